pub mod connection;
pub mod events;
pub mod handler;
pub mod types;

pub use connection::{ConnectionManager, SessionId, WsSender};
pub use handler::ws_handler;
