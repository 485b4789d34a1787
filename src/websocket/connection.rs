use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::websocket::types::ServerEvent;

pub type SessionId = Uuid;
pub type WsSender = mpsc::UnboundedSender<ServerEvent>;

struct Session {
    user_id: Uuid,
    tx: WsSender,
}

/// Process-wide session and room tables. One entry per live connection
/// (a user with several devices holds several sessions) and one room per
/// conversation id. Injected through `AppState`; cleared per-session on
/// disconnect.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    sessions: Arc<DashMap<SessionId, Session>>,
    rooms: Arc<DashMap<Uuid, HashSet<SessionId>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session_id: SessionId, user_id: Uuid, tx: WsSender) {
        self.sessions.insert(session_id, Session { user_id, tx });
        tracing::debug!("Session {} registered for user {}", session_id, user_id);
    }

    /// Removes the session and every room membership it holds. Idempotent:
    /// unregistering an unknown session is a no-op.
    pub fn unregister(&self, session_id: SessionId) {
        if self.sessions.remove(&session_id).is_none() {
            return;
        }
        self.rooms.retain(|_, members| {
            members.remove(&session_id);
            !members.is_empty()
        });
        tracing::debug!("Session {} unregistered", session_id);
    }

    /// Live sessions belonging to any of the given users.
    pub fn sessions_for(&self, user_ids: &[Uuid]) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|entry| user_ids.contains(&entry.value().user_id))
            .map(|entry| *entry.key())
            .collect()
    }

    /// Admits a session to a conversation room. Sessions that already
    /// disconnected are skipped, so a broadcast never reaches a dead handle.
    pub fn join_room(&self, conversation_id: Uuid, session_id: SessionId) {
        if !self.sessions.contains_key(&session_id) {
            return;
        }
        self.rooms
            .entry(conversation_id)
            .or_default()
            .insert(session_id);
    }

    /// Fan-out: delivers the event to every session currently in the room.
    /// Sessions whose channel is gone are pruned from the room on the way.
    pub fn emit_to_room(&self, conversation_id: Uuid, event: ServerEvent) {
        let Some(mut members) = self.rooms.get_mut(&conversation_id) else {
            return;
        };
        members.retain(|session_id| match self.sessions.get(session_id) {
            Some(session) => session.tx.send(event.clone()).is_ok(),
            None => false,
        });
    }

    pub fn send_to_session(&self, session_id: SessionId, event: ServerEvent) {
        if let Some(session) = self.sessions.get(&session_id) {
            let _ = session.tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::types::{Envelope, ServerEvent, TokenPayload};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn event() -> ServerEvent {
        ServerEvent::UpdateProfile(Envelope::ok(TokenPayload {
            token: "t".to_string(),
        }))
    }

    fn connect(manager: &ConnectionManager, user_id: Uuid) -> (SessionId, UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4();
        manager.register(session_id, user_id, tx);
        (session_id, rx)
    }

    #[tokio::test]
    async fn sessions_for_covers_every_device_of_a_user() {
        let manager = ConnectionManager::new();
        let user = Uuid::new_v4();
        let (phone, _rx1) = connect(&manager, user);
        let (laptop, _rx2) = connect(&manager, user);
        let (_stranger, _rx3) = connect(&manager, Uuid::new_v4());

        let mut sessions = manager.sessions_for(&[user]);
        sessions.sort();
        let mut expected = vec![phone, laptop];
        expected.sort();
        assert_eq!(sessions, expected);
    }

    #[tokio::test]
    async fn double_unregister_is_a_noop() {
        let manager = ConnectionManager::new();
        let user = Uuid::new_v4();
        let (session, _rx) = connect(&manager, user);

        manager.unregister(session);
        manager.unregister(session);

        assert!(manager.sessions_for(&[user]).is_empty());
    }

    #[tokio::test]
    async fn emit_reaches_room_members_only() {
        let manager = ConnectionManager::new();
        let room = Uuid::new_v4();
        let (member_a, mut rx_a) = connect(&manager, Uuid::new_v4());
        let (member_b, mut rx_b) = connect(&manager, Uuid::new_v4());
        let (_outsider, mut rx_c) = connect(&manager, Uuid::new_v4());

        manager.join_room(room, member_a);
        manager.join_room(room, member_b);
        manager.emit_to_room(room, event());

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnected_session_receives_no_broadcasts() {
        let manager = ConnectionManager::new();
        let room = Uuid::new_v4();
        let (leaver, mut rx_leaver) = connect(&manager, Uuid::new_v4());
        let (stayer, mut rx_stayer) = connect(&manager, Uuid::new_v4());
        manager.join_room(room, leaver);
        manager.join_room(room, stayer);

        manager.unregister(leaver);
        manager.emit_to_room(room, event());

        assert!(rx_leaver.try_recv().is_err());
        assert!(rx_stayer.try_recv().is_ok());
    }

    #[tokio::test]
    async fn join_after_disconnect_is_a_noop() {
        let manager = ConnectionManager::new();
        let room = Uuid::new_v4();
        let (ghost, mut rx_ghost) = connect(&manager, Uuid::new_v4());
        manager.unregister(ghost);

        manager.join_room(room, ghost);
        let (present, mut rx_present) = connect(&manager, Uuid::new_v4());
        manager.join_room(room, present);
        manager.emit_to_room(room, event());

        assert!(rx_ghost.try_recv().is_err());
        assert!(rx_present.try_recv().is_ok());
    }

    #[tokio::test]
    async fn emit_to_unknown_room_is_a_noop() {
        let manager = ConnectionManager::new();
        let (_session, mut rx) = connect(&manager, Uuid::new_v4());

        manager.emit_to_room(Uuid::new_v4(), event());

        assert!(rx.try_recv().is_err());
    }
}
