use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    auth::Identity,
    middleware::AuthUser,
    state::AppState,
    websocket::{events, types::ServerEvent},
};

/// Chat WebSocket endpoint. The auth middleware has already verified the
/// handshake token and attached the identity; a rejected handshake never
/// reaches this handler, so no session state exists for it.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
}

/// Per-session lifecycle: register, sync rooms from persisted membership,
/// pump events until either side hangs up, then tear everything down.
async fn handle_socket(socket: WebSocket, identity: Identity, state: AppState) {
    let session_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    state.connections.register(session_id, identity.id, tx.clone());
    tracing::info!("User {} connected (session {})", identity.id, session_id);

    // Join one room per persisted conversation membership, so broadcasts for
    // existing conversations reach this session immediately. A store failure
    // here is non-fatal: the session stays connected and will resync on its
    // next reconnect.
    match state
        .conversation_repository
        .find_ids_for_user(identity.id)
        .await
    {
        Ok(conversation_ids) => {
            for conversation_id in conversation_ids {
                state.connections.join_room(conversation_id, session_id);
            }
        }
        Err(e) => {
            tracing::warn!(
                "Failed to join conversation rooms for user {}: {:?}",
                identity.id,
                e
            );
        }
    }

    // Task: drain the session channel into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&event) {
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Task: dispatch inbound frames
    let recv_state = state.clone();
    let recv_identity = identity.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                events::dispatch(&text, session_id, &recv_identity, &recv_state).await;
            } else if let Message::Close(_) = msg {
                break;
            }
        }
    });

    // Heartbeat task
    let tx_heartbeat = tx.clone();
    let mut heartbeat_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            if tx_heartbeat.send(ServerEvent::Ping).is_err() {
                break;
            }
        }
    });

    // Stop all tasks when any one finishes
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            heartbeat_task.abort();
        },
        _ = &mut recv_task => {
            send_task.abort();
            heartbeat_task.abort();
        },
        _ = &mut heartbeat_task => {
            send_task.abort();
            recv_task.abort();
        }
    }

    // Drops the session from the registry and every room it occupied.
    // In-flight store work started by this session completes on its own;
    // only the echo is lost.
    state.connections.unregister(session_id);
    tracing::info!("User {} disconnected (session {})", identity.id, session_id);
}
