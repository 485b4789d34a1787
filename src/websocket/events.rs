use validator::Validate;

use crate::{
    auth::Identity,
    conversation::conversation_dto::NewConversationRequest,
    error::{AppError, Result},
    message::message_dto::{GetMessagesRequest, NewMessageRequest},
    state::AppState,
    user::user_dto::UpdateProfileRequest,
    websocket::{
        connection::SessionId,
        types::{self, ClientEvent, Envelope, ServerEvent, TokenPayload},
    },
};

/// Routes one inbound frame to its handler and answers on the same event
/// name. Every domain failure is converted to a failure envelope here; no
/// error escapes to the session loop.
pub async fn dispatch(text: &str, session_id: SessionId, identity: &Identity, state: &AppState) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed client event from {}: {}", identity.id, e);
            reject_malformed(text, session_id, state);
            return;
        }
    };

    match event {
        ClientEvent::NewConversation(req) => {
            if let Err(e) = new_conversation(session_id, identity, state, req).await {
                tracing::error!("newConversation error: {:?}", e);
                let msg = client_message(&e, "Failed to create conversation");
                state.connections.send_to_session(
                    session_id,
                    ServerEvent::NewConversation(Envelope::error(msg)),
                );
            }
        }
        ClientEvent::GetConversations => {
            let reply = match state.conversation_service.list(identity.id).await {
                Ok(conversations) => ServerEvent::GetConversations(Envelope::ok(conversations)),
                Err(e) => {
                    tracing::error!("getConversations error: {:?}", e);
                    ServerEvent::GetConversations(Envelope::error(client_message(
                        &e,
                        "Failed to fetch conversations",
                    )))
                }
            };
            state.connections.send_to_session(session_id, reply);
        }
        ClientEvent::NewMessage(req) => {
            if let Err(e) = new_message(state, req).await {
                tracing::error!("newMessage error: {:?}", e);
                let msg = client_message(&e, "Failed to send new message");
                state
                    .connections
                    .send_to_session(session_id, ServerEvent::NewMessage(Envelope::error(msg)));
            }
        }
        ClientEvent::GetMessages(req) => {
            let reply = match get_messages(state, req).await {
                Ok(messages) => ServerEvent::GetMessages(Envelope::ok(messages)),
                Err(e) => {
                    tracing::error!("getMessages error: {:?}", e);
                    ServerEvent::GetMessages(Envelope::error(client_message(
                        &e,
                        "Failed to get messages",
                    )))
                }
            };
            state.connections.send_to_session(session_id, reply);
        }
        ClientEvent::UpdateProfile(req) => {
            let reply = match update_profile(identity, state, req).await {
                Ok(token) => ServerEvent::UpdateProfile(Envelope {
                    success: true,
                    data: Some(TokenPayload { token }),
                    msg: Some("Profile updated successfully".to_string()),
                }),
                Err(e) => {
                    tracing::error!("updateProfile error: {:?}", e);
                    ServerEvent::UpdateProfile(Envelope::error(client_message(
                        &e,
                        "Error updating profile",
                    )))
                }
            };
            state.connections.send_to_session(session_id, reply);
        }
        ClientEvent::GetContacts => {
            let reply = match state.user_service.contacts(identity.id).await {
                Ok(contacts) => ServerEvent::GetContacts(Envelope::ok(contacts)),
                Err(e) => {
                    tracing::error!("getContacts error: {:?}", e);
                    ServerEvent::GetContacts(Envelope::error(client_message(
                        &e,
                        "Failed to fetch contacts",
                    )))
                }
            };
            state.connections.send_to_session(session_id, reply);
        }
        ClientEvent::Ping => {
            state
                .connections
                .send_to_session(session_id, ServerEvent::Pong);
        }
        ClientEvent::Pong => {}
    }
}

async fn new_conversation(
    session_id: SessionId,
    identity: &Identity,
    state: &AppState,
    req: NewConversationRequest,
) -> Result<()> {
    req.validate()?;
    state
        .conversation_service
        .open(session_id, identity, req)
        .await
}

async fn new_message(state: &AppState, req: NewMessageRequest) -> Result<()> {
    req.validate()?;
    state.message_service.send(req).await?;
    Ok(())
}

async fn get_messages(
    state: &AppState,
    req: GetMessagesRequest,
) -> Result<Vec<types::MessagePayload>> {
    state.message_service.list(req.conversation_id).await
}

async fn update_profile(
    identity: &Identity,
    state: &AppState,
    req: UpdateProfileRequest,
) -> Result<String> {
    req.validate()?;
    state
        .user_service
        .update_profile(identity.id, req.name.as_deref(), req.avatar.as_deref())
        .await
}

/// Known event tag with a bad payload gets a failure envelope on that event;
/// frames without a recoverable tag are dropped.
fn reject_malformed(text: &str, session_id: SessionId, state: &AppState) {
    let event_name = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| {
            value
                .get("event")
                .and_then(|event| event.as_str())
                .map(str::to_owned)
        });

    if let Some(reply) = event_name
        .as_deref()
        .and_then(|name| types::failure(name, "Invalid payload".to_string()))
    {
        state.connections.send_to_session(session_id, reply);
    }
}

/// Store and internal errors stay generic towards clients; validation and
/// not-found messages pass through.
fn client_message(error: &AppError, fallback: &str) -> String {
    match error {
        AppError::Database(_) | AppError::InternalError => fallback.to_string(),
        other => other.to_string(),
    }
}
