use uuid::Uuid;

use crate::{
    conversation::conversation_repository::ConversationRepository,
    error::{AppError, Result},
    message::{
        message_dto::{MessageSender, NewMessageRequest},
        message_models::Message,
        message_repository::MessageRepository,
    },
    websocket::{
        types::{Envelope, MessagePayload, ServerEvent},
        ConnectionManager,
    },
};

#[derive(Clone)]
pub struct MessageService {
    repo: MessageRepository,
    conversation_repo: ConversationRepository,
    connections: ConnectionManager,
}

impl MessageService {
    pub fn new(
        repo: MessageRepository,
        conversation_repo: ConversationRepository,
        connections: ConnectionManager,
    ) -> Self {
        Self {
            repo,
            conversation_repo,
            connections,
        }
    }

    /// Persists the message, then fans it out to the conversation room.
    ///
    /// The broadcast runs strictly after the insert, so every delivered
    /// message carries a durable id. The lastMessage pointer is written
    /// afterwards and may lag behind what clients have already rendered;
    /// a failure there leaves it stale until the next successful send.
    pub async fn send(&self, payload: NewMessageRequest) -> Result<Message> {
        self.conversation_repo
            .find_by_id(payload.conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

        let message = self
            .repo
            .create(
                payload.conversation_id,
                payload.sender.id,
                &payload.content,
                payload.attachment.as_deref(),
            )
            .await?;

        let ws_event = ServerEvent::NewMessage(Envelope::ok(MessagePayload {
            id: message.id,
            conversation_id: message.conversation_id,
            content: message.content.clone(),
            sender: payload.sender.clone(),
            attachment: message.attachment.clone(),
            created_at: message.created_at,
        }));
        self.connections
            .emit_to_room(message.conversation_id, ws_event);

        self.conversation_repo
            .set_last_message(message.conversation_id, message.id)
            .await?;

        Ok(message)
    }

    /// History for a conversation, newest first, each entry carrying the
    /// sender profile resolved from the store.
    pub async fn list(&self, conversation_id: Uuid) -> Result<Vec<MessagePayload>> {
        let rows = self.repo.find_for_conversation(conversation_id).await?;

        Ok(rows
            .into_iter()
            .map(|row| MessagePayload {
                id: row.id,
                conversation_id: row.conversation_id,
                content: row.content,
                sender: MessageSender {
                    id: row.sender_id,
                    name: row.sender_name,
                    avatar: row.sender_avatar,
                },
                attachment: row.attachment,
                created_at: row.created_at,
            })
            .collect())
    }
}
