use uuid::Uuid;

use crate::{
    auth::Identity,
    conversation::{
        conversation_dto::NewConversationRequest,
        conversation_models::Conversation,
        conversation_repository::ConversationRepository,
    },
    error::{AppError, Result},
    message::message_repository::MessageRepository,
    websocket::{
        connection::SessionId,
        types::{ConversationPayload, Envelope, LastMessageSummary, ServerEvent},
        ConnectionManager,
    },
};

/// Stable ordering for a direct pair, so lookup and creation always see the
/// same two bind positions regardless of how the client ordered them.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone)]
pub struct ConversationService {
    repo: ConversationRepository,
    message_repo: MessageRepository,
    connections: ConnectionManager,
}

impl ConversationService {
    pub fn new(
        repo: ConversationRepository,
        message_repo: MessageRepository,
        connections: ConnectionManager,
    ) -> Self {
        Self {
            repo,
            message_repo,
            connections,
        }
    }

    /// Creates a conversation, deduplicating direct pairs.
    ///
    /// A deduplicated hit answers the requester session alone. A fresh
    /// conversation admits every currently-connected participant session to
    /// the new room, then broadcasts one consistent populated event to the
    /// room, requester included. Participants who are offline pick the room
    /// up at their next connect-time join.
    ///
    /// The dedup check and the insert are not atomic; two sessions racing to
    /// open the same direct pair can both create one (see DESIGN.md).
    pub async fn open(
        &self,
        session_id: SessionId,
        identity: &Identity,
        payload: NewConversationRequest,
    ) -> Result<()> {
        if payload.kind != "direct" && payload.kind != "group" {
            return Err(AppError::BadRequest(
                "Conversation type must be 'direct' or 'group'".to_string(),
            ));
        }

        if payload.kind == "direct" {
            if payload.participants.len() != 2 {
                return Err(AppError::BadRequest(
                    "Direct conversations require exactly two participants".to_string(),
                ));
            }
            let (a, b) = canonical_pair(payload.participants[0], payload.participants[1]);
            if a == b {
                return Err(AppError::BadRequest(
                    "Direct conversation participants must be distinct".to_string(),
                ));
            }

            if let Some(existing) = self.repo.find_direct_between(a, b).await? {
                let populated = self.populate(&existing, Some(false)).await?;
                self.connections.send_to_session(
                    session_id,
                    ServerEvent::NewConversation(Envelope::ok(populated)),
                );
                return Ok(());
            }
        }

        let conversation = self
            .repo
            .create(
                &payload.kind,
                payload.name.as_deref().unwrap_or(""),
                payload.avatar.as_deref().unwrap_or(""),
                identity.id,
                &payload.participants,
            )
            .await?;

        // Only sessions already connected get the room now; everyone else
        // joins on their own next connect.
        for online_session in self.connections.sessions_for(&payload.participants) {
            self.connections.join_room(conversation.id, online_session);
        }

        let populated = self.populate(&conversation, Some(true)).await?;
        self.connections.emit_to_room(
            conversation.id,
            ServerEvent::NewConversation(Envelope::ok(populated)),
        );

        Ok(())
    }

    /// All conversations for the user, newest activity first, each enriched
    /// with participant profiles and a last-message summary.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ConversationPayload>> {
        let conversations = self.repo.find_for_user(user_id).await?;

        let mut payloads = Vec::with_capacity(conversations.len());
        for conversation in &conversations {
            payloads.push(self.populate(conversation, None).await?);
        }

        Ok(payloads)
    }

    /// Read-through join: resolves participant profiles and the last-message
    /// summary for one conversation row.
    async fn populate(
        &self,
        conversation: &Conversation,
        is_new: Option<bool>,
    ) -> Result<ConversationPayload> {
        let participants = self.repo.participants_of(conversation.id).await?;

        let last_message = match conversation.last_message_id {
            Some(message_id) => {
                self.message_repo
                    .find_by_id(message_id)
                    .await?
                    .map(|m| LastMessageSummary {
                        id: m.id,
                        content: m.content,
                        sender_id: m.sender_id,
                        attachment: m.attachment,
                        created_at: m.created_at,
                    })
            }
            None => None,
        };

        Ok(ConversationPayload {
            id: conversation.id,
            kind: conversation.kind.clone(),
            participants,
            name: conversation.name.clone(),
            avatar: conversation.avatar.clone(),
            created_by: conversation.created_by,
            last_message,
            is_new,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_insensitive() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn canonical_pair_sorts_ascending() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lo, hi) = canonical_pair(a, b);
        assert!(lo <= hi);
    }
}
