use std::sync::Arc;
use tracing::info;

use locaspace_core::{CoreError, CoreResult, MessagingApi, SessionContext};
use locaspace_shared::{Conversation, Message};

pub const MAX_MESSAGE_LEN: usize = 2000;

/// Conversations of the signed-in user.
pub struct MessagingService {
    api: Arc<dyn MessagingApi>,
    session: SessionContext,
}

impl MessagingService {
    pub fn new(api: Arc<dyn MessagingApi>, session: SessionContext) -> Self {
        Self { api, session }
    }

    pub async fn conversations(&self) -> CoreResult<Vec<Conversation>> {
        self.api.conversations().await
    }

    /// Messages of a conversation, oldest first.
    pub async fn messages(&self, conversation_id: &str) -> CoreResult<Vec<Message>> {
        let mut messages = self.api.messages(conversation_id).await?;
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    pub async fn send(&self, conversation_id: &str, body: &str) -> CoreResult<Message> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CoreError::ValidationError("A message cannot be empty.".to_string()));
        }
        if body.chars().count() > MAX_MESSAGE_LEN {
            return Err(CoreError::ValidationError(format!(
                "A message cannot exceed {} characters.",
                MAX_MESSAGE_LEN
            )));
        }

        let message = self.api.send_message(conversation_id, body).await?;
        info!(conversation_id, message_id = %message.id, "Message sent");
        Ok(message)
    }

    pub fn is_own_message(&self, message: &Message) -> bool {
        message.sender_id == self.session.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{client, spawn_backend};
    use locaspace_core::Role;

    async fn service() -> MessagingService {
        let base = spawn_backend().await;
        let api = client(&base);
        let session = api.session().clone();
        MessagingService::new(Arc::new(api), session)
    }

    #[tokio::test]
    async fn test_messages_are_ordered_and_owned() {
        let service = service().await;
        let messages = service.messages("c-1").await.unwrap();

        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["First", "Later"]);
        assert!(service.is_own_message(&messages[0]));
        assert!(!service.is_own_message(&messages[1]));
    }

    #[tokio::test]
    async fn test_send_trims_and_validates() {
        let service = service().await;

        let sent = service.send("c-1", "  Bonjour !  ").await.unwrap();
        assert_eq!(sent.body, "Bonjour !");
        assert_eq!(sent.conversation_id, "c-1");

        assert!(matches!(service.send("c-1", "   ").await, Err(CoreError::ValidationError(_))));
        let too_long = "a".repeat(MAX_MESSAGE_LEN + 1);
        assert!(matches!(service.send("c-1", &too_long).await, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_conversations() {
        let service = service().await;
        let conversations = service.conversations().await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].participants, vec!["u-1", "u-2"]);
        assert!(conversations[0].last_message.is_none());
    }

    #[test]
    fn test_is_own_message_uses_session_user() {
        struct NoApi;
        #[async_trait::async_trait]
        impl MessagingApi for NoApi {
            async fn conversations(&self) -> CoreResult<Vec<Conversation>> {
                Ok(Vec::new())
            }
            async fn messages(&self, _conversation_id: &str) -> CoreResult<Vec<Message>> {
                Ok(Vec::new())
            }
            async fn send_message(&self, _conversation_id: &str, _body: &str) -> CoreResult<Message> {
                Err(CoreError::InternalError("offline".to_string()))
            }
        }

        let service = MessagingService::new(Arc::new(NoApi), SessionContext::new("host-3", Role::Host));
        let message = Message {
            id: "m".to_string(),
            conversation_id: "c".to_string(),
            sender_id: "host-3".to_string(),
            body: "hi".to_string(),
            sent_at: chrono::Utc::now(),
        };
        assert!(service.is_own_message(&message));
    }
}
