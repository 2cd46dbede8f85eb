use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::chat_model::{
    ChatMessage, ChatUser, Conversation, ConversationSummary, ConversationView, NewMessage,
    SentMessage,
};
use super::chat_traits::{ChatRepositoryTrait, ChatServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::users::UserRepositoryTrait;
use crate::utils::time_utils::now_utc;

const MAX_MESSAGES: i64 = 200;

pub struct ChatService {
    repository: Arc<dyn ChatRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn ChatRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            user_repository,
        }
    }

    fn participant_conversation(&self, user_id: &str, conversation_id: &str) -> Result<Conversation> {
        let conversation = self.repository.get_conversation(conversation_id)?;
        if !conversation.has_participant(user_id) {
            return Err(Error::Forbidden(
                "you are not a participant of this conversation".to_string(),
            ));
        }
        Ok(conversation)
    }
}

#[async_trait]
impl ChatServiceTrait for ChatService {
    fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        self.repository
            .list_for_user(user_id)?
            .into_iter()
            .map(|conversation| {
                let other_id = conversation.other_participant(user_id).to_string();
                Ok(ConversationSummary {
                    other_user: self
                        .user_repository
                        .get_by_id(&other_id)
                        .ok()
                        .map(ChatUser::from),
                    last_message: self.repository.last_message(&conversation.id)?,
                    unread_count: self
                        .repository
                        .unread_in_conversation(&conversation.id, user_id)?,
                    conversation,
                })
            })
            .collect()
    }

    async fn open_conversation(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<ConversationView> {
        let other_user_id = other_user_id.trim();
        if other_user_id.is_empty() {
            return Err(ValidationError::MissingField("otherUserId".to_string()).into());
        }
        if other_user_id == user_id {
            return Err(
                ValidationError::invalid("cannot start a conversation with yourself").into(),
            );
        }
        let other_user = ChatUser::from(self.user_repository.get_by_id(other_user_id)?);

        if let Some(conversation) = self.repository.find_between(user_id, other_user_id)? {
            return Ok(ConversationView {
                conversation,
                other_user,
                created: false,
            });
        }

        let now = now_utc();
        let conversation = self
            .repository
            .create_conversation(Conversation {
                id: Uuid::new_v4().to_string(),
                participant1_id: user_id.to_string(),
                participant2_id: other_user_id.to_string(),
                last_message_at: None,
                created_at: now,
                updated_at: now,
            })
            .await?;
        debug!("Opened conversation {}", conversation.id);
        Ok(ConversationView {
            conversation,
            other_user,
            created: true,
        })
    }

    async fn messages(
        &self,
        user_id: &str,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>> {
        self.participant_conversation(user_id, conversation_id)?;
        let mut messages = self
            .repository
            .recent_messages(conversation_id, limit.clamp(1, MAX_MESSAGES))?;
        messages.reverse();
        self.repository
            .mark_conversation_read(conversation_id.to_string(), user_id.to_string())
            .await?;
        Ok(messages)
    }

    async fn send_message(&self, user_id: &str, message: NewMessage) -> Result<SentMessage> {
        message.validate()?;
        let conversation = self.participant_conversation(user_id, &message.conversation_id)?;
        let stored = self
            .repository
            .insert_message(ChatMessage {
                id: Uuid::new_v4().to_string(),
                conversation_id: conversation.id.clone(),
                sender_id: user_id.to_string(),
                content: message.content.trim().to_string(),
                is_read: false,
                created_at: now_utc(),
            })
            .await?;
        Ok(SentMessage {
            recipient_id: conversation.other_participant(user_id).to_string(),
            message: stored,
        })
    }

    async fn mark_read(&self, user_id: &str, message_id: &str) -> Result<ChatMessage> {
        let message = self.repository.get_message(message_id)?;
        let conversation = self.participant_conversation(user_id, &message.conversation_id)?;
        if message.sender_id == user_id {
            return Err(Error::Forbidden(
                "only the recipient can mark a message as read".to_string(),
            ));
        }
        debug!("Marking message {} in {} read", message.id, conversation.id);
        self.repository
            .mark_message_read(message_id.to_string())
            .await
    }

    fn unread_count(&self, user_id: &str) -> Result<i64> {
        self.repository.unread_count(user_id)
    }

    fn chat_users(&self, user_id: &str) -> Result<Vec<ChatUser>> {
        Ok(self
            .user_repository
            .list()?
            .into_iter()
            .filter(|u| u.is_active && u.id != user_id)
            .map(ChatUser::from)
            .collect())
    }
}
