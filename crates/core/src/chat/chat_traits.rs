use async_trait::async_trait;

use super::chat_model::{
    ChatMessage, ChatUser, Conversation, ConversationSummary, ConversationView, NewMessage,
    SentMessage,
};
use crate::errors::Result;

#[async_trait]
pub trait ChatRepositoryTrait: Send + Sync {
    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation>;

    /// The conversation between two users, in either participant order.
    fn find_between(&self, user_a: &str, user_b: &str) -> Result<Option<Conversation>>;

    /// Most recently active first.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>>;

    fn last_message(&self, conversation_id: &str) -> Result<Option<ChatMessage>>;

    /// Messages in the conversation not sent by `reader_id` and not read yet.
    fn unread_in_conversation(&self, conversation_id: &str, reader_id: &str) -> Result<i64>;

    /// Newest first.
    fn recent_messages(&self, conversation_id: &str, limit: i64) -> Result<Vec<ChatMessage>>;

    fn get_message(&self, message_id: &str) -> Result<ChatMessage>;

    /// Unread messages addressed to `user_id` across all conversations.
    fn unread_count(&self, user_id: &str) -> Result<i64>;

    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation>;

    /// Stores the message and bumps the conversation's last message time.
    async fn insert_message(&self, message: ChatMessage) -> Result<ChatMessage>;

    async fn mark_message_read(&self, message_id: String) -> Result<ChatMessage>;

    /// Marks everything `reader_id` received in the conversation as read.
    async fn mark_conversation_read(&self, conversation_id: String, reader_id: String)
        -> Result<usize>;
}

#[async_trait]
pub trait ChatServiceTrait: Send + Sync {
    fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>>;

    /// Returns the conversation with `other_user_id`, creating it if needed.
    async fn open_conversation(&self, user_id: &str, other_user_id: &str)
        -> Result<ConversationView>;

    /// Latest messages oldest first; incoming ones are marked read.
    async fn messages(
        &self,
        user_id: &str,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>>;

    async fn send_message(&self, user_id: &str, message: NewMessage) -> Result<SentMessage>;

    async fn mark_read(&self, user_id: &str, message_id: &str) -> Result<ChatMessage>;

    fn unread_count(&self, user_id: &str) -> Result<i64>;

    /// Active users the caller can talk to.
    fn chat_users(&self, user_id: &str) -> Result<Vec<ChatUser>>;
}
