//! One-to-one chat between back office users.

mod chat_model;
mod chat_service;
mod chat_traits;

#[cfg(test)]
mod chat_service_tests;

pub use chat_model::{
    ChatMessage, ChatUser, Conversation, ConversationSummary, ConversationView, NewMessage,
    OpenConversation, SentMessage,
};
pub use chat_service::ChatService;
pub use chat_traits::{ChatRepositoryTrait, ChatServiceTrait};
