//! Database models for conversations and chat messages.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use amanah_core::chat::{ChatMessage, Conversation};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConversationDB {
    pub id: String,
    pub participant1_id: String,
    pub participant2_id: String,
    pub last_message_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ConversationDB> for Conversation {
    fn from(db: ConversationDB) -> Self {
        Self {
            id: db.id,
            participant1_id: db.participant1_id,
            participant2_id: db.participant2_id,
            last_message_at: db.last_message_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Conversation> for ConversationDB {
    fn from(domain: Conversation) -> Self {
        Self {
            id: domain.id,
            participant1_id: domain.participant1_id,
            participant2_id: domain.participant2_id,
            last_message_at: domain.last_message_at,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::chat_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChatMessageDB {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl From<ChatMessageDB> for ChatMessage {
    fn from(db: ChatMessageDB) -> Self {
        Self {
            id: db.id,
            conversation_id: db.conversation_id,
            sender_id: db.sender_id,
            content: db.content,
            is_read: db.is_read,
            created_at: db.created_at,
        }
    }
}

impl From<ChatMessage> for ChatMessageDB {
    fn from(domain: ChatMessage) -> Self {
        Self {
            id: domain.id,
            conversation_id: domain.conversation_id,
            sender_id: domain.sender_id,
            content: domain.content,
            is_read: domain.is_read,
            created_at: domain.created_at,
        }
    }
}
