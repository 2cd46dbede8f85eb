use amanah_core::chat::{ChatMessage, ChatRepositoryTrait, Conversation};
use amanah_core::errors::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{ChatMessageDB, ConversationDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::{chat_messages, conversations};

pub struct ChatRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ChatRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ChatRepository { pool, writer }
    }
}

#[async_trait]
impl ChatRepositoryTrait for ChatRepository {
    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        let mut conn = get_connection(&self.pool)?;
        conversations::table
            .find(conversation_id)
            .select(ConversationDB::as_select())
            .first::<ConversationDB>(&mut conn)
            .map(Conversation::from)
            .map_err(not_found_as("Conversation", conversation_id))
    }

    fn find_between(&self, user_a: &str, user_b: &str) -> Result<Option<Conversation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = conversations::table
            .filter(
                conversations::participant1_id
                    .eq(user_a)
                    .and(conversations::participant2_id.eq(user_b))
                    .or(conversations::participant1_id
                        .eq(user_b)
                        .and(conversations::participant2_id.eq(user_a))),
            )
            .select(ConversationDB::as_select())
            .first::<ConversationDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Conversation::from))
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = conversations::table
            .filter(
                conversations::participant1_id
                    .eq(user_id)
                    .or(conversations::participant2_id.eq(user_id)),
            )
            .order((
                conversations::last_message_at.desc(),
                conversations::updated_at.desc(),
            ))
            .select(ConversationDB::as_select())
            .load::<ConversationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    fn last_message(&self, conversation_id: &str) -> Result<Option<ChatMessage>> {
        let mut conn = get_connection(&self.pool)?;
        let row = chat_messages::table
            .filter(chat_messages::conversation_id.eq(conversation_id))
            .order(chat_messages::created_at.desc())
            .select(ChatMessageDB::as_select())
            .first::<ChatMessageDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(ChatMessage::from))
    }

    fn unread_in_conversation(&self, conversation_id: &str, reader_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(chat_messages::table
            .filter(chat_messages::conversation_id.eq(conversation_id))
            .filter(chat_messages::sender_id.ne(reader_id))
            .filter(chat_messages::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn recent_messages(&self, conversation_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = chat_messages::table
            .filter(chat_messages::conversation_id.eq(conversation_id))
            .order(chat_messages::created_at.desc())
            .limit(limit.max(0))
            .select(ChatMessageDB::as_select())
            .load::<ChatMessageDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    fn get_message(&self, message_id: &str) -> Result<ChatMessage> {
        let mut conn = get_connection(&self.pool)?;
        chat_messages::table
            .find(message_id)
            .select(ChatMessageDB::as_select())
            .first::<ChatMessageDB>(&mut conn)
            .map(ChatMessage::from)
            .map_err(not_found_as("Message", message_id))
    }

    fn unread_count(&self, user_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let mine = conversations::table
            .filter(
                conversations::participant1_id
                    .eq(user_id.to_string())
                    .or(conversations::participant2_id.eq(user_id.to_string())),
            )
            .select(conversations::id);
        Ok(chat_messages::table
            .filter(chat_messages::conversation_id.eq_any(mine))
            .filter(chat_messages::sender_id.ne(user_id))
            .filter(chat_messages::is_read.eq(false))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Conversation> {
                let row: ConversationDB = conversation.into();
                let stored = diesel::insert_into(conversations::table)
                    .values(&row)
                    .returning(ConversationDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Conversation::from(stored))
            })
            .await
    }

    async fn insert_message(&self, message: ChatMessage) -> Result<ChatMessage> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ChatMessage> {
                let row: ChatMessageDB = message.into();
                let stored = diesel::insert_into(chat_messages::table)
                    .values(&row)
                    .returning(ChatMessageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                diesel::update(conversations::table.find(&stored.conversation_id))
                    .set((
                        conversations::last_message_at.eq(Some(stored.created_at)),
                        conversations::updated_at.eq(stored.created_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(ChatMessage::from(stored))
            })
            .await
    }

    async fn mark_message_read(&self, message_id: String) -> Result<ChatMessage> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ChatMessage> {
                let stored = diesel::update(chat_messages::table.find(&message_id))
                    .set(chat_messages::is_read.eq(true))
                    .returning(ChatMessageDB::as_returning())
                    .get_result(conn)
                    .map_err(not_found_as("Message", &message_id))?;
                Ok(ChatMessage::from(stored))
            })
            .await
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: String,
        reader_id: String,
    ) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::update(
                    chat_messages::table
                        .filter(chat_messages::conversation_id.eq(&conversation_id))
                        .filter(chat_messages::sender_id.ne(&reader_id))
                        .filter(chat_messages::is_read.eq(false)),
                )
                .set(chat_messages::is_read.eq(true))
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}
