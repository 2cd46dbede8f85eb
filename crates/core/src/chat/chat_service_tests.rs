use super::*;
use crate::errors::{Error, Result};
use crate::test_fixtures::MemoryUsers;
use crate::users::Role;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MemoryChat {
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl ChatRepositoryTrait for MemoryChat {
    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Conversation", conversation_id))
    }

    fn find_between(&self, user_a: &str, user_b: &str) -> Result<Option<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.has_participant(user_a) && c.has_participant(user_b))
            .cloned())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect())
    }

    fn last_message(&self, conversation_id: &str) -> Result<Option<ChatMessage>> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.conversation_id == conversation_id)
            .cloned())
    }

    fn unread_in_conversation(&self, conversation_id: &str, reader_id: &str) -> Result<i64> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id != reader_id)
            .filter(|m| !m.is_read)
            .count() as i64)
    }

    fn recent_messages(&self, conversation_id: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|m| m.conversation_id == conversation_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn get_message(&self, message_id: &str) -> Result<ChatMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Message", message_id))
    }

    fn unread_count(&self, user_id: &str) -> Result<i64> {
        let conversations = self.list_for_user(user_id)?;
        conversations
            .iter()
            .map(|c| self.unread_in_conversation(&c.id, user_id))
            .sum()
    }

    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.conversations.lock().unwrap().push(conversation.clone());
        Ok(conversation)
    }

    async fn insert_message(&self, message: ChatMessage) -> Result<ChatMessage> {
        for conversation in self
            .conversations
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|c| c.id == message.conversation_id)
        {
            conversation.last_message_at = Some(message.created_at);
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn mark_message_read(&self, message_id: String) -> Result<ChatMessage> {
        let mut messages = self.messages.lock().unwrap();
        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| Error::not_found("Message", &message_id))?;
        message.is_read = true;
        Ok(message.clone())
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: String,
        reader_id: String,
    ) -> Result<usize> {
        let mut marked = 0;
        for message in self.messages.lock().unwrap().iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.sender_id != reader_id && !m.is_read
        }) {
            message.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }
}

fn service() -> (Arc<MemoryChat>, ChatService) {
    let chat = Arc::new(MemoryChat::default());
    let users = Arc::new(MemoryUsers::with(&[
        ("Aisyah", Role::Admin, true),
        ("Bilal", Role::User, true),
        ("Citra", Role::Finance, true),
        ("Dimas", Role::User, false),
    ]));
    (chat.clone(), ChatService::new(chat, users))
}

fn text(conversation_id: &str, content: &str) -> NewMessage {
    NewMessage {
        conversation_id: conversation_id.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn opening_twice_returns_the_same_conversation() {
    let (_, service) = service();

    let first = service.open_conversation("u1", "u2").await.unwrap();
    let again = service.open_conversation("u2", "u1").await.unwrap();

    assert!(first.created);
    assert!(!again.created);
    assert_eq!(first.conversation.id, again.conversation.id);
    assert_eq!(again.other_user.name, "Aisyah");
}

#[tokio::test]
async fn cannot_open_conversation_with_self_or_unknown_user() {
    let (_, service) = service();

    let own = service.open_conversation("u1", "u1").await.unwrap_err();
    assert!(matches!(own, Error::Validation(_)));

    let unknown = service.open_conversation("u1", "u99").await.unwrap_err();
    assert!(unknown.is_not_found());
}

#[tokio::test]
async fn sent_message_is_addressed_to_the_other_participant() {
    let (_, service) = service();
    let view = service.open_conversation("u1", "u2").await.unwrap();

    let sent = service
        .send_message("u1", text(&view.conversation.id, "  Assalamualaikum  "))
        .await
        .unwrap();

    assert_eq!(sent.recipient_id, "u2");
    assert_eq!(sent.message.content, "Assalamualaikum");
    assert!(!sent.message.is_read);
    assert_eq!(service.unread_count("u2").unwrap(), 1);
    assert_eq!(service.unread_count("u1").unwrap(), 0);
}

#[tokio::test]
async fn outsiders_cannot_read_or_post() {
    let (_, service) = service();
    let view = service.open_conversation("u1", "u2").await.unwrap();
    let id = view.conversation.id;

    let read = service.messages("u3", &id, 50).await.unwrap_err();
    assert!(matches!(read, Error::Forbidden(_)));

    let post = service.send_message("u3", text(&id, "halo")).await.unwrap_err();
    assert!(matches!(post, Error::Forbidden(_)));

    let blank = service.send_message("u1", text(&id, "   ")).await.unwrap_err();
    assert!(matches!(blank, Error::Validation(_)));
}

#[tokio::test]
async fn reading_messages_returns_oldest_first_and_marks_them_read() {
    let (_, service) = service();
    let id = service
        .open_conversation("u1", "u2")
        .await
        .unwrap()
        .conversation
        .id;
    for content in ["satu", "dua", "tiga"] {
        service.send_message("u1", text(&id, content)).await.unwrap();
    }

    let latest_two = service.messages("u2", &id, 2).await.unwrap();
    let contents: Vec<&str> = latest_two.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["dua", "tiga"]);
    assert_eq!(service.unread_count("u2").unwrap(), 0);

    let summaries = service.list_conversations("u2").unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].unread_count, 0);
    assert_eq!(
        summaries[0].last_message.as_ref().map(|m| m.content.as_str()),
        Some("tiga")
    );
    assert_eq!(
        summaries[0].other_user.as_ref().map(|u| u.id.as_str()),
        Some("u1")
    );
}

#[tokio::test]
async fn only_the_recipient_marks_a_message_read() {
    let (_, service) = service();
    let id = service
        .open_conversation("u1", "u2")
        .await
        .unwrap()
        .conversation
        .id;
    let sent = service.send_message("u1", text(&id, "halo")).await.unwrap();

    let by_sender = service.mark_read("u1", &sent.message.id).await.unwrap_err();
    assert!(matches!(by_sender, Error::Forbidden(_)));

    let read = service.mark_read("u2", &sent.message.id).await.unwrap();
    assert!(read.is_read);
}

#[test]
fn chat_users_lists_other_active_users() {
    let (_, service) = service();
    let names: Vec<String> = service
        .chat_users("u1")
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Bilal".to_string(), "Citra".to_string()]);
}
