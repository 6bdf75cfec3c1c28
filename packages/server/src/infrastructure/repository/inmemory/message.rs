//! InMemory Message Repository 実装

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Message, MessageId, MessageRepository, NewMessage, PersistenceError, UserId,
};

#[derive(Default)]
struct MessageTable {
    rows: BTreeMap<MessageId, Message>,
    last_id: i64,
}

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    table: Mutex<MessageTable>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: NewMessage) -> Result<Message, PersistenceError> {
        let mut table = self.table.lock().await;
        let id = MessageId::new(table.last_id + 1)
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        let stored = message.into_message(id);
        table.last_id = id.value();
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, message: Message) -> Result<Message, PersistenceError> {
        let mut table = self.table.lock().await;
        let row = table
            .rows
            .get_mut(&message.id)
            .ok_or(PersistenceError::MessageNotFound(message.id))?;
        *row = message.clone();
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Message, PersistenceError> {
        let table = self.table.lock().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or(PersistenceError::MessageNotFound(id))
    }

    async fn list_conversation(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Vec<Message>, PersistenceError> {
        let table = self.table.lock().await;
        let mut messages: Vec<Message> = table
            .rows
            .values()
            .filter(|m| {
                (m.author == a && m.recipient == b) || (m.author == b && m.recipient == a)
            })
            .cloned()
            .collect();
        // newest first; id breaks ties between equal timestamps
        messages.sort_by(|x, y| y.timestamp.cmp(&x.timestamp).then(y.id.cmp(&x.id)));
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, MessageFactory, Timestamp};

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    fn draft(author: i64, recipient: i64, body: &str, ts: i64) -> NewMessage {
        MessageFactory::draft(user(author), user(recipient), body, None, Timestamp::new(ts))
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_keeps_fields() {
        // テスト項目: 保存時に ID が割り当てられ、他のフィールドは保持される
        // given (前提条件):
        let repository = InMemoryMessageRepository::new();

        // when (操作):
        let stored = repository.insert(draft(1, 2, " hi ", 100)).await.unwrap();

        // then (期待する結果):
        assert_eq!(stored.id.value(), 1);
        assert_eq!(stored.body.as_str(), "hi");
        assert_eq!(repository.find_by_id(stored.id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_update_unknown_message_fails() {
        // テスト項目: 存在しないメッセージの更新は MessageNotFound になる
        // given (前提条件):
        let repository = InMemoryMessageRepository::new();
        let ghost = draft(1, 2, "boo", 0).into_message(MessageId::new(5).unwrap());

        // when (操作):
        let result = repository.update(ghost).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PersistenceError::MessageNotFound(MessageId::new(5).unwrap()))
        );
    }

    #[tokio::test]
    async fn test_update_overwrites_body() {
        // テスト項目: 更新で本文が書き換わる
        let repository = InMemoryMessageRepository::new();
        let stored = repository.insert(draft(1, 2, "first", 0)).await.unwrap();

        let edited = stored.with_body(MessageBody::new("second"));
        repository.update(edited).await.unwrap();

        let reloaded = repository.find_by_id(stored.id).await.unwrap();
        assert_eq!(reloaded.body.as_str(), "second");
    }

    #[tokio::test]
    async fn test_conversation_is_newest_first_and_filtered() {
        // テスト項目: 会話は 2 者間のメッセージのみ、新しい順に返される
        // given (前提条件):
        let repository = InMemoryMessageRepository::new();
        repository.insert(draft(1, 2, "one", 100)).await.unwrap();
        repository.insert(draft(2, 1, "two", 200)).await.unwrap();
        repository.insert(draft(1, 3, "other", 300)).await.unwrap();
        repository.insert(draft(1, 2, "three", 300)).await.unwrap();

        // when (操作):
        let conversation = repository.list_conversation(user(2), user(1)).await.unwrap();

        // then (期待する結果):
        let bodies: Vec<&str> = conversation.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["three", "two", "one"]);
    }
}
