//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! BTreeMap をインメモリ DB として使用します。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{NewRoom, PersistenceError, Room, RoomId, RoomRepository};

#[derive(Default)]
struct RoomTable {
    rows: BTreeMap<RoomId, Room>,
    last_id: i64,
}

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    table: Mutex<RoomTable>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert(&self, room: NewRoom) -> Result<Room, PersistenceError> {
        let mut table = self.table.lock().await;
        let id = RoomId::new(table.last_id + 1)
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        let stored = Room {
            id,
            title: room.title,
            staff_only: room.staff_only,
            created_at: room.created_at,
        };
        table.last_id = id.value();
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: RoomId) -> Result<Room, PersistenceError> {
        let table = self.table.lock().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or(PersistenceError::RoomNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Room>, PersistenceError> {
        let table = self.table.lock().await;
        Ok(table.rows.values().cloned().collect())
    }
}
