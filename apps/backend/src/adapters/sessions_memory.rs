//! In-memory adapter for the session store.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::state::{PlayerId, Role};
use crate::errors::domain::DomainError;
use crate::repos::sessions::{RoomId, RoomState, SessionStore};

/// DashMap-backed `SessionStore`. Records are kept as JSON text exactly as a
/// durable store would hold them.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: DashMap<RoomId, String>,
    roles: DashMap<(RoomId, PlayerId), Role>,
    rooms: DashMap<RoomId, RoomState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, room: &str) -> Option<String> {
        self.sessions.get(room).map(|e| e.value().clone())
    }

    pub fn role(&self, room: &str, player_id: &str) -> Option<Role> {
        self.roles
            .get(&(room.to_string(), player_id.to_string()))
            .map(|e| *e.value())
    }

    pub fn room_state(&self, room: &str) -> Option<RoomState> {
        self.rooms.get(room).map(|e| *e.value())
    }

    /// Overwrite a record directly, bypassing the engine.
    pub fn put_raw(&self, room: &str, text: impl Into<String>) {
        self.sessions.insert(room.to_string(), text.into());
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load_session(&self, room: &str) -> Result<Option<String>, DomainError> {
        Ok(self.record(room))
    }

    async fn save_session(&self, room: &str, record: String) -> Result<(), DomainError> {
        self.sessions.insert(room.to_string(), record);
        Ok(())
    }

    async fn delete_session(&self, room: &str) -> Result<(), DomainError> {
        self.sessions.remove(room);
        self.roles.retain(|(r, _), _| r != room);
        Ok(())
    }

    async fn set_player_role(
        &self,
        room: &str,
        player_id: &str,
        role: Role,
    ) -> Result<(), DomainError> {
        self.roles
            .insert((room.to_string(), player_id.to_string()), role);
        Ok(())
    }

    async fn set_room_state(&self, room: &str, state: RoomState) -> Result<(), DomainError> {
        self.rooms.insert(room.to_string(), state);
        Ok(())
    }
}
