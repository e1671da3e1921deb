//! Session store seam.
//!
//! The store holds one serialized record per room and replaces it whole on
//! every save. It also keeps two side tables the lobby layer reads for
//! reconnection: each player's role and each room's lifecycle state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::state::Role;
use crate::errors::domain::DomainError;

pub type RoomId = String;

/// Lifecycle state of a room as seen by the lobby layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomState {
    Lobby,
    Playing,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored record text for a room, if any.
    async fn load_session(&self, room: &str) -> Result<Option<String>, DomainError>;

    /// Atomically replace the room's record.
    async fn save_session(&self, room: &str, record: String) -> Result<(), DomainError>;

    async fn delete_session(&self, room: &str) -> Result<(), DomainError>;

    async fn set_player_role(
        &self,
        room: &str,
        player_id: &str,
        role: Role,
    ) -> Result<(), DomainError>;

    async fn set_room_state(&self, room: &str, state: RoomState) -> Result<(), DomainError>;
}
