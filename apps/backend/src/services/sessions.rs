//! Session service: the collaborator layer around one engine per room.
//!
//! Every operation takes the room's mutex, reconciles the resident engine
//! with the store on first touch, mutates in memory, then writes the whole
//! record back. Store writes after a mutation never undo it: a failed write
//! is logged and the in-memory engine stays authoritative.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::actions::Rejection;
use crate::domain::engine::PhaseMachine;
use crate::domain::game_transition::{derive_game_transitions, GameTransition, LifecycleView};
use crate::domain::state::Player;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::sessions::{RoomState, SessionStore};
use crate::services::party_game::PartyGame;
use crate::services::rooms::{RoomRegistry, RoomSlot, SharedSlot};

/// Reply to `apply_action`: the actor's fresh view and, if the action was
/// ignored, why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReply<V> {
    pub projection: V,
    pub rejection: Option<Rejection>,
}

pub struct SessionService<G: PartyGame = PhaseMachine> {
    store: Arc<dyn SessionStore>,
    registry: RoomRegistry<G>,
    config: EngineConfig,
}

impl<G: PartyGame> SessionService<G> {
    pub fn new(store: Arc<dyn SessionStore>, config: EngineConfig) -> Self {
        Self {
            registry: RoomRegistry::new(config.max_rooms),
            store,
            config,
        }
    }

    pub fn registry(&self) -> &RoomRegistry<G> {
        &self.registry
    }

    /// Load the stored record into a slot that has not seen the store yet.
    ///
    /// Missing or corrupt records leave a fresh lobby; a store outage is an error
    /// and the slot stays unhydrated so the next call retries.
    async fn hydrate(&self, room: &str, slot: &mut RoomSlot<G>) -> Result<(), AppError> {
        if slot.hydrated {
            return Ok(());
        }
        let stored = self.store.load_session(room).await.map_err(|e| {
            warn!(room, error = %e, "Session store unavailable on load");
            AppError::from(e)
        })?;

        slot.game = match stored {
            None => G::lobby(),
            Some(text) => match G::from_record(&text) {
                Ok(game) => {
                    info!(room, "Session rehydrated from store");
                    game
                }
                Err(e) => {
                    warn!(room, error = %e, "Corrupt session record; resetting room to lobby");
                    G::lobby()
                }
            },
        };
        slot.hydrated = true;
        Ok(())
    }

    /// Slot for a room that is resident or has a stored record.
    ///
    /// Rooms nobody started stay out of the registry, so lookups never use
    /// up the room cap.
    async fn known_room(&self, room: &str) -> Result<Option<SharedSlot<G>>, AppError> {
        if let Some(slot) = self.registry.get(room) {
            return Ok(Some(slot));
        }
        let stored = self.store.load_session(room).await.map_err(|e| {
            warn!(room, error = %e, "Session store unavailable on load");
            AppError::from(e)
        })?;
        if stored.is_none() {
            return Ok(None);
        }
        Ok(Some(self.registry.get_or_create(room)?))
    }

    async fn persist(&self, room: &str, game: &G) {
        let record = match game.to_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(room, error = %e, "Failed to encode session record");
                return;
            }
        };
        if let Err(e) = self.store.save_session(room, record).await {
            warn!(room, error = %e, "Failed to save session record");
        }
    }

    async fn set_room_state(&self, room: &str, state: RoomState) {
        if let Err(e) = self.store.set_room_state(room, state).await {
            warn!(room, ?state, error = %e, "Failed to record room state");
        }
    }

    async fn publish_roles(&self, room: &str, game: &G) {
        for (player_id, role) in game.assigned_roles() {
            if let Err(e) = self.store.set_player_role(room, &player_id, role).await {
                warn!(room, player_id = %player_id, error = %e, "Failed to record player role");
            }
        }
    }

    fn log_transitions(room: &str, before: &LifecycleView, after: &LifecycleView) {
        for transition in derive_game_transitions(before, after) {
            match transition {
                GameTransition::GameStarted => info!(room, "Game started"),
                GameTransition::PresidentBecame { player_id } => {
                    debug!(room, president = %player_id, "President became")
                }
                GameTransition::PolicyEnacted(last) => {
                    info!(room, policy = ?last.policy, chaos = last.chaos, "Policy enacted")
                }
                GameTransition::GameEnded(victory) => info!(
                    room,
                    winner = ?victory.party,
                    reason = ?victory.reason,
                    "Game ended"
                ),
            }
        }
    }

    /// Seat `players` and start a game in `room`.
    pub async fn start_game(&self, room: &str, players: Vec<Player>) -> Result<(), AppError> {
        let slot = self.registry.get_or_create(room)?;
        let mut guard = slot.lock().await;
        self.hydrate(room, &mut guard).await?;

        let before = guard.game.lifecycle();
        let seed = self.config.game_seed();
        guard.game.start(players, seed)?;

        self.persist(room, &guard.game).await;
        self.publish_roles(room, &guard.game).await;
        self.set_room_state(room, RoomState::Playing).await;
        Self::log_transitions(room, &before, &guard.game.lifecycle());
        Ok(())
    }

    /// Apply one client payload from `actor` and return the actor's view.
    ///
    /// Rejected actions are reported in the reply, never as errors.
    pub async fn apply_action(
        &self,
        room: &str,
        actor: &str,
        payload: &JsonValue,
    ) -> Result<ActionReply<G::View>, AppError> {
        let action = G::decode_action(payload);
        let Some(slot) = self.known_room(room).await? else {
            return Err(AppError::not_found(
                ErrorCode::RoomNotFound,
                format!("Room {room} has no game"),
            ));
        };
        let mut guard = slot.lock().await;
        self.hydrate(room, &mut guard).await?;

        let before = guard.game.lifecycle();
        let rejection = guard.game.apply(actor, &action).err();

        if rejection.is_none() {
            self.persist(room, &guard.game).await;
            let after = guard.game.lifecycle();
            Self::log_transitions(room, &before, &after);
            if guard.game.is_over() && before.phase != after.phase {
                self.set_room_state(room, RoomState::Lobby).await;
            }
        }

        Ok(ActionReply {
            projection: guard.game.view(actor),
            rejection,
        })
    }

    /// Current view of `room` for `viewer`. Unknown rooms read as an empty lobby.
    pub async fn projection(&self, room: &str, viewer: &str) -> Result<G::View, AppError> {
        let Some(slot) = self.known_room(room).await? else {
            return Ok(G::lobby().view(viewer));
        };
        let mut guard = slot.lock().await;
        self.hydrate(room, &mut guard).await?;
        Ok(guard.game.view(viewer))
    }

    /// Discard the room's game and return it to the lobby.
    pub async fn reset_game(&self, room: &str) -> Result<(), AppError> {
        let Some(slot) = self.known_room(room).await? else {
            return Err(AppError::not_found(
                ErrorCode::RoomNotFound,
                format!("Room {room} has no game"),
            ));
        };
        let mut guard = slot.lock().await;
        self.store.delete_session(room).await?;
        guard.game = G::lobby();
        guard.hydrated = true;
        self.set_room_state(room, RoomState::Lobby).await;
        info!(room, "Game reset");
        Ok(())
    }

    /// Tear the room down: drop the resident engine and its record.
    pub async fn close_room(&self, room: &str) -> Result<(), AppError> {
        let Some(slot) = self.registry.remove(room) else {
            return Err(AppError::not_found(
                ErrorCode::RoomNotFound,
                format!("Room {room} is not open"),
            ));
        };
        // Wait out any in-flight action before deleting.
        let _guard = slot.lock().await;
        self.store.delete_session(room).await?;
        info!(room, "Room closed");
        Ok(())
    }
}
