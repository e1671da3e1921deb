//! Registry of resident room engines.
//!
//! One engine per room id, each behind its own async mutex so actions within
//! a room are serialized while rooms proceed independently.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::sessions::RoomId;
use crate::services::party_game::PartyGame;

/// A resident engine plus whether it has been reconciled with the store.
pub struct RoomSlot<G> {
    pub game: G,
    pub hydrated: bool,
}

pub type SharedSlot<G> = Arc<Mutex<RoomSlot<G>>>;

pub struct RoomRegistry<G> {
    rooms: DashMap<RoomId, SharedSlot<G>>,
    /// Slots counted against the cap.
    resident: AtomicUsize,
    max_rooms: Option<usize>,
}

impl<G: PartyGame> RoomRegistry<G> {
    pub fn new(max_rooms: Option<usize>) -> Self {
        Self {
            rooms: DashMap::new(),
            resident: AtomicUsize::new(0),
            max_rooms,
        }
    }

    pub fn get(&self, room: &str) -> Option<SharedSlot<G>> {
        self.rooms.get(room).map(|e| e.value().clone())
    }

    /// Existing slot for `room`, or a fresh unhydrated one.
    ///
    /// Fails with `RoomLimitReached` when a new slot would exceed the cap.
    pub fn get_or_create(&self, room: &str) -> Result<SharedSlot<G>, DomainError> {
        if let Some(slot) = self.get(room) {
            return Ok(slot);
        }
        let slot = match self.rooms.entry(room.to_string()) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                self.reserve()?;
                let slot = Arc::new(Mutex::new(RoomSlot {
                    game: G::lobby(),
                    hydrated: false,
                }));
                e.insert(slot.clone());
                slot
            }
        };
        Ok(slot)
    }

    /// Claim one unit of the cap. Called with the new room's shard locked,
    /// so it must not touch the map itself.
    fn reserve(&self) -> Result<(), DomainError> {
        let max = self.max_rooms.unwrap_or(usize::MAX);
        self.resident
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .map(|_| ())
            .map_err(|_| {
                DomainError::validation(
                    ValidationKind::RoomLimitReached,
                    format!("Room limit of {max} reached"),
                )
            })
    }

    pub fn remove(&self, room: &str) -> Option<SharedSlot<G>> {
        let removed = self.rooms.remove(room).map(|(_, slot)| slot);
        if removed.is_some() {
            self.resident.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
