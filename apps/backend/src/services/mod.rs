//! Room and session services sitting between transports and the engine.

pub mod party_game;
pub mod rooms;
pub mod sessions;

pub use party_game::PartyGame;
pub use rooms::{RoomRegistry, RoomSlot};
pub use sessions::{ActionReply, SessionService};
