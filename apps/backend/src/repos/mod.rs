//! Repository traits for the session layer.

pub mod sessions;

pub use sessions::{RoomId, RoomState, SessionStore};
