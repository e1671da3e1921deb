//! Backend test support utilities
//!
//! Shared by the backend's integration tests: one-time logging setup and
//! seating fixtures.

pub mod fixtures;
pub mod logging;
