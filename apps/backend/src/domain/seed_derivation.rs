//! RNG seed derivation utilities for deterministic shuffles.
//!
//! Every random decision in a session (role shuffle, seating rotation, each
//! deck generation) draws from its own seed derived from the game's base
//! seed, so a rehydrated session reshuffles exactly as the original would.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derive the seed used to shuffle role cards.
pub fn derive_role_seed(game_seed: u64) -> u64 {
    game_seed.wrapping_add(1)
}

/// Derive the seed used to shuffle the presidential rotation.
pub fn derive_turn_order_seed(game_seed: u64) -> u64 {
    game_seed.wrapping_add(2)
}

/// Derive the seed for a deck generation (0 for the opening deck).
///
/// Different multiplier from the other contexts to keep the streams apart.
pub fn derive_deck_seed(game_seed: u64, generation: u32) -> u64 {
    game_seed
        .wrapping_add((generation as u64).wrapping_mul(1_000_003))
        .wrapping_add(3)
}

/// Build the RNG for a derived seed.
pub fn rng_for(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
