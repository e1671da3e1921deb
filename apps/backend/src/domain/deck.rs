//! Policy deck: a 17-card stack with draw, discard and regeneration.
//!
//! When a draw needs more cards than remain, the deck is regenerated from the
//! fixed 6/11 split instead of recycling the discard pile, so its composition
//! never drifts.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::domain::seed_derivation::{derive_deck_seed, rng_for};
use crate::domain::state::Policy;

pub const LIBERAL_CARDS: usize = 6;
pub const FASCIST_CARDS: usize = 11;
pub const DECK_SIZE: usize = LIBERAL_CARDS + FASCIST_CARDS;

/// Cards handed to the president per legislative session.
pub const HAND_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDeck {
    /// Top of the deck is index 0.
    draw_pile: Vec<Policy>,
    discard: Vec<Policy>,
    /// Enactments taken from this generation.
    enacted: u8,
    generation: u32,
    seed: u64,
}

fn fresh_cards() -> Vec<Policy> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    cards.extend(std::iter::repeat_n(Policy::Liberal, LIBERAL_CARDS));
    cards.extend(std::iter::repeat_n(Policy::Fascist, FASCIST_CARDS));
    cards
}

impl PolicyDeck {
    /// Placeholder deck for a session that has not started.
    pub fn empty(seed: u64) -> Self {
        Self {
            draw_pile: Vec::new(),
            discard: Vec::new(),
            enacted: 0,
            generation: 0,
            seed,
        }
    }

    /// Opening deck for a game, shuffled from the game's base seed.
    pub fn new(seed: u64) -> Self {
        let mut deck = Self::empty(seed);
        deck.shuffle_generation();
        deck
    }

    /// Rebuild a deck from persisted parts.
    pub fn from_parts(
        draw_pile: Vec<Policy>,
        discard: Vec<Policy>,
        enacted: u8,
        generation: u32,
        seed: u64,
    ) -> Self {
        Self {
            draw_pile,
            discard,
            enacted,
            generation,
            seed,
        }
    }

    fn shuffle_generation(&mut self) {
        let mut cards = fresh_cards();
        let mut rng = rng_for(derive_deck_seed(self.seed, self.generation));
        cards.shuffle(&mut rng);
        self.draw_pile = cards;
        self.discard.clear();
        self.enacted = 0;
    }

    /// Replace everything with a freshly shuffled 6/11 deck.
    pub fn regenerate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.shuffle_generation();
        tracing::debug!(generation = self.generation, "Policy deck regenerated");
    }

    fn ensure(&mut self, needed: usize) {
        if self.draw_pile.len() < needed {
            self.regenerate();
        }
    }

    /// Take `HAND_SIZE` cards off the top, regenerating first if short.
    pub fn draw_hand(&mut self) -> Vec<Policy> {
        self.ensure(HAND_SIZE);
        self.draw_pile.drain(..HAND_SIZE).collect()
    }

    /// Take the top card for a chaos enactment.
    pub fn draw_top(&mut self) -> Policy {
        self.ensure(1);
        // ensure(1) guarantees a card; a fresh generation is never empty.
        let card = self.draw_pile.remove(0);
        self.enacted += 1;
        card
    }

    /// Copy the top `HAND_SIZE` cards without removing them.
    pub fn peek_hand(&mut self) -> Vec<Policy> {
        self.ensure(HAND_SIZE);
        self.draw_pile[..HAND_SIZE].to_vec()
    }

    pub fn discard(&mut self, card: Policy) {
        self.discard.push(card);
    }

    /// Account for a drawn card that left the hand by being enacted.
    pub fn record_enacted(&mut self) {
        self.enacted += 1;
    }

    pub fn draw_pile(&self) -> &[Policy] {
        &self.draw_pile
    }

    pub fn discard_pile(&self) -> &[Policy] {
        &self.discard
    }

    pub fn draw_pile_len(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    pub fn enacted_in_generation(&self) -> u8 {
        self.enacted
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
