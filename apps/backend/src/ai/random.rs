//! Random bot - picks uniformly among legal actions.

use parking_lot::Mutex;
use rand::prelude::*;

use super::trait_def::{Bot, BotError};
use crate::domain::actions::Action;
use crate::domain::player_view::Projection;

/// Bot that submits a random legal action.
///
/// Seeded bots are fully reproducible, which the simulator and the
/// end-to-end tests rely on.
pub struct RandomBot {
    rng: Mutex<StdRng>,
}

impl RandomBot {
    pub const NAME: &'static str = "RandomBot";

    /// `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Bot for RandomBot {
    fn choose_action(&self, view: &Projection) -> Result<Action, BotError> {
        let legal = view.legal_actions();
        if legal.is_empty() {
            return Err(BotError::NoLegalAction);
        }
        let mut rng = self.rng.lock();
        legal
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| BotError::Internal("failed to choose an action".into()))
    }
}
