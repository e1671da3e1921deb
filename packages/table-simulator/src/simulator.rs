//! In-memory self-play: one engine, one bot per seat.

use party_backend::ai::{create_bot, Bot, BotError};
use party_backend::domain::player_view::project;
use party_backend::domain::{Party, PhaseMachine, Player, PlayerId, WinReason};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Outcome of one simulated game.
#[derive(Debug, Clone, Serialize)]
pub struct GameResult {
    pub game: u32,
    pub seed: u64,
    pub players: usize,
    pub winner: Option<Party>,
    pub reason: Option<WinReason>,
    pub steps: u32,
    pub liberal_policies: u8,
    pub fascist_policies: u8,
    pub chaos_enactments: u32,
    pub deaths: usize,
    /// False when the step cap was hit first.
    pub completed: bool,
}

pub struct Simulator {
    machine: PhaseMachine,
    bots: Vec<(PlayerId, Box<dyn Bot>)>,
    game: u32,
    seed: u64,
    max_steps: u32,
}

impl Simulator {
    /// Seat `players` bots of kind `bot` and start a game from `seed`.
    pub fn new(
        game: u32,
        seed: u64,
        players: usize,
        bot: &str,
        max_steps: u32,
    ) -> Result<Self, SimulatorError> {
        let seats: Vec<Player> = (1..=players)
            .map(|i| Player::new(format!("bot{i}"), format!("Bot {i}")))
            .collect();
        let mut bots = Vec::with_capacity(players);
        for (i, p) in seats.iter().enumerate() {
            let config = json!({ "seed": seed.wrapping_add(i as u64 + 1) });
            let instance = create_bot(bot, Some(&config))
                .ok_or_else(|| SimulatorError::Setup(format!("unknown bot type: {bot}")))?;
            bots.push((p.id.clone(), instance));
        }

        let mut machine = PhaseMachine::new();
        machine
            .start(seats, seed)
            .map_err(|e| SimulatorError::Setup(e.to_string()))?;

        Ok(Self {
            machine,
            bots,
            game,
            seed,
            max_steps,
        })
    }

    /// Next seat with something to do, in seat order.
    fn next_actor(&self) -> Option<usize> {
        self.bots
            .iter()
            .position(|(id, _)| !project(self.machine.state(), id).legal_actions().is_empty())
    }

    pub fn run(mut self) -> Result<GameResult, SimulatorError> {
        let mut steps = 0;
        let mut chaos_enactments = 0;

        while !self.machine.is_over() && steps < self.max_steps {
            let seat = self.next_actor().ok_or(SimulatorError::Stuck {
                phase: format!("{:?}", self.machine.phase()),
            })?;
            let (actor, bot) = &self.bots[seat];
            let view = project(self.machine.state(), actor);
            let action = bot
                .choose_action(&view)
                .map_err(|e| SimulatorError::Bot(actor.clone(), e))?;

            let enacted_before = self.machine.state().enacted.total();
            let outcome = self.machine.apply(actor, &action);
            if let Some(reason) = outcome.rejection() {
                return Err(SimulatorError::Rejected {
                    actor: actor.clone(),
                    action: action.kind(),
                    reason: reason.to_string(),
                });
            }
            let state = self.machine.state();
            let moved = state.enacted.total() > enacted_before;
            if moved && state.last_enacted.is_some_and(|l| l.chaos) {
                chaos_enactments += 1;
            }

            let problems = self.machine.invariant_violations();
            if !problems.is_empty() {
                return Err(SimulatorError::Invariant {
                    step: steps,
                    problems,
                });
            }
            debug!(
                game = self.game,
                step = steps,
                actor = %actor,
                action = action.kind(),
                "Step applied"
            );
            steps += 1;
        }

        let state = self.machine.state();
        Ok(GameResult {
            game: self.game,
            seed: self.seed,
            players: state.players.len(),
            winner: state.winner.map(|v| v.party),
            reason: state.winner.map(|v| v.reason),
            steps,
            liberal_policies: state.enacted.liberal,
            fascist_policies: state.enacted.fascist,
            chaos_enactments,
            deaths: state.dead_players.len(),
            completed: self.machine.is_over(),
        })
    }
}

#[derive(Debug)]
pub enum SimulatorError {
    Setup(String),
    /// No seat has a legal action.
    Stuck { phase: String },
    Bot(PlayerId, BotError),
    /// A bot's legal action was turned away.
    Rejected {
        actor: PlayerId,
        action: &'static str,
        reason: String,
    },
    Invariant { step: u32, problems: Vec<String> },
}

impl std::fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatorError::Setup(msg) => write!(f, "Setup failed: {msg}"),
            SimulatorError::Stuck { phase } => write!(f, "No legal action in {phase}"),
            SimulatorError::Bot(actor, err) => write!(f, "Bot {actor} failed: {err}"),
            SimulatorError::Rejected {
                actor,
                action,
                reason,
            } => write!(f, "{actor}'s {action} was rejected: {reason}"),
            SimulatorError::Invariant { step, problems } => {
                write!(f, "Invariant broken at step {step}: {}", problems.join("; "))
            }
        }
    }
}

impl std::error::Error for SimulatorError {}
