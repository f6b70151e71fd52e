//! Owner of the canonical [`GameState`].
//!
//! The engine pairs the pure transitions in [`crate::state`] with the things
//! they need from the outside world: a clock, a random source and a place to
//! persist snapshots. It is built once with constructor-time load and torn
//! down with [`Engine::shutdown`], which flushes.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::state::{GameState, RouletteOutcome};
use crate::store::{KeyValueStore, Persistence};

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl<F: Fn() -> i64> Clock for F {
    fn now_millis(&self) -> i64 {
        self()
    }
}

pub struct Engine<S, C = SystemClock> {
    state: GameState,
    persistence: Persistence<S>,
    rng: StdRng,
    clock: C,
}

impl<S: KeyValueStore> Engine<S, SystemClock> {
    pub fn start(persistence: Persistence<S>) -> Self {
        Self::with_parts(persistence, StdRng::from_entropy(), SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    pub fn with_parts(persistence: Persistence<S>, rng: StdRng, clock: C) -> Self {
        let state = match persistence.load() {
            Some(state) => {
                info!(
                    "Resumed game: level {} prestige {} with {:.2} vibes",
                    state.level, state.prestige, state.vibes
                );
                state
            }
            None => {
                info!("Starting a fresh game");
                GameState::default()
            }
        };
        Self {
            state,
            persistence,
            rng,
            clock,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the vibes earned by this click.
    pub fn mine(&mut self) -> f64 {
        let now = self.clock.now_millis();
        let next = self.state.mine(now);
        let earned = next.total_vibes_mined - self.state.total_vibes_mined;
        if next.level > self.state.level {
            info!("Reached level {}", next.level);
        }
        self.state = next;
        earned
    }

    /// Returns whether the purchase went through.
    pub fn buy_upgrade(&mut self, id: &str) -> bool {
        let before = self.state.upgrade(id).map(|u| u.level);
        let next = self.state.buy_upgrade(id);
        let after = next.upgrade(id).map(|u| u.level);
        self.state = next;
        let bought = before != after;
        if bought {
            info!("Bought upgrade '{}' (now level {})", id, after.unwrap_or_default());
        } else {
            debug!("Upgrade '{}' not purchasable", id);
        }
        bought
    }

    /// Returns the amount actually moved into the stake.
    pub fn stake(&mut self, amount: f64) -> f64 {
        let next = self.state.stake(amount);
        let moved = next.staked_vibes - self.state.staked_vibes;
        self.state = next;
        if moved > 0.0 {
            debug!("Staked {:.2} vibes", moved);
        }
        moved
    }

    /// Returns the amount paid back to the balance.
    pub fn unstake(&mut self) -> f64 {
        let payout = self.state.staked_vibes + self.state.staked_returns;
        self.state = self.state.unstake();
        debug!("Unstaked {:.2} vibes", payout);
        payout
    }

    pub fn rug_pull_roulette(&mut self) -> RouletteOutcome {
        let (next, outcome) = self.state.rug_pull_roulette(&mut self.rng);
        match outcome {
            RouletteOutcome::RugPulled { burned } => {
                info!("Rug pulled at {:.2}% risk, burned {:.2}", self.state.rug_pull_risk, burned)
            }
            RouletteOutcome::Pumped { multiplier } => {
                info!("Roulette pumped returns {:.2}x", multiplier)
            }
        }
        self.state = next;
        outcome
    }

    pub fn dismiss_rug_pull(&mut self) {
        self.state = self.state.dismiss_rug_pull();
    }

    /// Returns whether the reset happened.
    pub fn prestige_reset(&mut self) -> bool {
        if !self.state.can_prestige() {
            debug!("Prestige refused at {:.0} lifetime vibes", self.state.total_vibes_mined);
            return false;
        }
        self.state = self.state.prestige_reset();
        info!(
            "Prestige {} reached, multiplier now {:.1}x",
            self.state.prestige, self.state.multiplier
        );
        true
    }

    pub fn share_text(&self) -> String {
        self.state.share_text()
    }

    pub fn economy_tick(&mut self) {
        self.state = self.state.economy_tick();
    }

    pub fn decay_combo(&mut self) {
        let now = self.clock.now_millis();
        self.state = self.state.decay_combo(now);
    }

    pub fn flush(&self) {
        self.persistence.save(&self.state);
    }

    /// Final flush; hands back the last state.
    pub fn shutdown(self) -> GameState {
        self.flush();
        info!("Engine shut down after {} clicks", self.state.click_count);
        self.state
    }
}
