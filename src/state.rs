//! The game aggregate and its transitions.
//!
//! Every transition borrows the current state and returns the next one; the
//! caller decides when to swap it in. Invalid actions return an unchanged
//! clone rather than an error.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::format::{format_share_total, random_between};
use crate::upgrade::{Upgrade, UpgradeKind, initial_upgrades, reconcile};

pub const MAX_COMBO: u32 = 50;
pub const MAX_RUG_PULL_RISK: f64 = 99.9;
pub const PRESTIGE_THRESHOLD: f64 = 1_000_000.0;
pub const DEFAULT_STAKING_APY: f64 = 42069.0;

const COMBO_STEP: f64 = 0.1;
const COMBO_WINDOW_MS: i64 = 2_000;
const TICKS_PER_SECOND: f64 = 10.0;
const STAKING_TICKS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0 * TICKS_PER_SECOND;
const RISK_RISE_PER_TICK: f64 = 0.01;
const RISK_DECAY_PER_TICK: f64 = 0.1;
const RUG_PULL_ODDS: f64 = 0.7;
const RUG_PULL_SURVIVING_SHARE: f64 = 0.1;
const RUG_PULL_COUNTDOWN: u32 = 3;
const PUMP_MIN: f64 = 2.0;
const PUMP_MAX: f64 = 10.0;
const PUMP_RISK_STEP: f64 = 10.0;
const PRESTIGE_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub vibes: f64,
    pub total_vibes_mined: f64,
    pub vibes_per_click: f64,
    pub vibes_per_second: f64,
    pub staked_vibes: f64,
    pub staked_returns: f64,
    #[serde(rename = "stakingAPY")]
    pub staking_apy: f64,
    pub rug_pull_risk: f64,
    pub level: u32,
    pub prestige: u32,
    pub click_count: u64,
    pub upgrades: Vec<Upgrade>,
    pub is_rug_pulled: bool,
    pub rug_pull_countdown: Option<u32>,
    pub multiplier: f64,
    pub combo: u32,
    /// Milliseconds since the Unix epoch.
    pub last_click_time: i64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            vibes: 0.0,
            total_vibes_mined: 0.0,
            vibes_per_click: 1.0,
            vibes_per_second: 0.0,
            staked_vibes: 0.0,
            staked_returns: 0.0,
            staking_apy: DEFAULT_STAKING_APY,
            rug_pull_risk: 0.0,
            level: 1,
            prestige: 0,
            click_count: 0,
            upgrades: initial_upgrades(),
            is_rug_pulled: false,
            rug_pull_countdown: None,
            multiplier: 1.0,
            combo: 0,
            last_click_time: 0,
        }
    }
}

/// What the roulette did, for whoever is rendering it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouletteOutcome {
    RugPulled { burned: f64 },
    Pumped { multiplier: f64 },
}

fn level_for(total_mined: f64) -> u32 {
    (total_mined + 1.0).log2().floor() as u32 + 1
}

impl GameState {
    /// Vibes one click yields right now, combo included.
    pub fn click_yield(&self) -> f64 {
        self.vibes_per_click * self.multiplier * (1.0 + self.combo as f64 * COMBO_STEP)
    }

    pub fn passive_yield(&self) -> f64 {
        self.vibes_per_second * self.multiplier
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn can_prestige(&self) -> bool {
        self.total_vibes_mined >= PRESTIGE_THRESHOLD
    }

    /// Multiplier a prestige reset would grant right now.
    pub fn prestige_multiplier(&self) -> f64 {
        1.0 + self.total_vibes_mined.log10().floor() * PRESTIGE_STEP
    }

    pub fn mine(&self, now_ms: i64) -> Self {
        let earned = self.click_yield();
        let total_vibes_mined = self.total_vibes_mined + earned;
        Self {
            vibes: self.vibes + earned,
            total_vibes_mined,
            click_count: self.click_count + 1,
            combo: self.combo.saturating_add(1).min(MAX_COMBO),
            last_click_time: now_ms,
            level: self.level.max(level_for(total_vibes_mined)),
            ..self.clone()
        }
    }

    pub fn buy_upgrade(&self, id: &str) -> Self {
        let Some(idx) = self.upgrades.iter().position(|u| u.id == id) else {
            return self.clone();
        };
        let upgrade = &self.upgrades[idx];
        if self.vibes < upgrade.cost || upgrade.is_maxed() {
            return self.clone();
        }

        let mut next = self.clone();
        next.upgrades[idx] = upgrade.leveled();
        next.vibes -= upgrade.cost;
        match upgrade.kind {
            UpgradeKind::Click => next.vibes_per_click += upgrade.value,
            UpgradeKind::Passive => next.vibes_per_second += upgrade.value,
            UpgradeKind::Multiplier => next.multiplier += upgrade.value,
            UpgradeKind::Staking => next.staking_apy += upgrade.value,
        }
        next
    }

    pub fn stake(&self, amount: f64) -> Self {
        // NaN fails this comparison too
        if !(amount > 0.0) {
            return self.clone();
        }
        let to_stake = amount.min(self.vibes);
        if to_stake <= 0.0 {
            return self.clone();
        }
        Self {
            vibes: self.vibes - to_stake,
            staked_vibes: self.staked_vibes + to_stake,
            ..self.clone()
        }
    }

    pub fn unstake(&self) -> Self {
        Self {
            vibes: self.vibes + self.staked_vibes + self.staked_returns,
            staked_vibes: 0.0,
            staked_returns: 0.0,
            rug_pull_risk: 0.0,
            ..self.clone()
        }
    }

    /// One spin. Loses 90% of the stake with probability `risk / 100 * 0.7`,
    /// otherwise multiplies accrued returns by a draw from `[2, 10)`.
    pub fn rug_pull_roulette<R: Rng + ?Sized>(&self, rng: &mut R) -> (Self, RouletteOutcome) {
        let roll: f64 = rng.gen_range(0.0..1.0);
        let threshold = self.rug_pull_risk.clamp(0.0, MAX_RUG_PULL_RISK) / 100.0;

        if roll < threshold * RUG_PULL_ODDS {
            let remaining = self.staked_vibes * RUG_PULL_SURVIVING_SHARE;
            let next = Self {
                is_rug_pulled: true,
                staked_vibes: remaining,
                staked_returns: 0.0,
                rug_pull_risk: 0.0,
                rug_pull_countdown: Some(RUG_PULL_COUNTDOWN),
                ..self.clone()
            };
            let burned = self.staked_vibes - remaining;
            (next, RouletteOutcome::RugPulled { burned })
        } else {
            let multiplier = random_between(rng, PUMP_MIN, PUMP_MAX);
            let next = Self {
                staked_returns: self.staked_returns * multiplier,
                rug_pull_risk: (self.rug_pull_risk + PUMP_RISK_STEP).min(MAX_RUG_PULL_RISK),
                ..self.clone()
            };
            (next, RouletteOutcome::Pumped { multiplier })
        }
    }

    pub fn dismiss_rug_pull(&self) -> Self {
        Self {
            is_rug_pulled: false,
            rug_pull_countdown: None,
            ..self.clone()
        }
    }

    /// Wipes progress in exchange for a permanent multiplier of
    /// `1 + floor(log10(total)) * 0.5`. No-op below one million mined.
    pub fn prestige_reset(&self) -> Self {
        if !self.can_prestige() {
            return self.clone();
        }
        Self {
            prestige: self.prestige + 1,
            multiplier: self.prestige_multiplier(),
            level: 1,
            ..Self::default()
        }
    }

    pub fn share_text(&self) -> String {
        let prestige = if self.prestige > 0 {
            format!("| Prestige {} ", self.prestige)
        } else {
            String::new()
        };
        format!(
            "I've mined {} $VIBE with {} clicks!\n\nLevel {} {}| Pure vibes only\n\nAre you even vibing? 🫠\n\n$VIBE",
            format_share_total(self.total_vibes_mined),
            self.click_count,
            self.level,
            prestige
        )
    }

    /// One 100ms economy step: passive income, staking accrual, risk drift.
    pub fn economy_tick(&self) -> Self {
        let passive = self.passive_yield() / TICKS_PER_SECOND;
        let staking = if self.staked_vibes > 0.0 {
            (self.staked_vibes * self.staking_apy / 100.0) / STAKING_TICKS_PER_YEAR
        } else {
            0.0
        };
        let rug_pull_risk = if self.staked_vibes > 0.0 {
            (self.rug_pull_risk + RISK_RISE_PER_TICK).min(MAX_RUG_PULL_RISK)
        } else {
            (self.rug_pull_risk - RISK_DECAY_PER_TICK).max(0.0)
        };
        Self {
            vibes: self.vibes + passive,
            total_vibes_mined: self.total_vibes_mined + passive,
            staked_returns: self.staked_returns + staking,
            rug_pull_risk,
            ..self.clone()
        }
    }

    /// Drops one combo step once the player has been idle past the window.
    pub fn decay_combo(&self, now_ms: i64) -> Self {
        if now_ms - self.last_click_time > COMBO_WINDOW_MS && self.combo > 0 {
            Self {
                combo: self.combo - 1,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// Normalizes a freshly loaded snapshot: an open rug-pull dialog never
    /// survives a reload, the upgrade list is rebuilt on the catalog and
    /// out-of-range counters are pulled back into their bounds.
    pub fn into_resumable(self) -> Self {
        let upgrades = reconcile(&self.upgrades);
        Self {
            is_rug_pulled: false,
            rug_pull_countdown: None,
            upgrades,
            combo: self.combo.min(MAX_COMBO),
            level: self.level.max(1),
            rug_pull_risk: self.rug_pull_risk.clamp(0.0, MAX_RUG_PULL_RISK),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rich(vibes: f64) -> GameState {
        GameState {
            vibes,
            ..GameState::default()
        }
    }

    #[test]
    fn mine_applies_combo_bonus_before_increment() {
        let state = GameState {
            combo: 5,
            vibes_per_click: 2.0,
            multiplier: 3.0,
            ..GameState::default()
        };
        let next = state.mine(1_000);
        assert!((next.vibes - 9.0).abs() < 1e-9);
        assert!((next.total_vibes_mined - 9.0).abs() < 1e-9);
        assert_eq!(next.combo, 6);
        assert_eq!(next.click_count, 1);
        assert_eq!(next.last_click_time, 1_000);
    }

    #[test]
    fn consecutive_mines_build_combo_up_to_cap() {
        let mut state = GameState::default();
        for n in 1..=60u32 {
            let before = state.total_vibes_mined;
            state = state.mine(n as i64 * 100);
            assert_eq!(state.combo, n.min(MAX_COMBO));
            assert!(state.total_vibes_mined > before);
        }
    }

    #[test]
    fn level_tracks_log2_of_lifetime_and_never_drops() {
        let state = GameState {
            total_vibes_mined: 1022.0,
            ..GameState::default()
        };
        // 1022 + 1 click = 1023, log2(1024) = 10
        let next = state.mine(0);
        assert_eq!(next.level, 11);

        let high = GameState {
            level: 40,
            ..GameState::default()
        };
        assert_eq!(high.mine(0).level, 40);
    }

    #[test]
    fn purchase_spends_pre_increment_cost_and_applies_one_effect() {
        let state = rich(100_000.0);
        for upgrade in state.upgrades.clone() {
            let next = state.buy_upgrade(&upgrade.id);
            assert_eq!(next.vibes, state.vibes - upgrade.cost, "{}", upgrade.id);

            let deltas = [
                next.vibes_per_click - state.vibes_per_click,
                next.vibes_per_second - state.vibes_per_second,
                next.multiplier - state.multiplier,
                next.staking_apy - state.staking_apy,
            ];
            let channel = match upgrade.kind {
                UpgradeKind::Click => 0,
                UpgradeKind::Passive => 1,
                UpgradeKind::Multiplier => 2,
                UpgradeKind::Staking => 3,
            };
            for (i, delta) in deltas.iter().enumerate() {
                if i == channel {
                    assert!((delta - upgrade.value).abs() < 1e-9, "{}", upgrade.id);
                } else {
                    assert_eq!(*delta, 0.0, "{}", upgrade.id);
                }
            }

            let bought = next.upgrade(&upgrade.id).unwrap();
            assert_eq!(bought.level, 1);
            assert_eq!(bought.cost, Upgrade::cost_at(upgrade.base_cost, 1));
        }
    }

    #[test]
    fn purchase_is_noop_when_unaffordable_maxed_or_unknown() {
        let poor = rich(14.0);
        assert_eq!(poor.buy_upgrade("cursor"), poor);

        let mut maxed = rich(1e12);
        for u in maxed.upgrades.iter_mut() {
            if u.id == "energy" {
                u.level = u.max_level;
            }
        }
        assert_eq!(maxed.buy_upgrade("energy"), maxed);

        let state = rich(1e12);
        assert_eq!(state.buy_upgrade("does-not-exist"), state);
    }

    #[test]
    fn exact_balance_is_enough() {
        let state = rich(15.0);
        let next = state.buy_upgrade("cursor");
        assert_eq!(next.vibes, 0.0);
        assert!((next.vibes_per_second - 0.1).abs() < 1e-12);
    }

    #[test]
    fn stake_clamps_to_balance_and_rejects_non_positive() {
        let state = rich(100.0);
        let next = state.stake(250.0);
        assert_eq!(next.vibes, 0.0);
        assert_eq!(next.staked_vibes, 100.0);

        assert_eq!(state.stake(0.0), state);
        assert_eq!(state.stake(-5.0), state);
        assert_eq!(state.stake(f64::NAN), state);
        assert_eq!(GameState::default().stake(10.0), GameState::default());

        let partial = state.stake(30.0);
        assert_eq!(partial.vibes, 70.0);
        assert_eq!(partial.staked_vibes, 30.0);
    }

    #[test]
    fn unstake_returns_principal_and_returns() {
        let state = GameState {
            vibes: 5.0,
            staked_vibes: 100.0,
            staked_returns: 20.0,
            rug_pull_risk: 33.0,
            ..GameState::default()
        };
        let next = state.unstake();
        assert_eq!(next.vibes, 125.0);
        assert_eq!(next.staked_vibes, 0.0);
        assert_eq!(next.staked_returns, 0.0);
        assert_eq!(next.rug_pull_risk, 0.0);

        let idle = GameState::default();
        assert_eq!(idle.unstake(), idle);
    }

    #[test]
    fn zero_risk_roulette_always_pumps() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState {
            staked_vibes: 100.0,
            staked_returns: 10.0,
            ..GameState::default()
        };
        for _ in 0..500 {
            let (next, outcome) = state.rug_pull_roulette(&mut rng);
            let RouletteOutcome::Pumped { multiplier } = outcome else {
                panic!("zero risk must never rug pull");
            };
            assert!((2.0..10.0).contains(&multiplier));
            assert!((next.staked_returns - 10.0 * multiplier).abs() < 1e-9);
            assert_eq!(next.rug_pull_risk, 10.0);
            assert_eq!(next.staked_vibes, 100.0);
        }
    }

    #[test]
    fn pump_caps_risk() {
        let mut rng = StdRng::seed_from_u64(3);
        let state = GameState {
            staked_vibes: 1.0,
            rug_pull_risk: 95.0,
            ..GameState::default()
        };
        loop {
            let (next, outcome) = state.rug_pull_roulette(&mut rng);
            if let RouletteOutcome::Pumped { .. } = outcome {
                assert_eq!(next.rug_pull_risk, MAX_RUG_PULL_RISK);
                break;
            }
        }
    }

    #[test]
    fn max_risk_roulette_loss_rate_and_loss_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let state = GameState {
            staked_vibes: 1_000.0,
            staked_returns: 50.0,
            rug_pull_risk: 100.0,
            ..GameState::default()
        };
        let draws = 100_000;
        let mut losses = 0;
        for _ in 0..draws {
            let (next, outcome) = state.rug_pull_roulette(&mut rng);
            if let RouletteOutcome::RugPulled { burned } = outcome {
                losses += 1;
                assert!((next.staked_vibes - 100.0).abs() < 1e-9);
                assert!((burned - 900.0).abs() < 1e-9);
                assert_eq!(next.staked_returns, 0.0);
                assert_eq!(next.rug_pull_risk, 0.0);
                assert!(next.is_rug_pulled);
                assert_eq!(next.rug_pull_countdown, Some(3));
            }
        }
        let rate = losses as f64 / draws as f64;
        let expected = 0.7 * 0.999;
        assert!((rate - expected).abs() < 0.01, "loss rate {rate}");
    }

    #[test]
    fn dismiss_is_idempotent() {
        let state = GameState {
            is_rug_pulled: true,
            rug_pull_countdown: Some(3),
            staked_vibes: 12.0,
            ..GameState::default()
        };
        let once = state.dismiss_rug_pull();
        assert_eq!(once.dismiss_rug_pull(), once);
        assert!(!once.is_rug_pulled);
        assert_eq!(once.rug_pull_countdown, None);
        assert_eq!(once.staked_vibes, 12.0);
    }

    #[test]
    fn prestige_requires_a_million() {
        let state = GameState {
            total_vibes_mined: 999_999.0,
            vibes: 500.0,
            ..GameState::default()
        };
        assert_eq!(state.prestige_reset(), state);
    }

    #[test]
    fn prestige_converts_lifetime_into_multiplier() {
        let mut state = rich(42_000.0);
        state.total_vibes_mined = 1_500_000.0;
        state.prestige = 2;
        state.level = 21;
        state.staked_vibes = 300.0;
        state = state.buy_upgrade("energy");

        let next = state.prestige_reset();
        assert_eq!(next.prestige, 3);
        assert_eq!(next.multiplier, 4.0);
        assert_eq!(next.level, 1);
        assert_eq!(next.vibes, 0.0);
        assert_eq!(next.total_vibes_mined, 0.0);
        assert_eq!(next.staked_vibes, 0.0);
        assert_eq!(next.upgrades, initial_upgrades());
    }

    #[test]
    fn share_text_mentions_prestige_only_when_earned() {
        let state = GameState {
            total_vibes_mined: 2_345_678.0,
            click_count: 420,
            level: 22,
            ..GameState::default()
        };
        assert_eq!(
            state.share_text(),
            "I've mined 2.3M $VIBE with 420 clicks!\n\nLevel 22 | Pure vibes only\n\nAre you even vibing? 🫠\n\n$VIBE"
        );

        let prestiged = GameState {
            prestige: 2,
            ..state
        };
        assert!(prestiged.share_text().contains("Level 22 | Prestige 2 | Pure vibes only"));

        let tie = GameState {
            total_vibes_mined: 2_250_000.0,
            ..GameState::default()
        };
        assert!(tie.share_text().starts_with("I've mined 2.3M $VIBE"));
    }

    #[test]
    fn economy_tick_pays_a_tenth_of_passive_rate() {
        let state = GameState {
            vibes_per_second: 10.0,
            multiplier: 2.0,
            ..GameState::default()
        };
        let next = state.economy_tick();
        assert_eq!(next.vibes - state.vibes, 2.0);
        assert_eq!(next.total_vibes_mined, 2.0);
        assert_eq!(next.staked_returns, 0.0);
    }

    #[test]
    fn economy_tick_accrues_staking_and_drifts_risk() {
        let staked = GameState {
            staked_vibes: 1_000_000.0,
            rug_pull_risk: 99.95,
            ..GameState::default()
        };
        let next = staked.economy_tick();
        let expected = (1_000_000.0 * DEFAULT_STAKING_APY / 100.0) / STAKING_TICKS_PER_YEAR;
        assert!((next.staked_returns - expected).abs() < 1e-12);
        assert_eq!(next.rug_pull_risk, MAX_RUG_PULL_RISK);

        let unstaked = GameState {
            rug_pull_risk: 0.05,
            ..GameState::default()
        };
        assert_eq!(unstaked.economy_tick().rug_pull_risk, 0.0);

        let rising = GameState {
            staked_vibes: 1.0,
            ..GameState::default()
        };
        assert!((rising.economy_tick().rug_pull_risk - 0.01).abs() < 1e-12);
    }

    #[test]
    fn combo_decays_only_after_idle_window() {
        let state = GameState {
            combo: 4,
            last_click_time: 10_000,
            ..GameState::default()
        };
        assert_eq!(state.decay_combo(12_000).combo, 4);
        assert_eq!(state.decay_combo(12_001).combo, 3);

        let idle = GameState::default();
        assert_eq!(idle.decay_combo(1_000_000), idle);
    }

    #[test]
    fn resumable_clears_transient_flags() {
        let state = GameState {
            is_rug_pulled: true,
            rug_pull_countdown: Some(3),
            ..GameState::default()
        };
        let resumed = state.into_resumable();
        assert!(!resumed.is_rug_pulled);
        assert_eq!(resumed.rug_pull_countdown, None);
    }

    #[test]
    fn resumable_restores_counter_bounds() {
        let state = GameState {
            combo: u32::MAX,
            level: 0,
            rug_pull_risk: 250.0,
            ..GameState::default()
        };
        let resumed = state.into_resumable();
        assert_eq!(resumed.combo, MAX_COMBO);
        assert_eq!(resumed.level, 1);
        assert_eq!(resumed.rug_pull_risk, MAX_RUG_PULL_RISK);

        let negative = GameState {
            rug_pull_risk: -4.0,
            ..GameState::default()
        };
        assert_eq!(negative.into_resumable().rug_pull_risk, 0.0);
    }

    #[test]
    fn mine_at_saturated_combo_stays_capped() {
        let state = GameState {
            combo: u32::MAX,
            ..GameState::default()
        };
        assert_eq!(state.mine(0).combo, MAX_COMBO);
    }
}
