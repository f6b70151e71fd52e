use std::collections::VecDeque;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::engine::{Clock, Engine, SystemClock};
use crate::format::{format_compact, format_number};
use crate::state::{GameState, RouletteOutcome};
use crate::store::KeyValueStore;

const MAX_MESSAGES: usize = 5;
const MAX_STAKE_INPUT: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Mine,
    Upgrades,
    Staking,
}

impl PaneFocus {
    pub const ALL: [PaneFocus; 3] = [PaneFocus::Mine, PaneFocus::Upgrades, PaneFocus::Staking];

    fn next(self) -> Self {
        match self {
            PaneFocus::Mine => PaneFocus::Upgrades,
            PaneFocus::Upgrades => PaneFocus::Staking,
            PaneFocus::Staking => PaneFocus::Mine,
        }
    }

    fn prev(self) -> Self {
        match self {
            PaneFocus::Mine => PaneFocus::Staking,
            PaneFocus::Upgrades => PaneFocus::Mine,
            PaneFocus::Staking => PaneFocus::Upgrades,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PaneFocus::Mine => "🫠 Mine",
            PaneFocus::Upgrades => "⬆️ Upgrades",
            PaneFocus::Staking => "📈 Staking",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PaneFocus::Mine => 0,
            PaneFocus::Upgrades => 1,
            PaneFocus::Staking => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub at: DateTime<Local>,
    pub text: String,
}

/// Accepts `max` or a positive decimal; anything else is rejected.
pub fn parse_stake_amount(input: &str, balance: f64) -> Option<f64> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("max") {
        return Some(balance);
    }
    input
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

pub struct App<S, C = SystemClock> {
    pub focus: PaneFocus,
    pub should_quit: bool,
    pub selected_upgrade: usize,
    pub stake_input: String,
    pub show_share: bool,
    pub messages: VecDeque<FeedEntry>,
    engine: Engine<S, C>,
}

impl<S: KeyValueStore, C: Clock> App<S, C> {
    pub fn new(engine: Engine<S, C>) -> Self {
        Self {
            focus: PaneFocus::Mine,
            should_quit: false,
            selected_upgrade: 0,
            stake_input: String::new(),
            show_share: false,
            messages: VecDeque::new(),
            engine,
        }
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn share_text(&self) -> String {
        self.engine.share_text()
    }

    pub fn on_economy_tick(&mut self) {
        self.engine.economy_tick();
    }

    pub fn on_combo_decay(&mut self) {
        self.engine.decay_combo();
    }

    pub fn on_flush(&mut self) {
        self.engine.flush();
    }

    pub fn shutdown(self) -> GameState {
        self.engine.shutdown()
    }

    fn push_message(&mut self, msg: impl Into<String>) {
        self.messages.push_front(FeedEntry {
            at: Local::now(),
            text: msg.into(),
        });
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_back();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('q' | 'Q')) {
            self.should_quit = true;
            return;
        }

        // The rug-pull dialog is modal.
        if self.engine.state().is_rug_pulled {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.engine.dismiss_rug_pull();
            }
            return;
        }

        if self.show_share {
            self.show_share = false;
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
            }
            KeyCode::Char('p' | 'P') => self.handle_prestige(),
            KeyCode::Char('s' | 'S') => {
                self.show_share = true;
            }
            _ => match self.focus {
                PaneFocus::Mine => self.handle_mine_input(key),
                PaneFocus::Upgrades => self.handle_upgrades_input(key),
                PaneFocus::Staking => self.handle_staking_input(key),
            },
        }
    }

    fn handle_prestige(&mut self) {
        if self.engine.prestige_reset() {
            let state = self.engine.state();
            let msg = format!(
                "Prestige {} unlocked, multiplier {:.1}x",
                state.prestige, state.multiplier
            );
            self.selected_upgrade = 0;
            self.push_message(msg);
        } else {
            self.push_message("Mine 1M lifetime $VIBE to prestige");
        }
    }

    fn handle_mine_input(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
            self.engine.mine();
        }
    }

    fn handle_upgrades_input(&mut self, key: KeyEvent) {
        let count = self.engine.state().upgrades.len();
        match key.code {
            KeyCode::Up if count > 0 => {
                self.selected_upgrade = (self.selected_upgrade + count - 1) % count;
            }
            KeyCode::Down if count > 0 => {
                self.selected_upgrade = (self.selected_upgrade + 1) % count;
            }
            KeyCode::Enter => {
                let Some(upgrade) = self.engine.state().upgrades.get(self.selected_upgrade) else {
                    return;
                };
                let (id, name, cost) = (upgrade.id.clone(), upgrade.name.clone(), upgrade.cost);
                if self.engine.buy_upgrade(&id) {
                    self.push_message(format!("Bought {} for {} $VIBE", name, format_number(cost)));
                } else if upgrade_is_maxed(self.engine.state(), &id) {
                    self.push_message(format!("{} is maxed out", name));
                } else {
                    self.push_message(format!("Need {} $VIBE for {}", format_number(cost), name));
                }
            }
            _ => {}
        }
    }

    fn handle_staking_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                if self.stake_input.eq_ignore_ascii_case("max") {
                    self.stake_input.clear();
                }
                if self.stake_input.len() < MAX_STAKE_INPUT {
                    self.stake_input.push(c);
                }
            }
            KeyCode::Backspace => {
                if self.stake_input.eq_ignore_ascii_case("max") {
                    self.stake_input.clear();
                } else {
                    self.stake_input.pop();
                }
            }
            KeyCode::Char('m' | 'M') => {
                self.stake_input = "max".to_string();
            }
            KeyCode::Enter => self.submit_stake(),
            KeyCode::Char('u' | 'U') => {
                if self.engine.state().staked_vibes > 0.0 {
                    let payout = self.engine.unstake();
                    self.push_message(format!("Unstaked {} $VIBE", format_number(payout)));
                } else {
                    self.push_message("Nothing staked");
                }
            }
            KeyCode::Char('r' | 'R') => self.spin_roulette(),
            _ => {}
        }
    }

    fn submit_stake(&mut self) {
        let balance = self.engine.state().vibes;
        let Some(amount) = parse_stake_amount(&self.stake_input, balance) else {
            self.push_message("Enter an amount or press M for max");
            return;
        };
        let moved = self.engine.stake(amount);
        self.stake_input.clear();
        if moved > 0.0 {
            self.push_message(format!("Staked {} $VIBE", format_number(moved)));
        } else {
            self.push_message("No $VIBE to stake");
        }
    }

    fn spin_roulette(&mut self) {
        if self.engine.state().staked_vibes <= 0.0 {
            self.push_message("Stake some $VIBE before tempting fate");
            return;
        }
        match self.engine.rug_pull_roulette() {
            RouletteOutcome::RugPulled { burned } => {
                self.push_message(format!("RUG PULLED. {} $VIBE gone", format_compact(burned)));
            }
            RouletteOutcome::Pumped { multiplier } => {
                self.push_message(format!("Pumped! Returns x{:.2}", multiplier));
            }
        }
    }
}

fn upgrade_is_maxed(state: &GameState, id: &str) -> bool {
    state.upgrade(id).is_some_and(|u| u.is_maxed())
}
