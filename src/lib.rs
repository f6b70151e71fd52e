//! Economy engine for the Vibe Machine clicker: mining, upgrades, staking,
//! rug-pull roulette and prestige, with snapshot persistence.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod upgrade;
