use serde::{Deserialize, Serialize};

const COST_GROWTH: f64 = 1.15;

/// Which production channel an upgrade feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Click,
    Passive,
    Multiplier,
    Staking,
}

impl UpgradeKind {
    pub fn label(self) -> &'static str {
        match self {
            UpgradeKind::Click => "click",
            UpgradeKind::Passive => "passive",
            UpgradeKind::Multiplier => "multiplier",
            UpgradeKind::Staking => "staking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub base_cost: f64,
    pub level: u32,
    pub max_level: u32,
    #[serde(rename = "type")]
    pub kind: UpgradeKind,
    pub value: f64,
    pub emoji: String,
}

impl Upgrade {
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: &str,
        name: &str,
        description: &str,
        base_cost: f64,
        max_level: u32,
        kind: UpgradeKind,
        value: f64,
        emoji: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            cost: base_cost,
            base_cost,
            level: 0,
            max_level,
            kind,
            value,
            emoji: emoji.to_string(),
        }
    }

    /// Price of the next level when `level` levels are owned.
    pub fn cost_at(base_cost: f64, level: u32) -> f64 {
        (base_cost * COST_GROWTH.powi(level as i32)).floor()
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    /// One level up with the price moved along the curve.
    pub fn leveled(&self) -> Self {
        let level = self.level + 1;
        Self {
            level,
            cost: Self::cost_at(self.base_cost, level),
            ..self.clone()
        }
    }
}

/// The fixed upgrade set every game starts with.
pub fn initial_upgrades() -> Vec<Upgrade> {
    vec![
        Upgrade::new(
            "cursor",
            "Auto-Cursor",
            "AI writes code for you",
            15.0,
            50,
            UpgradeKind::Passive,
            0.1,
            "🖱️",
        ),
        Upgrade::new(
            "copilot",
            "Vibe Copilot",
            "GitHub Copilot but vibes",
            100.0,
            50,
            UpgradeKind::Passive,
            1.0,
            "🤖",
        ),
        Upgrade::new(
            "claude",
            "Claude Instance",
            "Claude vibe codes for you",
            500.0,
            50,
            UpgradeKind::Passive,
            5.0,
            "🧠",
        ),
        Upgrade::new(
            "clickpower",
            "Mechanical Keyboard",
            "More vibes per keystroke",
            50.0,
            30,
            UpgradeKind::Click,
            1.0,
            "⌨️",
        ),
        Upgrade::new(
            "energy",
            "Energy Drink",
            "2x vibe output",
            1000.0,
            10,
            UpgradeKind::Multiplier,
            0.5,
            "⚡",
        ),
        Upgrade::new(
            "server",
            "Server Farm",
            "Industrial vibe mining",
            5000.0,
            50,
            UpgradeKind::Passive,
            25.0,
            "🏭",
        ),
        Upgrade::new(
            "quantum",
            "Quantum Compiler",
            "Vibes in superposition",
            25000.0,
            30,
            UpgradeKind::Passive,
            100.0,
            "⚛️",
        ),
        Upgrade::new(
            "stakeboost",
            "Staking Boost",
            "More APY for your vibes",
            2000.0,
            20,
            UpgradeKind::Staking,
            5000.0,
            "📈",
        ),
    ]
}

/// Rebuilds a persisted upgrade list on top of the catalog. Catalog order and
/// identity win; known ids keep their level (clamped) and get a fresh price.
pub fn reconcile(saved: &[Upgrade]) -> Vec<Upgrade> {
    initial_upgrades()
        .into_iter()
        .map(|base| match saved.iter().find(|u| u.id == base.id) {
            Some(prior) => {
                let level = prior.level.min(base.max_level);
                Upgrade {
                    level,
                    cost: Upgrade::cost_at(base.base_cost, level),
                    ..base
                }
            }
            None => base,
        })
        .collect()
}
