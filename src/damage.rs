//! Damage numbers for the damage beat.
//!
//! Values and tags are a pure function of the outcome and the event index.
//! The same outcome always yields the same batch, which keeps replays and
//! render snapshots stable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::outcome::BattleOutcome;

/// Multipliers applied to a tenth of player power, cycled by index.
pub const VARIATION: [f64; 10] = [1.0, 1.35, 0.85, 1.6, 0.95, 1.2, 0.75, 1.5, 1.05, 1.9];

pub const UNDERDOG_BATCH: usize = 8;
pub const FULL_BATCH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DamageTag {
    Crit,
    Glancing,
    Devastating,
    Blocked,
    Normal,
}

impl DamageTag {
    pub fn label(self) -> &'static str {
        match self {
            DamageTag::Crit => "CRIT",
            DamageTag::Glancing => "GLANCING",
            DamageTag::Devastating => "DEVASTATING",
            DamageTag::Blocked => "BLOCKED",
            DamageTag::Normal => "",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DamageEvent {
    pub value: u64,
    pub tag: DamageTag,
}

/// Tag for the event at `index`. Rules are checked in precedence order.
pub fn tag_for(ratio: f64, index: usize) -> DamageTag {
    if ratio >= 1.3 && index % 3 == 0 {
        DamageTag::Devastating
    } else if ratio >= 1.15 && index % 2 == 0 {
        DamageTag::Crit
    } else if ratio <= 0.7 && index % 2 == 0 {
        DamageTag::Blocked
    } else if ratio <= 0.85 && index % 3 == 0 {
        DamageTag::Glancing
    } else {
        DamageTag::Normal
    }
}

pub fn batch_len(ratio: f64) -> usize {
    if ratio < 1.0 {
        UNDERDOG_BATCH
    } else {
        FULL_BATCH
    }
}

pub fn generate_damage_events(outcome: &BattleOutcome) -> Vec<DamageEvent> {
    let ratio = outcome.power_ratio();
    let base = outcome.player_power() * 0.1;

    (0..batch_len(ratio))
        .map(|i| DamageEvent {
            value: (base * VARIATION[i % VARIATION.len()]).floor() as u64,
            tag: tag_for(ratio, i),
        })
        .collect()
}
