//! Battle outcome payload supplied by the host screen

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Power used when the host leaves a side's power unset.
pub const NOMINAL_POWER: f64 = 10_000.0;

pub const MAX_STARS: u8 = 3;

/// Screen the battle was launched from. Cosmetic only.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum BattleMode {
    #[default]
    Campaign,
    Dungeon,
    Arena,
}

impl BattleMode {
    pub fn label(self) -> &'static str {
        match self {
            BattleMode::Campaign => "campaign",
            BattleMode::Dungeon => "dungeon",
            BattleMode::Arena => "arena",
        }
    }
}

/// Server-resolved battle result. Immutable for one presentation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BattleOutcome {
    pub victory: bool,
    pub player_power: Option<f64>,
    pub enemy_power: Option<f64>,
    pub stage_name: Option<String>,
    pub first_clear: bool,
    pub stars: Option<u8>,
    pub rewards: BTreeMap<String, i64>,
}

impl BattleOutcome {
    pub fn new(victory: bool, player_power: f64, enemy_power: f64) -> Self {
        Self {
            victory,
            player_power: Some(player_power),
            enemy_power: Some(enemy_power),
            ..Default::default()
        }
    }

    pub fn with_stage(mut self, name: impl Into<String>) -> Self {
        self.stage_name = Some(name.into());
        self
    }

    pub fn with_stars(mut self, stars: u8) -> Self {
        self.stars = Some(stars);
        self
    }

    pub fn with_first_clear(mut self) -> Self {
        self.first_clear = true;
        self
    }

    pub fn with_reward(mut self, kind: impl Into<String>, amount: i64) -> Self {
        self.rewards.insert(kind.into(), amount);
        self
    }

    pub fn player_power(&self) -> f64 {
        resolve_power(self.player_power)
    }

    pub fn enemy_power(&self) -> f64 {
        resolve_power(self.enemy_power)
    }

    /// Player power divided by enemy power.
    pub fn power_ratio(&self) -> f64 {
        self.player_power() / self.enemy_power()
    }

    /// Star rating clamped to the displayable range.
    pub fn star_count(&self) -> u8 {
        self.stars.unwrap_or(0).min(MAX_STARS)
    }
}

fn resolve_power(power: Option<f64>) -> f64 {
    match power {
        Some(p) if p.is_finite() && p > 0.0 => p,
        _ => NOMINAL_POWER,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutcomeFile {
    Many(Vec<BattleOutcome>),
    One(BattleOutcome),
}

/// Parse a JSON document holding either one outcome or an array of them.
pub fn parse_outcomes(json: &str) -> Result<Vec<BattleOutcome>, Error> {
    let outcomes = match serde_json::from_str::<OutcomeFile>(json)? {
        OutcomeFile::Many(list) => list,
        OutcomeFile::One(outcome) => vec![outcome],
    };
    if outcomes.is_empty() {
        return Err(Error::NoOutcomes);
    }
    Ok(outcomes)
}

pub fn load_outcomes(path: &Path) -> Result<Vec<BattleOutcome>, Error> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_outcomes(&json)
}

/// Built-in outcomes covering every tag band and the clutch window.
pub fn sample_outcomes() -> Vec<BattleOutcome> {
    vec![
        BattleOutcome::new(true, 12_000.0, 12_000.0)
            .with_stage("1-4 Ember Pass")
            .with_stars(3)
            .with_first_clear()
            .with_reward("gold", 1_200)
            .with_reward("hero_xp", 340),
        BattleOutcome::new(true, 18_200.0, 13_000.0)
            .with_stage("Crypt of Ash B3")
            .with_stars(2)
            .with_reward("gold", 800)
            .with_reward("rune_shard", 3),
        BattleOutcome::new(false, 6_000.0, 10_000.0)
            .with_stage("Arena Silver II")
            .with_reward("arena_token", 1),
        BattleOutcome::new(false, 8_000.0, 10_000.0).with_stage("3-9 Frostmarch"),
    ]
}
