//! Key moments - the named beats of a battle presentation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::outcome::BattleOutcome;

/// Power ratio window in which the fight reads as close enough for a clutch beat.
pub const CLUTCH_RATIO_MIN: f64 = 0.9;
pub const CLUTCH_RATIO_MAX: f64 = 1.1;

/// Flat hold for every beat when reduced motion is active.
pub const REDUCED_MOMENT_MS: u64 = 700;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum KeyMoment {
    Opening,
    Skill,
    Damage,
    Clutch,
    Final,
}

impl KeyMoment {
    pub fn label(self) -> &'static str {
        match self {
            KeyMoment::Opening => "Opening Clash",
            KeyMoment::Skill => "Skill Unleashed",
            KeyMoment::Damage => "Critical Exchange",
            KeyMoment::Clutch => "Clutch Moment",
            KeyMoment::Final => "Final Blow",
        }
    }

    /// Nominal on-screen time in milliseconds.
    pub fn duration_ms(self) -> u64 {
        match self {
            KeyMoment::Opening => 1200,
            KeyMoment::Skill => 1400,
            KeyMoment::Damage => 1400,
            KeyMoment::Clutch => 1600,
            KeyMoment::Final => 1200,
        }
    }

    pub fn hold_ms(self, reduce_motion: bool) -> u64 {
        if reduce_motion {
            REDUCED_MOMENT_MS
        } else {
            self.duration_ms()
        }
    }
}

pub fn is_clutch_ratio(ratio: f64) -> bool {
    (CLUTCH_RATIO_MIN..=CLUTCH_RATIO_MAX).contains(&ratio)
}

/// Ordered beats for one presentation.
pub fn select_moments(outcome: &BattleOutcome, reduce_motion: bool) -> Vec<KeyMoment> {
    if reduce_motion {
        return vec![KeyMoment::Opening, KeyMoment::Final];
    }

    let mut moments = vec![KeyMoment::Opening, KeyMoment::Skill, KeyMoment::Damage];
    if is_clutch_ratio(outcome.power_ratio()) {
        moments.push(KeyMoment::Clutch);
    }
    moments.push(KeyMoment::Final);
    moments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(player: f64, enemy: f64) -> BattleOutcome {
        BattleOutcome::new(true, player, enemy)
    }

    #[test]
    fn test_even_fight_includes_clutch() {
        assert_eq!(
            select_moments(&outcome(12_000.0, 12_000.0), false),
            vec![
                KeyMoment::Opening,
                KeyMoment::Skill,
                KeyMoment::Damage,
                KeyMoment::Clutch,
                KeyMoment::Final,
            ]
        );
    }

    #[test]
    fn test_clutch_window_is_inclusive() {
        assert!(select_moments(&outcome(9_000.0, 10_000.0), false).contains(&KeyMoment::Clutch));
        assert!(select_moments(&outcome(11_000.0, 10_000.0), false).contains(&KeyMoment::Clutch));
        assert!(!select_moments(&outcome(8_900.0, 10_000.0), false).contains(&KeyMoment::Clutch));
        assert!(!select_moments(&outcome(11_200.0, 10_000.0), false).contains(&KeyMoment::Clutch));
    }

    #[test]
    fn test_reduced_motion_collapses_to_two_beats() {
        for (p, e) in [(12_000.0, 12_000.0), (1.0, 10_000.0), (90_000.0, 10.0)] {
            assert_eq!(
                select_moments(&outcome(p, e), true),
                vec![KeyMoment::Opening, KeyMoment::Final]
            );
        }
    }

    #[test]
    fn test_final_is_always_last() {
        let moments = select_moments(&outcome(20_000.0, 10_000.0), false);
        assert_eq!(moments.last(), Some(&KeyMoment::Final));
        assert_eq!(moments.len(), 4);
    }
}
