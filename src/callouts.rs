//! Cosmetic text for the skill beat and the climax.

pub const SKILL_CALLOUTS: [&str; 6] = [
    "Blazing Onslaught",
    "Tidal Requiem",
    "Stormbreaker",
    "Verdant Bastion",
    "Eclipse Fang",
    "Radiant Verdict",
];

pub const VICTORY_FLOURISH: &str = "The enemy line breaks!";
pub const DEFEAT_FLOURISH: &str = "Your squad falls back...";

pub fn skill_callout(moment_index: usize) -> &'static str {
    SKILL_CALLOUTS[moment_index % SKILL_CALLOUTS.len()]
}

pub fn climax_line(victory: bool) -> &'static str {
    if victory {
        VICTORY_FLOURISH
    } else {
        DEFEAT_FLOURISH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callout_wraps_table() {
        assert_eq!(skill_callout(1), SKILL_CALLOUTS[1]);
        assert_eq!(skill_callout(SKILL_CALLOUTS.len() + 1), SKILL_CALLOUTS[1]);
        assert!(SKILL_CALLOUTS.iter().all(|name| !name.is_empty()));
    }

    #[test]
    fn test_climax_line_differs_by_result() {
        assert_ne!(climax_line(true), climax_line(false));
    }
}
