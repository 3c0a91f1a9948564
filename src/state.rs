//! Application state - the host screen plus the active presentation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::callouts;
use crate::completion::CompletionReport;
use crate::damage::{self, DamageEvent};
use crate::moments::{self, KeyMoment};
use crate::outcome::{sample_outcomes, BattleMode, BattleOutcome};

pub const INTRO_MS: u64 = 900;
pub const REDUCED_INTRO_MS: u64 = 300;
pub const CLIMAX_MS: u64 = 1500;
pub const REDUCED_CLIMAX_MS: u64 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Phase {
    Intro,
    Moments,
    Climax,
    Result,
}

/// One run of the sequencer. Rebuilt from scratch on every activation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Presentation {
    /// Generation at activation; identifies this run to telemetry and completion
    pub activation: u64,
    pub outcome: BattleOutcome,
    pub mode: BattleMode,
    pub phase: Phase,
    pub moment_index: usize,
    pub skipped: bool,
    pub reduce_motion: bool,
    pub moments: Vec<KeyMoment>,
    pub damage_events: Vec<DamageEvent>,
    pub completed: bool,
}

impl Presentation {
    pub fn new(
        activation: u64,
        outcome: BattleOutcome,
        mode: BattleMode,
        reduce_motion: bool,
    ) -> Self {
        let moments = moments::select_moments(&outcome, reduce_motion);
        let damage_events = damage::generate_damage_events(&outcome);
        Self {
            activation,
            outcome,
            mode,
            phase: Phase::Intro,
            moment_index: 0,
            skipped: false,
            reduce_motion,
            moments,
            damage_events,
            completed: false,
        }
    }

    pub fn current_moment(&self) -> KeyMoment {
        // Opening and Final are always selected, so the fallback only covers restored states.
        self.moments
            .get(self.moment_index)
            .copied()
            .unwrap_or(KeyMoment::Final)
    }

    pub fn is_last_moment(&self) -> bool {
        self.moment_index + 1 >= self.moments.len()
    }

    pub fn skill_callout(&self) -> Option<&'static str> {
        (self.current_moment() == KeyMoment::Skill).then(|| callouts::skill_callout(self.moment_index))
    }

    pub fn shown_damage(&self) -> Option<DamageEvent> {
        if self.current_moment() != KeyMoment::Damage || self.damage_events.is_empty() {
            return None;
        }
        Some(self.damage_events[self.moment_index % self.damage_events.len()])
    }

    pub fn climax_line(&self) -> &'static str {
        callouts::climax_line(self.outcome.victory)
    }

    pub fn has_clutch(&self) -> bool {
        self.moments.contains(&KeyMoment::Clutch)
    }

    pub fn intro_ms(&self) -> u64 {
        if self.reduce_motion {
            REDUCED_INTRO_MS
        } else {
            INTRO_MS
        }
    }

    pub fn climax_ms(&self) -> u64 {
        if self.reduce_motion {
            REDUCED_CLIMAX_MS
        } else {
            CLIMAX_MS
        }
    }

    pub fn can_skip(&self) -> bool {
        self.phase != Phase::Result
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    /// Outcomes the host can present
    pub outcomes: Vec<BattleOutcome>,
    pub selected: usize,
    pub mode: BattleMode,

    /// Overlay visibility as set by the host
    pub visible: bool,
    pub presentation: Option<Presentation>,

    /// Bumped on every activation, hide and skip; deferred beats carry it
    pub generation: u64,

    /// Mirror of the device accessibility flag
    pub device_reduce_motion: bool,

    pub completed_count: u32,
    pub last_report: Option<CompletionReport>,
    pub status: Option<String>,
}

impl AppState {
    pub fn new(outcomes: Vec<BattleOutcome>, mode: BattleMode, reduce_motion: bool) -> Self {
        Self {
            outcomes,
            selected: 0,
            mode,
            visible: false,
            presentation: None,
            generation: 0,
            device_reduce_motion: reduce_motion,
            completed_count: 0,
            last_report: None,
            status: None,
        }
    }

    pub fn selected_outcome(&self) -> Option<&BattleOutcome> {
        self.outcomes.get(self.selected)
    }

    pub fn phase(&self) -> Option<Phase> {
        self.presentation.as_ref().map(|p| p.phase)
    }

    pub fn is_presenting(&self) -> bool {
        self.visible && self.presentation.is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(sample_outcomes(), BattleMode::default(), false)
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![DebugSection::new("Host")
            .entry("mode", ron_string(&self.mode))
            .entry("selected", ron_string(&self.selected))
            .entry("visible", ron_string(&self.visible))
            .entry("generation", ron_string(&self.generation))
            .entry("reduce_motion", ron_string(&self.device_reduce_motion))
            .entry("completed", ron_string(&self.completed_count))];

        if let Some(presentation) = &self.presentation {
            sections.push(
                DebugSection::new("Presentation")
                    .entry("phase", ron_string(&presentation.phase))
                    .entry("moment", ron_string(&presentation.current_moment()))
                    .entry("moment_index", ron_string(&presentation.moment_index))
                    .entry("skipped", ron_string(&presentation.skipped))
                    .entry("reduce_motion", ron_string(&presentation.reduce_motion))
                    .entry("ratio", format!("{:.3}", presentation.outcome.power_ratio())),
            );
        }

        sections
    }
}
