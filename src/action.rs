//! Actions for the host screen and the presentation sequencer

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::completion::CompletionReport;
use crate::outcome::{BattleMode, BattleOutcome};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Host category =====
    /// Move the outcome cursor down
    HostSelectNext,

    /// Move the outcome cursor up
    HostSelectPrev,

    /// Show the sequencer for the selected outcome
    HostPresentSelected,

    /// Flip the device reduce-motion setting
    HostToggleReduceMotion,

    /// Result: the player pressed Continue and the host took over
    HostDidComplete(CompletionReport),

    /// Result: a presentation was replaced or hidden before completing
    HostDidAbandon(u64),

    // ===== Presentation category =====
    /// Show the overlay. `None` renders nothing.
    PresentationShow {
        outcome: Option<BattleOutcome>,
        mode: BattleMode,
    },

    /// Tear the overlay down
    PresentationHide,

    /// Jump straight to the result beat
    PresentationSkip,

    /// Continue from the result beat
    PresentationContinue,

    // ===== ReduceMotion category =====
    /// Device flag changed
    ReduceMotionChanged(bool),

    /// Device flag source went away
    ReduceMotionLost,

    // ===== Beat category =====
    /// A scheduled beat fired; carries the generation it was scheduled for
    BeatElapsed(u64),

    // ===== Uncategorized (global) =====
    /// Start-up hook
    Init,

    /// Exit the application
    Quit,
}
