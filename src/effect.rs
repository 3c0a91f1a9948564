//! Effects - side effects declared by the reducer

use crate::completion::CompletionReport;
use crate::telemetry::TelemetryEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fire `BeatElapsed(generation)` after `delay_ms`, replacing any pending beat
    ScheduleBeat { generation: u64, delay_ms: u64 },
    /// Drop the pending beat timer
    CancelBeat,
    /// Open the completion channel for a new presentation
    OpenCompletion { generation: u64 },
    /// Drop the pending completion channel
    AbandonCompletion,
    /// Resolve the completion channel
    Complete(CompletionReport),
    /// Report an observability event
    Track(TelemetryEvent),
    /// Wait for the device flag to differ from `known`
    WatchReduceMotion { known: bool },
    /// Write the device flag
    SetDeviceReduceMotion(bool),
}
