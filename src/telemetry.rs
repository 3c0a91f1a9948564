//! Fire-and-forget observability events emitted by the sequencer.
//!
//! Sinks may fail; [`track`] logs and drops the error so sequencing never
//! depends on delivery.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::damage::DamageTag;
use crate::moments::KeyMoment;
use crate::outcome::BattleMode;
use crate::state::Phase;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    PresentationViewed {
        mode: BattleMode,
        generation: u64,
        victory: bool,
        power_ratio: f64,
        reduce_motion: bool,
    },
    MomentsShown {
        mode: BattleMode,
        generation: u64,
        moments: Vec<KeyMoment>,
        clutch: bool,
    },
    DamageBatchShown {
        mode: BattleMode,
        generation: u64,
        count: usize,
        total: u64,
        special_tags: usize,
        shown: Option<DamageTag>,
    },
    PresentationSkipped {
        mode: BattleMode,
        generation: u64,
        phase: Phase,
        moment_index: usize,
    },
    ResultShown {
        mode: BattleMode,
        generation: u64,
        victory: bool,
        stars: u8,
        first_clear: bool,
        skipped: bool,
    },
    PresentationCompleted {
        mode: BattleMode,
        generation: u64,
        skipped: bool,
    },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::PresentationViewed { .. } => "presentation_viewed",
            TelemetryEvent::MomentsShown { .. } => "moments_shown",
            TelemetryEvent::DamageBatchShown { .. } => "damage_batch_shown",
            TelemetryEvent::PresentationSkipped { .. } => "presentation_skipped",
            TelemetryEvent::ResultShown { .. } => "result_shown",
            TelemetryEvent::PresentationCompleted { .. } => "presentation_completed",
        }
    }

    pub fn mode(&self) -> BattleMode {
        match self {
            TelemetryEvent::PresentationViewed { mode, .. }
            | TelemetryEvent::MomentsShown { mode, .. }
            | TelemetryEvent::DamageBatchShown { mode, .. }
            | TelemetryEvent::PresentationSkipped { mode, .. }
            | TelemetryEvent::ResultShown { mode, .. }
            | TelemetryEvent::PresentationCompleted { mode, .. } => *mode,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("telemetry io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("telemetry encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("telemetry sink unavailable")]
    Unavailable,
}

pub trait TelemetrySink: Send + Sync {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Deliver `event`, swallowing sink failures.
pub fn track(sink: &dyn TelemetrySink, event: &TelemetryEvent) {
    if let Err(error) = sink.track(event) {
        tracing::debug!(event = event.name(), %error, "telemetry dropped");
    }
}

/// Emits each event as a structured `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(
            target: "telemetry",
            event = event.name(),
            mode = event.mode().label(),
            %payload,
            "telemetry"
        );
        Ok(())
    }
}

/// Appends one JSON object per line.
pub struct JsonLinesSink {
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub fn open(path: &Path) -> Result<Self, TelemetryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl TelemetrySink for JsonLinesSink {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        let mut file = self.file.lock().map_err(|_| TelemetryError::Unavailable)?;
        file.write_all(&line)?;
        Ok(())
    }
}

/// Keeps events in memory. Can be switched to fail every call.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<TelemetryEvent>>,
    failing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(TelemetryEvent::name).collect()
    }
}

impl TelemetrySink for MemorySink {
    fn track(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        if self.failing {
            return Err(TelemetryError::Unavailable);
        }
        self.events
            .lock()
            .map_err(|_| TelemetryError::Unavailable)?
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed() -> TelemetryEvent {
        TelemetryEvent::PresentationCompleted {
            mode: BattleMode::Arena,
            generation: 3,
            skipped: true,
        }
    }

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();
        track(&sink, &completed());
        assert_eq!(sink.names(), vec!["presentation_completed"]);
    }

    #[test]
    fn test_failing_sink_is_swallowed() {
        let sink = MemorySink::failing();
        track(&sink, &completed());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(completed()).unwrap();
        assert_eq!(json["event"], "presentation_completed");
        assert_eq!(json["mode"], "arena");
    }

    #[test]
    fn test_json_lines_sink_appends() {
        let path = std::env::temp_dir().join(format!(
            "battle-reveal-telemetry-{}.jsonl",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let sink = JsonLinesSink::open(&path).unwrap();
        track(&sink, &completed());
        track(&sink, &completed());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }
}
