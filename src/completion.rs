//! One-shot completion hand-off from the sequencer to its host.
//!
//! Each activation opens a fresh channel. The sender is consumed on use, so a
//! presentation can complete at most once; opening a new channel drops the
//! previous sender and the abandoned receiver resolves as
//! [`CompletionStatus::Abandoned`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::outcome::BattleMode;

/// What the host learns when the player presses Continue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompletionReport {
    pub generation: u64,
    pub mode: BattleMode,
    pub victory: bool,
    pub skipped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionStatus {
    Completed(CompletionReport),
    Abandoned { generation: u64 },
}

pub struct CompletionSender {
    generation: u64,
    tx: oneshot::Sender<CompletionReport>,
}

impl CompletionSender {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false if the receiver is already gone.
    pub fn send(self, report: CompletionReport) -> bool {
        self.tx.send(report).is_ok()
    }
}

pub struct CompletionReceiver {
    generation: u64,
    rx: oneshot::Receiver<CompletionReport>,
}

impl CompletionReceiver {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Future for CompletionReceiver {
    type Output = CompletionStatus;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let generation = self.generation;
        Pin::new(&mut self.rx).poll(cx).map(|result| match result {
            Ok(report) => CompletionStatus::Completed(report),
            Err(_) => CompletionStatus::Abandoned { generation },
        })
    }
}

pub fn completion_channel(generation: u64) -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = oneshot::channel();
    (
        CompletionSender { generation, tx },
        CompletionReceiver { generation, rx },
    )
}

/// Holds the sender for the active presentation, if any.
#[derive(Default)]
pub struct CompletionSlot {
    pending: Option<CompletionSender>,
}

impl CompletionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel for `generation`, abandoning whatever was pending.
    pub fn open(&mut self, generation: u64) -> CompletionReceiver {
        let (tx, rx) = completion_channel(generation);
        if let Some(previous) = self.pending.replace(tx) {
            tracing::debug!(
                generation = previous.generation(),
                "abandoning pending completion"
            );
        }
        rx
    }

    /// Drop the pending sender without completing it.
    pub fn abandon(&mut self) {
        self.pending = None;
    }

    /// Deliver `report` if it belongs to the pending generation.
    pub fn complete(&mut self, report: CompletionReport) -> bool {
        match self.pending.take() {
            Some(tx) if tx.generation() == report.generation => tx.send(report),
            Some(tx) => {
                tracing::warn!(
                    pending = tx.generation(),
                    requested = report.generation,
                    "ignoring completion for a stale presentation"
                );
                self.pending = Some(tx);
                false
            }
            None => false,
        }
    }

    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(CompletionSender::generation)
    }
}
