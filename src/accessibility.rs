//! Device "reduce motion" flag as an injected capability.

use tokio::sync::watch;

pub trait MotionPreference: Send + Sync {
    /// Current value of the flag.
    fn reduce_motion(&self) -> bool;

    /// Receiver notified whenever the flag changes.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Flag owned by the host and changeable at runtime.
pub struct SharedMotionPreference {
    tx: watch::Sender<bool>,
}

impl SharedMotionPreference {
    pub fn new(reduce_motion: bool) -> Self {
        let (tx, _rx) = watch::channel(reduce_motion);
        Self { tx }
    }

    pub fn set(&self, reduce_motion: bool) {
        let previous = self.tx.send_replace(reduce_motion);
        if previous != reduce_motion {
            tracing::info!(reduce_motion, "device reduce-motion changed");
        }
    }
}

impl MotionPreference for SharedMotionPreference {
    fn reduce_motion(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Constant flag for tests and headless runs.
pub struct FixedMotionPreference {
    tx: watch::Sender<bool>,
}

impl FixedMotionPreference {
    pub fn new(reduce_motion: bool) -> Self {
        let (tx, _rx) = watch::channel(reduce_motion);
        Self { tx }
    }
}

impl MotionPreference for FixedMotionPreference {
    fn reduce_motion(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Resolve once the flag differs from `known`. `None` if the source went away.
pub async fn wait_for_change(mut rx: watch::Receiver<bool>, known: bool) -> Option<bool> {
    loop {
        let current = *rx.borrow_and_update();
        if current != known {
            return Some(current);
        }
        if rx.changed().await.is_err() {
            return None;
        }
    }
}
