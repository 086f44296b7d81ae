//! Fallback (noop) implementation of event collection.
//!
//! This exists so the crate (and binary) can compile on any target without
//! pulling in OS hook dependencies. It never emits events on its own; the
//! sender side is exposed so tests and future platform hooks can feed the
//! channel.

use crate::collector::types::InputEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Errors that can occur during event collection.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
        }
    }
}

impl std::error::Error for CollectorError {}

/// A collector backed only by its channel; no system hook is installed.
pub struct NoopCollector {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
    running: Arc<AtomicBool>,
}

impl NoopCollector {
    pub fn new() -> Self {
        // Bounded so a stalled consumer drops events instead of growing
        // without limit.
        let (sender, receiver) = bounded(10_000);
        Self {
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start capturing events. Without a platform hook this only marks the
    /// collector as running.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop capturing events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Receiver side consumed by the event loop.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }

    /// Sender side for hook implementations and tests.
    pub fn sender(&self) -> Sender<InputEvent> {
        self.sender.clone()
    }
}

impl Default for NoopCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// There is no input-monitoring permission gate without a platform hook.
pub fn check_permission() -> bool {
    true
}
