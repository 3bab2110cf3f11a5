// src/status.rs
// =============================================================================
// Progress of a link check run, readable from anywhere as a snapshot.
//
// The board has exactly one writer (the service running the check). Readers
// get an owned copy and never hold the lock.
// =============================================================================

use crate::dispatch::Strategy;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Scanning,
    Checking,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub phase: Phase,
    pub message: String,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub targets: usize,
    pub strategy: Option<Strategy>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            message: "ready".to_string(),
            files_scanned: 0,
            files_failed: 0,
            targets: 0,
            strategy: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct StatusBoard {
    current: Mutex<StatusSnapshot>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Moves to `phase` with a new message, applying any other field changes
    /// under the same lock.
    pub(crate) fn update(&self, phase: Phase, message: impl Into<String>, edit: impl FnOnce(&mut StatusSnapshot)) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.phase = phase;
        current.message = message.into();
        edit(&mut current);
        tracing::debug!("status: {:?} - {}", current.phase, current.message);
    }
}
