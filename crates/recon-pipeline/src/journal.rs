//! Record of the host operations issued during a run.
//!
//! Each entry pins the operation to the pipeline state it was issued from,
//! so a report shows both what ran and how far the run had got.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::engine::PipelineState;

/// How a host operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// `detail` names the operation's subject (a path, a CRS, a photo count).
    Completed { detail: Option<String> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub operation: String,
    /// Pipeline state at the time the operation was issued.
    pub state: PipelineState,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Seconds since the Unix epoch.
    pub at: u64,
}

impl JournalEntry {
    pub fn completed(
        operation: impl Into<String>,
        state: PipelineState,
        detail: Option<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            state,
            outcome: Outcome::Completed { detail },
            at: unix_now(),
        }
    }

    pub fn failed(
        operation: impl Into<String>,
        state: PipelineState,
        error: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            state,
            outcome: Outcome::Failed {
                error: error.into(),
            },
            at: unix_now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, Outcome::Completed { .. })
    }

    /// Success detail or failure message.
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Completed { detail } => detail.as_deref(),
            Outcome::Failed { error } => Some(error),
        }
    }
}

/// Entries in issue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Names of the operations that completed, in order.
    pub fn completed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_completed())
            .map(|e| e.operation.as_str())
            .collect()
    }

    pub fn last_failure(&self) -> Option<&JournalEntry> {
        self.entries.iter().rev().find(|e| !e.is_completed())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
