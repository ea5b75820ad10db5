//! Phase output type with factory methods.

use super::{PhaseKind, PhaseStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The recorded outcome of one phase; one entry of a pipeline trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutput {
    /// The phase this entry describes.
    pub phase: PhaseKind,

    /// The status of the phase.
    pub status: PhaseStatus,

    /// Command lines issued (or, in a plan, that would be issued).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    /// Exit status of the last process that ran, if any completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Error message (for failed phases).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Skip reason (for skipped phases).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,

    /// When the phase started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock duration in milliseconds.
    #[serde(default)]
    pub duration_ms: f64,
}

impl PhaseOutput {
    fn with_status(phase: PhaseKind, status: PhaseStatus) -> Self {
        Self {
            phase,
            status,
            commands: Vec::new(),
            exit_code: None,
            error: None,
            skip_reason: None,
            started_at: None,
            duration_ms: 0.0,
        }
    }

    /// Creates a successful output. No exit code is recorded until a process ran.
    #[must_use]
    pub fn ok(phase: PhaseKind) -> Self {
        Self::with_status(phase, PhaseStatus::Ok)
    }

    /// Creates a skip output with a reason.
    #[must_use]
    pub fn skip(phase: PhaseKind, reason: impl Into<String>) -> Self {
        Self {
            skip_reason: Some(reason.into()),
            ..Self::with_status(phase, PhaseStatus::Skip)
        }
    }

    /// Creates a failure output.
    #[must_use]
    pub fn fail(phase: PhaseKind, exit_code: Option<i32>, error: impl Into<String>) -> Self {
        Self {
            exit_code,
            error: Some(error.into()),
            ..Self::with_status(phase, PhaseStatus::Fail)
        }
    }

    /// Creates a planned (not yet executed) output.
    #[must_use]
    pub fn pending(phase: PhaseKind) -> Self {
        Self::with_status(phase, PhaseStatus::Pending)
    }

    /// Records the exit status of the last process that ran.
    #[must_use]
    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Records the command lines issued.
    #[must_use]
    pub fn with_commands(mut self, commands: Vec<String>) -> Self {
        self.commands = commands;
        self
    }

    /// Records timing.
    #[must_use]
    pub fn with_timing(mut self, started_at: DateTime<Utc>, duration_ms: f64) -> Self {
        self.started_at = Some(started_at);
        self.duration_ms = duration_ms;
        self
    }

    /// Returns true if the next phase may start.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the phase failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Returns true if the phase was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.status == PhaseStatus::Skip
    }
}
