//! The host environment a pipeline mutates.
//!
//! Installed toolchains and packages persist across phases. The runner
//! threads a [`HostEnvironment`] through every phase by `&mut` reference and
//! records each provisioning phase's [`Precondition`] on it.

mod process;

pub use process::ProcessHost;

use crate::core::{Invocation, PhaseKind, Precondition};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an external process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "code")]
pub enum CommandStatus {
    /// The process exited with a status code.
    Exited(i32),
    /// The process was terminated without an exit code (e.g. by a signal).
    Terminated,
}

impl CommandStatus {
    /// Returns true if the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Returns the exit code, if the process exited normally.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Terminated => None,
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit status {code}"),
            Self::Terminated => write!(f, "terminated without exit status"),
        }
    }
}

/// The machine a pipeline runs on.
///
/// Implementations run external commands synchronously and remember which
/// preconditions have been established so far.
#[cfg_attr(test, mockall::automock)]
pub trait HostEnvironment {
    /// Runs one invocation on behalf of `phase`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be started.
    fn run(&mut self, phase: PhaseKind, invocation: &Invocation) -> std::io::Result<CommandStatus>;

    /// Records that `precondition` now holds.
    fn establish(&mut self, precondition: Precondition);

    /// Returns true if `precondition` has been established.
    fn is_established(&self, precondition: Precondition) -> bool;
}
