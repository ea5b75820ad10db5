//! Error types for cimatrix.
//!
//! Phase failures are terminal for the pipeline run that produced them. They
//! are reported through [`PipelineResult`](crate::pipeline::PipelineResult)
//! and converted into [`PhaseFailure`] when a caller wants a `Result`.

use crate::core::PhaseKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for cimatrix operations.
#[derive(Debug, Error)]
pub enum CimatrixError {
    /// Configuration could not be assembled.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A target identifier was malformed.
    #[error("{0}")]
    InvalidTarget(#[from] InvalidTargetError),

    /// A toolchain name was malformed.
    #[error("{0}")]
    InvalidToolchain(#[from] InvalidToolchainError),

    /// A phase plan was malformed.
    #[error("{0}")]
    Plan(#[from] PlanValidationError),

    /// A pipeline phase failed.
    #[error("{0}")]
    Phase(#[from] PhaseFailure),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when a target triple cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid target '{triple}': {reason}")]
pub struct InvalidTargetError {
    /// The rejected identifier.
    pub triple: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidTargetError {
    /// Creates a new invalid target error.
    #[must_use]
    pub fn new(triple: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            triple: triple.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when a toolchain name cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid toolchain '{name}': {reason}")]
pub struct InvalidToolchainError {
    /// The rejected name.
    pub name: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidToolchainError {
    /// Creates a new invalid toolchain error.
    #[must_use]
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when a phase plan is not a valid ordering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid phase plan: {message}")]
pub struct PlanValidationError {
    /// The error message.
    pub message: String,
    /// The phases involved in the error.
    pub phases: Vec<PhaseKind>,
}

impl PlanValidationError {
    /// Creates a new plan validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phases: Vec::new(),
        }
    }

    /// Sets the phases involved.
    #[must_use]
    pub fn with_phases(mut self, phases: Vec<PhaseKind>) -> Self {
        self.phases = phases;
        self
    }
}

/// Errors raised while reading pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable was not set.
    #[error("Missing required configuration: {name}")]
    Missing {
        /// The variable name.
        name: String,
    },

    /// A variable had a value that could not be interpreted.
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        /// The variable name.
        name: String,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A target in the configuration was malformed.
    #[error("{0}")]
    Target(#[from] InvalidTargetError),

    /// A toolchain in the configuration was malformed.
    #[error("{0}")]
    Toolchain(#[from] InvalidToolchainError),
}

impl ConfigError {
    /// Creates a missing-variable error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid_value(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Classification of a terminal phase failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseFailureKind {
    /// The toolchain channel could not be installed or selected.
    ProvisioningFailure,
    /// Cross-compilation support for the target could not be installed.
    CrossSupportInstallFailure,
    /// The alternate libc system packages could not be installed.
    SystemPackageInstallFailure,
    /// The formatting component could not be installed.
    FormatCheckerInstallFailure,
    /// The project failed to build.
    BuildFailure,
    /// The test suite failed.
    TestFailure,
    /// At least one file is not correctly formatted.
    FormatCheckFailure,
}

impl PhaseFailureKind {
    /// Returns the failure kind reported when `phase` fails.
    #[must_use]
    pub fn for_phase(phase: PhaseKind) -> Self {
        match phase {
            PhaseKind::ProvisionToolchain => Self::ProvisioningFailure,
            PhaseKind::InstallTargetSupport => Self::CrossSupportInstallFailure,
            PhaseKind::InstallSystemPackages => Self::SystemPackageInstallFailure,
            PhaseKind::InstallFormatChecker => Self::FormatCheckerInstallFailure,
            PhaseKind::Build => Self::BuildFailure,
            PhaseKind::Test => Self::TestFailure,
            PhaseKind::FormatCheck => Self::FormatCheckFailure,
        }
    }
}

impl fmt::Display for PhaseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProvisioningFailure => "provisioning failure",
            Self::CrossSupportInstallFailure => "cross-support install failure",
            Self::SystemPackageInstallFailure => "system package install failure",
            Self::FormatCheckerInstallFailure => "format checker install failure",
            Self::BuildFailure => "build failure",
            Self::TestFailure => "test failure",
            Self::FormatCheckFailure => "format check failure",
        };
        f.write_str(name)
    }
}

/// A terminal failure of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind} in phase '{phase}': {message}")]
pub struct PhaseFailure {
    /// The phase that failed.
    pub phase: PhaseKind,
    /// The failure classification.
    pub kind: PhaseFailureKind,
    /// Exit status of the failing process, if one ran to completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Human-readable detail.
    pub message: String,
}

impl PhaseFailure {
    /// Creates a failure for `phase`.
    #[must_use]
    pub fn new(phase: PhaseKind, exit_code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            phase,
            kind: PhaseFailureKind::for_phase(phase),
            exit_code,
            message: message.into(),
        }
    }

    /// Returns the process exit code this failure maps to.
    ///
    /// The failing process's status is reused when it fits in `1..=255`;
    /// everything else (spawn errors, signals, out-of-range codes) maps to 1.
    #[must_use]
    pub fn process_exit_code(&self) -> u8 {
        self.exit_code
            .and_then(|code| u8::try_from(code).ok())
            .filter(|code| *code != 0)
            .unwrap_or(1)
    }
}
