//! # Cimatrix
//!
//! A fail-fast build matrix runner for Rust projects.
//!
//! For one (target, toolchain) pair, cimatrix provisions the toolchain,
//! installs cross-compilation support and system packages where the target
//! needs them, then builds, tests and format-checks the workspace:
//!
//! - **Typed conditions**: conditional phases are decided from structural
//!   properties of the target (cross or native, libc family)
//! - **Explicit host state**: provisioning phases establish preconditions on a
//!   [`host::HostEnvironment`] that later phases require
//! - **Fail-fast**: the first failing phase ends the run and is reported by name
//! - **Event-driven observability**: lifecycle events through an [`events::EventSink`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cimatrix::prelude::*;
//!
//! let config = PipelineConfig::from_env()?;
//! let mut host = ProcessHost::new();
//! let result = run_pipeline(&config, &mut host, Arc::new(LoggingEventSink::info()));
//!
//! if let Some(failure) = &result.failure {
//!     eprintln!("phase {} failed", failure.phase);
//! }
//! std::process::exit(i32::from(result.exit_code()));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod host;
pub mod pipeline;
pub mod probe;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{PipelineConfig, ToolCommands};
    pub use crate::core::{
        BuildPair, Channel, Invocation, LibcFamily, PhaseKind, PhaseOutput, PhaseStatus,
        Precondition, Target, Toolchain,
    };
    pub use crate::errors::{
        CimatrixError, ConfigError, InvalidTargetError, InvalidToolchainError, PhaseFailure,
        PhaseFailureKind, PlanValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::host::{CommandStatus, HostEnvironment, ProcessHost};
    pub use crate::pipeline::{
        run_pipeline, PhaseCondition, PhasePlan, PhaseRunner, PhaseSpec, PipelinePlan,
        PipelineResult, PipelineSwitch,
    };
    pub use crate::probe::{EnvironmentProber, TargetProfile};
}
