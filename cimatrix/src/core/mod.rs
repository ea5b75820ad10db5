//! Core domain model types for cimatrix.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Target triples and toolchain channels
//! - Phase identities, statuses and outputs
//! - External command invocations

mod invocation;
mod output;
mod pair;
mod phase;
mod status;
mod target;
mod toolchain;

pub use invocation::Invocation;
pub use output::PhaseOutput;
pub use pair::BuildPair;
pub use phase::{PhaseKind, Precondition};
pub use status::PhaseStatus;
pub use target::{LibcFamily, Target};
pub use toolchain::{Channel, Toolchain};
