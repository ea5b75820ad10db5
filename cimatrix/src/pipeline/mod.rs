//! Pipeline planning and execution.
//!
//! This module provides:
//! - The ordered phase plan and its predicate table
//! - Per-phase command resolution
//! - The fail-fast phase runner
//! - Run results and dry-run plans

mod commands;
mod result;
mod runner;
mod spec;


pub use commands::CommandSet;
pub use result::{PipelinePlan, PipelineResult};
pub use runner::{run_pipeline, PhaseRunner};
pub use spec::{PhaseCondition, PhasePlan, PhaseSpec, PipelineSwitch};
