//! Testing utilities for cimatrix pipelines.
//!
//! This module provides:
//! - A recording host that scripts phase outcomes
//! - Fixtures for pairs and a runner pinned to a known host
//! - Assertions over pipeline traces

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_failed_at, assert_not_attempted, assert_pipeline_succeeded, assert_trace,
    trace_summary,
};
pub use fixtures::{gnu_host_runner, pair, GNU_HOST};
pub use mocks::{RecordingHost, ScriptedOutcome};
