//! Test assertions for pipeline results.

use crate::core::{PhaseKind, PhaseStatus};
use crate::pipeline::PipelineResult;

/// Asserts that the pipeline succeeded.
pub fn assert_pipeline_succeeded(result: &PipelineResult) {
    assert!(
        result.is_success(),
        "Expected success, got failure: {:?}",
        result.failure
    );
}

/// Asserts that the pipeline failed at `phase`.
pub fn assert_failed_at(result: &PipelineResult, phase: PhaseKind) {
    assert_eq!(
        result.failed_phase(),
        Some(phase),
        "Expected failure at {phase}, trace: {:?}",
        trace_summary(result)
    );
    assert_eq!(
        result.trace.last().map(|o| o.phase),
        Some(phase),
        "Trace must end at the failing phase"
    );
}

/// Asserts the status of every phase in the trace, in order.
pub fn assert_trace(result: &PipelineResult, expected: &[(PhaseKind, PhaseStatus)]) {
    assert_eq!(trace_summary(result), expected.to_vec());
}

/// Asserts that `phase` never appears in the trace.
pub fn assert_not_attempted(result: &PipelineResult, phase: PhaseKind) {
    assert!(
        result.output(phase).is_none(),
        "Expected {phase} not to be attempted, trace: {:?}",
        trace_summary(result)
    );
}

/// Returns (phase, status) for each trace entry.
#[must_use]
pub fn trace_summary(result: &PipelineResult) -> Vec<(PhaseKind, PhaseStatus)> {
    result.trace.iter().map(|o| (o.phase, o.status)).collect()
}
