//! Aggregate outcome of one pipeline run.

use crate::core::{BuildPair, PhaseKind, PhaseOutput, PhaseStatus};
use crate::errors::PhaseFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of running the phase list for one (target, toolchain) pair.
///
/// Success only if every executed phase succeeded. On failure, `failure`
/// names the first failing phase and the trace ends with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Unique ID of this run.
    pub run_id: Uuid,
    /// The pair the pipeline ran for.
    pub pair: BuildPair,
    /// True if the pipeline was switched off and no phase ran.
    #[serde(default)]
    pub disabled: bool,
    /// One entry per phase reached, in execution order.
    pub trace: Vec<PhaseOutput>,
    /// The first failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<PhaseFailure>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total duration in milliseconds.
    pub duration_ms: f64,
}

impl PipelineResult {
    /// Returns true if no phase failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Returns the first failing phase, if any.
    #[must_use]
    pub fn failed_phase(&self) -> Option<PhaseKind> {
        self.failure.as_ref().map(|f| f.phase)
    }

    /// Phases that were attempted (succeeded or failed), in order.
    #[must_use]
    pub fn executed_phases(&self) -> Vec<PhaseKind> {
        self.phases_with(|status| matches!(status, PhaseStatus::Ok | PhaseStatus::Fail))
    }

    /// Phases that were skipped by their condition, in order.
    #[must_use]
    pub fn skipped_phases(&self) -> Vec<PhaseKind> {
        self.phases_with(|status| status == PhaseStatus::Skip)
    }

    /// Returns the trace entry for `phase`, if the run reached it.
    #[must_use]
    pub fn output(&self, phase: PhaseKind) -> Option<&PhaseOutput> {
        self.trace.iter().find(|o| o.phase == phase)
    }

    /// Process exit code: 0 on success, else derived from the failing phase.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.failure
            .as_ref()
            .map_or(0, PhaseFailure::process_exit_code)
    }

    /// Converts into a `Result`, keeping the full record on success.
    ///
    /// # Errors
    ///
    /// Returns the first phase failure.
    pub fn into_result(self) -> Result<Self, PhaseFailure> {
        match self.failure.clone() {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }

    fn phases_with(&self, predicate: impl Fn(PhaseStatus) -> bool) -> Vec<PhaseKind> {
        self.trace
            .iter()
            .filter(|o| predicate(o.status))
            .map(|o| o.phase)
            .collect()
    }
}

/// The phases a run would execute, computed without touching the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePlan {
    /// The pair planned for.
    pub pair: BuildPair,
    /// The host triple the plan was computed against.
    pub native_triple: String,
    /// True if the pipeline is switched off.
    #[serde(default)]
    pub disabled: bool,
    /// True if build and test go through the cross-execution wrapper.
    #[serde(default)]
    pub uses_cross_wrapper: bool,
    /// Every phase with status `pending` (would run) or `skip`.
    pub phases: Vec<PhaseOutput>,
}

impl PipelinePlan {
    /// Phases that would run, in order.
    #[must_use]
    pub fn runnable_phases(&self) -> Vec<PhaseKind> {
        if self.disabled {
            return Vec::new();
        }
        self.phases
            .iter()
            .filter(|o| o.status == PhaseStatus::Pending)
            .map(|o| o.phase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Target, Toolchain};

    fn result(trace: Vec<PhaseOutput>, failure: Option<PhaseFailure>) -> PipelineResult {
        PipelineResult {
            run_id: Uuid::new_v4(),
            pair: BuildPair::new(
                Target::parse("x86_64-unknown-linux-gnu").unwrap(),
                Toolchain::stable(),
            ),
            disabled: false,
            trace,
            failure,
            started_at: Utc::now(),
            duration_ms: 0.0,
        }
    }

    #[test]
    fn test_success_result() {
        let r = result(
            vec![
                PhaseOutput::ok(PhaseKind::ProvisionToolchain),
                PhaseOutput::skip(PhaseKind::InstallTargetSupport, "native"),
                PhaseOutput::ok(PhaseKind::Build),
            ],
            None,
        );

        assert!(r.is_success());
        assert_eq!(r.exit_code(), 0);
        assert_eq!(r.failed_phase(), None);
        assert_eq!(
            r.executed_phases(),
            vec![PhaseKind::ProvisionToolchain, PhaseKind::Build]
        );
        assert_eq!(r.skipped_phases(), vec![PhaseKind::InstallTargetSupport]);
        assert!(r.into_result().is_ok());
    }

    #[test]
    fn test_failure_result() {
        let failure = PhaseFailure::new(PhaseKind::Test, Some(101), "tests failed");
        let r = result(
            vec![
                PhaseOutput::ok(PhaseKind::Build),
                PhaseOutput::fail(PhaseKind::Test, Some(101), "tests failed"),
            ],
            Some(failure.clone()),
        );

        assert!(!r.is_success());
        assert_eq!(r.failed_phase(), Some(PhaseKind::Test));
        assert_eq!(r.exit_code(), 101);
        assert!(r.output(PhaseKind::Test).unwrap().is_failure());
        assert!(r.output(PhaseKind::FormatCheck).is_none());
        assert_eq!(r.into_result().unwrap_err(), failure);
    }

    #[test]
    fn test_result_serializes() {
        let r = result(vec![PhaseOutput::ok(PhaseKind::Build)], None);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["pair"]["target"], "x86_64-unknown-linux-gnu");
        assert_eq!(json["trace"][0]["phase"], "build");
        assert!(json.get("failure").is_none());
    }
}
