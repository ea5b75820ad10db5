//! Phase and plan specifications.
//!
//! Conditional phases are keyed on a [`TargetProfile`] computed by the
//! prober, never on substrings of the target identifier.

use crate::core::{PhaseKind, Precondition};
use crate::errors::PlanValidationError;
use crate::probe::TargetProfile;
use serde::{Deserialize, Serialize};

/// When a phase runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseCondition {
    /// The phase always runs.
    Always,
    /// The phase runs only when the target is not the host's native triple.
    CrossTarget,
    /// The phase runs only when the target uses the alternate libc.
    AlternateLibc,
}

impl PhaseCondition {
    /// Evaluates the condition.
    #[must_use]
    pub fn holds(&self, profile: &TargetProfile) -> bool {
        match self {
            Self::Always => true,
            Self::CrossTarget => profile.cross,
            Self::AlternateLibc => profile.alternate_libc,
        }
    }

    /// Reason recorded when the phase is skipped.
    #[must_use]
    pub fn skip_reason(&self) -> &'static str {
        match self {
            Self::Always => "never skipped",
            Self::CrossTarget => "target is the host's native triple",
            Self::AlternateLibc => "target does not use the alternate libc",
        }
    }
}

/// Whether a pipeline runs at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineSwitch {
    /// Phases run normally.
    #[default]
    Enabled,
    /// No phase runs and the pipeline reports success.
    Disabled,
}

impl PipelineSwitch {
    /// Returns true if phases should run.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl From<bool> for PipelineSwitch {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Specification for a single phase in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// The phase.
    pub kind: PhaseKind,
    /// When it runs.
    pub condition: PhaseCondition,
}

impl PhaseSpec {
    /// Creates a phase that always runs.
    #[must_use]
    pub fn new(kind: PhaseKind) -> Self {
        Self {
            kind,
            condition: PhaseCondition::Always,
        }
    }

    /// Sets the condition.
    #[must_use]
    pub fn when(mut self, condition: PhaseCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Host preconditions that must hold before this phase starts.
    #[must_use]
    pub fn requirements(&self, profile: &TargetProfile) -> Vec<Precondition> {
        match self.kind {
            PhaseKind::ProvisionToolchain | PhaseKind::InstallSystemPackages => Vec::new(),
            PhaseKind::InstallTargetSupport | PhaseKind::InstallFormatChecker => {
                vec![Precondition::ToolchainActive]
            }
            PhaseKind::Build | PhaseKind::Test => {
                let mut required = vec![Precondition::ToolchainActive];
                if profile.cross {
                    required.push(Precondition::TargetSupport);
                }
                if profile.alternate_libc {
                    required.push(Precondition::AlternateLibcPackages);
                }
                required
            }
            PhaseKind::FormatCheck => {
                vec![Precondition::ToolchainActive, Precondition::FormatChecker]
            }
        }
    }
}

/// The ordered phase list of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    phases: Vec<PhaseSpec>,
}

impl Default for PhasePlan {
    fn default() -> Self {
        Self::standard()
    }
}

impl PhasePlan {
    /// The full provision, build, test and format-check sequence.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            phases: vec![
                PhaseSpec::new(PhaseKind::ProvisionToolchain),
                PhaseSpec::new(PhaseKind::InstallTargetSupport).when(PhaseCondition::CrossTarget),
                PhaseSpec::new(PhaseKind::InstallSystemPackages)
                    .when(PhaseCondition::AlternateLibc),
                PhaseSpec::new(PhaseKind::InstallFormatChecker),
                PhaseSpec::new(PhaseKind::Build),
                PhaseSpec::new(PhaseKind::Test),
                PhaseSpec::new(PhaseKind::FormatCheck),
            ],
        }
    }

    /// Creates a plan from an explicit phase list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or not in strictly increasing
    /// phase order (which also rules out duplicates).
    pub fn new(phases: Vec<PhaseSpec>) -> Result<Self, PlanValidationError> {
        if phases.is_empty() {
            return Err(PlanValidationError::new("plan has no phases"));
        }

        if let Some(pair) = phases.windows(2).find(|w| w[0].kind >= w[1].kind) {
            return Err(PlanValidationError::new(format!(
                "phase '{}' cannot run after '{}'",
                pair[1].kind, pair[0].kind
            ))
            .with_phases(vec![pair[0].kind, pair[1].kind]));
        }

        Ok(Self { phases })
    }

    /// Returns the phases in execution order.
    #[must_use]
    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    /// Returns the number of phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Returns true if the plan has no phases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATIVE: TargetProfile = TargetProfile {
        cross: false,
        alternate_libc: false,
    };
    const CROSS_MUSL: TargetProfile = TargetProfile {
        cross: true,
        alternate_libc: true,
    };

    #[test]
    fn test_standard_plan_order() {
        let plan = PhasePlan::standard();
        let kinds: Vec<_> = plan.phases().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PhaseKind::ALL.to_vec());
    }

    #[test]
    fn test_standard_plan_conditions() {
        let plan = PhasePlan::standard();
        let conditions: Vec<_> = plan.phases().iter().map(|p| p.condition).collect();
        assert_eq!(conditions[1], PhaseCondition::CrossTarget);
        assert_eq!(conditions[2], PhaseCondition::AlternateLibc);
        assert!(conditions
            .iter()
            .enumerate()
            .all(|(i, c)| i == 1 || i == 2 || *c == PhaseCondition::Always));
    }

    #[test]
    fn test_condition_table() {
        assert!(PhaseCondition::Always.holds(&NATIVE));
        assert!(!PhaseCondition::CrossTarget.holds(&NATIVE));
        assert!(!PhaseCondition::AlternateLibc.holds(&NATIVE));
        assert!(PhaseCondition::CrossTarget.holds(&CROSS_MUSL));
        assert!(PhaseCondition::AlternateLibc.holds(&CROSS_MUSL));
    }

    #[test]
    fn test_build_requirements_follow_profile() {
        let build = PhaseSpec::new(PhaseKind::Build);
        assert_eq!(build.requirements(&NATIVE), vec![Precondition::ToolchainActive]);
        assert_eq!(
            build.requirements(&CROSS_MUSL),
            vec![
                Precondition::ToolchainActive,
                Precondition::TargetSupport,
                Precondition::AlternateLibcPackages,
            ]
        );
    }

    #[test]
    fn test_plan_rejects_empty() {
        assert!(PhasePlan::new(Vec::new()).is_err());
    }

    #[test]
    fn test_plan_rejects_out_of_order() {
        let err = PhasePlan::new(vec![
            PhaseSpec::new(PhaseKind::Build),
            PhaseSpec::new(PhaseKind::ProvisionToolchain),
        ])
        .unwrap_err();
        assert_eq!(err.phases, vec![PhaseKind::Build, PhaseKind::ProvisionToolchain]);
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        assert!(PhasePlan::new(vec![
            PhaseSpec::new(PhaseKind::Build),
            PhaseSpec::new(PhaseKind::Build),
        ])
        .is_err());
    }

    #[test]
    fn test_switch_from_bool() {
        assert_eq!(PipelineSwitch::from(true), PipelineSwitch::Enabled);
        assert_eq!(PipelineSwitch::from(false), PipelineSwitch::Disabled);
        assert!(!PipelineSwitch::Disabled.is_enabled());
    }
}
