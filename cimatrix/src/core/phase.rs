//! Phase identities and the host preconditions they establish.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    /// Install the toolchain channel and make it the default.
    ProvisionToolchain,
    /// Install cross-compilation support for a non-native target.
    InstallTargetSupport,
    /// Install the system packages needed to link against the alternate libc.
    InstallSystemPackages,
    /// Install the formatting component.
    InstallFormatChecker,
    /// Build the whole workspace for the target.
    Build,
    /// Test the whole workspace for the target.
    Test,
    /// Verify formatting without rewriting files.
    FormatCheck,
}

impl PhaseKind {
    /// Every phase, in the order the runner executes them.
    pub const ALL: [Self; 7] = [
        Self::ProvisionToolchain,
        Self::InstallTargetSupport,
        Self::InstallSystemPackages,
        Self::InstallFormatChecker,
        Self::Build,
        Self::Test,
        Self::FormatCheck,
    ];

    /// Returns the phase name used in logs, events and results.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProvisionToolchain => "provision-toolchain",
            Self::InstallTargetSupport => "install-target-support",
            Self::InstallSystemPackages => "install-system-packages",
            Self::InstallFormatChecker => "install-format-checker",
            Self::Build => "build",
            Self::Test => "test",
            Self::FormatCheck => "format-check",
        }
    }

    /// Looks a phase up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.name() == name)
    }

    /// Returns the host precondition this phase establishes on success.
    #[must_use]
    pub fn establishes(&self) -> Option<Precondition> {
        match self {
            Self::ProvisionToolchain => Some(Precondition::ToolchainActive),
            Self::InstallTargetSupport => Some(Precondition::TargetSupport),
            Self::InstallSystemPackages => Some(Precondition::AlternateLibcPackages),
            Self::InstallFormatChecker => Some(Precondition::FormatChecker),
            Self::Build | Self::Test | Self::FormatCheck => None,
        }
    }

    /// Returns true if the phase only installs software.
    #[must_use]
    pub fn is_provisioning(&self) -> bool {
        self.establishes().is_some()
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host state a provisioning phase puts in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// The requested toolchain is installed and selected.
    ToolchainActive,
    /// The standard library for the target is installed.
    TargetSupport,
    /// The alternate libc toolchain packages are installed.
    AlternateLibcPackages,
    /// The formatting component is installed.
    FormatChecker,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolchainActive => write!(f, "toolchain-active"),
            Self::TargetSupport => write!(f, "target-support"),
            Self::AlternateLibcPackages => write!(f, "alternate-libc-packages"),
            Self::FormatChecker => write!(f, "format-checker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declared_order() {
        let mut sorted = PhaseKind::ALL;
        sorted.sort();
        assert_eq!(sorted, PhaseKind::ALL);
        assert_eq!(PhaseKind::ALL[0], PhaseKind::ProvisionToolchain);
        assert_eq!(PhaseKind::ALL[6], PhaseKind::FormatCheck);
    }

    #[test]
    fn test_name_round_trip() {
        for phase in PhaseKind::ALL {
            assert_eq!(PhaseKind::from_name(phase.name()), Some(phase));
        }
        assert_eq!(PhaseKind::from_name("deploy"), None);
    }

    #[test]
    fn test_serialized_name_matches_display() {
        let json = serde_json::to_string(&PhaseKind::InstallTargetSupport).unwrap();
        assert_eq!(json, r#""install-target-support""#);
        assert_eq!(PhaseKind::FormatCheck.to_string(), "format-check");
    }

    #[test]
    fn test_only_installers_establish_preconditions() {
        assert!(PhaseKind::ProvisionToolchain.is_provisioning());
        assert!(PhaseKind::InstallFormatChecker.is_provisioning());
        assert!(!PhaseKind::Build.is_provisioning());
        assert!(!PhaseKind::FormatCheck.is_provisioning());
    }
}
