//! Command lines issued by each phase.

use crate::config::ToolCommands;
use crate::core::{BuildPair, Invocation, PhaseKind};
use crate::probe::TargetProfile;
use std::path::PathBuf;

/// Resolves the invocations for every phase of one pair.
#[derive(Debug, Clone)]
pub struct CommandSet<'a> {
    tools: &'a ToolCommands,
    pair: &'a BuildPair,
    profile: TargetProfile,
    use_cross: bool,
    workdir: Option<PathBuf>,
}

impl<'a> CommandSet<'a> {
    /// Creates a command set.
    #[must_use]
    pub fn new(
        tools: &'a ToolCommands,
        pair: &'a BuildPair,
        profile: TargetProfile,
        use_cross: bool,
        workdir: Option<PathBuf>,
    ) -> Self {
        Self {
            tools,
            pair,
            profile,
            use_cross,
            workdir,
        }
    }

    /// Returns the invocations `phase` runs, in order.
    #[must_use]
    pub fn invocations(&self, phase: PhaseKind) -> Vec<Invocation> {
        let target = self.pair.target.as_str();
        let toolchain = self.pair.toolchain.as_str();

        match phase {
            PhaseKind::ProvisionToolchain => vec![
                Invocation::new(&self.tools.rustup)
                    .args(["toolchain", "install", toolchain, "--profile", "minimal"]),
                Invocation::new(&self.tools.rustup).args(["default", toolchain]),
            ],
            PhaseKind::InstallTargetSupport => vec![Invocation::new(&self.tools.rustup)
                .args(["target", "add", target, "--toolchain", toolchain])],
            PhaseKind::InstallSystemPackages => {
                if self.tools.alt_libc_packages.is_empty() {
                    return Vec::new();
                }
                Invocation::from_prefix(&self.tools.package_manager)
                    .map(|inv| {
                        inv.args(self.tools.alt_libc_packages.iter().cloned())
                            .privileged()
                    })
                    .into_iter()
                    .collect()
            }
            PhaseKind::InstallFormatChecker => vec![Invocation::new(&self.tools.rustup).args([
                "component",
                "add",
                self.tools.format_component.as_str(),
                "--toolchain",
                toolchain,
            ])],
            PhaseKind::Build => vec![self.build_tool_invocation("build")],
            PhaseKind::Test => vec![self.build_tool_invocation("test")],
            PhaseKind::FormatCheck => vec![Invocation::new(&self.tools.cargo)
                .args(["fmt", "--all", "--", "--check"])
                .with_workdir(self.workdir.clone())],
        }
    }

    /// Returns true if build and test go through the cross-execution wrapper.
    #[must_use]
    pub fn uses_cross_wrapper(&self) -> bool {
        self.use_cross && self.profile.cross
    }

    fn build_tool_invocation(&self, subcommand: &str) -> Invocation {
        let program = if self.uses_cross_wrapper() {
            &self.tools.cross
        } else {
            &self.tools.cargo
        };

        Invocation::new(program)
            .args([
                subcommand,
                "--target",
                self.pair.target.as_str(),
                "--verbose",
                "--workspace",
            ])
            .with_workdir(self.workdir.clone())
    }
}
