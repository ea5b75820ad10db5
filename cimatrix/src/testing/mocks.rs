//! Test doubles for the host environment.

use std::collections::{BTreeSet, HashMap};

use crate::core::{Invocation, PhaseKind, Precondition};
use crate::host::{CommandStatus, HostEnvironment};

/// What a scripted phase does when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Every invocation exits with this status.
    Exit(i32),
    /// Every invocation is terminated without an exit status.
    Terminated,
    /// The process cannot be started.
    SpawnError,
}

/// A host that records what it was asked to run and never touches the machine.
///
/// Every invocation succeeds unless its phase has been scripted otherwise.
#[derive(Debug, Default)]
pub struct RecordingHost {
    scripted: HashMap<PhaseKind, ScriptedOutcome>,
    calls: Vec<(PhaseKind, Invocation)>,
    established: BTreeSet<Precondition>,
}

impl RecordingHost {
    /// Creates a host on which everything succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every invocation of `phase` exit with `code`.
    #[must_use]
    pub fn failing(mut self, phase: PhaseKind, code: i32) -> Self {
        self.scripted.insert(phase, ScriptedOutcome::Exit(code));
        self
    }

    /// Scripts an arbitrary outcome for `phase`.
    #[must_use]
    pub fn scripted(mut self, phase: PhaseKind, outcome: ScriptedOutcome) -> Self {
        self.scripted.insert(phase, outcome);
        self
    }

    /// Pre-establishes a precondition, as if an earlier run had provided it.
    #[must_use]
    pub fn with_established(mut self, precondition: Precondition) -> Self {
        self.established.insert(precondition);
        self
    }

    /// Returns every (phase, invocation) pair run so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(PhaseKind, Invocation)> {
        self.calls.clone()
    }

    /// Returns the distinct phases that ran commands, in first-seen order.
    #[must_use]
    pub fn phase_trace(&self) -> Vec<PhaseKind> {
        let mut trace: Vec<PhaseKind> = Vec::new();
        for (phase, _) in &self.calls {
            if trace.last() != Some(phase) {
                trace.push(*phase);
            }
        }
        trace
    }

    /// Returns the command lines run so far.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|(_, inv)| inv.command_line())
            .collect()
    }

    /// Returns the number of invocations run so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Returns the preconditions established so far.
    #[must_use]
    pub fn established(&self) -> Vec<Precondition> {
        self.established.iter().copied().collect()
    }
}

impl HostEnvironment for RecordingHost {
    fn run(&mut self, phase: PhaseKind, invocation: &Invocation) -> std::io::Result<CommandStatus> {
        self.calls.push((phase, invocation.clone()));

        match self.scripted.get(&phase) {
            None => Ok(CommandStatus::Exited(0)),
            Some(ScriptedOutcome::Exit(code)) => Ok(CommandStatus::Exited(*code)),
            Some(ScriptedOutcome::Terminated) => Ok(CommandStatus::Terminated),
            Some(ScriptedOutcome::SpawnError) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: command not found", invocation.program),
            )),
        }
    }

    fn establish(&mut self, precondition: Precondition) {
        self.established.insert(precondition);
    }

    fn is_established(&self, precondition: Precondition) -> bool {
        self.established.contains(&precondition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls() {
        let mut host = RecordingHost::new();
        host.run(PhaseKind::Build, &Invocation::new("cargo").arg("build"))
            .unwrap();
        host.run(PhaseKind::Build, &Invocation::new("cargo").arg("build"))
            .unwrap();
        host.run(PhaseKind::Test, &Invocation::new("cargo").arg("test"))
            .unwrap();

        assert_eq!(host.call_count(), 3);
        assert_eq!(host.phase_trace(), vec![PhaseKind::Build, PhaseKind::Test]);
        assert_eq!(host.command_lines()[2], "cargo test");
    }

    #[test]
    fn test_scripted_outcomes() {
        let mut host = RecordingHost::new()
            .failing(PhaseKind::Build, 101)
            .scripted(PhaseKind::Test, ScriptedOutcome::Terminated)
            .scripted(PhaseKind::FormatCheck, ScriptedOutcome::SpawnError);

        let inv = Invocation::new("cargo");
        assert_eq!(host.run(PhaseKind::Build, &inv).unwrap(), CommandStatus::Exited(101));
        assert_eq!(host.run(PhaseKind::Test, &inv).unwrap(), CommandStatus::Terminated);
        assert!(host.run(PhaseKind::FormatCheck, &inv).is_err());
        assert_eq!(
            host.run(PhaseKind::ProvisionToolchain, &inv).unwrap(),
            CommandStatus::Exited(0)
        );
    }

    #[test]
    fn test_preconditions() {
        let mut host = RecordingHost::new().with_established(Precondition::FormatChecker);
        assert!(host.is_established(Precondition::FormatChecker));
        assert!(!host.is_established(Precondition::ToolchainActive));

        host.establish(Precondition::ToolchainActive);
        assert_eq!(
            host.established(),
            vec![Precondition::ToolchainActive, Precondition::FormatChecker]
        );
    }
}
