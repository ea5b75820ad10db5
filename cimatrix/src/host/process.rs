//! Host backed by real child processes.

use super::{CommandStatus, HostEnvironment};
use crate::core::{Invocation, PhaseKind, Precondition};
use std::collections::BTreeSet;
use std::process::Command;
use tracing::debug;

/// Runs invocations as child processes.
///
/// Child stdout is sent to stderr so the caller's stdout carries only its own
/// output. Stdin and stderr are inherited.
///
/// Each pipeline run is assumed to own its machine, so established
/// preconditions are tracked in memory only.
#[derive(Debug, Default)]
pub struct ProcessHost {
    established: BTreeSet<Precondition>,
}

impl ProcessHost {
    /// Creates a host with no established preconditions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the preconditions established so far.
    #[must_use]
    pub fn established(&self) -> Vec<Precondition> {
        self.established.iter().copied().collect()
    }
}

impl HostEnvironment for ProcessHost {
    fn run(&mut self, phase: PhaseKind, invocation: &Invocation) -> std::io::Result<CommandStatus> {
        debug!(
            phase = %phase,
            command = %invocation,
            privileged = invocation.privileged,
            "Spawning process"
        );

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdout(std::io::stderr());
        if let Some(ref dir) = invocation.workdir {
            command.current_dir(dir);
        }

        let status = command.status()?;
        Ok(status
            .code()
            .map_or(CommandStatus::Terminated, CommandStatus::Exited))
    }

    fn establish(&mut self, precondition: Precondition) {
        self.established.insert(precondition);
    }

    fn is_established(&self, precondition: Precondition) -> bool {
        self.established.contains(&precondition)
    }
}
