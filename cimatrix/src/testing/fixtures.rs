//! Fixtures for pipeline tests.

use crate::core::{BuildPair, Target, Toolchain};
use crate::events::CollectingEventSink;
use crate::pipeline::PhaseRunner;
use crate::probe::EnvironmentProber;
use std::sync::Arc;

/// Native triple used by the fixtures.
pub const GNU_HOST: &str = "x86_64-unknown-linux-gnu";

/// Builds a pair from string literals.
///
/// # Panics
///
/// Panics if either value is malformed.
#[must_use]
pub fn pair(target: &str, toolchain: &str) -> BuildPair {
    BuildPair::new(
        Target::parse(target).unwrap_or_else(|e| panic!("fixture target: {e}")),
        Toolchain::parse(toolchain).unwrap_or_else(|e| panic!("fixture toolchain: {e}")),
    )
}

/// A runner whose host is pinned to an x86_64 glibc Linux machine.
///
/// Returns the collecting sink attached to it alongside.
#[must_use]
pub fn gnu_host_runner() -> (PhaseRunner, Arc<CollectingEventSink>) {
    let sink = Arc::new(CollectingEventSink::new());
    let prober = EnvironmentProber::with_native(
        Target::parse(GNU_HOST).unwrap_or_else(|e| panic!("fixture host: {e}")),
    );
    let runner = PhaseRunner::new()
        .with_prober(prober)
        .with_event_sink(sink.clone());
    (runner, sink)
}
