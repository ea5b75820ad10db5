//! Sequential, fail-fast phase execution.

use super::commands::CommandSet;
use super::result::{PipelinePlan, PipelineResult};
use super::spec::{PhasePlan, PhaseSpec, PipelineSwitch};
use crate::config::{PipelineConfig, ToolCommands};
use crate::core::{BuildPair, Invocation, PhaseKind, PhaseOutput};
use crate::errors::PhaseFailure;
use crate::events::{EventSink, NoOpEventSink};
use crate::host::HostEnvironment;
use crate::probe::{EnvironmentProber, TargetProfile};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Runs the phase plan for one pair at a time.
///
/// Phases run strictly in order. The first phase that fails ends the run;
/// nothing is retried and later phases are never attempted.
#[derive(Debug, Clone)]
pub struct PhaseRunner {
    plan: PhasePlan,
    prober: EnvironmentProber,
    tools: ToolCommands,
    use_cross: bool,
    workdir: Option<PathBuf>,
    sink: Arc<dyn EventSink>,
}

impl PhaseRunner {
    /// Creates a runner with the standard plan, default tools and the detected host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plan: PhasePlan::standard(),
            prober: EnvironmentProber::new(),
            tools: ToolCommands::default(),
            use_cross: false,
            workdir: None,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Creates a runner from configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        let prober = config
            .host_triple
            .clone()
            .map_or_else(EnvironmentProber::new, EnvironmentProber::with_native);

        Self {
            prober,
            tools: config.tools.clone(),
            use_cross: config.use_cross,
            workdir: config.workdir.clone(),
            ..Self::new()
        }
    }

    /// Replaces the phase plan.
    #[must_use]
    pub fn with_plan(mut self, plan: PhasePlan) -> Self {
        self.plan = plan;
        self
    }

    /// Replaces the environment prober.
    #[must_use]
    pub fn with_prober(mut self, prober: EnvironmentProber) -> Self {
        self.prober = prober;
        self
    }

    /// Sets the cross-execution flag.
    #[must_use]
    pub fn with_use_cross(mut self, use_cross: bool) -> Self {
        self.use_cross = use_cross;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the prober in use.
    #[must_use]
    pub fn prober(&self) -> &EnvironmentProber {
        &self.prober
    }

    /// Computes which phases would run for `pair`, without touching a host.
    #[must_use]
    pub fn plan(&self, pair: &BuildPair, switch: PipelineSwitch) -> PipelinePlan {
        let profile = self.prober.profile(&pair.target);
        let commands = self.command_set(pair, profile);

        let phases = self
            .plan
            .phases()
            .iter()
            .map(|spec| {
                if spec.condition.holds(&profile) {
                    PhaseOutput::pending(spec.kind)
                        .with_commands(command_lines(&commands.invocations(spec.kind)))
                } else {
                    PhaseOutput::skip(spec.kind, spec.condition.skip_reason())
                }
            })
            .collect();

        PipelinePlan {
            pair: pair.clone(),
            native_triple: self.prober.native_triple().to_string(),
            disabled: !switch.is_enabled(),
            uses_cross_wrapper: commands.uses_cross_wrapper(),
            phases,
        }
    }

    /// Runs the pipeline for `pair` on `host`.
    ///
    /// A disabled pipeline runs no phase and succeeds.
    pub fn run(
        &self,
        pair: &BuildPair,
        switch: PipelineSwitch,
        host: &mut dyn HostEnvironment,
    ) -> PipelineResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        let span = info_span!(
            "pipeline",
            run_id = %run_id,
            target = %pair.target,
            toolchain = %pair.toolchain,
        );
        let _enter = span.enter();

        let mut result = PipelineResult {
            run_id,
            pair: pair.clone(),
            disabled: false,
            trace: Vec::new(),
            failure: None,
            started_at,
            duration_ms: 0.0,
        };

        if !switch.is_enabled() {
            info!("Pipeline disabled; no phases will run");
            self.sink.emit("pipeline.disabled", Some(pair_event(&result)));
            result.disabled = true;
            return result;
        }

        let profile = self.prober.profile(&pair.target);
        let commands = self.command_set(pair, profile);

        info!(
            native = %self.prober.native_triple(),
            cross = profile.cross,
            alternate_libc = profile.alternate_libc,
            cross_wrapper = commands.uses_cross_wrapper(),
            "Pipeline started"
        );
        self.sink.emit("pipeline.started", Some(pair_event(&result)));

        for spec in self.plan.phases() {
            let output = self.run_phase(spec, &profile, &commands, host);
            let failed = output.is_failure();

            if failed {
                result.failure = Some(PhaseFailure::new(
                    output.phase,
                    output.exit_code,
                    output.error.clone().unwrap_or_default(),
                ));
            }
            result.trace.push(output);

            if failed {
                break;
            }
        }

        result.duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result.failure {
            Some(ref failure) => {
                error!(
                    phase = %failure.phase,
                    kind = %failure.kind,
                    exit_code = ?failure.exit_code,
                    "Pipeline failed"
                );
                self.sink.emit(
                    "pipeline.failed",
                    Some(serde_json::json!({
                        "run_id": run_id,
                        "phase": failure.phase,
                        "kind": failure.kind,
                        "exit_code": failure.exit_code,
                        "duration_ms": result.duration_ms,
                    })),
                );
            }
            None => {
                info!(duration_ms = result.duration_ms, "Pipeline completed");
                self.sink.emit(
                    "pipeline.completed",
                    Some(serde_json::json!({
                        "run_id": run_id,
                        "duration_ms": result.duration_ms,
                    })),
                );
            }
        }

        result
    }

    fn run_phase(
        &self,
        spec: &PhaseSpec,
        profile: &TargetProfile,
        commands: &CommandSet<'_>,
        host: &mut dyn HostEnvironment,
    ) -> PhaseOutput {
        let phase = spec.kind;

        if !spec.condition.holds(profile) {
            let reason = spec.condition.skip_reason();
            info!(phase = %phase, reason, "Phase skipped");
            self.sink.emit(
                "phase.skipped",
                Some(serde_json::json!({ "phase": phase, "reason": reason })),
            );
            return PhaseOutput::skip(phase, reason);
        }

        info!(phase = %phase, "Phase started");
        self.sink
            .emit("phase.started", Some(serde_json::json!({ "phase": phase })));

        let started_at = Utc::now();
        let start = Instant::now();
        let invocations = commands.invocations(phase);

        let output = match spec
            .requirements(profile)
            .into_iter()
            .find(|p| !host.is_established(*p))
        {
            Some(missing) => {
                warn!(phase = %phase, precondition = %missing, "Precondition not established");
                PhaseOutput::fail(
                    phase,
                    None,
                    format!("precondition '{missing}' has not been established"),
                )
            }
            None => execute_invocations(phase, &invocations, host),
        };

        let output = output
            .with_commands(command_lines(&invocations))
            .with_timing(started_at, start.elapsed().as_secs_f64() * 1000.0);

        if output.is_failure() {
            error!(
                phase = %phase,
                exit_code = ?output.exit_code,
                error = output.error.as_deref().unwrap_or(""),
                "Phase failed"
            );
            self.sink.emit(
                "phase.failed",
                Some(serde_json::json!({
                    "phase": phase,
                    "exit_code": output.exit_code,
                    "error": output.error,
                    "duration_ms": output.duration_ms,
                })),
            );
        } else {
            if let Some(precondition) = phase.establishes() {
                host.establish(precondition);
            }
            info!(phase = %phase, duration_ms = output.duration_ms, "Phase completed");
            self.sink.emit(
                "phase.completed",
                Some(serde_json::json!({
                    "phase": phase,
                    "duration_ms": output.duration_ms,
                })),
            );
        }

        output
    }

    fn command_set<'a>(&'a self, pair: &'a BuildPair, profile: TargetProfile) -> CommandSet<'a> {
        CommandSet::new(
            &self.tools,
            pair,
            profile,
            self.use_cross,
            self.workdir.clone(),
        )
    }
}

impl Default for PhaseRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a pipeline described entirely by `config`.
pub fn run_pipeline(
    config: &PipelineConfig,
    host: &mut dyn HostEnvironment,
    sink: Arc<dyn EventSink>,
) -> PipelineResult {
    PhaseRunner::from_config(config)
        .with_event_sink(sink)
        .run(&config.pair, PipelineSwitch::from(config.enabled), host)
}

/// Runs invocations in order, stopping at the first that does not succeed.
fn execute_invocations(
    phase: PhaseKind,
    invocations: &[Invocation],
    host: &mut dyn HostEnvironment,
) -> PhaseOutput {
    let mut last_code = None;
    for invocation in invocations {
        debug!(phase = %phase, command = %invocation, "Running command");
        match host.run(phase, invocation) {
            Ok(status) if status.success() => last_code = status.code(),
            Ok(status) => {
                return PhaseOutput::fail(
                    phase,
                    status.code(),
                    format!("`{invocation}` failed with {status}"),
                );
            }
            Err(err) => {
                return PhaseOutput::fail(
                    phase,
                    None,
                    format!("failed to start `{invocation}`: {err}"),
                );
            }
        }
    }
    PhaseOutput::ok(phase).with_exit_code(last_code)
}

fn command_lines(invocations: &[Invocation]) -> Vec<String> {
    invocations.iter().map(Invocation::command_line).collect()
}

fn pair_event(result: &PipelineResult) -> serde_json::Value {
    serde_json::json!({
        "run_id": result.run_id,
        "target": result.pair.target,
        "toolchain": result.pair.toolchain,
    })
}
