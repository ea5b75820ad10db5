//! Subcommands and the argument groups they share.

pub mod matrix;
pub mod plan;
pub mod run;

use anyhow::Result;
use cimatrix::config::{
    PipelineConfig, ENV_ENABLED, ENV_HOST_TRIPLE, ENV_TARGET, ENV_TOOLCHAIN, ENV_USE_CROSS,
    ENV_WORKDIR,
};
use cimatrix::errors::ConfigError;
use cimatrix::pipeline::PipelineResult;
use clap::Args;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::error;

/// Settings shared by every subcommand. Each flag overrides its environment variable.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Build and test through the cross wrapper for non-native targets [env: CIMATRIX_USE_CROSS]
    #[arg(long, overrides_with = "no_use_cross")]
    pub use_cross: bool,

    /// Build and test with cargo even for non-native targets
    #[arg(long, overrides_with = "use_cross")]
    pub no_use_cross: bool,

    /// Run the phases even if CIMATRIX_ENABLED=false [env: CIMATRIX_ENABLED]
    #[arg(long, overrides_with = "disabled")]
    pub enabled: bool,

    /// Skip every phase and report success
    #[arg(long, overrides_with = "enabled")]
    pub disabled: bool,

    /// Native triple to compare targets against [env: CIMATRIX_HOST_TRIPLE]
    #[arg(long)]
    pub host_triple: Option<String>,

    /// Directory build, test and format-check run in [env: CIMATRIX_WORKDIR]
    #[arg(long)]
    pub workdir: Option<PathBuf>,
}

impl SettingsArgs {
    fn overrides(&self) -> HashMap<&'static str, String> {
        let mut overrides = HashMap::new();
        if let Some(on) = switch(self.use_cross, self.no_use_cross) {
            overrides.insert(ENV_USE_CROSS, on.to_string());
        }
        if let Some(on) = switch(self.enabled, self.disabled) {
            overrides.insert(ENV_ENABLED, on.to_string());
        }
        if let Some(triple) = &self.host_triple {
            overrides.insert(ENV_HOST_TRIPLE, triple.clone());
        }
        if let Some(dir) = &self.workdir {
            overrides.insert(ENV_WORKDIR, dir.to_string_lossy().into_owned());
        }
        overrides
    }

    /// Loads configuration for an explicit pair, taking everything else from
    /// these flags and the environment.
    pub fn load_for(&self, target: &str, toolchain: &str) -> Result<PipelineConfig, ConfigError> {
        let mut overrides = self.overrides();
        overrides.insert(ENV_TARGET, target.to_string());
        overrides.insert(ENV_TOOLCHAIN, toolchain.to_string());
        load_config(&overrides)
    }
}

/// A pair given on the command line or through `TARGET` and `TOOLCHAIN_CHANNEL`.
#[derive(Args, Debug, Default, Clone)]
pub struct PairArgs {
    /// Target triple to build for [env: TARGET]
    #[arg(long)]
    pub target: Option<String>,

    /// Toolchain channel to provision [env: TOOLCHAIN_CHANNEL]
    #[arg(long)]
    pub toolchain: Option<String>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl PairArgs {
    /// Loads configuration from the flags, falling back to the environment.
    pub fn load(&self) -> Result<PipelineConfig, ConfigError> {
        let mut overrides = self.settings.overrides();
        if let Some(target) = &self.target {
            overrides.insert(ENV_TARGET, target.clone());
        }
        if let Some(toolchain) = &self.toolchain {
            overrides.insert(ENV_TOOLCHAIN, toolchain.clone());
        }
        load_config(&overrides)
    }
}

/// Collapses an on/off flag pair. clap keeps only the last of the two.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn load_config(overrides: &HashMap<&'static str, String>) -> Result<PipelineConfig, ConfigError> {
    PipelineConfig::from_lookup(|key| {
        overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    })
}

/// Logs the failing phase, if any, and prints a human-readable summary.
pub fn report_text(result: &PipelineResult, out: &mut impl Write) -> Result<()> {
    log_failure(result);

    if result.disabled {
        writeln!(out, "{}: disabled, no phases run", result.pair)?;
        return Ok(());
    }

    for output in &result.trace {
        let detail = match (&output.skip_reason, &output.error) {
            (Some(reason), _) => format!(" ({reason})"),
            (None, Some(error)) => format!(" ({error})"),
            (None, None) => String::new(),
        };
        writeln!(
            out,
            "  {:<24} {}{detail}",
            output.phase.to_string(),
            output.status
        )?;
    }

    match &result.failure {
        Some(failure) => writeln!(
            out,
            "{}: failed at {} ({})",
            result.pair, failure.phase, failure.kind
        )?,
        None => writeln!(out, "{}: ok", result.pair)?,
    }
    Ok(())
}

/// Logs the failing phase, if any.
pub fn log_failure(result: &PipelineResult) {
    if let Some(failure) = &result.failure {
        error!(
            target_triple = %result.pair.target,
            toolchain = %result.pair.toolchain,
            exit_code = ?failure.exit_code,
            "phase {} failed",
            failure.phase
        );
    }
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn write_json<T: serde::Serialize>(value: &T, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimatrix::core::{PhaseKind, PhaseOutput};
    use cimatrix::pipeline::PipelineSwitch;
    use cimatrix::testing::{gnu_host_runner, pair, RecordingHost};
    use clap::Parser;

    #[test]
    fn settings_become_overrides() {
        let settings = SettingsArgs {
            use_cross: true,
            disabled: true,
            host_triple: Some("aarch64-unknown-linux-gnu".to_string()),
            workdir: Some(PathBuf::from("/work")),
            ..SettingsArgs::default()
        };

        let overrides = settings.overrides();
        assert_eq!(overrides[ENV_USE_CROSS], "true");
        assert_eq!(overrides[ENV_ENABLED], "false");
        assert_eq!(overrides[ENV_HOST_TRIPLE], "aarch64-unknown-linux-gnu");
        assert_eq!(overrides[ENV_WORKDIR], "/work");
    }

    #[test]
    fn off_flags_override_in_both_directions() {
        let settings = SettingsArgs {
            no_use_cross: true,
            enabled: true,
            ..SettingsArgs::default()
        };

        let overrides = settings.overrides();
        assert_eq!(overrides[ENV_USE_CROSS], "false");
        assert_eq!(overrides[ENV_ENABLED], "true");
    }

    #[test]
    fn last_of_a_flag_pair_wins() {
        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            settings: SettingsArgs,
        }

        let parsed =
            Harness::try_parse_from(["cimatrix", "--use-cross", "--no-use-cross"]).unwrap();
        assert_eq!(parsed.settings.overrides()[ENV_USE_CROSS], "false");

        let parsed = Harness::try_parse_from(["cimatrix", "--enabled", "--disabled"]).unwrap();
        assert_eq!(parsed.settings.overrides()[ENV_ENABLED], "false");

        let parsed = Harness::try_parse_from(["cimatrix", "--disabled", "--enabled"]).unwrap();
        assert_eq!(parsed.settings.overrides()[ENV_ENABLED], "true");
    }

    #[test]
    fn unset_flags_leave_environment_alone() {
        assert!(SettingsArgs::default().overrides().is_empty());
    }

    #[test]
    fn text_report_names_failing_phase() {
        let (runner, _) = gnu_host_runner();
        let mut host = RecordingHost::new().failing(PhaseKind::Test, 101);
        let result = runner.run(
            &pair("x86_64-unknown-linux-gnu", "stable"),
            PipelineSwitch::Enabled,
            &mut host,
        );

        let mut out = Vec::new();
        report_text(&result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("install-target-support"));
        assert!(
            text.ends_with("x86_64-unknown-linux-gnu (stable): failed at test (test failure)\n")
        );
        assert!(!text.contains("format-check "));
    }

    #[test]
    fn text_report_for_disabled_run() {
        let (runner, _) = gnu_host_runner();
        let mut host = RecordingHost::new();
        let result = runner.run(
            &pair("x86_64-unknown-linux-musl", "nightly"),
            PipelineSwitch::Disabled,
            &mut host,
        );

        let mut out = Vec::new();
        report_text(&result, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x86_64-unknown-linux-musl (nightly): disabled, no phases run\n"
        );
    }

    #[test]
    fn json_output_ends_with_newline() {
        let mut out = Vec::new();
        write_json(&PhaseOutput::ok(PhaseKind::Build), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
    }
}
