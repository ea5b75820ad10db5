//! `cimatrix matrix <file>` - run every pair of a build matrix

use super::{log_failure, report_text, write_json, SettingsArgs};
use crate::CommandResult;
use anyhow::Context;
use cimatrix::errors::ConfigError;
use cimatrix::events::LoggingEventSink;
use cimatrix::host::ProcessHost;
use cimatrix::pipeline::{run_pipeline, PipelineResult};
use clap::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args)]
pub struct MatrixArgs {
    /// JSON file with `targets`, `toolchains` and optional `exclude`
    pub file: PathBuf,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print the results as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// A build matrix: the cross-product of targets and toolchains, minus exclusions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixFile {
    pub targets: Vec<String>,
    pub toolchains: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<MatrixCell>,
}

/// One (target, toolchain) cell of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixCell {
    pub target: String,
    pub toolchain: String,
}

impl MatrixFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::invalid_value("matrix file", &shown, e.to_string()))?;
        let matrix: Self = serde_json::from_str(&text)
            .map_err(|e| ConfigError::invalid_value("matrix file", &shown, e.to_string()))?;

        if matrix.targets.is_empty() {
            return Err(ConfigError::invalid_value("matrix file", shown, "no targets"));
        }
        if matrix.toolchains.is_empty() {
            return Err(ConfigError::invalid_value("matrix file", shown, "no toolchains"));
        }
        Ok(matrix)
    }

    /// Expands the matrix: targets outer, toolchains inner, excluded cells dropped.
    pub fn cells(&self) -> Vec<MatrixCell> {
        self.targets
            .iter()
            .flat_map(|target| {
                self.toolchains.iter().map(move |toolchain| MatrixCell {
                    target: target.clone(),
                    toolchain: toolchain.clone(),
                })
            })
            .filter(|cell| !self.exclude.contains(cell))
            .collect()
    }
}

pub fn matrix(args: &MatrixArgs) -> CommandResult {
    let matrix = MatrixFile::load(&args.file)?;
    let cells = matrix.cells();

    // Every cell is validated before any of them runs.
    let configs = cells
        .iter()
        .map(|cell| args.settings.load_for(&cell.target, &cell.toolchain))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid matrix cell")?;

    info!(pairs = configs.len(), "Running build matrix");

    let mut results: Vec<PipelineResult> = Vec::new();
    let mut exit_code = 0;
    let mut stdout = std::io::stdout().lock();

    for config in &configs {
        let mut host = ProcessHost::new();
        let result = run_pipeline(config, &mut host, Arc::new(LoggingEventSink::debug()));

        if args.json {
            log_failure(&result);
        } else {
            report_text(&result, &mut stdout)?;
        }

        exit_code = result.exit_code();
        results.push(result);
        if exit_code != 0 {
            break;
        }
    }

    if args.json {
        write_json(&results, &mut stdout)?;
    }
    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(target: &str, toolchain: &str) -> MatrixCell {
        MatrixCell {
            target: target.to_string(),
            toolchain: toolchain.to_string(),
        }
    }

    #[test]
    fn cells_expand_targets_outer() {
        let matrix = MatrixFile {
            targets: vec!["a-unknown-linux-gnu".into(), "b-unknown-linux-musl".into()],
            toolchains: vec!["stable".into(), "nightly".into()],
            exclude: vec![cell("b-unknown-linux-musl", "stable")],
        };

        assert_eq!(
            matrix.cells(),
            vec![
                cell("a-unknown-linux-gnu", "stable"),
                cell("a-unknown-linux-gnu", "nightly"),
                cell("b-unknown-linux-musl", "nightly"),
            ]
        );
    }

    #[test]
    fn matrix_file_parses_without_exclude() {
        let json = r#"{"targets": ["x86_64-unknown-linux-gnu"], "toolchains": ["stable"]}"#;
        let matrix: MatrixFile = serde_json::from_str(json).unwrap();
        assert!(matrix.exclude.is_empty());
        assert_eq!(matrix.cells().len(), 1);
    }

    #[test]
    fn matrix_file_rejects_unknown_fields() {
        let parsed: Result<MatrixFile, _> =
            serde_json::from_str(r#"{"targets": [], "toolchains": [], "include": []}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let err = MatrixFile::load(Path::new("/nonexistent/matrix.json")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
