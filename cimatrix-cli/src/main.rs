//! cimatrix - build matrix runner CLI

mod commands;
mod logging;

use anyhow::Result;
use cimatrix::errors::{ConfigError, InvalidTargetError, InvalidToolchainError};
use clap::{Parser, Subcommand};
use commands::{matrix, plan, run};
use logging::LogFormat;
use std::process::ExitCode;

/// Exit code for configuration and usage errors.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(
    name = "cimatrix",
    version,
    about = "Provision, build, test and format-check one target/toolchain pair at a time"
)]
struct Cli {
    /// Log output format (verbosity comes from RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for one pair
    Run(run::RunArgs),
    /// Print the phases a run would execute, without running them
    Plan(plan::PlanArgs),
    /// Run every pair of a matrix file, stopping at the first failing pair
    Matrix(matrix::MatrixArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let outcome = match cli.command {
        Commands::Run(args) => run::run(&args),
        Commands::Plan(args) => plan::plan(&args),
        Commands::Matrix(args) => matrix::matrix(&args),
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(error_exit_code(&err))
        }
    }
}

fn error_exit_code(err: &anyhow::Error) -> u8 {
    let is_config = err.chain().any(|cause| {
        cause.is::<ConfigError>()
            || cause.is::<InvalidTargetError>()
            || cause.is::<InvalidToolchainError>()
    });
    if is_config {
        EXIT_CONFIG
    } else {
        1
    }
}

/// Result type for subcommands: the process exit code on completion.
pub(crate) type CommandResult = Result<u8>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_two() {
        let err = anyhow::Error::new(ConfigError::missing("TARGET"));
        assert_eq!(error_exit_code(&err), 2);

        let err = anyhow::Error::new(ConfigError::missing("TARGET")).context("loading");
        assert_eq!(error_exit_code(&err), 2);
    }

    #[test]
    fn other_errors_exit_one() {
        let err = anyhow::anyhow!("stdout closed");
        assert_eq!(error_exit_code(&err), 1);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
