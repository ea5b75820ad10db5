//! `cimatrix run` - run the pipeline for one pair

use super::{log_failure, report_text, write_json, PairArgs};
use crate::CommandResult;
use anyhow::Context;
use cimatrix::events::LoggingEventSink;
use cimatrix::host::ProcessHost;
use cimatrix::pipeline::run_pipeline;
use clap::Args;
use std::sync::Arc;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &RunArgs) -> CommandResult {
    let config = args.pair.load().context("invalid configuration")?;
    let mut host = ProcessHost::new();

    let result = run_pipeline(&config, &mut host, Arc::new(LoggingEventSink::debug()));

    let mut stdout = std::io::stdout().lock();
    if args.json {
        log_failure(&result);
        write_json(&result, &mut stdout)?;
    } else {
        report_text(&result, &mut stdout)?;
    }
    Ok(result.exit_code())
}
