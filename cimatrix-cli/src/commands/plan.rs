//! `cimatrix plan` - print the phases a run would execute

use super::{write_json, PairArgs};
use crate::CommandResult;
use anyhow::Context;
use cimatrix::pipeline::{PhaseRunner, PipelineSwitch};
use clap::Args;

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub pair: PairArgs,
}

pub fn plan(args: &PlanArgs) -> CommandResult {
    let config = args.pair.load().context("invalid configuration")?;

    let plan = PhaseRunner::from_config(&config)
        .plan(&config.pair, PipelineSwitch::from(config.enabled));

    write_json(&plan, &mut std::io::stdout().lock())?;
    Ok(0)
}
