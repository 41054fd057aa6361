//! `stitch status`: the state of each target file, without writing.

use tracing::instrument;

use crate::{
    cli::{OutputFormat, StatusArgs},
    commands::workspace::Workspace,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(namespace = %args.namespace))]
pub fn execute(args: StatusArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let mut workspace = Workspace::open(&config, config.mobile.state_manager)?;
    let states = workspace.orchestrator.status(
        &mut workspace.ctx,
        &args.namespace,
        args.entity.as_deref(),
    )?;

    if output.format() != OutputFormat::Json {
        output.header(&format!("Target files for {}", args.namespace))?;
    }
    output.file_states(&states)?;
    Ok(())
}
