//! `stitch server`: forms, views, routes, API layer and HTML pages.

use tracing::instrument;

use stitch_core::domain::Ecosystem;

use crate::{
    cli::ServerArgs, commands::workspace::Workspace, config::AppConfig, error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(namespace = %args.target.namespace))]
pub fn execute(args: ServerArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let mut workspace = Workspace::open(&config, config.mobile.state_manager)?;
    workspace.generate(Ecosystem::Server, &args.target, args.kinds(), &config, &output)?;
    Ok(())
}
