//! `stitch mobile`: model, data, service, pages, state and registration.

use tracing::instrument;

use stitch_core::domain::{ArtifactKind, ArtifactKindSet, Ecosystem, StateManager};

use crate::{
    cli::MobileArgs,
    commands::workspace::Workspace,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(namespace = %args.target.namespace))]
pub fn execute(args: MobileArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let kinds = parse_only(&args.only)?;
    let state_manager = args
        .state_manager
        .map(StateManager::from)
        .unwrap_or(config.mobile.state_manager);

    let mut workspace = Workspace::open(&config, state_manager)?;
    workspace.generate(Ecosystem::Mobile, &args.target, kinds, &config, &output)?;
    Ok(())
}

/// `--only` values; `model` and `mobile-model` both name `MobileModel`.
fn parse_only(only: &[String]) -> CliResult<ArtifactKindSet> {
    let mut kinds = ArtifactKindSet::empty();
    for raw in only {
        let kind: ArtifactKind = raw.parse().map_err(|e| CliError::InvalidInput {
            message: format!("{e}"),
        })?;
        if kind.ecosystem() != Ecosystem::Mobile {
            return Err(CliError::InvalidInput {
                message: format!("'{raw}' is a server artifact; use 'stitch server'"),
            });
        }
        kinds.insert(kind);
    }
    Ok(kinds.or_all(Ecosystem::Mobile))
}
