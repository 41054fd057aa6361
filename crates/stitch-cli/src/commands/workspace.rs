//! Adapter wiring shared by `server`, `mobile` and `status`.

use std::path::PathBuf;

use tracing::{debug, instrument};

use stitch_adapters::{ExternalFormatter, LocalFilesystem, TomlMetadataSource, open_library};
use stitch_core::{
    application::{GenerationRequest, GenerationSummary, ScaffoldOrchestrator},
    domain::{ArtifactKindSet, Ecosystem, GenerationContext, StateManager},
};

use crate::{
    cli::TargetArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Orchestrator plus run context, built from the loaded configuration.
pub struct Workspace {
    pub orchestrator: ScaffoldOrchestrator,
    pub ctx: GenerationContext,
}

impl Workspace {
    #[instrument(skip_all, fields(state_manager = %state_manager))]
    pub fn open(config: &AppConfig, state_manager: StateManager) -> CliResult<Self> {
        let entities = config.entities_path();
        if !entities.is_file() {
            return Err(CliError::ConfigError {
                message: format!(
                    "entity manifest '{}' not found (run 'stitch init' or set project.entities)",
                    entities.display()
                ),
                source: None,
            });
        }

        let metadata = TomlMetadataSource::from_path(&entities)?;
        let templates = open_library(config.templates_dir().as_deref())?;

        let mut ctx = GenerationContext::new(
            config.project.root.clone(),
            &config.server.root,
            &config.mobile.root,
        )
        .with_state_manager(state_manager);
        if let Some(package) = &config.mobile.package {
            ctx = ctx.with_mobile_package(package.clone());
        }
        debug!(
            server = %ctx.server_root.display(),
            mobile = %ctx.mobile_root.display(),
            "Workspace resolved"
        );

        Ok(Self {
            orchestrator: ScaffoldOrchestrator::new(
                Box::new(metadata),
                templates,
                Box::new(LocalFilesystem::new()),
            ),
            ctx,
        })
    }

    /// Run one request and print its summary.
    pub fn generate(
        &mut self,
        ecosystem: Ecosystem,
        target: &TargetArgs,
        kinds: ArtifactKindSet,
        config: &AppConfig,
        output: &OutputManager,
    ) -> CliResult<GenerationSummary> {
        let mut request = GenerationRequest::new(target.namespace.clone(), kinds).dry_run(target.dry_run);
        if let Some(entity) = &target.entity {
            request = request.entity(entity.clone());
        }

        let summary = self.orchestrator.run(&mut self.ctx, &request)?;

        let title = match &target.entity {
            Some(entity) => format!("{ecosystem} · {}.{entity}", target.namespace),
            None => format!("{ecosystem} · {}", target.namespace),
        };
        output.summary(&title, &summary)?;

        if target.format {
            if target.dry_run {
                output.info("Dry run: formatter not started")?;
            } else {
                run_formatter(ecosystem, &summary, config, output)?;
            }
        }
        Ok(summary)
    }
}

/// Format the written files. Failures are reported and never fail the run.
fn run_formatter(
    ecosystem: Ecosystem,
    summary: &GenerationSummary,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let (command, extension) = match ecosystem {
        Ecosystem::Server => (config.format.server.as_deref(), "py"),
        Ecosystem::Mobile => (config.format.mobile.as_deref(), "dart"),
    };
    let Some(command) = command else {
        output.warning(&format!("No formatter configured for {ecosystem} (set format.{ecosystem})"))?;
        return Ok(());
    };

    let files: Vec<PathBuf> = summary.touched_paths().into_iter().cloned().collect();
    let result = ExternalFormatter::parse(command)
        .map(|f| f.only_extensions([extension]))
        .and_then(|f| f.format(&files));

    match result {
        Ok(formatted) if formatted.is_empty() => Ok(()),
        Ok(formatted) => {
            output.success(&format!("Formatted {} file(s) with '{command}'", formatted.len()))?;
            Ok(())
        }
        Err(e) => {
            output.warning(&format!("Formatter failed: {e}"))?;
            for suggestion in e.suggestions() {
                output.print(&format!("  {suggestion}"))?;
            }
            Ok(())
        }
    }
}
