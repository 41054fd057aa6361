//! `stitch init`: write a default `stitch.toml` and a starter
//! `entities.toml`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    cli::InitArgs,
    config::{AppConfig, LOCAL_CONFIG},
    error::{CliError, CliResult},
    output::OutputManager,
};

const STARTER_MANIFEST: &str = r#"# Entities stitch generates code for.
#
# type: char, text, email, slug, url, uuid, ip-address, integer,
#       big-integer, small-integer, positive-integer, positive-small-integer,
#       decimal, float, boolean, null-boolean, date, datetime, time, duration,
#       file, file-path, image, binary, foreign-key, one-to-one, many-to-many
#       auto, big-auto, small-auto (primary keys)
# related: "Entity" (same namespace) or "namespace.Entity"

[[namespace]]
name = "billing"

[[namespace.entity]]
name = "Invoice"
display_columns = ["number", "total", "due_date"]

[[namespace.entity.field]]
name = "number"
type = "char"

[[namespace.entity.field]]
name = "total"
type = "decimal"

[[namespace.entity.field]]
name = "due_date"
type = "date"

[[namespace.entity.field]]
name = "paid"
type = "boolean"
"#;

pub fn execute(args: InitArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let config_path = if args.global {
        AppConfig::config_path()
    } else {
        PathBuf::from(LOCAL_CONFIG)
    };

    let default_config = toml::to_string_pretty(&AppConfig::default()).map_err(|e| {
        CliError::ConfigError {
            message: format!("Failed to serialise default config: {e}"),
            source: Some(Box::new(e)),
        }
    })?;

    if write_unless_present(&config_path, &default_config, args.force, &output)? {
        output.success(&format!("Configuration created at {}", config_path.display()))?;
    }

    // The manifest belongs to the project, never to the user-wide location.
    if !args.global {
        let manifest = config.entities_path();
        if write_unless_present(&manifest, STARTER_MANIFEST, args.force, &output)? {
            output.success(&format!("Entity manifest created at {}", manifest.display()))?;
        }
    }

    Ok(())
}

/// Returns whether the file was written.
fn write_unless_present(path: &Path, content: &str, force: bool, output: &OutputManager) -> CliResult<bool> {
    if path.exists() && !force {
        output.warning(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::IoError {
            message: format!("Failed to create directory '{}'", parent.display()),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| CliError::IoError {
        message: format!("Failed to write '{}'", path.display()),
        source: e,
    })?;
    info!(path = %path.display(), "File written");
    Ok(true)
}
