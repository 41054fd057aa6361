//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STITCH_<SECTION>__<KEY>`, e.g.
//!    `STITCH_MOBILE__STATE_MANAGER=cubit`
//! 3. Config file: `--config`, else `./stitch.toml`, else the platform
//!    config dir
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use stitch_core::domain::StateManager;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "stitch.toml";

const ENV_PREFIX: &str = "STITCH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub project: ProjectConfig,
    pub server: ServerConfig,
    pub mobile: MobileConfig,
    pub templates: TemplateConfig,
    pub format: FormatConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root every other relative path is resolved against.
    pub root: PathBuf,
    /// Entity manifest.
    pub entities: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobileConfig {
    pub root: PathBuf,
    /// Dart package name; the mobile root's directory name when unset.
    pub package: Option<String>,
    pub state_manager: StateManager,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory whose `.tpl` files override the built-in ones.
    pub dir: Option<PathBuf>,
}

/// Formatter command per ecosystem, e.g. `black` / `dart format`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub server: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            entities: PathBuf::from("entities.toml"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("server"),
        }
    }
}

impl Default for MobileConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("mobile"),
            package: None,
            state_manager: StateManager::Provider,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then the config file, then the environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default()).context("serialising defaults")?;
        let mut builder = Config::builder().add_source(defaults);

        match config_file {
            Some(path) => {
                builder = builder.add_source(toml_file(path).required(true));
            }
            None => {
                if let Some(path) = Self::discover() {
                    builder = builder.add_source(toml_file(&path).required(false));
                }
            }
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// First config file that exists: `./stitch.toml`, then the platform one.
    pub fn discover() -> Option<PathBuf> {
        [PathBuf::from(LOCAL_CONFIG), Self::config_path()]
            .into_iter()
            .find(|p| p.is_file())
    }

    /// Path to the user-wide configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `./stitch.toml`.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stitch", "stitch")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// `path` resolved against the project root when relative.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project.root.join(path)
        }
    }

    pub fn entities_path(&self) -> PathBuf {
        self.resolve(&self.project.entities)
    }

    pub fn templates_dir(&self) -> Option<PathBuf> {
        self.templates.dir.as_deref().map(|d| self.resolve(d))
    }

    /// Dotted lookup over the serialised configuration.
    pub fn get(&self, key: &str) -> Option<toml::Value> {
        let mut value = toml::Value::try_from(self).ok()?;
        for segment in key.split('.') {
            value = value.get(segment)?.clone();
        }
        Some(value)
    }
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::new(&path.to_string_lossy(), FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_conventional_roots() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.root, PathBuf::from("server"));
        assert_eq!(cfg.mobile.state_manager, StateManager::Provider);
        assert_eq!(cfg.entities_path(), PathBuf::from("./entities.toml"));
        assert!(cfg.templates_dir().is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[mobile]\nstate_manager = \"cubit\"\npackage = \"shop\"\n\n[format]\nserver = \"black -q\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.mobile.state_manager, StateManager::Cubit);
        assert_eq!(cfg.mobile.package.as_deref(), Some("shop"));
        assert_eq!(cfg.format.server.as_deref(), Some("black -q"));
        assert_eq!(cfg.server.root, PathBuf::from("server"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn dotted_get_walks_sections() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.get("mobile.state_manager"),
            Some(toml::Value::String("provider".into()))
        );
        assert_eq!(cfg.get("output.no_color"), Some(toml::Value::Boolean(false)));
        assert!(cfg.get("mobile.nope").is_none());
    }

    #[test]
    fn absolute_paths_are_not_rebased() {
        let mut cfg = AppConfig::default();
        cfg.project.root = PathBuf::from("/work");
        assert_eq!(cfg.resolve(Path::new("/etc/x")), PathBuf::from("/etc/x"));
        assert_eq!(cfg.resolve(Path::new("server")), PathBuf::from("/work/server"));
    }
}
