//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No generation logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use stitch_core::domain::{ArtifactKind, ArtifactKindSet, Ecosystem, StateManager};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stitch",
    bin_name = "stitch",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Entity-driven scaffolds that merge into hand-edited files",
    long_about = "Stitch generates server (forms, views, routes, API, HTML) and \
                  mobile (model, data, service, pages, state) code for the \
                  entities of a namespace, and merges it into files you have \
                  already edited. Re-running is safe: nothing is duplicated, \
                  and files carrying '#FileLocked' are never touched.",
    after_help = "EXAMPLES:\n\
        \x20 stitch init\n\
        \x20 stitch server billing\n\
        \x20 stitch server billing Invoice --forms --views --dry-run\n\
        \x20 stitch mobile billing --state-manager cubit\n\
        \x20 stitch status billing",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate server artifacts.
    #[command(
        visible_alias = "s",
        about = "Generate server artifacts for a namespace or one entity",
        after_help = "With no artifact flag every server artifact is generated.\n\n\
            EXAMPLES:\n\
            \x20 stitch server billing\n\
            \x20 stitch server billing Invoice --routes --api\n\
            \x20 stitch server billing --templates --render-html --format"
    )]
    Server(ServerArgs),

    /// Generate mobile artifacts.
    #[command(
        visible_alias = "m",
        about = "Generate mobile artifacts for a namespace or one entity",
        after_help = "EXAMPLES:\n\
            \x20 stitch mobile billing\n\
            \x20 stitch mobile billing Invoice --state-manager mobx\n\
            \x20 stitch mobile billing --only model,data,service"
    )]
    Mobile(MobileArgs),

    /// Show the state of every file a run would touch.
    #[command(
        visible_alias = "st",
        about = "Show absent / present / locked state of target files",
        after_help = "EXAMPLES:\n\
            \x20 stitch status billing\n\
            \x20 stitch status billing Invoice --output-format json"
    )]
    Status(StatusArgs),

    /// Write a starter configuration and entity manifest.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stitch init           # ./stitch.toml + ./entities.toml\n\
            \x20 stitch init --global  # user-wide config"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stitch completions bash > ~/.local/share/bash-completion/completions/stitch\n\
            \x20 stitch completions zsh  > ~/.zfunc/_stitch\n\
            \x20 stitch completions fish > ~/.config/fish/completions/stitch.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stitch config get mobile.state_manager\n\
            \x20 stitch config list\n\
            \x20 stitch config path"
    )]
    Config(ConfigCommands),
}

// ── generation target ─────────────────────────────────────────────────────────

/// Namespace, optional entity, and the shared run switches.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Namespace (server app) whose entities are generated.
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,

    /// Limit the run to one entity of the namespace.
    #[arg(value_name = "ENTITY")]
    pub entity: Option<String>,

    /// Render and merge, report outcomes, write nothing.
    #[arg(long = "dry-run", help = "Report what would change without writing")]
    pub dry_run: bool,

    /// Run the configured formatter over the written files.
    #[arg(long = "format", help = "Run the configured external formatter afterwards")]
    pub format: bool,
}

// ── server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long, help = "Forms")]
    pub forms: bool,

    #[arg(long, help = "Views")]
    pub views: bool,

    #[arg(long, help = "URL routes")]
    pub routes: bool,

    /// Serializer, API views and API routes.
    #[arg(long, help = "API layer (serializer, API views, API routes)")]
    pub api: bool,

    #[arg(long, help = "HTML page scaffolds")]
    pub templates: bool,

    #[arg(long = "render-html", help = "Field content spliced into the HTML pages")]
    pub render_html: bool,
}

impl ServerArgs {
    /// Requested kinds; every server kind when no flag is given.
    pub fn kinds(&self) -> ArtifactKindSet {
        let mut kinds = ArtifactKindSet::empty();
        let mut add = |on: bool, selected: &[ArtifactKind]| {
            if on {
                for kind in selected {
                    kinds.insert(*kind);
                }
            }
        };
        add(self.forms, &[ArtifactKind::Forms]);
        add(self.views, &[ArtifactKind::Views]);
        add(self.routes, &[ArtifactKind::Routes]);
        add(
            self.api,
            &[
                ArtifactKind::Serializer,
                ArtifactKind::ApiViews,
                ArtifactKind::ApiRoutes,
            ],
        );
        add(self.templates, &[ArtifactKind::Templates]);
        add(self.render_html, &[ArtifactKind::RenderHtml]);
        kinds.or_all(Ecosystem::Server)
    }
}

// ── mobile ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MobileArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// State management variant; defaults to `mobile.state_manager`.
    #[arg(long = "state-manager", value_enum, value_name = "KIND")]
    pub state_manager: Option<StateManagerArg>,

    /// Comma-separated subset: model, data, service, pages, state, registration.
    #[arg(long = "only", value_delimiter = ',', value_name = "KINDS")]
    pub only: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum StateManagerArg {
    Provider,
    #[value(name = "mobx")]
    MobX,
    #[value(alias = "bloc")]
    Cubit,
}

impl From<StateManagerArg> for StateManager {
    fn from(arg: StateManagerArg) -> Self {
        match arg {
            StateManagerArg::Provider => StateManager::Provider,
            StateManagerArg::MobX => StateManager::MobX,
            StateManagerArg::Cubit => StateManager::Cubit,
        }
    }
}

// ── status ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[arg(value_name = "NAMESPACE")]
    pub namespace: String,

    #[arg(value_name = "ENTITY")]
    pub entity: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the user-wide config location instead of `./stitch.toml`.
    #[arg(long = "global", help = "Create global configuration")]
    pub global: bool,

    /// Overwrite existing files.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `mobile.state_manager`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
