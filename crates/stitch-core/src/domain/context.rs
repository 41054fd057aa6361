//! Per-run generation state.

use crate::domain::entity::EntityRef;
use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ── StateManager ─────────────────────────────────────────────────────────────

/// Mobile state-management variant; picks the state templates and how the
/// state object is registered in `main.dart`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateManager {
    #[default]
    Provider,
    #[serde(rename = "mobx")]
    MobX,
    Cubit,
}

impl StateManager {
    pub const ALL: &'static [StateManager] = &[Self::Provider, Self::MobX, Self::Cubit];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::MobX => "mobx",
            Self::Cubit => "cubit",
        }
    }

    /// Suffix of the generated state class (`InvoiceProvider`).
    pub const fn class_suffix(&self) -> &'static str {
        match self {
            Self::Provider => "Provider",
            Self::MobX => "Controller",
            Self::Cubit => "Cubit",
        }
    }

    /// File the state class lives in, inside the entity directory.
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Provider => "provider.dart",
            Self::MobX => "controller.dart",
            Self::Cubit => "cubit.dart",
        }
    }
}

impl fmt::Display for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateManager {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "provider" => Ok(Self::Provider),
            "mobx" => Ok(Self::MobX),
            "cubit" | "bloc" => Ok(Self::Cubit),
            other => Err(DomainError::InvalidName {
                name: other.to_string(),
                reason: "state manager must be provider, mobx or cubit".into(),
            }),
        }
    }
}

// ── Side content ─────────────────────────────────────────────────────────────

/// A quick-add relation found while planning an entity's views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAddRelation {
    pub field: String,
    pub target: EntityRef,
}

// ── GenerationContext ────────────────────────────────────────────────────────

/// State shared by every planner call of one run.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub project_root: PathBuf,
    pub server_root: PathBuf,
    pub mobile_root: PathBuf,
    /// Dart package name used in `package:` imports.
    pub mobile_package: String,
    pub state_manager: StateManager,
    quick_adds: BTreeMap<String, Vec<QuickAddRelation>>,
}

impl GenerationContext {
    /// Context rooted at `project_root`, server and mobile roots resolved
    /// against it when relative.
    pub fn new(
        project_root: impl Into<PathBuf>,
        server_root: impl AsRef<Path>,
        mobile_root: impl AsRef<Path>,
    ) -> Self {
        let project_root = project_root.into();
        let server_root = project_root.join(server_root);
        let mobile_root = project_root.join(mobile_root);
        let mobile_package = mobile_root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app")
            .to_string();

        Self {
            project_root,
            server_root,
            mobile_root,
            mobile_package,
            state_manager: StateManager::default(),
            quick_adds: BTreeMap::new(),
        }
    }

    pub fn with_state_manager(mut self, state_manager: StateManager) -> Self {
        self.state_manager = state_manager;
        self
    }

    pub fn with_mobile_package(mut self, package: impl Into<String>) -> Self {
        self.mobile_package = package.into();
        self
    }

    /// `<server>/<ns>`
    pub fn server_app_dir(&self, namespace: &str) -> PathBuf {
        self.server_root.join(namespace.to_lowercase())
    }

    /// `<mobile>/lib/apps/<ns>/<entity>`
    pub fn mobile_entity_dir(&self, namespace: &str, entity: &str) -> PathBuf {
        self.mobile_root
            .join("lib")
            .join("apps")
            .join(namespace.to_lowercase())
            .join(entity.to_lowercase())
    }

    pub fn mobile_main(&self) -> PathBuf {
        self.mobile_root.join("lib").join("main.dart")
    }

    pub fn record_quick_add(&mut self, entity: &str, relation: QuickAddRelation) {
        let entries = self.quick_adds.entry(entity.to_string()).or_default();
        if !entries.contains(&relation) {
            entries.push(relation);
        }
    }

    /// Quick-add relations recorded for `entity` earlier in this run.
    pub fn quick_adds(&self, entity: &str) -> &[QuickAddRelation] {
        self.quick_adds
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
