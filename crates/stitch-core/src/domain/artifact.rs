//! Artifact kinds and the per-file work items the planner emits.

use crate::domain::anchor::AnchorStrategy;
use crate::domain::error::DomainError;
use crate::domain::render::Fragment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ── Ecosystem ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Web stack: forms, views, routes, API layer, HTML templates.
    Server,
    /// Mobile client: model, data, service, pages, state.
    Mobile,
}

impl Ecosystem {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ArtifactKind ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Forms,
    Views,
    Serializer,
    Routes,
    ApiViews,
    ApiRoutes,
    Templates,
    RenderHtml,
    MobileModel,
    MobileData,
    MobileService,
    MobilePages,
    MobileState,
    MobileRegistration,
}

impl ArtifactKind {
    /// Server kinds in emission order.
    pub const SERVER: &'static [ArtifactKind] = &[
        Self::Forms,
        Self::Views,
        Self::Serializer,
        Self::Routes,
        Self::ApiViews,
        Self::ApiRoutes,
        Self::Templates,
        Self::RenderHtml,
    ];

    /// Mobile kinds in emission order.
    pub const MOBILE: &'static [ArtifactKind] = &[
        Self::MobileModel,
        Self::MobileData,
        Self::MobileService,
        Self::MobilePages,
        Self::MobileState,
        Self::MobileRegistration,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forms => "forms",
            Self::Views => "views",
            Self::Serializer => "serializer",
            Self::Routes => "routes",
            Self::ApiViews => "api-views",
            Self::ApiRoutes => "api-routes",
            Self::Templates => "templates",
            Self::RenderHtml => "render-html",
            Self::MobileModel => "mobile-model",
            Self::MobileData => "mobile-data",
            Self::MobileService => "mobile-service",
            Self::MobilePages => "mobile-pages",
            Self::MobileState => "mobile-state",
            Self::MobileRegistration => "mobile-registration",
        }
    }

    pub const fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::Forms
            | Self::Views
            | Self::Serializer
            | Self::Routes
            | Self::ApiViews
            | Self::ApiRoutes
            | Self::Templates
            | Self::RenderHtml => Ecosystem::Server,
            _ => Ecosystem::Mobile,
        }
    }

    pub fn all(ecosystem: Ecosystem) -> &'static [ArtifactKind] {
        match ecosystem {
            Ecosystem::Server => Self::SERVER,
            Ecosystem::Mobile => Self::MOBILE,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let short = format!("mobile-{normalized}");
        Self::SERVER
            .iter()
            .chain(Self::MOBILE)
            .find(|k| k.as_str() == normalized || k.as_str() == short)
            .copied()
            .ok_or_else(|| DomainError::InvalidName {
                name: s.to_string(),
                reason: "not an artifact kind".into(),
            })
    }
}

// ── ArtifactKindSet ──────────────────────────────────────────────────────────

/// Requested subset of kinds, always iterated in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactKindSet(Vec<ArtifactKind>);

impl ArtifactKindSet {
    pub fn all(ecosystem: Ecosystem) -> Self {
        Self(ArtifactKind::all(ecosystem).to_vec())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ArtifactKind) {
        if !self.0.contains(&kind) {
            self.0.push(kind);
            self.0.sort();
        }
    }

    pub fn with(mut self, kind: ArtifactKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.0.iter().copied()
    }

    /// The set, or every kind of `ecosystem` when nothing was requested.
    pub fn or_all(self, ecosystem: Ecosystem) -> Self {
        if self.is_empty() {
            Self::all(ecosystem)
        } else {
            self
        }
    }
}

impl FromIterator<ArtifactKind> for ArtifactKindSet {
    fn from_iter<I: IntoIterator<Item = ArtifactKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

// ── ArtifactSpec ─────────────────────────────────────────────────────────────

/// One fragment bound for one file, with the strategies that place it.
///
/// An entity yields many of these; several may target the same file and are
/// applied in planner order, each against the result of the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub entity: String,
    pub path: PathBuf,
    /// Short name of this step within its kind (`imports`, `body`, ...).
    pub step: &'static str,
    pub fragment: Fragment,
    pub anchors: Vec<AnchorStrategy>,
}

impl ArtifactSpec {
    /// New spec guarded by the lock sentinel.
    pub fn new(
        kind: ArtifactKind,
        entity: impl Into<String>,
        path: impl Into<PathBuf>,
        step: &'static str,
        fragment: Fragment,
    ) -> Self {
        Self {
            kind,
            entity: entity.into(),
            path: path.into(),
            step,
            fragment,
            anchors: vec![AnchorStrategy::SkipIfLocked],
        }
    }

    pub fn anchor(mut self, strategy: AnchorStrategy) -> Self {
        self.anchors.push(strategy);
        self
    }

    pub fn skip_if_contains(self, marker: impl Into<String>) -> Self {
        self.anchor(AnchorStrategy::skip_if_contains(marker))
    }

    /// Text guards, in order.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().filter_map(|a| match a {
            AnchorStrategy::SkipIfContains(m) => Some(m.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_long_and_short_names() {
        assert_eq!("routes".parse::<ArtifactKind>().unwrap(), ArtifactKind::Routes);
        assert_eq!("api_views".parse::<ArtifactKind>().unwrap(), ArtifactKind::ApiViews);
        assert_eq!("model".parse::<ArtifactKind>().unwrap(), ArtifactKind::MobileModel);
        assert_eq!(
            "mobile-state".parse::<ArtifactKind>().unwrap(),
            ArtifactKind::MobileState
        );
        assert!("everything".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn set_iterates_in_emission_order() {
        let set: ArtifactKindSet = [ArtifactKind::Routes, ArtifactKind::Forms, ArtifactKind::Routes]
            .into_iter()
            .collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ArtifactKind::Forms, ArtifactKind::Routes]
        );
    }

    #[test]
    fn empty_set_means_everything() {
        let set = ArtifactKindSet::empty().or_all(Ecosystem::Mobile);
        assert_eq!(set.iter().count(), ArtifactKind::MOBILE.len());
        assert!(set.iter().all(|k| k.ecosystem() == Ecosystem::Mobile));
    }

    #[test]
    fn specs_start_lock_guarded() {
        let spec = ArtifactSpec::new(
            ArtifactKind::Forms,
            "Invoice",
            "billing/forms.py",
            "body",
            Fragment::text("class InvoiceForm"),
        )
        .skip_if_contains("class InvoiceForm")
        .anchor(AnchorStrategy::AppendToFile);

        assert_eq!(spec.anchors[0], AnchorStrategy::SkipIfLocked);
        assert_eq!(spec.markers().collect::<Vec<_>>(), vec!["class InvoiceForm"]);
    }
}
