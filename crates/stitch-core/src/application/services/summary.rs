//! What a run did, artifact by artifact.

use std::path::PathBuf;
use uuid::Uuid;

use crate::application::services::orchestrator::RunState;
use crate::domain::{ArtifactKind, ArtifactSpec, SkipReason, WriteAction};
use crate::error::StitchError;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Written(WriteAction),
    Skipped(SkipReason),
    Failed(StitchError),
}

/// One step of one artifact, or one field that could not be mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRecord {
    pub entity: String,
    /// `None` for failures found while planning (a field or the entity itself).
    pub kind: Option<ArtifactKind>,
    pub path: Option<PathBuf>,
    pub step: &'static str,
    pub outcome: Outcome,
}

impl ArtifactRecord {
    fn for_spec(spec: &ArtifactSpec, outcome: Outcome) -> Self {
        Self {
            entity: spec.entity.clone(),
            kind: Some(spec.kind),
            path: Some(spec.path.clone()),
            step: spec.step,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub run_id: Uuid,
    pub state: RunState,
    pub dry_run: bool,
    pub records: Vec<ArtifactRecord>,
    /// Soft problems: anchor fallbacks, unresolved display columns.
    pub warnings: Vec<String>,
}

impl GenerationSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::Idle,
            dry_run,
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn wrote(&mut self, spec: &ArtifactSpec, action: WriteAction) {
        self.records
            .push(ArtifactRecord::for_spec(spec, Outcome::Written(action)));
    }

    pub(crate) fn skipped(&mut self, spec: &ArtifactSpec, reason: SkipReason) {
        self.records
            .push(ArtifactRecord::for_spec(spec, Outcome::Skipped(reason)));
    }

    pub(crate) fn failed(&mut self, spec: &ArtifactSpec, error: StitchError) {
        self.records
            .push(ArtifactRecord::for_spec(spec, Outcome::Failed(error)));
    }

    pub(crate) fn plan_failed(&mut self, entity: &str, error: StitchError) {
        self.records.push(ArtifactRecord {
            entity: entity.to_string(),
            kind: None,
            path: None,
            step: "plan",
            outcome: Outcome::Failed(error),
        });
    }

    pub(crate) fn warn(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Written(WriteAction::Created)))
    }

    /// Spliced, appended or regenerated.
    pub fn merged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Written(a) if *a != WriteAction::Created))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Distinct files written, in first-write order.
    pub fn touched_paths(&self) -> Vec<&PathBuf> {
        let mut out: Vec<&PathBuf> = Vec::new();
        for record in &self.records {
            if let (Outcome::Written(_), Some(path)) = (&record.outcome, &record.path) {
                if !out.contains(&path) {
                    out.push(path);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, Fragment};

    fn spec(step: &'static str) -> ArtifactSpec {
        ArtifactSpec::new(
            ArtifactKind::Routes,
            "Invoice",
            "server/billing/urls.py",
            step,
            Fragment::text(""),
        )
    }

    #[test]
    fn counts_by_outcome() {
        let mut summary = GenerationSummary::new(false);
        summary.wrote(&spec("imports"), WriteAction::Created);
        summary.wrote(&spec("table"), WriteAction::Merged);
        summary.wrote(&spec("entries"), WriteAction::Appended);
        summary.skipped(&spec("entries"), SkipReason::Locked);
        summary.plan_failed(
            "Invoice",
            DomainError::UnknownFieldType {
                entity: "Invoice".into(),
                field: "payload".into(),
                tag: "json".into(),
            }
            .into(),
        );

        assert_eq!(summary.created(), 1);
        assert_eq!(summary.merged(), 2);
        assert_eq!(summary.skipped_count(), 1);
        assert_eq!(summary.failed_count(), 1);
        assert!(summary.has_failures());
        assert_eq!(summary.failures().next().map(|r| r.step), Some("plan"));
        assert_eq!(summary.touched_paths().len(), 1);
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(
            GenerationSummary::new(true).run_id,
            GenerationSummary::new(true).run_id
        );
    }
}
