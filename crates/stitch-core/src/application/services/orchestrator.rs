//! Scaffold Orchestrator - the generation run.
//!
//! A run moves through `Idle → Validating → Planning → Emitting → Done`.
//! Validation is the only stage that can stop it (`Aborted`): once entities
//! are resolved, every failure is scoped to one field or one artifact step,
//! recorded in the [`GenerationSummary`], and the run carries on.
//!
//! Steps are emitted strictly in planner order, one file at a time. Each merge
//! reads the target as the previous step left it.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, MetadataSource, TemplateLibrary};
use crate::application::services::inspector::{ArtifactStateInspector, FileState};
use crate::application::services::resolver::FragmentResolver;
use crate::application::services::summary::GenerationSummary;
use crate::domain::{
    AnchorMergeEngine, ArtifactKind, ArtifactKindSet, ArtifactSpec, Ecosystem, Entity,
    EntityArtifactPlanner, GenerationContext, MergeOutcome, SkipReason, WriteAction,
    is_locked_text,
};
use crate::error::StitchResult;

// ── Run state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Validating,
    Planning,
    Emitting,
    Done,
    Aborted,
}

impl RunState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Planning => "planning",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Request ──────────────────────────────────────────────────────────────────

/// What to generate: one entity, or every entity of a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub namespace: String,
    pub entity: Option<String>,
    pub kinds: ArtifactKindSet,
    /// Render and merge, report outcomes, write nothing.
    pub dry_run: bool,
}

impl GenerationRequest {
    pub fn new(namespace: impl Into<String>, kinds: ArtifactKindSet) -> Self {
        Self {
            namespace: namespace.into(),
            entity: None,
            kinds,
            dry_run: false,
        }
    }

    pub fn entity(mut self, name: impl Into<String>) -> Self {
        self.entity = Some(name.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// ── Orchestrator ─────────────────────────────────────────────────────────────

pub struct ScaffoldOrchestrator {
    metadata: Box<dyn MetadataSource>,
    templates: Box<dyn TemplateLibrary>,
    filesystem: Box<dyn Filesystem>,
}

impl ScaffoldOrchestrator {
    pub fn new(
        metadata: Box<dyn MetadataSource>,
        templates: Box<dyn TemplateLibrary>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            metadata,
            templates,
            filesystem,
        }
    }

    /// Run one generation request.
    ///
    /// Returns `Err` only when validation aborts the run. Everything after
    /// that is reported through the summary.
    #[instrument(
        skip_all,
        fields(
            namespace = %request.namespace,
            entity = request.entity.as_deref().unwrap_or("*"),
            dry_run = request.dry_run
        )
    )]
    pub fn run(
        &self,
        ctx: &mut GenerationContext,
        request: &GenerationRequest,
    ) -> StitchResult<GenerationSummary> {
        let mut summary = GenerationSummary::new(request.dry_run);
        info!(run_id = %summary.run_id, kinds = request.kinds.iter().count(), "Generation started");

        transition(&mut summary, RunState::Validating);
        let entities = match self.validate(&request.namespace, request.entity.as_deref()) {
            Ok(entities) => entities,
            Err(e) => {
                transition(&mut summary, RunState::Aborted);
                warn!(error = %e, "Generation aborted");
                return Err(e);
            }
        };
        if entities.is_empty() {
            warn!("Namespace has no entities; nothing to generate");
        }

        let mut staged: HashMap<PathBuf, String> = HashMap::new();
        for entity in &entities {
            transition(&mut summary, RunState::Planning);
            if let Err(e) = entity.validate() {
                warn!(entity = %entity.name, error = %e, "Entity skipped");
                summary.plan_failed(&entity.name, e.into());
                continue;
            }

            let plan = EntityArtifactPlanner::plan(ctx, entity, &request.kinds);
            debug!(entity = %entity.name, specs = plan.specs.len(), "Entity planned");
            for failure in plan.failures {
                warn!(entity = %entity.name, error = %failure, "Field left out");
                summary.plan_failed(&entity.name, failure.into());
            }
            for warning in plan.warnings {
                warn!(entity = %entity.name, "{warning}");
                summary.warn(warning);
            }

            transition(&mut summary, RunState::Emitting);
            for spec in &plan.specs {
                self.emit(spec, request.dry_run, &mut staged, &mut summary);
            }
            info!(entity = %entity.name, "Entity generated");
        }

        transition(&mut summary, RunState::Done);
        info!(
            created = summary.created(),
            merged = summary.merged(),
            skipped = summary.skipped_count(),
            failed = summary.failed_count(),
            "Generation finished"
        );
        Ok(summary)
    }

    /// State of every file the full pipeline would touch, without writing.
    #[instrument(skip_all, fields(namespace = %namespace))]
    pub fn status(
        &self,
        ctx: &mut GenerationContext,
        namespace: &str,
        entity: Option<&str>,
    ) -> StitchResult<Vec<(PathBuf, FileState)>> {
        let entities = self.validate(namespace, entity)?;
        let mut kinds = ArtifactKindSet::all(Ecosystem::Server);
        for kind in ArtifactKind::MOBILE {
            kinds.insert(*kind);
        }

        let inspector = ArtifactStateInspector::new(self.filesystem.as_ref());
        let mut out: Vec<(PathBuf, FileState)> = Vec::new();
        for entity in &entities {
            let plan = EntityArtifactPlanner::plan(ctx, entity, &kinds);
            for spec in plan.specs {
                if out.iter().any(|(p, _)| *p == spec.path) {
                    continue;
                }
                let state = inspector.state(&spec.path);
                out.push((spec.path, state));
            }
        }
        Ok(out)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Resolve the namespace (and entity) against the generation set.
    fn validate(&self, namespace: &str, entity: Option<&str>) -> StitchResult<Vec<Entity>> {
        let known = self.metadata.namespaces()?;
        let Some(namespace) = known.iter().find(|n| n.eq_ignore_ascii_case(namespace)) else {
            return Err(ApplicationError::Validation(format!(
                "namespace '{namespace}' is not part of the generation set (known: {})",
                known.join(", ")
            ))
            .into());
        };

        match entity {
            None => self.metadata.entities(namespace),
            Some(name) => match self.metadata.entity(namespace, name)? {
                Some(entity) => Ok(vec![entity]),
                None => Err(ApplicationError::Validation(format!(
                    "entity '{name}' not found in namespace '{namespace}'"
                ))
                .into()),
            },
        }
    }

    /// Render, inspect, merge and write one step. Never fails the run.
    fn emit(
        &self,
        spec: &ArtifactSpec,
        dry_run: bool,
        staged: &mut HashMap<PathBuf, String>,
        summary: &mut GenerationSummary,
    ) {
        let inspector = ArtifactStateInspector::new(self.filesystem.as_ref());
        let staged_text = staged.get(&spec.path);

        // A locked file is never rendered for, so a broken template cannot
        // turn a lock skip into a failure.
        let locked = match staged_text {
            Some(text) => is_locked_text(text),
            None => inspector.is_locked(&spec.path),
        };
        if locked {
            info!(path = %spec.path.display(), step = spec.step, "Skipped: file is locked");
            summary.skipped(spec, SkipReason::Locked);
            return;
        }

        let current = match staged_text {
            Some(text) => Some(text.clone()),
            None => match inspector.load(&spec.path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        path = %spec.path.display(),
                        step = spec.step,
                        error = %e,
                        "Target unreadable; step skipped"
                    );
                    summary.failed(spec, e);
                    return;
                }
            },
        };

        let fragment = match FragmentResolver::new(self.templates.as_ref()).resolve(&spec.fragment) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %spec.path.display(), step = spec.step, error = %e, "Render failed");
                summary.failed(spec, e);
                return;
            }
        };

        match AnchorMergeEngine::merge(current.as_deref(), &fragment, &spec.anchors) {
            MergeOutcome::Skip(reason) => {
                match &reason {
                    SkipReason::Unchanged => {
                        debug!(path = %spec.path.display(), step = spec.step, "Unchanged")
                    }
                    _ => info!(
                        path = %spec.path.display(),
                        step = spec.step,
                        reason = %reason,
                        "Skipped"
                    ),
                }
                summary.skipped(spec, reason);
            }
            MergeOutcome::Write { text, action } => {
                if action == WriteAction::Appended {
                    let warning = format!(
                        "{}: anchor for '{}' {} not found; fragment appended",
                        spec.path.display(),
                        spec.entity,
                        spec.step
                    );
                    warn!("{warning}");
                    summary.warn(warning);
                }

                if dry_run {
                    staged.insert(spec.path.clone(), text);
                } else if let Err(e) = self.write(&spec.path, &text) {
                    warn!(path = %spec.path.display(), error = %e, "Write failed");
                    summary.failed(spec, e);
                    return;
                }

                debug!(path = %spec.path.display(), step = spec.step, action = action.as_str(), "Written");
                summary.wrote(spec, action);
            }
        }
    }

    fn write(&self, path: &Path, text: &str) -> StitchResult<()> {
        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(path, text)
    }
}

fn transition(summary: &mut GenerationSummary, next: RunState) {
    if summary.state != next {
        debug!(from = %summary.state, to = %next, "Run state");
        summary.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockMetadataSource;
    use crate::domain::{Field, TemplateId, TypeTag};
    use crate::error::StitchError;
    use crate::application::services::summary::Outcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};

    #[derive(Clone, Default)]
    struct Disk(Arc<RwLock<HashMap<PathBuf, String>>>);

    impl Disk {
        fn get(&self, path: &str) -> Option<String> {
            self.0.read().unwrap().get(Path::new(path)).cloned()
        }
        fn put(&self, path: &str, text: &str) {
            self.0.write().unwrap().insert(PathBuf::from(path), text.to_string());
        }
    }

    impl Filesystem for Disk {
        fn read_to_string(&self, path: &Path) -> StitchResult<String> {
            self.0.read().unwrap().get(path).cloned().ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "not found".into(),
                }
                .into()
            })
        }
        fn write_file(&self, path: &Path, content: &str) -> StitchResult<()> {
            self.0
                .write()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }
        fn create_dir_all(&self, _: &Path) -> StitchResult<()> {
            Ok(())
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.read().unwrap().contains_key(path)
        }
    }

    struct Library {
        bodies: HashMap<&'static str, &'static str>,
        loads: Arc<AtomicUsize>,
    }

    impl TemplateLibrary for Library {
        fn load_template(&self, id: &TemplateId) -> StitchResult<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .get(id.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| ApplicationError::TemplateNotFound { id: id.to_string() }.into())
        }
    }

    fn library(loads: Arc<AtomicUsize>) -> Library {
        Library {
            bodies: HashMap::from([
                (
                    "server/routes/imports",
                    "from django.urls import path\nfrom .views import $ModelClass$ListView",
                ),
                ("server/routes/table", "app_name = '$app_name$'\n\nurlpatterns = [\n]"),
                (
                    "server/routes/entries",
                    "path('$model_name$/', $ModelClass$ListView.as_view(), name='$model_name$-list'),",
                ),
            ]),
            loads,
        }
    }

    fn entity(name: &str) -> Entity {
        Entity::new("billing", name)
            .with_field(Field::new("id", TypeTag::Auto))
            .with_field(Field::new("total", TypeTag::Decimal))
            .with_field(Field::new("due_date", TypeTag::Date))
            .with_field(Field::new("deleted", TypeTag::Boolean))
    }

    fn metadata() -> MockMetadataSource {
        let mut mock = MockMetadataSource::new();
        mock.expect_namespaces()
            .returning(|| Ok(vec!["billing".to_string()]));
        mock.expect_entity().returning(|_, name| {
            Ok(match name {
                "Invoice" | "Payment" => Some(entity(name)),
                _ => None,
            })
        });
        mock.expect_entities()
            .returning(|_| Ok(vec![entity("Invoice"), entity("Payment")]));
        mock
    }

    fn orchestrator(disk: &Disk, loads: Arc<AtomicUsize>) -> ScaffoldOrchestrator {
        ScaffoldOrchestrator::new(
            Box::new(metadata()),
            Box::new(library(loads)),
            Box::new(disk.clone()),
        )
    }

    fn ctx() -> GenerationContext {
        GenerationContext::new("/p", "server", "mobile/app")
    }

    fn routes(entity: &str) -> GenerationRequest {
        GenerationRequest::new("billing", ArtifactKindSet::empty().with(ArtifactKind::Routes))
            .entity(entity)
    }

    const URLS: &str = "/p/server/billing/urls.py";

    #[test]
    fn unknown_namespace_aborts() {
        let disk = Disk::default();
        let request = GenerationRequest::new("hr", ArtifactKindSet::all(Ecosystem::Server));
        let err = orchestrator(&disk, Arc::default())
            .run(&mut ctx(), &request)
            .unwrap_err();
        assert!(matches!(err, StitchError::Application(ApplicationError::Validation(_))));
        assert!(disk.0.read().unwrap().is_empty());
    }

    #[test]
    fn unknown_entity_aborts() {
        let disk = Disk::default();
        let err = orchestrator(&disk, Arc::default())
            .run(&mut ctx(), &routes("Refund"))
            .unwrap_err();
        assert!(err.to_string().contains("Refund"));
    }

    #[test]
    fn routes_then_second_entity_then_rerun() {
        let disk = Disk::default();
        let orch = orchestrator(&disk, Arc::default());

        let first = orch.run(&mut ctx(), &routes("Invoice")).unwrap();
        assert_eq!(first.state, RunState::Done);
        assert_eq!(first.created(), 1);
        assert_eq!(first.merged(), 2);
        let after_invoice = disk.get(URLS).unwrap();
        assert!(after_invoice.contains("from .views import InvoiceListView"));
        assert!(after_invoice.contains("name='invoice-list'"));

        let second = orch.run(&mut ctx(), &routes("Payment")).unwrap();
        assert!(!second.has_failures());
        let both = disk.get(URLS).unwrap();
        assert!(both.contains("from .views import InvoiceListView, PaymentListView"));
        assert!(both.contains("name='payment-list'"));
        let invoice_entry = after_invoice
            .lines()
            .find(|l| l.contains("invoice-list"))
            .unwrap();
        assert!(both.lines().any(|l| l == invoice_entry));

        let rerun = orch.run(&mut ctx(), &routes("Payment")).unwrap();
        assert_eq!(rerun.skipped_count(), 3);
        assert_eq!(disk.get(URLS).unwrap(), both);
    }

    #[test]
    fn whole_namespace_runs_every_entity() {
        let disk = Disk::default();
        let request = GenerationRequest::new("Billing", ArtifactKindSet::empty().with(ArtifactKind::Routes));
        let summary = orchestrator(&disk, Arc::default())
            .run(&mut ctx(), &request)
            .unwrap();
        assert_eq!(summary.records.len(), 6);
        let text = disk.get(URLS).unwrap();
        assert!(text.contains("invoice-list") && text.contains("payment-list"));
    }

    #[test]
    fn locked_file_is_never_rendered_or_written() {
        let disk = Disk::default();
        let locked = "#FileLocked\nurlpatterns = [\n]\n";
        disk.put(URLS, locked);
        let loads = Arc::new(AtomicUsize::new(0));

        let summary = orchestrator(&disk, loads.clone())
            .run(&mut ctx(), &routes("Invoice"))
            .unwrap();
        assert_eq!(summary.skipped_count(), 3);
        assert!(summary
            .records
            .iter()
            .all(|r| r.outcome == Outcome::Skipped(SkipReason::Locked)));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert_eq!(disk.get(URLS).unwrap(), locked);
    }

    #[test]
    fn relation_without_target_does_not_drop_the_entity() {
        let disk = Disk::default();
        let mut mock = MockMetadataSource::new();
        mock.expect_namespaces()
            .returning(|| Ok(vec!["billing".to_string()]));
        mock.expect_entity().returning(|_, name| {
            Ok(Some(
                entity(name).with_field(Field::new("customer", TypeTag::ForeignKey)),
            ))
        });
        let orch = ScaffoldOrchestrator::new(
            Box::new(mock),
            Box::new(library(Arc::default())),
            Box::new(disk.clone()),
        );

        let summary = orch.run(&mut ctx(), &routes("Invoice")).unwrap();
        assert!(!summary.has_failures());
        assert_eq!(summary.created(), 1);
        assert!(disk.get(URLS).unwrap().contains("name='invoice-list'"));
    }

    #[test]
    fn dry_run_merges_in_memory_only() {
        let disk = Disk::default();
        let summary = orchestrator(&disk, Arc::default())
            .run(&mut ctx(), &routes("Invoice").dry_run(true))
            .unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.created(), 1);
        assert_eq!(summary.merged(), 2);
        assert!(disk.get(URLS).is_none());
    }

    #[test]
    fn missing_template_fails_one_step_only() {
        let disk = Disk::default();
        let request = GenerationRequest::new(
            "billing",
            ArtifactKindSet::empty()
                .with(ArtifactKind::Forms)
                .with(ArtifactKind::Routes),
        )
        .entity("Invoice");
        let summary = orchestrator(&disk, Arc::default())
            .run(&mut ctx(), &request)
            .unwrap();

        assert_eq!(summary.state, RunState::Done);
        assert!(summary.failures().all(|r| r.kind == Some(ArtifactKind::Forms)));
        assert!(summary.has_failures());
        assert!(disk.get(URLS).unwrap().contains("invoice-list"));
    }

    #[test]
    fn status_reports_file_states() {
        let disk = Disk::default();
        disk.put(URLS, "#FileLocked\n");
        disk.put("/p/server/billing/forms.py", "from core.forms import BaseForm\n");
        let states = orchestrator(&disk, Arc::default())
            .status(&mut ctx(), "billing", Some("Invoice"))
            .unwrap();

        let state_of = |p: &str| states.iter().find(|(path, _)| path == Path::new(p)).map(|(_, s)| *s);
        assert_eq!(state_of(URLS), Some(FileState::Locked));
        assert_eq!(state_of("/p/server/billing/forms.py"), Some(FileState::Present));
        assert_eq!(
            state_of("/p/mobile/app/lib/apps/billing/invoice/model.dart"),
            Some(FileState::Absent)
        );
        let mut paths: Vec<_> = states.iter().map(|(p, _)| p).collect();
        paths.dedup();
        assert_eq!(paths.len(), states.len());
    }
}
