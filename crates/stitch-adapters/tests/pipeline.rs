//! End-to-end generation runs over the in-memory filesystem, the built-in
//! templates and a TOML entity manifest.

use std::path::{Path, PathBuf};

use stitch_adapters::{
    BuiltinTemplateLibrary, LocalFilesystem, MemoryFilesystem, TomlMetadataSource,
};
use stitch_core::application::{
    GenerationRequest, GenerationSummary, Outcome, ScaffoldOrchestrator,
};
use stitch_core::error::StitchError;
use stitch_core::domain::{
    ArtifactKind, ArtifactKindSet, DomainError, Ecosystem, GenerationContext, SkipReason,
    StateManager,
};

const MANIFEST: &str = r#"
[[namespace]]
name = "billing"

[[namespace.entity]]
name = "Invoice"
quick_add = ["customer"]
display_columns = ["total", "customer__name"]

[[namespace.entity.field]]
name = "id"
type = "auto"

[[namespace.entity.field]]
name = "total"
type = "decimal"
label = "Total R$"

[[namespace.entity.field]]
name = "due_date"
type = "date"

[[namespace.entity.field]]
name = "paid"
type = "boolean"

[[namespace.entity.field]]
name = "customer"
type = "foreign-key"
related = "sales.Customer"

[[namespace.entity]]
name = "Payment"

[[namespace.entity.field]]
name = "amount"
type = "decimal"

[[namespace.entity.field]]
name = "invoice"
type = "foreign-key"
related = "Invoice"
"#;

fn orchestrator(fs: &MemoryFilesystem) -> ScaffoldOrchestrator {
    ScaffoldOrchestrator::new(
        Box::new(TomlMetadataSource::parse(MANIFEST).unwrap()),
        Box::new(BuiltinTemplateLibrary::new()),
        Box::new(fs.clone()),
    )
}

fn ctx() -> GenerationContext {
    GenerationContext::new("/project", "server", "mobile/shop_app")
}

fn every_kind() -> ArtifactKindSet {
    let mut kinds = ArtifactKindSet::all(Ecosystem::Server);
    for kind in ArtifactKind::MOBILE {
        kinds.insert(*kind);
    }
    kinds
}

fn run(fs: &MemoryFilesystem, request: GenerationRequest) -> GenerationSummary {
    orchestrator(fs).run(&mut ctx(), &request).unwrap()
}

fn urls() -> PathBuf {
    PathBuf::from("/project/server/billing/urls.py")
}

fn read(fs: &MemoryFilesystem, path: impl AsRef<Path>) -> String {
    fs.read_file(path.as_ref()).unwrap()
}

#[test]
fn rerunning_the_full_pipeline_changes_nothing() {
    let fs = MemoryFilesystem::new();
    let first = run(&fs, GenerationRequest::new("billing", every_kind()));
    assert!(first.created() > 0);
    assert!(!first.has_failures(), "{:?}", first.failures().collect::<Vec<_>>());
    let before = fs.snapshot();

    let second = run(&fs, GenerationRequest::new("billing", every_kind()));
    assert_eq!(second.created(), 0);
    assert_eq!(second.merged(), 0);
    assert_eq!(fs.snapshot(), before);
}

#[test]
fn routes_for_two_entities_share_one_table() {
    let fs = MemoryFilesystem::new();
    let routes = ArtifactKindSet::empty().with(ArtifactKind::Routes);

    run(&fs, GenerationRequest::new("billing", routes.clone()).entity("Invoice"));
    run(&fs, GenerationRequest::new("billing", routes).entity("Payment"));

    let text = read(&fs, urls());
    assert_eq!(text.matches("urlpatterns = [").count(), 1);
    assert_eq!(text.matches("from .views import").count(), 1);
    assert!(text.contains("name='invoice-list'"));
    assert!(text.contains("name='payment-list'"));

    let imports = text
        .lines()
        .find(|l| l.starts_with("from .views import"))
        .unwrap();
    assert_eq!(imports.matches("InvoiceListView").count(), 1);
    assert_eq!(imports.matches("PaymentListView").count(), 1);
    assert_eq!(imports.matches("BillingIndexTemplateView").count(), 1);
}

#[test]
fn model_imports_join_as_a_set() {
    let fs = MemoryFilesystem::new();
    let forms = ArtifactKindSet::empty().with(ArtifactKind::Forms);

    run(&fs, GenerationRequest::new("billing", forms.clone()));
    run(&fs, GenerationRequest::new("billing", forms));

    let text = read(&fs, "/project/server/billing/forms.py");
    let imports: Vec<_> = text
        .lines()
        .filter(|l| l.starts_with("from .models import"))
        .collect();
    assert_eq!(imports, vec!["from .models import Invoice, Payment"]);
    assert_eq!(text.matches("class InvoiceForm(").count(), 1);
    assert_eq!(text.matches("class PaymentForm(").count(), 1);
}

#[test]
fn locked_files_are_never_touched() {
    let locked = "#FileLocked\nfrom django.views import View\n\n# hand written\n";
    let views = "/project/server/billing/views.py";
    let fs = MemoryFilesystem::new().with_file(views, locked).unwrap();

    let summary = run(
        &fs,
        GenerationRequest::new("billing", ArtifactKindSet::all(Ecosystem::Server)),
    );

    assert_eq!(read(&fs, views), locked);
    let on_views: Vec<_> = summary
        .records
        .iter()
        .filter(|r| r.path.as_deref() == Some(Path::new(views)))
        .collect();
    assert!(!on_views.is_empty());
    for record in on_views {
        assert_eq!(record.outcome, Outcome::Skipped(SkipReason::Locked));
    }
    assert!(fs.read_file(Path::new("/project/server/billing/forms.py")).is_some());
}

#[test]
fn missing_anchor_appends_and_warns() {
    let hand_written = "from django.urls import path\n\n# custom routes\n";
    let fs = MemoryFilesystem::new().with_file(urls(), hand_written).unwrap();

    let summary = run(
        &fs,
        GenerationRequest::new("billing", ArtifactKindSet::empty().with(ArtifactKind::Routes))
            .entity("Invoice"),
    );

    let text = read(&fs, urls());
    assert!(text.starts_with(hand_written.trim_end()));
    assert!(text.contains("name='invoice-list'"));
    assert!(summary.warnings.iter().any(|w| w.contains("appended")));
    assert!(!summary.has_failures());
}

#[test]
fn dry_run_reports_without_writing() {
    let fs = MemoryFilesystem::new();
    let summary = run(
        &fs,
        GenerationRequest::new("billing", ArtifactKindSet::all(Ecosystem::Server)).dry_run(true),
    );

    assert!(summary.dry_run);
    assert!(summary.created() > 0);
    assert!(fs.list_files().is_empty());
}

#[test]
fn cubit_state_manager_emits_its_state_file() {
    let fs = MemoryFilesystem::new();
    let mut ctx = ctx().with_state_manager(StateManager::Cubit);
    let request = GenerationRequest::new(
        "billing",
        ArtifactKindSet::empty().with(ArtifactKind::MobileState),
    )
    .entity("Invoice");
    orchestrator(&fs).run(&mut ctx, &request).unwrap();

    let dir = Path::new("/project/mobile/shop_app/lib/apps/billing/invoice");
    assert!(fs.read_file(&dir.join("cubit.dart")).is_some());
    assert!(fs.read_file(&dir.join("state.dart")).is_some());
}

#[test]
fn unreadable_locked_file_is_left_alone() {
    let dir = tempfile::TempDir::new().unwrap();
    let forms = dir.path().join("server/billing/forms.py");
    std::fs::create_dir_all(forms.parent().unwrap()).unwrap();
    // Latin-1 text, not valid UTF-8.
    let original: &[u8] = b"#FileLocked\n# Autor: Jos\xe9\nclass Custom: pass\n";
    std::fs::write(&forms, original).unwrap();

    let orchestrator = ScaffoldOrchestrator::new(
        Box::new(TomlMetadataSource::parse(MANIFEST).unwrap()),
        Box::new(BuiltinTemplateLibrary::new()),
        Box::new(LocalFilesystem::new()),
    );
    let mut ctx = GenerationContext::new(dir.path(), "server", "mobile/shop_app");
    let request = GenerationRequest::new("billing", ArtifactKindSet::empty().with(ArtifactKind::Forms))
        .entity("Invoice");
    let summary = orchestrator.run(&mut ctx, &request).unwrap();

    assert_eq!(std::fs::read(&forms).unwrap(), original);
    assert_eq!(summary.created() + summary.merged(), 0);
    let steps: Vec<_> = summary
        .records
        .iter()
        .filter(|r| r.path.as_deref() == Some(forms.as_path()))
        .collect();
    assert!(!steps.is_empty());
    assert!(steps.iter().all(|r| matches!(r.outcome, Outcome::Failed(StitchError::Application(_)))));
}

#[test]
fn relation_without_target_still_generates_the_entity() {
    let manifest = r#"
[[namespace]]
name = "billing"

[[namespace.entity]]
name = "Invoice"

[[namespace.entity.field]]
name = "total"
type = "decimal"

[[namespace.entity.field]]
name = "customer"
type = "foreign-key"
"#;
    let fs = MemoryFilesystem::new();
    let orchestrator = ScaffoldOrchestrator::new(
        Box::new(TomlMetadataSource::parse(manifest).unwrap()),
        Box::new(BuiltinTemplateLibrary::new()),
        Box::new(fs.clone()),
    );
    let request = GenerationRequest::new(
        "billing",
        ArtifactKindSet::empty()
            .with(ArtifactKind::Views)
            .with(ArtifactKind::Routes),
    );
    let summary = orchestrator.run(&mut ctx(), &request).unwrap();

    assert!(read(&fs, urls()).contains("name='invoice-list'"));
    assert!(read(&fs, "/project/server/billing/views.py").contains("class InvoiceListView("));
    let failures: Vec<_> = summary.failures().collect();
    assert_eq!(failures.len(), 1, "{failures:?}");
    assert_eq!(failures[0].kind, None);
    assert!(matches!(
        &failures[0].outcome,
        Outcome::Failed(StitchError::Domain(DomainError::MissingRelationTarget { field, .. }))
            if field == "customer"
    ));
}
