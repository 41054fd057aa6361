//! Web-stack source files: forms, views, serializers, routes.
//!
//! Every multi-step file follows the same shape: a header step that creates
//! the file (skipped once its framework import exists), import-list merges,
//! then the body. All steps of one entity share the body's declaration as a
//! guard, so a second run over the same entity is a no-op.

use super::{Plan, display_columns, tokens};
use crate::domain::anchor::AnchorStrategy;
use crate::domain::artifact::{ArtifactKind, ArtifactSpec};
use crate::domain::context::{GenerationContext, QuickAddRelation};
use crate::domain::entity::Entity;
use crate::domain::render::{Fragment, TokenMap};
use std::path::PathBuf;

fn file(ctx: &GenerationContext, entity: &Entity, name: &str) -> PathBuf {
    ctx.server_app_dir(&entity.namespace).join(name)
}

fn spec(
    ctx: &GenerationContext,
    entity: &Entity,
    kind: ArtifactKind,
    file_name: &str,
    step: &'static str,
    template: &str,
    own: TokenMap,
) -> ArtifactSpec {
    ArtifactSpec::new(
        kind,
        entity.name.clone(),
        file(ctx, entity, file_name),
        step,
        Fragment::template(template, tokens(ctx, entity, own)),
    )
}

fn import_line(prefix: &str, symbol: String) -> Fragment {
    Fragment::text(format!("{prefix} {symbol}"))
}

// ── Forms ────────────────────────────────────────────────────────────────────

pub(super) fn forms(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::Forms;
    let marker = format!("class {}Form(", entity.name);
    let path = file(ctx, entity, "forms.py");

    plan.push(
        spec(ctx, entity, kind, "forms.py", "header", "server/forms/imports", TokenMap::new())
            .skip_if_contains("from core.forms import BaseForm")
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::AppendToFile),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path,
            "models-import",
            import_line("from .models import", entity.name.clone()),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::join_list("from .models import")),
    );
    plan.push(
        spec(ctx, entity, kind, "forms.py", "body", "server/forms/class", TokenMap::new())
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::AppendToFile),
    );
}

// ── Views ────────────────────────────────────────────────────────────────────

/// Quick-add relations of `entity`, recorded into the run context so later
/// kinds (the HTML modals) see the same set.
pub(super) fn quick_adds(ctx: &mut GenerationContext, entity: &Entity) -> Vec<QuickAddRelation> {
    for field in &entity.fields {
        if !entity.is_quick_add(field) {
            continue;
        }
        if let Some(target) = &field.related {
            ctx.record_quick_add(
                &entity.name,
                QuickAddRelation {
                    field: field.name.clone(),
                    target: target.clone(),
                },
            );
        }
    }
    ctx.quick_adds(&entity.name).to_vec()
}

pub(super) fn views(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::Views;
    let marker = format!("class {}ListView(", entity.name);
    let path = file(ctx, entity, "views.py");
    let relations = quick_adds(ctx, entity);

    plan.push(
        spec(ctx, entity, kind, "views.py", "header", "server/views/imports", TokenMap::new())
            .skip_if_contains("from core.views import")
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::AppendToFile),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path.clone(),
            "models-import",
            import_line("from .models import", entity.name.clone()),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::join_list("from .models import")),
    );

    // Same-namespace related forms join the local import, others get their own line.
    let mut local_forms = vec![format!("{}Form", entity.name)];
    for relation in &relations {
        let symbol = format!("{}Form", relation.target.name);
        if relation.target.is_cross_namespace(&entity.namespace) {
            let ns = relation.target.namespace_or(&entity.namespace).to_lowercase();
            let prefix = format!("from {ns}.forms import");
            plan.push(
                ArtifactSpec::new(
                    kind,
                    entity.name.clone(),
                    path.clone(),
                    "cross-import",
                    import_line(&prefix, symbol),
                )
                .skip_if_contains(&marker)
                .anchor(AnchorStrategy::join_list(prefix)),
            );
        } else if !local_forms.contains(&symbol) {
            local_forms.push(symbol);
        }
    }
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path.clone(),
            "forms-import",
            import_line("from .forms import", local_forms.join(", ")),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::join_list("from .forms import")),
    );

    plan.push(
        spec(ctx, entity, kind, "views.py", "index", "server/views/index", TokenMap::new())
            .skip_if_contains(format!(
                "class {}IndexTemplateView(",
                crate::domain::naming::title(&entity.namespace)
            ))
            .anchor(AnchorStrategy::AppendToFile),
    );

    let context_lines: Vec<Fragment> = relations
        .iter()
        .map(|relation| {
            Fragment::template(
                "server/views/quick_add_context",
                TokenMap::new()
                    .with("$related_name$", relation.target.name.to_lowercase())
                    .with("$Related$", relation.target.name.clone()),
            )
        })
        .collect();
    let context_block = Fragment::indent("        ", Fragment::join(context_lines, "\n"));

    let list_fields = display_columns(entity, plan)
        .iter()
        .map(|c| format!("'{}'", c.path))
        .collect::<Vec<_>>()
        .join(", ");

    plan.push(
        spec(
            ctx,
            entity,
            kind,
            "views.py",
            "body",
            "server/views/crud",
            TokenMap::new()
                .with("$ListFields$", list_fields)
                .with("$FormsModalCreate$", context_block.clone())
                .with("$FormsModalUpdate$", context_block),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::AppendToFile),
    );
}

// ── Serializer ───────────────────────────────────────────────────────────────

pub(super) fn serializer(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::Serializer;
    let marker = format!("class {}Serializer(", entity.name);
    let path = file(ctx, entity, "serializers.py");

    plan.push(
        spec(
            ctx,
            entity,
            kind,
            "serializers.py",
            "header",
            "server/serializer/imports",
            TokenMap::new(),
        )
        .skip_if_contains("from rest_framework.serializers import ModelSerializer")
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::AppendToFile),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path,
            "models-import",
            import_line("from .models import", entity.name.clone()),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::join_list("from .models import")),
    );
    plan.push(
        spec(
            ctx,
            entity,
            kind,
            "serializers.py",
            "body",
            "server/serializer/class",
            TokenMap::new(),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::AppendToFile),
    );
}

// ── Routes ───────────────────────────────────────────────────────────────────

fn route_table_header(ctx: &GenerationContext, entity: &Entity, kind: ArtifactKind, template: &str) -> ArtifactSpec {
    spec(ctx, entity, kind, "urls.py", "table", template, TokenMap::new())
        .skip_if_contains("urlpatterns = [")
        .anchor(AnchorStrategy::AppendToFile)
}

pub(super) fn routes(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::Routes;
    let marker = format!("name='{}-list'", entity.name.to_lowercase());

    plan.push(
        spec(ctx, entity, kind, "urls.py", "imports", "server/routes/imports", TokenMap::new())
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::join_list("from .views import")),
    );
    plan.push(route_table_header(ctx, entity, kind, "server/routes/table"));
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            file(ctx, entity, "urls.py"),
            "entries",
            Fragment::indent(
                "    ",
                Fragment::template("server/routes/entries", tokens(ctx, entity, TokenMap::new())),
            ),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::insert_block("urlpatterns = [")),
    );
}

// ── API views ────────────────────────────────────────────────────────────────

pub(super) fn api_views(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::ApiViews;
    let marker = format!("class {}ViewAPI(", entity.name);
    let path = file(ctx, entity, "views.py");

    plan.push(
        spec(ctx, entity, kind, "views.py", "header", "server/api_views/imports", TokenMap::new())
            .skip_if_contains("from rest_framework.viewsets import ModelViewSet")
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::AppendToFile),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path.clone(),
            "models-import",
            import_line("from .models import", entity.name.clone()),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::join_list("from .models import")),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path,
            "serializers-import",
            import_line("from .serializers import", format!("{}Serializer", entity.name)),
        )
        .skip_if_contains(&marker)
        .anchor(AnchorStrategy::join_list("from .serializers import")),
    );
    plan.push(
        spec(ctx, entity, kind, "views.py", "body", "server/api_views/class", TokenMap::new())
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::AppendToFile),
    );
}

// ── API routes ───────────────────────────────────────────────────────────────

pub(super) fn api_routes(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::ApiRoutes;
    let marker = format!("{}ViewAPI, basename=", entity.name);
    let path = file(ctx, entity, "urls.py");
    let router = "router = routers.DefaultRouter()";

    plan.push(
        spec(ctx, entity, kind, "urls.py", "imports", "server/api_routes/imports", TokenMap::new())
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::join_list("from .views import")),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path.clone(),
            "routers-import",
            Fragment::text("from rest_framework import routers"),
        )
        .skip_if_contains("from rest_framework import routers")
        .anchor(AnchorStrategy::insert_block("from django.urls import")),
    );
    plan.push(route_table_header(ctx, entity, kind, "server/api_routes/table"));
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path.clone(),
            "router",
            Fragment::text(router),
        )
        .skip_if_contains(router)
        .anchor(AnchorStrategy::insert_block("app_name =")),
    );
    plan.push(
        spec(ctx, entity, kind, "urls.py", "register", "server/api_routes/register", TokenMap::new())
            .skip_if_contains(&marker)
            .anchor(AnchorStrategy::insert_block(router)),
    );
    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            path,
            "include",
            Fragment::text("    path('api/', include(router.urls)),"),
        )
        .skip_if_contains("include(router.urls)")
        .anchor(AnchorStrategy::insert_block("urlpatterns = [")),
    );
}

#[cfg(test)]
mod tests {
    use super::super::tests::{ctx, invoice};
    use super::*;
    use crate::domain::artifact::ArtifactKindSet;
    use crate::domain::planner::EntityArtifactPlanner;

    fn plan_for(kind: ArtifactKind) -> Plan {
        EntityArtifactPlanner::plan(&mut ctx(), &invoice(), &ArtifactKindSet::empty().with(kind))
    }

    #[test]
    fn forms_steps_share_the_class_marker() {
        let plan = plan_for(ArtifactKind::Forms);
        let steps: Vec<_> = plan.specs.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec!["header", "models-import", "body"]);
        for spec in &plan.specs {
            assert!(spec.markers().any(|m| m == "class InvoiceForm("));
        }
    }

    #[test]
    fn views_import_cross_namespace_forms() {
        let plan = plan_for(ArtifactKind::Views);
        let cross = plan
            .specs
            .iter()
            .find(|s| s.step == "cross-import")
            .expect("cross-namespace import");
        assert_eq!(cross.fragment, Fragment::text("from sales.forms import CustomerForm"));
        assert!(cross.anchors.contains(&AnchorStrategy::join_list("from sales.forms import")));
    }

    #[test]
    fn views_record_quick_add_relations() {
        let mut ctx = ctx();
        EntityArtifactPlanner::plan(
            &mut ctx,
            &invoice(),
            &ArtifactKindSet::empty().with(ArtifactKind::Views),
        );
        let recorded = ctx.quick_adds("Invoice");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].target.name, "Customer");
    }

    #[test]
    fn routes_guard_on_the_list_route_name() {
        let plan = plan_for(ArtifactKind::Routes);
        let steps: Vec<_> = plan.specs.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec!["imports", "table", "entries"]);
        assert!(plan.specs[2].markers().any(|m| m == "name='invoice-list'"));
        assert!(
            plan.specs[2]
                .anchors
                .contains(&AnchorStrategy::insert_block("urlpatterns = ["))
        );
    }

    #[test]
    fn api_routes_place_the_router_after_app_name() {
        let plan = plan_for(ArtifactKind::ApiRoutes);
        let router = plan.specs.iter().find(|s| s.step == "router").unwrap();
        assert!(router.anchors.contains(&AnchorStrategy::insert_block("app_name =")));
        let register = plan.specs.iter().find(|s| s.step == "register").unwrap();
        assert!(
            register
                .anchors
                .contains(&AnchorStrategy::insert_block("router = routers.DefaultRouter()"))
        );
    }
}
