//! HTML page scaffolds and the per-field content spliced into them.

use super::server::quick_adds;
use super::{Plan, display_columns, mapped_fields, tokens};
use crate::domain::anchor::AnchorStrategy;
use crate::domain::artifact::{ArtifactKind, ArtifactSpec};
use crate::domain::context::GenerationContext;
use crate::domain::entity::Entity;
use crate::domain::field_types::QUICK_ADD_WIDGET;
use crate::domain::naming;
use crate::domain::render::{Fragment, TokenMap};
use std::path::PathBuf;

pub const PARSER_MARKER: &str = "<!--REPLACE_PARSER_HTML-->";
pub const MODAL_MARKER: &str = "<!--REPLACE_MODAL_HTML-->";
pub const THEAD_MARKER: &str = "<!--REPLACE_THEAD-->";
pub const TLINE_MARKER: &str = "<!--REPLACE_TLINE-->";

const REQUIRED_FEEDBACK: &str = "<div class=\"invalid-feedback\">Campo Requerido.</div>";

fn template_dir(ctx: &GenerationContext, entity: &Entity) -> PathBuf {
    let ns = entity.namespace.to_lowercase();
    ctx.server_app_dir(&entity.namespace).join("templates").join(ns)
}

fn page(ctx: &GenerationContext, entity: &Entity, page: &str) -> PathBuf {
    template_dir(ctx, entity).join(format!("{}_{page}.html", entity.name.to_lowercase()))
}

// ── Scaffolds ────────────────────────────────────────────────────────────────

pub(super) fn templates(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::Templates;

    plan.push(
        ArtifactSpec::new(
            kind,
            entity.name.clone(),
            template_dir(ctx, entity).join("index.html"),
            "index",
            Fragment::template("html/index", tokens(ctx, entity, TokenMap::new())),
        )
        .anchor(AnchorStrategy::CreateOnly),
    );

    for name in ["detail", "list", "create", "update", "delete"] {
        plan.push(
            ArtifactSpec::new(
                kind,
                entity.name.clone(),
                page(ctx, entity, name),
                name,
                Fragment::template(format!("html/{name}").as_str(), tokens(ctx, entity, TokenMap::new())),
            )
            .anchor(AnchorStrategy::CreateOnly),
        );
    }
}

// ── Field content ────────────────────────────────────────────────────────────

pub(super) fn render_html(ctx: &mut GenerationContext, entity: &Entity, plan: &mut Plan) {
    let kind = ArtifactKind::RenderHtml;

    let inputs: Vec<Fragment> = mapped_fields(entity, plan)
        .into_iter()
        .map(|(field, mapping)| {
            let quick_add = entity.is_quick_add(field);
            let widget = if quick_add {
                QUICK_ADD_WIDGET
            } else {
                mapping.server.widget
            };
            let related = field
                .related
                .as_ref()
                .map(|r| r.name.clone())
                .unwrap_or_default();
            let required = if field.nullable { "" } else { REQUIRED_FEEDBACK };

            Fragment::template(
                widget,
                TokenMap::new()
                    .with("$field$", field.name.clone())
                    .with("$Label$", field.display_label())
                    .with("$Required$", required)
                    .with("$Related$", related),
            )
        })
        .collect();
    let inputs = Fragment::join(inputs, "\n");

    for name in ["create", "update"] {
        plan.push(
            ArtifactSpec::new(kind, entity.name.clone(), page(ctx, entity, name), "fields", inputs.clone())
                .anchor(AnchorStrategy::replace_marker(PARSER_MARKER)),
        );
    }

    let relations = quick_adds(ctx, entity);
    if !relations.is_empty() {
        let modals: Vec<Fragment> = relations
            .iter()
            .map(|relation| {
                let target = &relation.target;
                let ns = target.namespace_or(&entity.namespace).to_lowercase();
                let lower = target.name.to_lowercase();
                Fragment::template(
                    "html/modal_form",
                    TokenMap::new()
                        .with("$Related$", target.name.clone())
                        .with("$RelatedLabel$", naming::humanize(&target.name))
                        .with("$related_name$", lower.clone())
                        .with("$related_url$", format!("{ns}:{lower}-create")),
                )
            })
            .collect();
        let modals = Fragment::join(modals, "\n");

        for name in ["create", "update"] {
            plan.push(
                ArtifactSpec::new(kind, entity.name.clone(), page(ctx, entity, name), "modals", modals.clone())
                    .anchor(AnchorStrategy::replace_marker(MODAL_MARKER)),
            );
        }
    }

    let columns = display_columns(entity, plan);
    let heads: Vec<Fragment> = columns
        .iter()
        .map(|c| {
            let label = if c.path.contains("__") {
                naming::humanize(&c.path.replace("__", "_"))
            } else {
                c.field.display_label()
            };
            Fragment::text(format!("<th>{label}</th>"))
        })
        .collect();
    let cells: Vec<Fragment> = columns
        .iter()
        .map(|c| Fragment::text(format!("<td>{}</td>", c.mapping.server.display_expr(&c.path))))
        .collect();

    let list = page(ctx, entity, "list");
    plan.push(
        ArtifactSpec::new(kind, entity.name.clone(), list.clone(), "thead", Fragment::join(heads, "\n"))
            .anchor(AnchorStrategy::replace_marker(THEAD_MARKER)),
    );
    plan.push(
        ArtifactSpec::new(kind, entity.name.clone(), list, "tline", Fragment::join(cells, "\n"))
            .anchor(AnchorStrategy::replace_marker(TLINE_MARKER)),
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
    fn scaffolds_are_create_only() {
        let plan = plan_for(ArtifactKind::Templates);
        assert_eq!(plan.specs.len(), 6);
        assert!(plan.specs[0].path.ends_with("server/billing/templates/billing/index.html"));
        assert!(plan.specs[1].path.ends_with("templates/billing/invoice_detail.html"));
        for spec in &plan.specs {
            assert!(spec.anchors.contains(&AnchorStrategy::CreateOnly));
        }
    }

    #[test]
    fn quick_add_relation_uses_the_richer_widget() {
        let plan = plan_for(ArtifactKind::RenderHtml);
        let fields = plan.specs.iter().find(|s| s.step == "fields").unwrap();
        let ids: Vec<_> = fields.fragment.template_ids().iter().map(|i| i.as_str()).collect();
        assert_eq!(
            ids,
            vec!["html/field_input", "html/field_input", QUICK_ADD_WIDGET]
        );

        let modals: Vec<_> = plan.specs.iter().filter(|s| s.step == "modals").collect();
        assert_eq!(modals.len(), 2);
    }

    #[test]
    fn list_cells_follow_display_columns() {
        let mut ctx = ctx();
        let entity = invoice()
            .with_display_column("total")
            .with_display_column("customer__name");
        let plan = EntityArtifactPlanner::plan(
            &mut ctx,
            &entity,
            &ArtifactKindSet::empty().with(ArtifactKind::RenderHtml),
        );
        let heads = plan.specs.iter().find(|s| s.step == "thead").unwrap();
        assert_eq!(
            heads.fragment,
            Fragment::join(
                vec![
                    Fragment::text("<th>Total R$</th>"),
                    Fragment::text("<th>Customer Name</th>"),
                ],
                "\n"
            )
        );
        let cells = plan.specs.iter().find(|s| s.step == "tline").unwrap();
        assert_eq!(
            cells.fragment,
            Fragment::join(
                vec![
                    Fragment::text("<td>{{ item.total|floatformat:2 }}</td>"),
                    Fragment::text("<td>{{ item.customer.name }}</td>"),
                ],
                "\n"
            )
        );
    }
}
