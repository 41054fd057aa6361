//! Entity artifact planner.
//!
//! Expands one entity and a set of artifact kinds into the ordered list of
//! [`ArtifactSpec`]s the orchestrator emits. Planning is pure: it never reads
//! a target file, it only describes fragments and how to place them.
//!
//! Per-field problems are scoped to the field: an unknown type is recorded in
//! [`Plan::failures`] and that field's fragments are left out, the rest of the
//! entity still plans. Unresolved display columns become [`Plan::warnings`].

mod html;
mod mobile;
mod server;

pub use html::{MODAL_MARKER, PARSER_MARKER, THEAD_MARKER, TLINE_MARKER};

use crate::domain::artifact::{ArtifactKind, ArtifactKindSet, ArtifactSpec};
use crate::domain::context::GenerationContext;
use crate::domain::entity::{Entity, Field};
use crate::domain::error::DomainError;
use crate::domain::field_types::{self, TypeMapping};
use crate::domain::naming;
use crate::domain::render::TokenMap;

/// Ordered specs plus the soft problems found while planning.
#[derive(Debug, Default)]
pub struct Plan {
    pub specs: Vec<ArtifactSpec>,
    pub failures: Vec<DomainError>,
    pub warnings: Vec<String>,
}

impl Plan {
    pub fn extend(&mut self, other: Plan) {
        self.specs.extend(other.specs);
        self.failures.extend(other.failures);
        self.warnings.extend(other.warnings);
    }

    fn push(&mut self, spec: ArtifactSpec) {
        self.specs.push(spec);
    }
}

pub struct EntityArtifactPlanner;

impl EntityArtifactPlanner {
    /// Plan `kinds` for `entity`, in emission order.
    pub fn plan(ctx: &mut GenerationContext, entity: &Entity, kinds: &ArtifactKindSet) -> Plan {
        let mut plan = Plan::default();

        for kind in kinds.iter() {
            match kind {
                ArtifactKind::Forms => server::forms(ctx, entity, &mut plan),
                ArtifactKind::Views => server::views(ctx, entity, &mut plan),
                ArtifactKind::Serializer => server::serializer(ctx, entity, &mut plan),
                ArtifactKind::Routes => server::routes(ctx, entity, &mut plan),
                ArtifactKind::ApiViews => server::api_views(ctx, entity, &mut plan),
                ArtifactKind::ApiRoutes => server::api_routes(ctx, entity, &mut plan),
                ArtifactKind::Templates => html::templates(ctx, entity, &mut plan),
                ArtifactKind::RenderHtml => html::render_html(ctx, entity, &mut plan),
                ArtifactKind::MobileModel => mobile::model(ctx, entity, &mut plan),
                ArtifactKind::MobileData => mobile::data(ctx, entity, &mut plan),
                ArtifactKind::MobileService => mobile::service(ctx, entity, &mut plan),
                ArtifactKind::MobilePages => mobile::pages(ctx, entity, &mut plan),
                ArtifactKind::MobileState => mobile::state(ctx, entity, &mut plan),
                ArtifactKind::MobileRegistration => mobile::registration(ctx, entity, &mut plan),
            }
        }

        plan
    }
}

// ── Shared helpers ───────────────────────────────────────────────────────────

/// Tokens every entity-level template may use. Appended after a template's
/// own tokens so that they also expand inside inserted blocks.
fn entity_tokens(ctx: &GenerationContext, entity: &Entity) -> TokenMap {
    let model_lower = entity.name.to_lowercase();
    let app_lower = entity.namespace.to_lowercase();
    let state = ctx.state_manager;

    TokenMap::new()
        .with("$ModelClass$", entity.name.clone())
        .with("$ModelCamel$", naming::camel(&entity.name))
        .with("$ModelLabel$", entity.display_label())
        .with("$model_name$", model_lower.clone())
        .with("$AppTitle$", naming::title(&entity.namespace))
        .with("$app_name$", app_lower.clone())
        .with("$url_back$", format!("{app_lower}:{model_lower}-list"))
        .with("$project$", ctx.mobile_package.clone())
        .with(
            "$StateClass$",
            format!("{}{}", entity.name, state.class_suffix()),
        )
        .with("$state_file$", state.file_name())
}

/// Template-specific tokens followed by the entity tokens.
fn tokens(ctx: &GenerationContext, entity: &Entity, own: TokenMap) -> TokenMap {
    entity_tokens(ctx, entity).extend_front(own)
}

/// User fields that have a mapping. Unknown types are recorded once per
/// field and dropped.
fn mapped_fields<'e>(entity: &'e Entity, plan: &mut Plan) -> Vec<(&'e Field, &'static TypeMapping)> {
    let mut out = Vec::new();
    for field in entity.user_fields() {
        match field_types::lookup(entity, field) {
            Ok(mapping) => out.push((field, mapping)),
            Err(err) => {
                if !plan.failures.contains(&err) {
                    plan.failures.push(err);
                }
            }
        }
    }
    out
}

/// A display column resolved to the field its head segment names.
struct Column<'e> {
    path: String,
    field: &'e Field,
    mapping: &'static TypeMapping,
}

/// Declared display columns, or every listable user field when none are
/// declared. `customer__name` resolves through its head segment `customer`.
fn display_columns<'e>(entity: &'e Entity, plan: &mut Plan) -> Vec<Column<'e>> {
    if entity.display_columns.is_empty() {
        return mapped_fields(entity, plan)
            .into_iter()
            .filter(|(f, _)| !f.type_tag.is_relation_to_many())
            .map(|(field, mapping)| Column {
                path: field.name.clone(),
                field,
                mapping,
            })
            .collect();
    }

    let mut out = Vec::new();
    for column in &entity.display_columns {
        let head = column.split("__").next().unwrap_or(column.as_str());
        let Some(field) = entity.field(head) else {
            let warning = format!(
                "display column '{column}' of '{}' does not name a field; skipped",
                entity.name
            );
            if !plan.warnings.contains(&warning) {
                plan.warnings.push(warning);
            }
            continue;
        };
        match field_types::lookup(entity, field) {
            Ok(mapping) => out.push(Column {
                path: column.clone(),
                field,
                mapping,
            }),
            Err(err) => {
                if !plan.failures.contains(&err) {
                    plan.failures.push(err);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::anchor::AnchorStrategy;
    use crate::domain::artifact::Ecosystem;
    use crate::domain::entity::{EntityRef, TypeTag};

    pub(super) fn ctx() -> GenerationContext {
        GenerationContext::new("/project", "server", "mobile/shop_app")
    }

    pub(super) fn invoice() -> Entity {
        Entity::new("billing", "Invoice")
            .with_field(Field::new("id", TypeTag::Auto))
            .with_field(Field::new("total", TypeTag::Decimal).label("Total R$"))
            .with_field(Field::new("due_date", TypeTag::Date))
            .with_field(Field::new("deleted", TypeTag::Boolean))
            .with_field(
                Field::new("customer", TypeTag::ForeignKey)
                    .related(EntityRef::parse("sales.Customer").unwrap()),
            )
            .with_quick_add("customer")
    }

    fn kinds(kinds: &[ArtifactKind]) -> ArtifactKindSet {
        kinds.iter().copied().collect()
    }

    #[test]
    fn plans_follow_emission_order() {
        let plan = EntityArtifactPlanner::plan(
            &mut ctx(),
            &invoice(),
            &ArtifactKindSet::all(Ecosystem::Server),
        );
        let mut seen = Vec::new();
        for spec in &plan.specs {
            if seen.last() != Some(&spec.kind) {
                seen.push(spec.kind);
            }
        }
        assert_eq!(seen, ArtifactKind::SERVER.to_vec());
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn every_spec_is_lock_guarded() {
        let mut all = ArtifactKindSet::all(Ecosystem::Server);
        for kind in ArtifactKind::MOBILE {
            all.insert(*kind);
        }
        let plan = EntityArtifactPlanner::plan(&mut ctx(), &invoice(), &all);
        assert!(!plan.specs.is_empty());
        for spec in &plan.specs {
            assert_eq!(spec.anchors.first(), Some(&AnchorStrategy::SkipIfLocked));
        }
    }

    #[test]
    fn unknown_field_type_fails_only_that_field() {
        let entity = invoice().with_field(Field::new("payload", TypeTag::Unrecognized("json".into())));
        let mut plan = Plan::default();
        let fields = mapped_fields(&entity, &mut plan);

        let names: Vec<_> = fields.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["total", "due_date", "customer"]);
        assert_eq!(plan.failures.len(), 1);
        assert!(matches!(
            plan.failures[0],
            DomainError::UnknownFieldType { ref field, .. } if field == "payload"
        ));
    }

    #[test]
    fn relation_without_target_fails_only_that_field() {
        let entity = invoice().with_field(Field::new("salesperson", TypeTag::ForeignKey));
        let mut plan = Plan::default();
        let fields = mapped_fields(&entity, &mut plan);

        let names: Vec<_> = fields.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["total", "due_date", "customer"]);
        assert_eq!(
            plan.failures,
            vec![DomainError::MissingRelationTarget {
                entity: "Invoice".into(),
                field: "salesperson".into(),
            }]
        );
    }

    #[test]
    fn unresolved_display_column_is_a_warning() {
        let entity = invoice()
            .with_display_column("total")
            .with_display_column("customer__name")
            .with_display_column("missing");
        let mut plan = Plan::default();
        let columns = display_columns(&entity, &mut plan);

        let paths: Vec<_> = columns.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["total", "customer__name"]);
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("missing"));
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn only_requested_kinds_are_planned() {
        let plan = EntityArtifactPlanner::plan(&mut ctx(), &invoice(), &kinds(&[ArtifactKind::Routes]));
        assert!(plan.specs.iter().all(|s| s.kind == ArtifactKind::Routes));
        assert!(
            plan.specs
                .iter()
                .all(|s| s.path.ends_with("server/billing/urls.py"))
        );
    }
}
