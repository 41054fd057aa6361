//! Template bodies compiled into the binary.

use std::collections::HashMap;

use stitch_core::{
    application::{ApplicationError, ports::TemplateLibrary},
    domain::TemplateId,
    error::StitchResult,
};

macro_rules! builtin {
    ($($id:literal),* $(,)?) => {
        &[$(($id, include_str!(concat!("../../templates/", $id, ".tpl")))),*]
    };
}

/// Every built-in template as `(id, body)`.
static BUILTIN: &[(&str, &str)] = builtin![
    "html/create",
    "html/delete",
    "html/detail",
    "html/field_check",
    "html/field_input",
    "html/field_multiple",
    "html/field_relation",
    "html/field_relation_quick_add",
    "html/index",
    "html/list",
    "html/modal_form",
    "html/update",
    "mobile/data",
    "mobile/main/cubit",
    "mobile/main/mobx",
    "mobile/main/provider",
    "mobile/model",
    "mobile/pages/create",
    "mobile/pages/detail",
    "mobile/pages/index",
    "mobile/pages/list",
    "mobile/pages/update",
    "mobile/pages/widget",
    "mobile/service",
    "mobile/state/cubit",
    "mobile/state/cubit_state",
    "mobile/state/mobx",
    "mobile/state/provider",
    "mobile/switch_field",
    "mobile/text_field",
    "mobile/util",
    "server/api_routes/imports",
    "server/api_routes/register",
    "server/api_routes/table",
    "server/api_views/class",
    "server/api_views/imports",
    "server/forms/class",
    "server/forms/imports",
    "server/routes/entries",
    "server/routes/imports",
    "server/routes/table",
    "server/serializer/class",
    "server/serializer/imports",
    "server/views/crud",
    "server/views/imports",
    "server/views/index",
    "server/views/quick_add_context",
];

/// The default template set.
#[derive(Debug, Clone)]
pub struct BuiltinTemplateLibrary {
    bodies: HashMap<&'static str, &'static str>,
}

impl BuiltinTemplateLibrary {
    pub fn new() -> Self {
        Self {
            bodies: BUILTIN.iter().copied().collect(),
        }
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.bodies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, id: &str) -> Option<&'static str> {
        self.bodies.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl Default for BuiltinTemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLibrary for BuiltinTemplateLibrary {
    fn load_template(&self, id: &TemplateId) -> StitchResult<String> {
        self.get(id.as_str()).map(str::to_string).ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                id: id.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::domain::{
        ArtifactKind, ArtifactKindSet, Ecosystem, Entity, EntityArtifactPlanner, EntityRef, Field,
        GenerationContext, MODAL_MARKER, PARSER_MARKER, StateManager, THEAD_MARKER, TLINE_MARKER,
        TypeTag,
    };

    fn entity() -> Entity {
        let mut entity = Entity::new("billing", "Invoice")
            .with_field(Field::new("customer", TypeTag::ForeignKey).related(EntityRef::parse("sales.Customer").unwrap()))
            .with_field(Field::new("tags", TypeTag::ManyToMany).related(EntityRef::parse("Tag").unwrap()))
            .with_quick_add("customer");
        for tag in TypeTag::ALL {
            if tag.is_relation_to_one() || tag.is_relation_to_many() {
                continue;
            }
            entity = entity.with_field(Field::new(format!("f_{}", tag.as_str().replace('-', "_")), tag.clone()));
        }
        entity
    }

    #[test]
    fn every_planned_template_is_built_in() {
        let library = BuiltinTemplateLibrary::new();
        let mut kinds = ArtifactKindSet::all(Ecosystem::Server);
        for kind in ArtifactKind::MOBILE {
            kinds.insert(*kind);
        }

        for state in StateManager::ALL {
            let mut ctx = GenerationContext::new("/p", "server", "mobile/app").with_state_manager(*state);
            let plan = EntityArtifactPlanner::plan(&mut ctx, &entity(), &kinds);
            assert!(plan.failures.is_empty(), "{:?}", plan.failures);
            for spec in &plan.specs {
                for id in spec.fragment.template_ids() {
                    assert!(library.get(id.as_str()).is_some(), "missing template {id}");
                }
            }
        }
    }

    #[test]
    fn scaffold_pages_carry_their_markers() {
        let library = BuiltinTemplateLibrary::new();
        for page in ["html/create", "html/update"] {
            let body = library.get(page).unwrap();
            assert!(body.contains(PARSER_MARKER));
            assert!(body.contains(MODAL_MARKER));
        }
        let list = library.get("html/list").unwrap();
        assert!(list.contains(THEAD_MARKER) && list.contains(TLINE_MARKER));
    }

    #[test]
    fn registration_anchors_exist_in_main_skeletons() {
        let library = BuiltinTemplateLibrary::new();
        for id in ["mobile/main/provider", "mobile/main/cubit", "mobile/main/mobx"] {
            let body = library.get(id).unwrap();
            assert!(body.contains("import 'package:flutter/material.dart';"));
            assert!(body.contains("providers: [") || body.contains("void setupLocator() {"));
        }
    }

    #[test]
    fn unknown_id_is_not_found() {
        let err = BuiltinTemplateLibrary::new()
            .load_template(&TemplateId::new("server/nope"))
            .unwrap_err();
        assert!(err.to_string().contains("server/nope"));
    }
}
