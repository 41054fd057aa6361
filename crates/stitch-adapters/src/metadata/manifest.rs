//! `entities.toml` entity manifest.
//!
//! # Format
//!
//! ```toml
//! [[namespace]]
//! name  = "billing"
//!
//! [[namespace.entity]]
//! name            = "Invoice"
//! quick_add       = ["customer"]
//! display_columns = ["total", "customer__name"]
//!
//! [[namespace.entity.field]]
//! name     = "customer"
//! type     = "foreign-key"
//! related  = "sales.Customer"   # or "Customer" for the same namespace
//! nullable = false
//! label    = "Customer"
//! ```
//!
//! Unknown `type` strings load fine and become `TypeTag::Unrecognized`; the
//! type table rejects them per field at generation time.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use stitch_core::{
    application::{ApplicationError, ports::MetadataSource},
    domain::{Entity, EntityRef, Field, TypeTag},
    error::StitchResult,
};

// ── Manifest types ───────────────────────────────────────────────────────────

/// Deserialised `entities.toml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EntityManifest {
    #[serde(default, rename = "namespace")]
    pub namespaces: Vec<NamespaceEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NamespaceEntry {
    pub name: String,
    pub label: Option<String>,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntityEntry {
    pub name: String,
    pub label: Option<String>,
    #[serde(default)]
    pub quick_add: Vec<String>,
    #[serde(default)]
    pub display_columns: Vec<String>,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub related: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    pub label: Option<String>,
}

impl EntityEntry {
    fn to_entity(&self, namespace: &str) -> StitchResult<Entity> {
        let mut entity = Entity::new(namespace, self.name.clone());
        entity.label = self.label.clone();
        entity.quick_add = self.quick_add.clone();
        entity.display_columns = self.display_columns.clone();

        for entry in &self.fields {
            // FromStr for TypeTag is infallible.
            let tag: TypeTag = entry.type_tag.parse().unwrap_or_else(|e| match e {});
            let mut field = Field::new(entry.name.clone(), tag).nullable(entry.nullable);
            if let Some(related) = &entry.related {
                let target = EntityRef::parse(related).map_err(|e| ApplicationError::MetadataError {
                    reason: format!("{}.{}: {e}", self.name, entry.name),
                })?;
                field = field.related(target);
            }
            if let Some(label) = &entry.label {
                field = field.label(label.clone());
            }
            entity.fields.push(field);
        }
        Ok(entity)
    }
}

// ── Source ───────────────────────────────────────────────────────────────────

/// [`MetadataSource`] over a parsed manifest. Namespace and entity names are
/// matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct TomlMetadataSource {
    manifest: EntityManifest,
}

impl TomlMetadataSource {
    pub fn new(manifest: EntityManifest) -> Self {
        Self { manifest }
    }

    /// Parse manifest text.
    pub fn parse(raw: &str) -> StitchResult<Self> {
        let manifest: EntityManifest = toml::from_str(raw).map_err(|e| ApplicationError::MetadataError {
            reason: format!("failed to parse entity manifest: {e}"),
        })?;
        Ok(Self::new(manifest))
    }

    /// Read and parse a manifest file.
    #[instrument(fields(path = %path.as_ref().display()), skip_all)]
    pub fn from_path(path: impl AsRef<Path>) -> StitchResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ApplicationError::MetadataError {
            reason: format!("failed to read '{}': {e}", path.display()),
        })?;
        let source = Self::parse(&raw)?;
        debug!(namespaces = source.manifest.namespaces.len(), "entity manifest loaded");
        Ok(source)
    }

    pub fn manifest(&self) -> &EntityManifest {
        &self.manifest
    }

    fn namespace(&self, name: &str) -> Option<&NamespaceEntry> {
        self.manifest
            .namespaces
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
    }
}

impl MetadataSource for TomlMetadataSource {
    fn namespaces(&self) -> StitchResult<Vec<String>> {
        Ok(self.manifest.namespaces.iter().map(|n| n.name.clone()).collect())
    }

    fn entities(&self, namespace: &str) -> StitchResult<Vec<Entity>> {
        let Some(ns) = self.namespace(namespace) else {
            return Ok(Vec::new());
        };
        ns.entities.iter().map(|e| e.to_entity(&ns.name)).collect()
    }

    fn entity(&self, namespace: &str, name: &str) -> StitchResult<Option<Entity>> {
        let Some(ns) = self.namespace(namespace) else {
            return Ok(None);
        };
        ns.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.to_entity(&ns.name))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[[namespace]]
name = "billing"
label = "Billing"

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
name = "customer"
type = "foreign-key"
related = "sales.Customer"

[[namespace.entity.field]]
name = "payload"
type = "json"
nullable = true

[[namespace.entity]]
name = "Payment"

[[namespace]]
name = "sales"
"#;

    #[test]
    fn loads_namespaces_and_entities_in_order() {
        let source = TomlMetadataSource::parse(MANIFEST).unwrap();
        assert_eq!(source.namespaces().unwrap(), vec!["billing", "sales"]);

        let names: Vec<_> = source
            .entities("billing")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Invoice", "Payment"]);
        assert!(source.entities("sales").unwrap().is_empty());
    }

    #[test]
    fn entity_fields_carry_their_metadata() {
        let source = TomlMetadataSource::parse(MANIFEST).unwrap();
        let invoice = source.entity("BILLING", "invoice").unwrap().unwrap();

        assert_eq!(invoice.namespace, "billing");
        assert_eq!(invoice.quick_add, vec!["customer"]);
        assert_eq!(invoice.display_columns, vec!["total", "customer__name"]);

        let customer = invoice.field("customer").unwrap();
        assert_eq!(customer.type_tag, TypeTag::ForeignKey);
        assert_eq!(
            customer.related.as_ref().map(|r| r.to_string()),
            Some("sales.Customer".to_string())
        );
        assert_eq!(invoice.field("total").unwrap().display_label(), "Total R$");
    }

    #[test]
    fn unknown_type_survives_loading() {
        let source = TomlMetadataSource::parse(MANIFEST).unwrap();
        let invoice = source.entity("billing", "Invoice").unwrap().unwrap();
        let payload = invoice.field("payload").unwrap();
        assert_eq!(payload.type_tag, TypeTag::Unrecognized("json".into()));
        assert!(payload.nullable);
    }

    #[test]
    fn missing_entity_is_none() {
        let source = TomlMetadataSource::parse(MANIFEST).unwrap();
        assert!(source.entity("billing", "Refund").unwrap().is_none());
        assert!(source.entity("hr", "Invoice").unwrap().is_none());
    }

    #[test]
    fn malformed_manifest_is_a_metadata_error() {
        let err = TomlMetadataSource::parse("[[namespace]]\nlabel = 3\n").unwrap_err();
        assert!(matches!(
            err,
            stitch_core::error::StitchError::Application(ApplicationError::MetadataError { .. })
        ));
    }
}
