//! Entity metadata: the read-only input of every generation run.
//!
//! # Design
//!
//! `TypeTag` is a closed enumeration produced once by the metadata source.
//! The core never inspects framework objects, only these values. A tag the
//! source does not recognise survives as `TypeTag::Unrecognized` so that the
//! field type table, not the loader, rejects that single field.

use crate::domain::error::DomainError;
use crate::domain::naming;
use std::fmt;
use std::str::FromStr;

// ── Base lifecycle fields ────────────────────────────────────────────────────

/// Implementation-owned fields every entity inherits from the base model.
///
/// They never appear in list columns, form inputs or mobile model fields.
pub const BASE_FIELDS: &[&str] = &[
    "id",
    "enabled",
    "deleted",
    "created_on",
    "createdOn",
    "updated_on",
    "updatedOn",
];

/// Whether `field` is a base lifecycle field of `entity`.
///
/// Besides [`BASE_FIELDS`], the mobile primary key alias `id<entity>` counts.
pub fn is_base_field(entity: &str, field: &str) -> bool {
    BASE_FIELDS.contains(&field) || field.eq_ignore_ascii_case(&format!("id{entity}"))
}

// ── TypeTag ──────────────────────────────────────────────────────────────────

/// Source type of an entity field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Auto,
    BigAuto,
    SmallAuto,
    Integer,
    BigInteger,
    SmallInteger,
    PositiveInteger,
    PositiveSmallInteger,
    Boolean,
    NullBoolean,
    Char,
    Text,
    Email,
    Slug,
    Url,
    Uuid,
    IpAddress,
    File,
    FilePath,
    Image,
    Date,
    Datetime,
    Time,
    Duration,
    Decimal,
    Float,
    Binary,
    ForeignKey,
    OneToOne,
    ManyToMany,
    /// A tag outside the supported domain, kept verbatim.
    Unrecognized(String),
}

impl TypeTag {
    /// Every supported tag, in declaration order.
    pub const ALL: &'static [TypeTag] = &[
        Self::Auto,
        Self::BigAuto,
        Self::SmallAuto,
        Self::Integer,
        Self::BigInteger,
        Self::SmallInteger,
        Self::PositiveInteger,
        Self::PositiveSmallInteger,
        Self::Boolean,
        Self::NullBoolean,
        Self::Char,
        Self::Text,
        Self::Email,
        Self::Slug,
        Self::Url,
        Self::Uuid,
        Self::IpAddress,
        Self::File,
        Self::FilePath,
        Self::Image,
        Self::Date,
        Self::Datetime,
        Self::Time,
        Self::Duration,
        Self::Decimal,
        Self::Float,
        Self::Binary,
        Self::ForeignKey,
        Self::OneToOne,
        Self::ManyToMany,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::BigAuto => "big-auto",
            Self::SmallAuto => "small-auto",
            Self::Integer => "integer",
            Self::BigInteger => "big-integer",
            Self::SmallInteger => "small-integer",
            Self::PositiveInteger => "positive-integer",
            Self::PositiveSmallInteger => "positive-small-integer",
            Self::Boolean => "boolean",
            Self::NullBoolean => "null-boolean",
            Self::Char => "char",
            Self::Text => "text",
            Self::Email => "email",
            Self::Slug => "slug",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::IpAddress => "ip-address",
            Self::File => "file",
            Self::FilePath => "file-path",
            Self::Image => "image",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Time => "time",
            Self::Duration => "duration",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Binary => "binary",
            Self::ForeignKey => "foreign-key",
            Self::OneToOne => "one-to-one",
            Self::ManyToMany => "many-to-many",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub const fn is_relation_to_one(&self) -> bool {
        matches!(self, Self::ForeignKey | Self::OneToOne)
    }

    pub const fn is_relation_to_many(&self) -> bool {
        matches!(self, Self::ManyToMany)
    }

    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean | Self::NullBoolean)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    /// Never fails: unknown strings become [`TypeTag::Unrecognized`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Ok(Self::ALL
            .iter()
            .find(|tag| tag.as_str() == normalized)
            .cloned()
            .unwrap_or_else(|| Self::Unrecognized(s.trim().to_string())))
    }
}

// ── EntityRef ────────────────────────────────────────────────────────────────

/// Reference to a relation target, `sales.Customer` or bare `Customer`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// `None` when the target lives in the referring entity's namespace.
    pub namespace: Option<String>,
    pub name: String,
}

impl EntityRef {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        let (namespace, name) = match raw.split_once('.') {
            Some((ns, name)) => (Some(ns.to_string()), name.to_string()),
            None => (None, raw.to_string()),
        };

        if let Some(ns) = &namespace {
            naming::validate_identifier(ns)?;
        }
        naming::validate_identifier(&name)?;

        Ok(Self { namespace, name })
    }

    /// Namespace of the target, defaulting to the referring namespace.
    pub fn namespace_or<'a>(&'a self, current: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(current)
    }

    /// Whether the target lives outside `current`.
    pub fn is_cross_namespace(&self, current: &str) -> bool {
        self.namespace
            .as_deref()
            .is_some_and(|ns| !ns.eq_ignore_ascii_case(current))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

// ── Field ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_tag: TypeTag,
    pub nullable: bool,
    pub related: Option<EntityRef>,
    pub label: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            nullable: false,
            related: None,
            label: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn related(mut self, target: EntityRef) -> Self {
        self.related = Some(target);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Declared label, or the humanized field name.
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| naming::humanize(&self.name))
    }
}

// ── Entity ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub namespace: String,
    pub name: String,
    pub label: Option<String>,
    pub fields: Vec<Field>,
    /// Relation-to-one fields that render an inline creation control.
    pub quick_add: Vec<String>,
    /// Columns of the list view; `a__b` paths traverse relations.
    pub display_columns: Vec<String>,
}

impl Entity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            label: None,
            fields: Vec::new(),
            quick_add: Vec::new(),
            display_columns: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_quick_add(mut self, field: impl Into<String>) -> Self {
        self.quick_add.push(field.into());
        self
    }

    pub fn with_display_column(mut self, column: impl Into<String>) -> Self {
        self.display_columns.push(column.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields a user may edit, in declaration order.
    pub fn user_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| !is_base_field(&self.name, &f.name))
    }

    pub fn is_quick_add(&self, field: &Field) -> bool {
        field.type_tag.is_relation_to_one() && self.quick_add.iter().any(|q| q == &field.name)
    }

    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| naming::humanize(&self.name))
    }

    /// Structural checks run before planning. Per-field typing problems are
    /// left to the field type lookup.
    pub fn validate(&self) -> Result<(), DomainError> {
        naming::validate_identifier(&self.namespace)?;
        naming::validate_identifier(&self.name)?;

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DomainError::InvalidEntity {
                    name: self.name.clone(),
                    reason: format!("field '{}' is declared twice", field.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tag_parses_known_and_keeps_unknown() {
        assert_eq!("foreign-key".parse::<TypeTag>().unwrap(), TypeTag::ForeignKey);
        assert_eq!("foreign_key".parse::<TypeTag>().unwrap(), TypeTag::ForeignKey);
        assert_eq!("DATETIME".parse::<TypeTag>().unwrap(), TypeTag::Datetime);
        assert_eq!(
            "json".parse::<TypeTag>().unwrap(),
            TypeTag::Unrecognized("json".into())
        );
    }

    #[test]
    fn type_tag_round_trips_through_as_str() {
        for tag in TypeTag::ALL {
            assert_eq!(&tag.as_str().parse::<TypeTag>().unwrap(), tag);
        }
    }

    #[test]
    fn entity_ref_parses_qualified_and_bare() {
        let qualified = EntityRef::parse("sales.Customer").unwrap();
        assert_eq!(qualified.namespace.as_deref(), Some("sales"));
        assert!(qualified.is_cross_namespace("billing"));

        let bare = EntityRef::parse("Customer").unwrap();
        assert_eq!(bare.namespace_or("billing"), "billing");
        assert!(!bare.is_cross_namespace("billing"));

        assert!(EntityRef::parse("sales.").is_err());
    }

    #[test]
    fn base_fields_are_excluded_from_user_fields() {
        let entity = Entity::new("billing", "Invoice")
            .with_field(Field::new("id", TypeTag::Auto))
            .with_field(Field::new("idinvoice", TypeTag::Integer))
            .with_field(Field::new("total", TypeTag::Decimal))
            .with_field(Field::new("deleted", TypeTag::Boolean))
            .with_field(Field::new("created_on", TypeTag::Datetime));

        let names: Vec<_> = entity.user_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["total"]);
    }

    #[test]
    fn validate_leaves_relation_targets_to_field_lookup() {
        let entity = Entity::new("billing", "Invoice")
            .with_field(Field::new("customer", TypeTag::ForeignKey));
        assert!(entity.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_fields() {
        let entity = Entity::new("billing", "Invoice")
            .with_field(Field::new("total", TypeTag::Decimal))
            .with_field(Field::new("total", TypeTag::Float));
        assert!(entity.validate().is_err());
    }

    #[test]
    fn labels_fall_back_to_humanized_names() {
        let field = Field::new("due_date", TypeTag::Date);
        assert_eq!(field.display_label(), "Due Date");
        assert_eq!(field.label("Vencimento").display_label(), "Vencimento");
    }
}
