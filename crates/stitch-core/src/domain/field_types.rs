//! Field type table: one mapping per `TypeTag`, for both ecosystems.
//!
//! [`mapping_for`] is an exhaustive `match` over the known tags, so a new tag that
//! is not given a mapping fails to compile rather than falling through to a
//! default. Only `TypeTag::Unrecognized` yields `UnknownFieldType`.
//!
//! Expression templates use these tokens:
//!
//! | token        | value                                   |
//! |--------------|-----------------------------------------|
//! | `$name$`     | dart member name (`dueDate`)            |
//! | `$key$`      | wire key, the source field name         |
//! | `$default$`  | boolean default from [`bool_default`]   |
//! | `$target$`   | variable the form page assigns into     |
//! | `$controller$` | text controller holding the input     |
//! | `$path$`     | template variable path (`customer.name`) |

use crate::domain::entity::{Entity, Field, TypeTag};
use crate::domain::error::DomainError;
use crate::domain::render::TemplateRenderer;

// ── Mapping types ────────────────────────────────────────────────────────────

/// Web-stack side of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerMapping {
    /// Python type the column holds.
    pub primitive: &'static str,
    /// List cell expression (`$path$`).
    pub display: &'static str,
    /// Form widget template id.
    pub widget: &'static str,
}

/// Mobile side of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileMapping {
    /// Dart type of the model member.
    pub primitive: &'static str,
    /// Local storage column type.
    pub storage: &'static str,
    pub decode: &'static str,
    pub encode: &'static str,
    /// Controller text to typed value.
    pub form_read: &'static str,
    /// UI template id of the form input.
    pub widget: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    pub server: ServerMapping,
    pub mobile: MobileMapping,
}

// ── Shared fragments ─────────────────────────────────────────────────────────

const PLAIN_CELL: &str = "{{ item.$path$ }}";
const INPUT: &str = "html/field_input";
const TEXT_FIELD: &str = "mobile/text_field";

const INT_DECODE: &str =
    "$name$ = json['$key$'] == null ? null : int.tryParse(json['$key$'].toString());";
const PLAIN_ENCODE: &str = "'$key$': $name$,";
const INT_READ: &str = "$target$.$name$ = int.tryParse($controller$.text);";

const STRING_DECODE: &str = "$name$ = json['$key$'] == null ? \"\" : json['$key$'].toString();";
const STRING_ENCODE: &str = "'$key$': $name$ ?? \"\",";
const STRING_READ: &str = "$target$.$name$ = $controller$.text;";

const DOUBLE_DECODE: &str =
    "$name$ = json['$key$'] == null ? null : double.parse(json['$key$'].toString());";
const DOUBLE_READ: &str = "$target$.$name$ = double.tryParse($controller$.text);";

const DATE_DECODE: &str = "$name$ = Util.convertDate(json['$key$']);";
const DATE_READ: &str =
    "$target$.$name$ = $controller$.text != \"\" ? Util.convertDate($controller$.text) : null;";

const fn integer(python: &'static str, storage: &'static str) -> TypeMapping {
    TypeMapping {
        server: ServerMapping {
            primitive: python,
            display: PLAIN_CELL,
            widget: INPUT,
        },
        mobile: MobileMapping {
            primitive: "int",
            storage,
            decode: INT_DECODE,
            encode: PLAIN_ENCODE,
            form_read: INT_READ,
            widget: TEXT_FIELD,
        },
    }
}

const fn text(python: &'static str, widget: &'static str) -> TypeMapping {
    TypeMapping {
        server: ServerMapping {
            primitive: python,
            display: PLAIN_CELL,
            widget,
        },
        mobile: MobileMapping {
            primitive: "String",
            storage: "TEXT",
            decode: STRING_DECODE,
            encode: STRING_ENCODE,
            form_read: STRING_READ,
            widget: TEXT_FIELD,
        },
    }
}

const fn temporal(
    python: &'static str,
    display: &'static str,
    storage: &'static str,
    encode: &'static str,
) -> TypeMapping {
    TypeMapping {
        server: ServerMapping {
            primitive: python,
            display,
            widget: INPUT,
        },
        mobile: MobileMapping {
            primitive: "DateTime",
            storage,
            decode: DATE_DECODE,
            encode,
            form_read: DATE_READ,
            widget: TEXT_FIELD,
        },
    }
}

const fn fractional(python: &'static str, storage: &'static str) -> TypeMapping {
    TypeMapping {
        server: ServerMapping {
            primitive: python,
            display: "{{ item.$path$|floatformat:2 }}",
            widget: INPUT,
        },
        mobile: MobileMapping {
            primitive: "double",
            storage,
            decode: DOUBLE_DECODE,
            encode: PLAIN_ENCODE,
            form_read: DOUBLE_READ,
            widget: TEXT_FIELD,
        },
    }
}

// ── Table ────────────────────────────────────────────────────────────────────

static AUTO: TypeMapping = integer("int", "INT");
static BIG_AUTO: TypeMapping = integer("int", "BIGINT");
static SMALL_AUTO: TypeMapping = integer("int", "SMALLINT");
static DURATION: TypeMapping = integer("datetime.timedelta", "INT");

static BOOLEAN: TypeMapping = TypeMapping {
    server: ServerMapping {
        primitive: "bool",
        display: "{{ item.$path$|yesno:\"Sim,Não\" }}",
        widget: "html/field_check",
    },
    mobile: MobileMapping {
        primitive: "bool",
        storage: "BOOLEAN",
        decode: "$name$ = json['$key$'] == null ? $default$ : json['$key$'];",
        encode: "'$key$': $name$ ?? $default$,",
        form_read: "$target$.$name$ = $controller$.text == \"\" ? $default$ : $controller$.text == \"true\";",
        widget: "mobile/switch_field",
    },
};

static CHAR: TypeMapping = text("str", INPUT);
static UUID: TypeMapping = text("uuid.UUID", INPUT);
static BINARY: TypeMapping = text("bytes", INPUT);

static DATE: TypeMapping = temporal(
    "datetime.date",
    "{{ item.$path$|date:\"d/m/Y\" }}",
    "DATE",
    "'$key$': $name$ != null ? Util.stringDateTimeSplit($name$, returnType: \"d\") : null,",
);
static DATETIME: TypeMapping = temporal(
    "datetime.datetime",
    "{{ item.$path$|date:\"d/m/Y H:i\" }}",
    "DATETIME",
    "'$key$': $name$ != null ? Util.stringDateTimeSplit($name$, returnType: \"dt\") : null,",
);
static TIME: TypeMapping = temporal(
    "datetime.time",
    "{{ item.$path$|time:\"H:i\" }}",
    "TEXT",
    "'$key$': $name$ != null ? Util.stringDateTimeSplit($name$, returnType: \"t\") : null,",
);

static DECIMAL: TypeMapping = fractional("Decimal", "DOUBLE");
static FLOAT: TypeMapping = fractional("float", "FLOAT");

static RELATION: TypeMapping = text("int", "html/field_relation");
static MANY: TypeMapping = TypeMapping {
    server: ServerMapping {
        primitive: "list",
        display: "{{ item.$path$.all|join:\", \" }}",
        widget: "html/field_multiple",
    },
    mobile: MobileMapping {
        primitive: "String",
        storage: "TEXT",
        decode: STRING_DECODE,
        encode: STRING_ENCODE,
        form_read: STRING_READ,
        widget: TEXT_FIELD,
    },
};

/// Form widget used when a relation exposes a quick-add control.
pub const QUICK_ADD_WIDGET: &str = "html/field_relation_quick_add";

/// Mapping for a known tag, `None` for [`TypeTag::Unrecognized`].
pub fn mapping_for(tag: &TypeTag) -> Option<&'static TypeMapping> {
    let mapping = match tag {
        TypeTag::Auto | TypeTag::Integer | TypeTag::PositiveInteger => &AUTO,
        TypeTag::BigAuto | TypeTag::BigInteger => &BIG_AUTO,
        TypeTag::SmallAuto | TypeTag::SmallInteger | TypeTag::PositiveSmallInteger => {
            &SMALL_AUTO
        }
        TypeTag::Boolean | TypeTag::NullBoolean => &BOOLEAN,
        TypeTag::Char
        | TypeTag::Text
        | TypeTag::Email
        | TypeTag::Slug
        | TypeTag::Url
        | TypeTag::IpAddress
        | TypeTag::File
        | TypeTag::FilePath
        | TypeTag::Image => &CHAR,
        TypeTag::Uuid => &UUID,
        TypeTag::Binary => &BINARY,
        TypeTag::Date => &DATE,
        TypeTag::Datetime => &DATETIME,
        TypeTag::Time => &TIME,
        TypeTag::Duration => &DURATION,
        TypeTag::Decimal => &DECIMAL,
        TypeTag::Float => &FLOAT,
        TypeTag::ForeignKey | TypeTag::OneToOne => &RELATION,
        TypeTag::ManyToMany => &MANY,
        TypeTag::Unrecognized(_) => return None,
    };
    Some(mapping)
}

/// Mapping for `field` of `entity`.
///
/// A relation without a target has nothing to point its widget or import at,
/// so it fails the same way an unknown type does: for that field only.
pub fn lookup(entity: &Entity, field: &Field) -> Result<&'static TypeMapping, DomainError> {
    let is_relation = field.type_tag.is_relation_to_one() || field.type_tag.is_relation_to_many();
    if is_relation && field.related.is_none() {
        return Err(DomainError::MissingRelationTarget {
            entity: entity.name.clone(),
            field: field.name.clone(),
        });
    }
    mapping_for(&field.type_tag).ok_or_else(|| DomainError::UnknownFieldType {
        entity: entity.name.clone(),
        field: field.name.clone(),
        tag: field.type_tag.to_string(),
    })
}

// ── Boolean defaults ─────────────────────────────────────────────────────────

/// Value an absent boolean decodes to.
///
/// A soft-deleted flag defaults to `false`; every other boolean, the
/// soft-enabled flag included, defaults to `true`.
pub fn bool_default(field_name: &str) -> bool {
    !field_name.eq_ignore_ascii_case("deleted")
}

// ── Expression rendering ─────────────────────────────────────────────────────

impl MobileMapping {
    fn expand(template: &str, name: &str, key: &str) -> String {
        let default = bool_default(name).to_string();
        substitute(
            template,
            &[("$name$", name), ("$key$", key), ("$default$", &default)],
        )
    }

    /// JSON to member assignment.
    pub fn decode_expr(&self, name: &str, key: &str) -> String {
        Self::expand(self.decode, name, key)
    }

    /// Member to wire map entry.
    pub fn encode_expr(&self, name: &str, key: &str) -> String {
        Self::expand(self.encode, name, key)
    }

    /// Controller text into `target.name`.
    pub fn form_read_expr(&self, target: &str, name: &str, controller: &str) -> String {
        let default = bool_default(name).to_string();
        substitute(
            self.form_read,
            &[
                ("$target$", target),
                ("$name$", name),
                ("$controller$", controller),
                ("$default$", &default),
            ],
        )
    }
}

impl ServerMapping {
    /// List cell for a `__`-separated column path.
    pub fn display_expr(&self, column: &str) -> String {
        substitute(self.display, &[("$path$", &column.replace("__", "."))])
    }
}

/// Expression templates are static and callers pass fixed token lists, so
/// the only renderer failure left is a blank template, which renders as itself.
fn substitute(template: &str, pairs: &[(&str, &str)]) -> String {
    if template.trim().is_empty() {
        return template.to_string();
    }
    let (tokens, values): (Vec<&str>, Vec<&str>) = pairs.iter().copied().unzip();
    let rendered = TemplateRenderer::render(template, &tokens, &values);
    debug_assert!(rendered.is_ok(), "expression {template:?} failed to render: {rendered:?}");
    rendered.unwrap_or_else(|_| template.to_string())
}
