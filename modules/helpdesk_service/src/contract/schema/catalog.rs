//! Runtime column metadata for every relation
//!
//! The typed Row/Insert/Update shapes cover compile-time checking. This
//! catalog covers untyped JSON payloads: it lets the RPC boundary reject a
//! payload that misses a required column or nulls a non-nullable one before
//! any storage call is made.

use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::contract::model::{TagType, TicketPriority, TicketStatus};

/// Name of the only schema the store exposes.
pub const PUBLIC_SCHEMA: &str = "public";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Double,
    Date,
    Timestamp,
    /// Constrained string enumeration
    Enum(&'static [&'static str]),
}

impl ColumnType {
    fn expected(&self) -> String {
        match self {
            Self::Uuid => "uuid".to_string(),
            Self::Text => "string".to_string(),
            Self::Double => "number".to_string(),
            Self::Date => "date (YYYY-MM-DD)".to_string(),
            Self::Timestamp => "RFC 3339 timestamp".to_string(),
            Self::Enum(values) => format!("one of {}", values.join(", ")),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Uuid, Value::String(s)) => Uuid::parse_str(s).is_ok(),
            (Self::Text, Value::String(_)) => true,
            (Self::Double, Value::Number(_)) => true,
            (Self::Date, Value::String(s)) => {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            }
            (Self::Timestamp, Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            (Self::Enum(values), Value::String(s)) => values.contains(&s.as_str()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub relation: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    /// Generated or defaulted by the store; optional on Insert
    pub has_default: bool,
    /// Accepted on Insert at all
    pub insertable: bool,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            has_default: false,
            insertable: true,
            references: None,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn defaulted(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub const fn not_insertable(mut self) -> Self {
        self.insertable = false;
        self
    }

    pub const fn references(mut self, relation: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { relation, column });
        self
    }

    /// Must be present on Insert
    pub fn is_required(&self) -> bool {
        self.insertable && !self.nullable && !self.has_default
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RelationDef {
    pub schema: &'static str,
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl RelationDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_required())
    }
}

/// A single reason a payload was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NotAnObject,
    UnknownColumn(String),
    NotInsertable(String),
    MissingColumn(String),
    NullNotAllowed(String),
    InvalidValue { column: String, expected: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "payload must be a JSON object"),
            Self::UnknownColumn(c) => write!(f, "unknown column '{}'", c),
            Self::NotInsertable(c) => write!(f, "column '{}' cannot be set on insert", c),
            Self::MissingColumn(c) => write!(f, "missing required column '{}'", c),
            Self::NullNotAllowed(c) => write!(f, "column '{}' is not nullable", c),
            Self::InvalidValue { column, expected } => {
                write!(f, "column '{}' expects {}", column, expected)
            }
        }
    }
}

/// Rejected payload for one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadError {
    pub relation: &'static str,
    pub violations: Vec<Violation>,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "invalid {} payload: {}", self.relation, reasons.join("; "))
    }
}

impl std::error::Error for PayloadError {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Insert,
    Update,
}

/// Validate an untyped Insert payload against a relation
pub fn validate_insert(def: &'static RelationDef, payload: &Value) -> Result<(), PayloadError> {
    validate(def, payload, Shape::Insert)
}

/// Validate an untyped Update payload against a relation
pub fn validate_update(def: &'static RelationDef, payload: &Value) -> Result<(), PayloadError> {
    validate(def, payload, Shape::Update)
}

fn validate(def: &'static RelationDef, payload: &Value, shape: Shape) -> Result<(), PayloadError> {
    let fail = |violations| PayloadError {
        relation: def.name,
        violations,
    };

    let Some(object) = payload.as_object() else {
        return Err(fail(vec![Violation::NotAnObject]));
    };

    let mut violations = Vec::new();

    for (key, value) in object {
        let Some(column) = def.column(key) else {
            violations.push(Violation::UnknownColumn(key.clone()));
            continue;
        };
        if shape == Shape::Insert && !column.insertable {
            violations.push(Violation::NotInsertable(key.clone()));
            continue;
        }
        if value.is_null() {
            if !column.nullable {
                violations.push(Violation::NullNotAllowed(key.clone()));
            }
            continue;
        }
        if !column.ty.accepts(value) {
            violations.push(Violation::InvalidValue {
                column: key.clone(),
                expected: column.ty.expected(),
            });
        }
    }

    if shape == Shape::Insert {
        for column in def.required_columns() {
            if !object.contains_key(column.name) {
                violations.push(Violation::MissingColumn(column.name.to_string()));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(fail(violations))
    }
}

/// Resolve `relation` or `schema.relation` to its metadata
pub fn lookup(reference: &str) -> Option<&'static RelationDef> {
    let (schema, name) = reference
        .split_once('.')
        .unwrap_or((PUBLIC_SCHEMA, reference));
    RELATIONS
        .iter()
        .copied()
        .find(|def| def.schema == schema && def.name == name)
}

// ===== Column definitions =====

use ColumnType::{Date, Double, Enum, Text, Timestamp};

const ID: ColumnDef = ColumnDef::new("id", ColumnType::Uuid).defaulted();
const CREATED_AT: ColumnDef = ColumnDef::new("created_at", Timestamp).defaulted();
const UPDATED_AT: ColumnDef = ColumnDef::new("updated_at", Timestamp).defaulted();
const DELETED_AT: ColumnDef = ColumnDef::new("deleted_at", Timestamp)
    .nullable()
    .not_insertable();

const fn uuid_ref(name: &'static str, relation: &'static str) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Uuid).references(relation, "id")
}

pub static ORGANIZATIONS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "organizations",
    columns: &[
        ID,
        ColumnDef::new("name", Text),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static PROFILES: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "profiles",
    columns: &[
        // Assigned by the auth identity, never generated
        ColumnDef::new("id", ColumnType::Uuid),
        ColumnDef::new("full_name", Text).nullable(),
        ColumnDef::new("avatar_url", Text).nullable(),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static ORGANIZATION_MEMBERS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "organization_members",
    columns: &[
        ID,
        uuid_ref("organization_id", "organizations"),
        uuid_ref("profile_id", "profiles"),
        ColumnDef::new("role", Text).defaulted(),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static ORGANIZATION_INVITATIONS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "organization_invitations",
    columns: &[
        ID,
        uuid_ref("organization_id", "organizations"),
        ColumnDef::new("email", Text),
        ColumnDef::new("role", Text).defaulted(),
        uuid_ref("invited_by", "profiles").nullable(),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TICKETS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tickets",
    columns: &[
        ID,
        uuid_ref("organization_id", "organizations"),
        uuid_ref("created_by", "profiles"),
        uuid_ref("assigned_to", "profiles").nullable(),
        ColumnDef::new("title", Text),
        ColumnDef::new("description", Text).nullable(),
        ColumnDef::new("status", Enum(TicketStatus::VALUES)).defaulted(),
        ColumnDef::new("priority", Enum(TicketPriority::VALUES)).defaulted(),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TICKET_COMMENTS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "ticket_comments",
    columns: &[
        ID,
        uuid_ref("ticket_id", "tickets"),
        uuid_ref("user_id", "profiles"),
        ColumnDef::new("comment", Text),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TAG_KEYS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tag_keys",
    columns: &[
        ID,
        uuid_ref("organization_id", "organizations"),
        ColumnDef::new("name", Text),
        ColumnDef::new("tag_type", Enum(TagType::VALUES)),
        ColumnDef::new("description", Text).nullable(),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TAG_TEXT_VALUES: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tag_text_values",
    columns: &[
        ID,
        uuid_ref("tag_key_id", "tag_keys"),
        uuid_ref("ticket_id", "tickets"),
        ColumnDef::new("value", Text),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TAG_NUMBER_VALUES: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tag_number_values",
    columns: &[
        ID,
        uuid_ref("tag_key_id", "tag_keys"),
        uuid_ref("ticket_id", "tickets"),
        ColumnDef::new("value", Double),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TAG_DATE_VALUES: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tag_date_values",
    columns: &[
        ID,
        uuid_ref("tag_key_id", "tag_keys"),
        uuid_ref("ticket_id", "tickets"),
        ColumnDef::new("value", Date),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TAG_ENUM_OPTIONS: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tag_enum_options",
    columns: &[
        ID,
        uuid_ref("tag_key_id", "tag_keys"),
        ColumnDef::new("value", Text),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

pub static TAG_ENUM_VALUES: RelationDef = RelationDef {
    schema: PUBLIC_SCHEMA,
    name: "tag_enum_values",
    columns: &[
        ID,
        uuid_ref("tag_key_id", "tag_keys"),
        uuid_ref("ticket_id", "tickets"),
        uuid_ref("enum_option_id", "tag_enum_options"),
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

/// Every relation in the store
pub static RELATIONS: &[&RelationDef] = &[
    &ORGANIZATIONS,
    &PROFILES,
    &ORGANIZATION_MEMBERS,
    &ORGANIZATION_INVITATIONS,
    &TICKETS,
    &TICKET_COMMENTS,
    &TAG_KEYS,
    &TAG_TEXT_VALUES,
    &TAG_NUMBER_VALUES,
    &TAG_DATE_VALUES,
    &TAG_ENUM_OPTIONS,
    &TAG_ENUM_VALUES,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_resolves_plain_and_qualified_names() {
        let plain = lookup("tickets").unwrap();
        let qualified = lookup("public.tickets").unwrap();
        assert!(std::ptr::eq(plain, qualified));
        assert_eq!(plain.qualified_name(), "public.tickets");
    }

    #[test]
    fn lookup_unknown_relation_is_none() {
        assert!(lookup("widgets").is_none());
        assert!(lookup("auth.tickets").is_none());
    }

    #[test]
    fn insert_without_optional_columns_is_accepted() {
        let payload = json!({
            "organization_id": Uuid::new_v4(),
            "created_by": Uuid::new_v4(),
            "title": "Printer on fire",
        });
        assert!(validate_insert(&TICKETS, &payload).is_ok());
    }

    #[test]
    fn insert_missing_required_column_is_rejected() {
        let payload = json!({
            "organization_id": Uuid::new_v4(),
            "title": "Printer on fire",
        });
        let err = validate_insert(&TICKETS, &payload).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::MissingColumn("created_by".to_string())]
        );
    }

    #[test]
    fn profile_id_is_required_on_insert() {
        let err = validate_insert(&PROFILES, &json!({"full_name": "Ada"})).unwrap_err();
        assert_eq!(err.violations, vec![Violation::MissingColumn("id".to_string())]);
    }

    #[test]
    fn null_rules_follow_column_nullability() {
        let id = Uuid::new_v4();
        assert!(validate_update(&TICKETS, &json!({"assigned_to": null})).is_ok());
        let err = validate_update(&TICKETS, &json!({"title": null})).unwrap_err();
        assert_eq!(err.violations, vec![Violation::NullNotAllowed("title".to_string())]);
        assert!(validate_update(&PROFILES, &json!({"id": id, "avatar_url": null})).is_ok());
    }

    #[test]
    fn deleted_at_is_not_insertable() {
        let payload = json!({"name": "Acme", "deleted_at": "2024-01-01T00:00:00Z"});
        let err = validate_insert(&ORGANIZATIONS, &payload).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::NotInsertable("deleted_at".to_string())]
        );
    }

    #[test]
    fn enum_and_typed_columns_are_checked() {
        let err = validate_update(&TICKETS, &json!({"status": "blocked", "title": 7})).unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert!(validate_update(&TAG_DATE_VALUES, &json!({"value": "2024-02-30"})).is_err());
        assert!(validate_update(&TAG_DATE_VALUES, &json!({"value": "2024-02-29"})).is_ok());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let err = validate_update(&ORGANIZATIONS, &json!({"slug": "acme"})).unwrap_err();
        assert_eq!(err.to_string(), "invalid organizations payload: unknown column 'slug'");
    }

    #[test]
    fn every_foreign_key_points_at_a_known_relation() {
        for def in RELATIONS {
            for column in def.columns {
                if let Some(fk) = column.references {
                    let target = lookup(fk.relation).unwrap();
                    assert!(target.column(fk.column).is_some());
                }
            }
        }
    }
}
