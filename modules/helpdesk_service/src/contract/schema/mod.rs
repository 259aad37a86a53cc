//! Relational schema contract of the backing store
//!
//! Every relation is a zero-sized marker implementing [`Relation`], which
//! projects it onto its Row, Insert and Update shapes:
//!
//! ```
//! use helpdesk_service::contract::schema::{Insert, Row, Tickets};
//!
//! fn title(row: &Row<Tickets>) -> &str {
//!     &row.title
//! }
//!
//! fn draft(insert: &Insert<Tickets>) -> bool {
//!     insert.status.is_none()
//! }
//! # let _ = (title, draft);
//! ```
//!
//! Naming a relation that does not exist, or qualifying a relation with a
//! schema it does not live in, fails to compile:
//!
//! ```compile_fail
//! use helpdesk_service::contract::schema::{QualifiedRow, Tickets};
//!
//! enum Auth {}
//! impl helpdesk_service::contract::schema::Schema for Auth {
//!     const NAME: &'static str = "auth";
//! }
//!
//! fn nope(_: QualifiedRow<Auth, Tickets>) {}
//! ```

pub mod catalog;
pub mod patch;
pub mod tables;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use catalog::{
    lookup, validate_insert, validate_update, ColumnDef, ColumnType, PayloadError,
    RelationDef, Violation,
};
pub use tables::*;

/// A namespace of relations in the store
pub trait Schema: 'static {
    const NAME: &'static str;
}

/// The `public` schema, home of every helpdesk relation
pub enum Public {}

impl Schema for Public {
    const NAME: &'static str = catalog::PUBLIC_SCHEMA;
}

/// Type-level description of one relation
pub trait Relation: 'static {
    type Schema: Schema;
    type Row: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    type Insert: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    type Update: Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static;

    const NAME: &'static str;

    /// Runtime column metadata
    fn definition() -> &'static RelationDef;
}

/// Row shape of a relation
pub type Row<R> = <R as Relation>::Row;
/// Insert shape of a relation
pub type Insert<R> = <R as Relation>::Insert;
/// Update shape of a relation
pub type Update<R> = <R as Relation>::Update;

/// Projection through an explicit schema; only implemented for the schema
/// the relation actually lives in.
pub trait Qualified<S: Schema> {
    type Row;
    type Insert;
    type Update;
}

impl<R: Relation> Qualified<R::Schema> for R {
    type Row = R::Row;
    type Insert = R::Insert;
    type Update = R::Update;
}

pub type QualifiedRow<S, R> = <R as Qualified<S>>::Row;
pub type QualifiedInsert<S, R> = <R as Qualified<S>>::Insert;
pub type QualifiedUpdate<S, R> = <R as Qualified<S>>::Update;

macro_rules! relation {
    ($(#[$meta:meta])* $marker:ident, $def:ident, $name:literal, $row:ty, $insert:ty, $update:ty) => {
        $(#[$meta])*
        pub enum $marker {}

        impl Relation for $marker {
            type Schema = Public;
            type Row = $row;
            type Insert = $insert;
            type Update = $update;

            const NAME: &'static str = $name;

            fn definition() -> &'static RelationDef {
                &catalog::$def
            }
        }
    };
}

relation!(
    /// `public.organizations`
    Organizations, ORGANIZATIONS, "organizations", OrganizationRow, OrganizationInsert, OrganizationUpdate
);
relation!(
    /// `public.profiles`
    Profiles, PROFILES, "profiles", ProfileRow, ProfileInsert, ProfileUpdate
);
relation!(
    /// `public.organization_members`
    OrganizationMembers, ORGANIZATION_MEMBERS, "organization_members", MembershipRow, MembershipInsert, MembershipUpdate
);
relation!(
    /// `public.organization_invitations`
    OrganizationInvitations, ORGANIZATION_INVITATIONS, "organization_invitations", InvitationRow, InvitationInsert, InvitationUpdate
);
relation!(
    /// `public.tickets`
    Tickets, TICKETS, "tickets", TicketRow, TicketInsert, TicketUpdate
);
relation!(
    /// `public.ticket_comments`
    TicketComments, TICKET_COMMENTS, "ticket_comments", TicketCommentRow, TicketCommentInsert, TicketCommentUpdate
);
relation!(
    /// `public.tag_keys`
    TagKeys, TAG_KEYS, "tag_keys", TagKeyRow, TagKeyInsert, TagKeyUpdate
);
relation!(
    /// `public.tag_text_values`
    TagTextValues, TAG_TEXT_VALUES, "tag_text_values", TagTextValueRow, TagTextValueInsert, TagTextValueUpdate
);
relation!(
    /// `public.tag_number_values`
    TagNumberValues, TAG_NUMBER_VALUES, "tag_number_values", TagNumberValueRow, TagNumberValueInsert, TagNumberValueUpdate
);
relation!(
    /// `public.tag_date_values`
    TagDateValues, TAG_DATE_VALUES, "tag_date_values", TagDateValueRow, TagDateValueInsert, TagDateValueUpdate
);
relation!(
    /// `public.tag_enum_options`
    TagEnumOptions, TAG_ENUM_OPTIONS, "tag_enum_options", EnumOptionRow, EnumOptionInsert, EnumOptionUpdate
);
relation!(
    /// `public.tag_enum_values`
    TagEnumValues, TAG_ENUM_VALUES, "tag_enum_values", EnumValueRow, EnumValueInsert, EnumValueUpdate
);

/// Parse an untyped Insert payload for `R`, checking column metadata first
pub fn parse_insert<R: Relation>(payload: serde_json::Value) -> Result<R::Insert, PayloadError> {
    validate_insert(R::definition(), &payload)?;
    serde_json::from_value(payload).map_err(|e| PayloadError {
        relation: R::NAME,
        violations: vec![Violation::InvalidValue {
            column: "*".to_string(),
            expected: e.to_string(),
        }],
    })
}

/// Parse an untyped Update payload for `R`, checking column metadata first
pub fn parse_update<R: Relation>(payload: serde_json::Value) -> Result<R::Update, PayloadError> {
    validate_update(R::definition(), &payload)?;
    serde_json::from_value(payload).map_err(|e| PayloadError {
        relation: R::NAME,
        violations: vec![Violation::InvalidValue {
            column: "*".to_string(),
            expected: e.to_string(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn qualified_name<R: Relation>() -> String {
        format!("{}.{}", <R::Schema as Schema>::NAME, R::NAME)
    }

    #[test]
    fn markers_resolve_to_catalog_entries() {
        assert_eq!(qualified_name::<Tickets>(), "public.tickets");
        assert_eq!(qualified_name::<OrganizationMembers>(), "public.organization_members");
        assert!(std::ptr::eq(
            TagEnumValues::definition(),
            lookup("public.tag_enum_values").unwrap()
        ));
    }

    #[test]
    fn qualified_projection_matches_plain_projection() {
        fn same<T>(_: Option<T>, _: Option<T>) {}
        same::<Row<Tickets>>(None, None::<QualifiedRow<Public, Tickets>>);
        same::<Update<Profiles>>(None, None::<QualifiedUpdate<Public, Profiles>>);
    }

    #[test]
    fn every_catalog_entry_has_a_marker() {
        let names = [
            Organizations::NAME,
            Profiles::NAME,
            OrganizationMembers::NAME,
            OrganizationInvitations::NAME,
            Tickets::NAME,
            TicketComments::NAME,
            TagKeys::NAME,
            TagTextValues::NAME,
            TagNumberValues::NAME,
            TagDateValues::NAME,
            TagEnumOptions::NAME,
            TagEnumValues::NAME,
        ];
        assert_eq!(names.len(), catalog::RELATIONS.len());
        for def in catalog::RELATIONS {
            assert!(names.contains(&def.name), "{} has no marker", def.name);
        }
    }

    #[test]
    fn parse_insert_reports_metadata_violations() {
        let err = parse_insert::<Organizations>(json!({})).unwrap_err();
        assert_eq!(err.violations, vec![Violation::MissingColumn("name".to_string())]);

        let ok = parse_insert::<Organizations>(json!({"name": "Acme"})).unwrap();
        assert_eq!(ok.name, "Acme");
    }

    #[test]
    fn parse_update_accepts_partial_payloads() {
        let assignee = Uuid::new_v4();
        let patch = parse_update::<Tickets>(json!({"assigned_to": assignee})).unwrap();
        assert_eq!(patch.assigned_to, Some(Some(assignee)));
        assert!(patch.title.is_none());
    }
}
