//! Row, Insert and Update shapes for every relation
//!
//! Row carries every column as read back from the store. Insert makes
//! required columns mandatory and generated/defaulted ones optional. Update
//! makes everything optional; nullable columns use `Option<Option<T>>` so an
//! explicit `null` clears the column while absence leaves it untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::patch::{non_null, nullable};
use crate::contract::model::{TagType, TicketPriority, TicketStatus};

// ===== organizations =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== profiles =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileRow {
    /// Equal to the auth identity id
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileInsert {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== organization_members =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MembershipRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub profile_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub organization_id: Uuid,
    pub profile_id: Uuid,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== organization_invitations =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvitationRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub role: String,
    pub invited_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvitationInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub organization_id: Uuid,
    pub email: String,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvitationUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== tickets =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub organization_id: Uuid,
    pub created_by: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== ticket_comments =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketCommentRow {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketCommentInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketCommentUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== tag_keys =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagKeyRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub tag_type: TagType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagKeyInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub organization_id: Uuid,
    pub name: String,
    pub tag_type: TagType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagKeyUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<TagType>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== tag value tables =====
//
// The three scalar value tables differ only in the type of `value`.

macro_rules! tag_value_shapes {
    ($row:ident, $insert:ident, $update:ident, $value:ty, [$($derive:ident),*]) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema $(, $derive)*)]
        pub struct $row {
            pub id: Uuid,
            pub tag_key_id: Uuid,
            pub ticket_id: Uuid,
            pub value: $value,
            pub created_at: DateTime<Utc>,
            pub updated_at: DateTime<Utc>,
            pub deleted_at: Option<DateTime<Utc>>,
        }

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize $(, $derive)*)]
        #[serde(deny_unknown_fields)]
        pub struct $insert {
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub id: Option<Uuid>,
            pub tag_key_id: Uuid,
            pub ticket_id: Uuid,
            pub value: $value,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub created_at: Option<DateTime<Utc>>,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub updated_at: Option<DateTime<Utc>>,
        }

        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize $(, $derive)*)]
        #[serde(deny_unknown_fields)]
        pub struct $update {
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub id: Option<Uuid>,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub tag_key_id: Option<Uuid>,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub ticket_id: Option<Uuid>,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub value: Option<$value>,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub created_at: Option<DateTime<Utc>>,
            #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
            pub updated_at: Option<DateTime<Utc>>,
            #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
            pub deleted_at: Option<Option<DateTime<Utc>>>,
        }
    };
}

tag_value_shapes!(TagTextValueRow, TagTextValueInsert, TagTextValueUpdate, String, [Eq]);
tag_value_shapes!(TagNumberValueRow, TagNumberValueInsert, TagNumberValueUpdate, f64, []);
tag_value_shapes!(TagDateValueRow, TagDateValueInsert, TagDateValueUpdate, NaiveDate, [Eq]);

// ===== tag_enum_options =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnumOptionRow {
    pub id: Uuid,
    pub tag_key_id: Uuid,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumOptionInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub tag_key_id: Uuid,
    pub value: String,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumOptionUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub tag_key_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

// ===== tag_enum_values =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnumValueRow {
    pub id: Uuid,
    pub tag_key_id: Uuid,
    pub ticket_id: Uuid,
    pub enum_option_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueInsert {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub tag_key_id: Uuid,
    pub ticket_id: Uuid,
    pub enum_option_id: Uuid,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueUpdate {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub tag_key_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub enum_option_id: Option<Uuid>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ticket_insert_accepts_omitted_optional_columns() {
        let insert: TicketInsert = serde_json::from_value(json!({
            "organization_id": Uuid::new_v4(),
            "created_by": Uuid::new_v4(),
            "title": "VPN is down",
        }))
        .unwrap();
        assert!(insert.id.is_none());
        assert!(insert.assigned_to.is_none());
        assert!(insert.status.is_none());
    }

    #[test]
    fn ticket_insert_rejects_missing_required_column() {
        let result = serde_json::from_value::<TicketInsert>(json!({
            "organization_id": Uuid::new_v4(),
            "title": "VPN is down",
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("created_by"), "{err}");
    }

    #[test]
    fn insert_rejects_null_in_defaulted_non_nullable_column() {
        let result = serde_json::from_value::<TicketInsert>(json!({
            "organization_id": Uuid::new_v4(),
            "created_by": Uuid::new_v4(),
            "title": "VPN is down",
            "status": null,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn insert_accepts_explicit_null_in_nullable_column() {
        let insert: ProfileInsert = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "full_name": null,
        }))
        .unwrap();
        assert!(insert.full_name.is_none());
    }

    #[test]
    fn insert_rejects_deleted_at() {
        let result = serde_json::from_value::<OrganizationInsert>(json!({
            "name": "Acme",
            "deleted_at": null,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let clear: TicketUpdate = serde_json::from_value(json!({"assigned_to": null})).unwrap();
        assert_eq!(clear.assigned_to, Some(None));
        let untouched: TicketUpdate = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert_eq!(untouched.assigned_to, None);

        let json = serde_json::to_value(&clear).unwrap();
        assert_eq!(json, json!({"assigned_to": null}));
    }

    #[test]
    fn update_rejects_null_in_non_nullable_column() {
        assert!(serde_json::from_value::<TicketUpdate>(json!({"title": null})).is_err());
        assert!(serde_json::from_value::<TagKeyUpdate>(json!({"tag_type": null})).is_err());
    }
}
