//! Entity to row mappers
//!
//! Conversions between SeaORM entities and the contract's relation shapes.
//! Update shapes become partial active models: absent fields stay `NotSet`.

use sea_orm::ActiveValue::{self, NotSet, Set};

use super::entity::{
    enum_option, enum_value, invitation, membership, organization, profile, tag_date_value,
    tag_key, tag_number_value, tag_text_value, ticket, ticket_comment,
};
use crate::contract::schema::{
    EnumOptionRow, EnumValueRow, InvitationRow, MembershipRow, MembershipUpdate, OrganizationRow,
    OrganizationUpdate, ProfileRow, ProfileUpdate, TagDateValueRow, TagKeyRow,
    TagNumberValueRow, TagTextValueRow, TicketCommentRow, TicketRow, TicketUpdate,
};

fn patch<T>(value: Option<T>) -> ActiveValue<T>
where
    T: Into<sea_orm::Value>,
{
    match value {
        Some(v) => Set(v),
        None => NotSet,
    }
}

// ===== Organizations =====

impl From<organization::Model> for OrganizationRow {
    fn from(entity: organization::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&OrganizationRow> for organization::ActiveModel {
    fn from(row: &OrganizationRow) -> Self {
        Self {
            id: Set(row.id),
            name: Set(row.name.clone()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

impl From<&OrganizationUpdate> for organization::ActiveModel {
    fn from(update: &OrganizationUpdate) -> Self {
        Self {
            id: NotSet,
            name: patch(update.name.clone()),
            created_at: patch(update.created_at),
            updated_at: patch(update.updated_at),
            deleted_at: patch(update.deleted_at),
        }
    }
}

// ===== Profiles =====

impl From<profile::Model> for ProfileRow {
    fn from(entity: profile::Model) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            avatar_url: entity.avatar_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&ProfileRow> for profile::ActiveModel {
    fn from(row: &ProfileRow) -> Self {
        Self {
            id: Set(row.id),
            full_name: Set(row.full_name.clone()),
            avatar_url: Set(row.avatar_url.clone()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

impl From<&ProfileUpdate> for profile::ActiveModel {
    fn from(update: &ProfileUpdate) -> Self {
        Self {
            id: NotSet,
            full_name: patch(update.full_name.clone()),
            avatar_url: patch(update.avatar_url.clone()),
            created_at: patch(update.created_at),
            updated_at: patch(update.updated_at),
            deleted_at: patch(update.deleted_at),
        }
    }
}

// ===== Memberships and invitations =====

impl From<membership::Model> for MembershipRow {
    fn from(entity: membership::Model) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            profile_id: entity.profile_id,
            role: entity.role,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&MembershipRow> for membership::ActiveModel {
    fn from(row: &MembershipRow) -> Self {
        Self {
            id: Set(row.id),
            organization_id: Set(row.organization_id),
            profile_id: Set(row.profile_id),
            role: Set(row.role.clone()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

impl From<&MembershipUpdate> for membership::ActiveModel {
    fn from(update: &MembershipUpdate) -> Self {
        Self {
            id: NotSet,
            organization_id: patch(update.organization_id),
            profile_id: patch(update.profile_id),
            role: patch(update.role.clone()),
            created_at: patch(update.created_at),
            updated_at: patch(update.updated_at),
            deleted_at: patch(update.deleted_at),
        }
    }
}

impl From<invitation::Model> for InvitationRow {
    fn from(entity: invitation::Model) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            email: entity.email,
            role: entity.role,
            invited_by: entity.invited_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&InvitationRow> for invitation::ActiveModel {
    fn from(row: &InvitationRow) -> Self {
        Self {
            id: Set(row.id),
            organization_id: Set(row.organization_id),
            email: Set(row.email.clone()),
            role: Set(row.role.clone()),
            invited_by: Set(row.invited_by),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

// ===== Tickets and comments =====

impl TryFrom<ticket::Model> for TicketRow {
    type Error = anyhow::Error;

    fn try_from(entity: ticket::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            created_by: entity.created_by,
            assigned_to: entity.assigned_to,
            title: entity.title,
            description: entity.description,
            status: entity.status.parse()?,
            priority: entity.priority.parse()?,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        })
    }
}

impl From<&TicketRow> for ticket::ActiveModel {
    fn from(row: &TicketRow) -> Self {
        Self {
            id: Set(row.id),
            organization_id: Set(row.organization_id),
            created_by: Set(row.created_by),
            assigned_to: Set(row.assigned_to),
            title: Set(row.title.clone()),
            description: Set(row.description.clone()),
            status: Set(row.status.as_str().to_string()),
            priority: Set(row.priority.as_str().to_string()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

impl From<&TicketUpdate> for ticket::ActiveModel {
    fn from(update: &TicketUpdate) -> Self {
        Self {
            id: NotSet,
            organization_id: patch(update.organization_id),
            created_by: patch(update.created_by),
            assigned_to: patch(update.assigned_to),
            title: patch(update.title.clone()),
            description: patch(update.description.clone()),
            status: patch(update.status.map(|s| s.as_str().to_string())),
            priority: patch(update.priority.map(|p| p.as_str().to_string())),
            created_at: patch(update.created_at),
            updated_at: patch(update.updated_at),
            deleted_at: patch(update.deleted_at),
        }
    }
}

impl From<ticket_comment::Model> for TicketCommentRow {
    fn from(entity: ticket_comment::Model) -> Self {
        Self {
            id: entity.id,
            ticket_id: entity.ticket_id,
            user_id: entity.user_id,
            comment: entity.comment,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&TicketCommentRow> for ticket_comment::ActiveModel {
    fn from(row: &TicketCommentRow) -> Self {
        Self {
            id: Set(row.id),
            ticket_id: Set(row.ticket_id),
            user_id: Set(row.user_id),
            comment: Set(row.comment.clone()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

// ===== Tags =====

impl TryFrom<tag_key::Model> for TagKeyRow {
    type Error = anyhow::Error;

    fn try_from(entity: tag_key::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            name: entity.name,
            tag_type: entity.tag_type.parse()?,
            description: entity.description,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        })
    }
}

impl From<&TagKeyRow> for tag_key::ActiveModel {
    fn from(row: &TagKeyRow) -> Self {
        Self {
            id: Set(row.id),
            organization_id: Set(row.organization_id),
            name: Set(row.name.clone()),
            tag_type: Set(row.tag_type.as_str().to_string()),
            description: Set(row.description.clone()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

impl From<enum_option::Model> for EnumOptionRow {
    fn from(entity: enum_option::Model) -> Self {
        Self {
            id: entity.id,
            tag_key_id: entity.tag_key_id,
            value: entity.value,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&EnumOptionRow> for enum_option::ActiveModel {
    fn from(row: &EnumOptionRow) -> Self {
        Self {
            id: Set(row.id),
            tag_key_id: Set(row.tag_key_id),
            value: Set(row.value.clone()),
            created_at: Set(row.created_at),
            updated_at: Set(row.updated_at),
            deleted_at: Set(row.deleted_at),
        }
    }
}

macro_rules! value_row_from_model {
    ($row:ty, $module:ident) => {
        impl From<$module::Model> for $row {
            fn from(entity: $module::Model) -> Self {
                Self {
                    id: entity.id,
                    tag_key_id: entity.tag_key_id,
                    ticket_id: entity.ticket_id,
                    value: entity.value,
                    created_at: entity.created_at,
                    updated_at: entity.updated_at,
                    deleted_at: entity.deleted_at,
                }
            }
        }
    };
}

value_row_from_model!(TagTextValueRow, tag_text_value);
value_row_from_model!(TagNumberValueRow, tag_number_value);
value_row_from_model!(TagDateValueRow, tag_date_value);

impl From<enum_value::Model> for EnumValueRow {
    fn from(entity: enum_value::Model) -> Self {
        Self {
            id: entity.id,
            tag_key_id: entity.tag_key_id,
            ticket_id: entity.ticket_id,
            enum_option_id: entity.enum_option_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}
