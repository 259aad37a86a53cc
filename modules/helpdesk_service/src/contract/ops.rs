//! Named remote operations and their inputs
//!
//! The remote client serializes these inputs into a batch call and the RPC
//! endpoint deserializes them back, so both sides share one definition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::model::{TagValue, TicketFilter};
use super::schema::{OrganizationUpdate, ProfileUpdate, TicketUpdate};

/// Whether an operation reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

macro_rules! operations {
    ($($variant:ident => ($name:literal, $kind:ident)),+ $(,)?) => {
        /// Every operation the façade exposes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant),+
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Operation::$variant => $name),+
                }
            }

            pub fn kind(self) -> OperationKind {
                match self {
                    $(Operation::$variant => OperationKind::$kind),+
                }
            }
        }

        impl FromStr for Operation {
            type Err = UnknownOperation;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Operation::$variant),)+
                    other => Err(UnknownOperation(other.to_string())),
                }
            }
        }
    };
}

operations! {
    ListOrganizations => ("list_organizations", Query),
    GetOrganization => ("get_organization", Query),
    CreateOrganization => ("create_organization", Mutation),
    UpdateOrganization => ("update_organization", Mutation),
    DeleteOrganization => ("delete_organization", Mutation),
    GetMacroStatistics => ("get_macro_statistics", Query),
    GetMyProfile => ("get_my_profile", Query),
    CreateProfile => ("create_profile", Mutation),
    UpdateProfile => ("update_profile", Mutation),
    ListMembers => ("list_members", Query),
    UpdateMemberRole => ("update_member_role", Mutation),
    RemoveMember => ("remove_member", Mutation),
    InviteMember => ("invite_member", Mutation),
    ListInvitations => ("list_invitations", Query),
    ListMyInvitations => ("list_my_invitations", Query),
    AcceptInvitation => ("accept_invitation", Mutation),
    RevokeInvitation => ("revoke_invitation", Mutation),
    ListTickets => ("list_tickets", Query),
    GetTicket => ("get_ticket", Query),
    CreateTicket => ("create_ticket", Mutation),
    UpdateTicket => ("update_ticket", Mutation),
    DeleteTicket => ("delete_ticket", Mutation),
    ListComments => ("list_comments", Query),
    AddComment => ("add_comment", Mutation),
    DeleteComment => ("delete_comment", Mutation),
    ListTagKeys => ("list_tag_keys", Query),
    CreateTagKey => ("create_tag_key", Mutation),
    DeleteTagKey => ("delete_tag_key", Mutation),
    AddEnumOption => ("add_enum_option", Mutation),
    ListEnumOptions => ("list_enum_options", Query),
    SetTicketTag => ("set_ticket_tag", Mutation),
    ListTicketTags => ("list_ticket_tags", Query),
    ClearTicketTag => ("clear_ticket_tag", Mutation),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

// ===== Inputs =====

/// Input of operations that take no arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoInput {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub organization_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrganizationInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrganizationInput {
    pub organization_id: Uuid,
    pub patch: OrganizationUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    pub patch: ProfileUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub organization_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMemberRoleInput {
    pub organization_id: Uuid,
    pub profile_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteMemberInput {
    pub organization_id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationRef {
    pub invitation_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTicketsInput {
    pub organization_id: Uuid,
    #[serde(default)]
    pub filter: TicketFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRef {
    pub ticket_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTicketInput {
    pub ticket_id: Uuid,
    pub patch: TicketUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCommentInput {
    pub ticket_id: Uuid,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRef {
    pub comment_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagKeyRef {
    pub tag_key_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEnumOptionInput {
    pub tag_key_id: Uuid,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTicketTagInput {
    pub ticket_id: Uuid,
    pub tag_key_id: Uuid,
    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTagRef {
    pub ticket_id: Uuid,
    pub tag_key_id: Uuid,
}
