//! Remote procedure façade
//!
//! Screens talk to the helpdesk exclusively through this trait. Each
//! implementation is bound to one caller: the native client carries an
//! explicit security context, the remote client carries the session store
//! whose access token becomes the bearer credential.

use async_trait::async_trait;
use uuid::Uuid;

use super::error::HelpdeskError;
use super::model::{MacroStatistics, TagValue, TicketFilter, TicketTag};
use super::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, OrganizationRow, OrganizationUpdate,
    ProfileInsert, ProfileRow, ProfileUpdate, TagKeyInsert, TagKeyRow, TicketCommentRow,
    TicketInsert, TicketRow, TicketUpdate,
};

/// Helpdesk API for screens and other in-process consumers
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    // ===== Organizations =====

    /// Active organizations the caller is a member of
    async fn list_organizations(&self) -> Result<Vec<OrganizationRow>, HelpdeskError>;

    async fn get_organization(&self, organization_id: Uuid)
        -> Result<OrganizationRow, HelpdeskError>;

    /// Create an organization with the caller as its admin
    async fn create_organization(&self, name: &str) -> Result<OrganizationRow, HelpdeskError>;

    async fn update_organization(
        &self,
        organization_id: Uuid,
        patch: OrganizationUpdate,
    ) -> Result<OrganizationRow, HelpdeskError>;

    /// Soft delete
    async fn delete_organization(&self, organization_id: Uuid) -> Result<(), HelpdeskError>;

    async fn get_macro_statistics(
        &self,
        organization_id: Uuid,
    ) -> Result<MacroStatistics, HelpdeskError>;

    // ===== Profiles =====

    async fn get_my_profile(&self) -> Result<ProfileRow, HelpdeskError>;

    async fn create_profile(&self, profile: ProfileInsert) -> Result<ProfileRow, HelpdeskError>;

    async fn update_profile(&self, patch: ProfileUpdate) -> Result<ProfileRow, HelpdeskError>;

    // ===== Members and invitations =====

    async fn list_members(&self, organization_id: Uuid)
        -> Result<Vec<MembershipRow>, HelpdeskError>;

    async fn update_member_role(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
        role: &str,
    ) -> Result<MembershipRow, HelpdeskError>;

    async fn remove_member(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<(), HelpdeskError>;

    async fn invite_member(
        &self,
        organization_id: Uuid,
        email: &str,
        role: Option<&str>,
    ) -> Result<InvitationRow, HelpdeskError>;

    async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<InvitationRow>, HelpdeskError>;

    /// Pending invitations addressed to the caller's email
    async fn list_my_invitations(&self) -> Result<Vec<InvitationRow>, HelpdeskError>;

    async fn accept_invitation(&self, invitation_id: Uuid)
        -> Result<MembershipRow, HelpdeskError>;

    async fn revoke_invitation(&self, invitation_id: Uuid) -> Result<(), HelpdeskError>;

    // ===== Tickets and comments =====

    async fn list_tickets(
        &self,
        organization_id: Uuid,
        filter: TicketFilter,
    ) -> Result<Vec<TicketRow>, HelpdeskError>;

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketRow, HelpdeskError>;

    async fn create_ticket(&self, ticket: TicketInsert) -> Result<TicketRow, HelpdeskError>;

    async fn update_ticket(
        &self,
        ticket_id: Uuid,
        patch: TicketUpdate,
    ) -> Result<TicketRow, HelpdeskError>;

    async fn delete_ticket(&self, ticket_id: Uuid) -> Result<(), HelpdeskError>;

    async fn list_comments(&self, ticket_id: Uuid)
        -> Result<Vec<TicketCommentRow>, HelpdeskError>;

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        comment: &str,
    ) -> Result<TicketCommentRow, HelpdeskError>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<(), HelpdeskError>;

    // ===== Tags =====

    async fn list_tag_keys(&self, organization_id: Uuid) -> Result<Vec<TagKeyRow>, HelpdeskError>;

    async fn create_tag_key(&self, tag_key: TagKeyInsert) -> Result<TagKeyRow, HelpdeskError>;

    async fn delete_tag_key(&self, tag_key_id: Uuid) -> Result<(), HelpdeskError>;

    async fn add_enum_option(
        &self,
        tag_key_id: Uuid,
        value: &str,
    ) -> Result<EnumOptionRow, HelpdeskError>;

    async fn list_enum_options(
        &self,
        tag_key_id: Uuid,
    ) -> Result<Vec<EnumOptionRow>, HelpdeskError>;

    async fn set_ticket_tag(
        &self,
        ticket_id: Uuid,
        tag_key_id: Uuid,
        value: TagValue,
    ) -> Result<TicketTag, HelpdeskError>;

    async fn list_ticket_tags(&self, ticket_id: Uuid) -> Result<Vec<TicketTag>, HelpdeskError>;

    async fn clear_ticket_tag(&self, ticket_id: Uuid, tag_key_id: Uuid)
        -> Result<(), HelpdeskError>;
}
