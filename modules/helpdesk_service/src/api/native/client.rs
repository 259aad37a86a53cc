//! Native client implementation - wraps domain service for in-process calls

use crate::contract::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, OrganizationRow, OrganizationUpdate,
    ProfileInsert, ProfileRow, ProfileUpdate, TagKeyInsert, TagKeyRow, TicketCommentRow,
    TicketInsert, TicketRow, TicketUpdate,
};
use crate::contract::{
    HelpdeskApi, HelpdeskError, MacroStatistics, SecurityContext, TagValue, TicketFilter,
    TicketTag,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Native client that calls the domain service directly on behalf of one
/// caller, without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
    ctx: SecurityContext,
}

impl NativeClient {
    /// Create a new native client acting as `ctx`
    pub fn new(service: Arc<Service>, ctx: SecurityContext) -> Self {
        Self { service, ctx }
    }

    /// Same service, different caller
    pub fn with_context(&self, ctx: SecurityContext) -> Self {
        Self {
            service: self.service.clone(),
            ctx,
        }
    }

    pub fn context(&self) -> &SecurityContext {
        &self.ctx
    }
}

#[async_trait]
impl HelpdeskApi for NativeClient {
    async fn list_organizations(&self) -> Result<Vec<OrganizationRow>, HelpdeskError> {
        self.service.list_organizations(&self.ctx).await
    }

    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<OrganizationRow, HelpdeskError> {
        self.service.get_organization(&self.ctx, organization_id).await
    }

    async fn create_organization(&self, name: &str) -> Result<OrganizationRow, HelpdeskError> {
        self.service.create_organization(&self.ctx, name).await
    }

    async fn update_organization(
        &self,
        organization_id: Uuid,
        patch: OrganizationUpdate,
    ) -> Result<OrganizationRow, HelpdeskError> {
        self.service
            .update_organization(&self.ctx, organization_id, patch)
            .await
    }

    async fn delete_organization(&self, organization_id: Uuid) -> Result<(), HelpdeskError> {
        self.service
            .delete_organization(&self.ctx, organization_id)
            .await
    }

    async fn get_macro_statistics(
        &self,
        organization_id: Uuid,
    ) -> Result<MacroStatistics, HelpdeskError> {
        self.service
            .get_macro_statistics(&self.ctx, organization_id)
            .await
    }

    async fn get_my_profile(&self) -> Result<ProfileRow, HelpdeskError> {
        self.service.get_my_profile(&self.ctx).await
    }

    async fn create_profile(&self, profile: ProfileInsert) -> Result<ProfileRow, HelpdeskError> {
        self.service.create_profile(&self.ctx, profile).await
    }

    async fn update_profile(&self, patch: ProfileUpdate) -> Result<ProfileRow, HelpdeskError> {
        self.service.update_profile(&self.ctx, patch).await
    }

    async fn list_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MembershipRow>, HelpdeskError> {
        self.service.list_members(&self.ctx, organization_id).await
    }

    async fn update_member_role(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
        role: &str,
    ) -> Result<MembershipRow, HelpdeskError> {
        self.service
            .update_member_role(&self.ctx, organization_id, profile_id, role)
            .await
    }

    async fn remove_member(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        self.service
            .remove_member(&self.ctx, organization_id, profile_id)
            .await
    }

    async fn invite_member(
        &self,
        organization_id: Uuid,
        email: &str,
        role: Option<&str>,
    ) -> Result<InvitationRow, HelpdeskError> {
        self.service
            .invite_member(&self.ctx, organization_id, email, role)
            .await
    }

    async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<InvitationRow>, HelpdeskError> {
        self.service.list_invitations(&self.ctx, organization_id).await
    }

    async fn list_my_invitations(&self) -> Result<Vec<InvitationRow>, HelpdeskError> {
        self.service.list_my_invitations(&self.ctx).await
    }

    async fn accept_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<MembershipRow, HelpdeskError> {
        self.service.accept_invitation(&self.ctx, invitation_id).await
    }

    async fn revoke_invitation(&self, invitation_id: Uuid) -> Result<(), HelpdeskError> {
        self.service.revoke_invitation(&self.ctx, invitation_id).await
    }

    async fn list_tickets(
        &self,
        organization_id: Uuid,
        filter: TicketFilter,
    ) -> Result<Vec<TicketRow>, HelpdeskError> {
        self.service
            .list_tickets(&self.ctx, organization_id, filter)
            .await
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketRow, HelpdeskError> {
        self.service.get_ticket(&self.ctx, ticket_id).await
    }

    async fn create_ticket(&self, ticket: TicketInsert) -> Result<TicketRow, HelpdeskError> {
        self.service.create_ticket(&self.ctx, ticket).await
    }

    async fn update_ticket(
        &self,
        ticket_id: Uuid,
        patch: TicketUpdate,
    ) -> Result<TicketRow, HelpdeskError> {
        self.service.update_ticket(&self.ctx, ticket_id, patch).await
    }

    async fn delete_ticket(&self, ticket_id: Uuid) -> Result<(), HelpdeskError> {
        self.service.delete_ticket(&self.ctx, ticket_id).await
    }

    async fn list_comments(
        &self,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketCommentRow>, HelpdeskError> {
        self.service.list_comments(&self.ctx, ticket_id).await
    }

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        comment: &str,
    ) -> Result<TicketCommentRow, HelpdeskError> {
        self.service.add_comment(&self.ctx, ticket_id, comment).await
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<(), HelpdeskError> {
        self.service.delete_comment(&self.ctx, comment_id).await
    }

    async fn list_tag_keys(&self, organization_id: Uuid) -> Result<Vec<TagKeyRow>, HelpdeskError> {
        self.service.list_tag_keys(&self.ctx, organization_id).await
    }

    async fn create_tag_key(&self, tag_key: TagKeyInsert) -> Result<TagKeyRow, HelpdeskError> {
        self.service.create_tag_key(&self.ctx, tag_key).await
    }

    async fn delete_tag_key(&self, tag_key_id: Uuid) -> Result<(), HelpdeskError> {
        self.service.delete_tag_key(&self.ctx, tag_key_id).await
    }

    async fn add_enum_option(
        &self,
        tag_key_id: Uuid,
        value: &str,
    ) -> Result<EnumOptionRow, HelpdeskError> {
        self.service
            .add_enum_option(&self.ctx, tag_key_id, value)
            .await
    }

    async fn list_enum_options(
        &self,
        tag_key_id: Uuid,
    ) -> Result<Vec<EnumOptionRow>, HelpdeskError> {
        self.service.list_enum_options(&self.ctx, tag_key_id).await
    }

    async fn set_ticket_tag(
        &self,
        ticket_id: Uuid,
        tag_key_id: Uuid,
        value: TagValue,
    ) -> Result<TicketTag, HelpdeskError> {
        self.service
            .set_ticket_tag(&self.ctx, ticket_id, tag_key_id, value)
            .await
    }

    async fn list_ticket_tags(&self, ticket_id: Uuid) -> Result<Vec<TicketTag>, HelpdeskError> {
        self.service.list_ticket_tags(&self.ctx, ticket_id).await
    }

    async fn clear_ticket_tag(
        &self,
        ticket_id: Uuid,
        tag_key_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        self.service
            .clear_ticket_tag(&self.ctx, ticket_id, tag_key_id)
            .await
    }
}
