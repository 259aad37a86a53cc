//! Organization access checks
//!
//! Every row is scoped by organization, directly or through its ticket or
//! tag key. Reads and ticket-level writes need an active membership;
//! organization settings, members, invitations and tag keys need the admin
//! role.

use super::service::{internal, Service};
use crate::contract::schema::{InvitationRow, MembershipRow, OrganizationRow, TicketRow};
use crate::contract::{is_admin_role, HelpdeskError, SecurityContext};
use uuid::Uuid;

/// How a caller may act on an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAccess {
    /// The invitation is addressed to the caller
    Invitee,
    /// The caller administers the inviting organization
    Admin,
}

impl Service {
    /// Active organization plus the caller's active membership in it
    pub(crate) async fn member_access(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<(OrganizationRow, MembershipRow), HelpdeskError> {
        let organization = self
            .repos
            .organizations
            .find_active(organization_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("organization", organization_id))?;

        let membership = self
            .repos
            .memberships
            .find_active(organization_id, profile_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| {
                tracing::warn!(%organization_id, %profile_id, "rejected non-member access");
                HelpdeskError::forbidden(format!(
                    "not a member of organization {}",
                    organization_id
                ))
            })?;

        Ok((organization, membership))
    }

    /// Fail unless `profile_id` is an active member of the organization
    pub async fn check_is_org_member(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<MembershipRow, HelpdeskError> {
        self.member_access(organization_id, profile_id)
            .await
            .map(|(_, membership)| membership)
    }

    /// Fail unless `profile_id` holds the admin role in the organization
    pub async fn check_is_org_admin(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<MembershipRow, HelpdeskError> {
        let membership = self.check_is_org_member(organization_id, profile_id).await?;
        if !is_admin_role(&membership.role) {
            tracing::warn!(%organization_id, %profile_id, role = %membership.role, "rejected non-admin access");
            return Err(HelpdeskError::forbidden(format!(
                "admin role required in organization {}",
                organization_id
            )));
        }
        Ok(membership)
    }

    /// Invitee (by email, case-insensitive) or an admin of the organization
    pub async fn check_invitation_access(
        &self,
        ctx: &SecurityContext,
        invitation: &InvitationRow,
    ) -> Result<InvitationAccess, HelpdeskError> {
        let is_invitee = ctx
            .email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&invitation.email));
        if is_invitee {
            return Ok(InvitationAccess::Invitee);
        }

        self.check_is_org_admin(invitation.organization_id, ctx.profile_id)
            .await
            .map(|_| InvitationAccess::Admin)
    }

    /// Active ticket the caller can see, with the caller's membership
    pub(crate) async fn ticket_access(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
    ) -> Result<(TicketRow, MembershipRow), HelpdeskError> {
        let ticket = self
            .repos
            .tickets
            .find_active(ticket_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("ticket", ticket_id))?;
        let membership = self
            .check_is_org_member(ticket.organization_id, ctx.profile_id)
            .await?;
        Ok((ticket, membership))
    }
}
