//! Domain service - business logic orchestration

use super::access::InvitationAccess;
use super::repository::{
    CommentRepository, InvitationRepository, MembershipRepository, OrganizationRepository,
    ProfileRepository, TagRepository, TicketRepository,
};
use super::validation::{
    normalize_email, normalize_role, optional_text, reject_immutable, require_text,
};
use crate::contract::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, MembershipUpdate, OrganizationRow,
    OrganizationUpdate, ProfileInsert, ProfileRow, ProfileUpdate, TagKeyInsert, TagKeyRow,
    TicketCommentRow, TicketInsert, TicketRow, TicketUpdate,
};
use crate::contract::{
    is_admin_role, HelpdeskError, MacroStatistics, SecurityContext, TagType, TagValue,
    TicketFilter, TicketPriority, TicketStatus, TicketTag, ROLE_ADMIN, ROLE_MEMBER,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Storage failures are logged here and surface as an opaque internal error
pub(crate) fn internal(err: anyhow::Error) -> HelpdeskError {
    tracing::error!(error = ?err, "storage operation failed");
    HelpdeskError::Internal
}

/// Repository handles the service is built from
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
}

/// Tunables taken from the module configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 200,
        }
    }
}

/// Domain service for organizations, tickets and tags
pub struct Service {
    pub(crate) repos: Repositories,
    config: ServiceConfig,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, config: ServiceConfig) -> Self {
        Self { repos, config }
    }

    // ===== Organizations =====

    /// Active organizations the caller belongs to, ordered by name
    pub async fn list_organizations(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<OrganizationRow>, HelpdeskError> {
        let memberships = self
            .repos
            .memberships
            .list_by_profile(ctx.profile_id)
            .await
            .map_err(internal)?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.organization_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.repos
            .organizations
            .find_active_by_ids(&ids)
            .await
            .map_err(internal)
    }

    pub async fn get_organization(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
    ) -> Result<OrganizationRow, HelpdeskError> {
        self.member_access(organization_id, ctx.profile_id)
            .await
            .map(|(organization, _)| organization)
    }

    /// Create an organization and record the caller as its admin
    pub async fn create_organization(
        &self,
        ctx: &SecurityContext,
        name: &str,
    ) -> Result<OrganizationRow, HelpdeskError> {
        let name = require_text("name", name)?;
        self.require_profile(ctx).await?;

        let now = Utc::now();
        let organization = OrganizationRow {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let admin = MembershipRow {
            id: Uuid::new_v4(),
            organization_id: organization.id,
            profile_id: ctx.profile_id,
            role: ROLE_ADMIN.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let organization = self
            .repos
            .organizations
            .create_with_admin(&organization, &admin)
            .await
            .map_err(internal)?;

        tracing::info!(
            organization_id = %organization.id,
            profile_id = %ctx.profile_id,
            "organization created"
        );
        Ok(organization)
    }

    pub async fn update_organization(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
        mut patch: OrganizationUpdate,
    ) -> Result<OrganizationRow, HelpdeskError> {
        self.check_is_org_admin(organization_id, ctx.profile_id)
            .await?;
        reject_immutable(&[
            ("id", patch.id.is_some()),
            ("created_at", patch.created_at.is_some()),
            ("deleted_at", patch.deleted_at.is_some()),
        ])?;
        if let Some(name) = patch.name.take() {
            patch.name = Some(require_text("name", &name)?);
        }
        patch.updated_at = Some(Utc::now());

        self.repos
            .organizations
            .update(organization_id, &patch)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("organization", organization_id))
    }

    /// Soft delete; the organization disappears from every listing
    pub async fn delete_organization(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        self.check_is_org_admin(organization_id, ctx.profile_id)
            .await?;
        let deleted = self
            .repos
            .organizations
            .soft_delete(organization_id, Utc::now())
            .await
            .map_err(internal)?;
        if !deleted {
            return Err(HelpdeskError::not_found("organization", organization_id));
        }
        tracing::info!(%organization_id, profile_id = %ctx.profile_id, "organization deleted");
        Ok(())
    }

    /// Ticket counts over active tickets, plus the active member count
    pub async fn get_macro_statistics(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
    ) -> Result<MacroStatistics, HelpdeskError> {
        self.check_is_org_member(organization_id, ctx.profile_id)
            .await?;

        let tickets = self
            .repos
            .tickets
            .list(organization_id, &TicketFilter::default())
            .await
            .map_err(internal)?;
        let members = self
            .repos
            .memberships
            .list_by_organization(organization_id)
            .await
            .map_err(internal)?;

        let mut by_status: BTreeMap<String, u64> = TicketStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_priority: BTreeMap<String, u64> = TicketPriority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        let mut unassigned_tickets = 0;

        for ticket in &tickets {
            *by_status.entry(ticket.status.as_str().to_string()).or_default() += 1;
            *by_priority
                .entry(ticket.priority.as_str().to_string())
                .or_default() += 1;
            if ticket.assigned_to.is_none() {
                unassigned_tickets += 1;
            }
        }

        Ok(MacroStatistics {
            organization_id,
            total_tickets: tickets.len() as u64,
            unassigned_tickets,
            member_count: members.len() as u64,
            by_status,
            by_priority,
        })
    }

    // ===== Profiles =====

    pub async fn get_my_profile(&self, ctx: &SecurityContext) -> Result<ProfileRow, HelpdeskError> {
        self.require_profile(ctx).await
    }

    /// Create the caller's own profile; its id must be the auth identity
    pub async fn create_profile(
        &self,
        ctx: &SecurityContext,
        profile: ProfileInsert,
    ) -> Result<ProfileRow, HelpdeskError> {
        if profile.id != ctx.profile_id {
            return Err(HelpdeskError::forbidden(
                "profile id must match the authenticated identity",
            ));
        }
        let existing = self
            .repos
            .profiles
            .find_active(profile.id)
            .await
            .map_err(internal)?;
        if existing.is_some() {
            return Err(HelpdeskError::conflict(format!(
                "profile already exists: {}",
                profile.id
            )));
        }

        let now = Utc::now();
        let row = ProfileRow {
            id: profile.id,
            full_name: optional_text(profile.full_name),
            avatar_url: optional_text(profile.avatar_url),
            created_at: profile.created_at.unwrap_or(now),
            updated_at: profile.updated_at.unwrap_or(now),
            deleted_at: None,
        };
        let row = self.repos.profiles.create(&row).await.map_err(internal)?;
        tracing::info!(profile_id = %row.id, "profile created");
        Ok(row)
    }

    pub async fn update_profile(
        &self,
        ctx: &SecurityContext,
        mut patch: ProfileUpdate,
    ) -> Result<ProfileRow, HelpdeskError> {
        reject_immutable(&[
            ("id", patch.id.is_some()),
            ("created_at", patch.created_at.is_some()),
            ("deleted_at", patch.deleted_at.is_some()),
        ])?;
        if let Some(full_name) = patch.full_name.take() {
            patch.full_name = Some(optional_text(full_name));
        }
        if let Some(avatar_url) = patch.avatar_url.take() {
            patch.avatar_url = Some(optional_text(avatar_url));
        }
        patch.updated_at = Some(Utc::now());

        self.repos
            .profiles
            .update(ctx.profile_id, &patch)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("profile", ctx.profile_id))
    }

    // ===== Members =====

    pub async fn list_members(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
    ) -> Result<Vec<MembershipRow>, HelpdeskError> {
        self.check_is_org_member(organization_id, ctx.profile_id)
            .await?;
        self.repos
            .memberships
            .list_by_organization(organization_id)
            .await
            .map_err(internal)
    }

    pub async fn update_member_role(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
        profile_id: Uuid,
        role: &str,
    ) -> Result<MembershipRow, HelpdeskError> {
        let role = normalize_role(role)?;
        self.check_is_org_admin(organization_id, ctx.profile_id)
            .await?;
        let target = self.find_member(organization_id, profile_id).await?;

        if is_admin_role(&target.role) && !is_admin_role(&role) {
            self.ensure_other_admin(organization_id, profile_id).await?;
        }

        let patch = MembershipUpdate {
            role: Some(role),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let updated = self
            .repos
            .memberships
            .update(target.id, &patch)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("membership", target.id))?;
        tracing::info!(%organization_id, %profile_id, role = %updated.role, "member role updated");
        Ok(updated)
    }

    /// Admins may remove anyone; members may remove themselves
    pub async fn remove_member(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        if profile_id == ctx.profile_id {
            self.check_is_org_member(organization_id, ctx.profile_id)
                .await?;
        } else {
            self.check_is_org_admin(organization_id, ctx.profile_id)
                .await?;
        }
        let target = self.find_member(organization_id, profile_id).await?;
        if is_admin_role(&target.role) {
            self.ensure_other_admin(organization_id, profile_id).await?;
        }

        self.repos
            .memberships
            .soft_delete(target.id, Utc::now())
            .await
            .map_err(internal)?;
        tracing::info!(%organization_id, %profile_id, "member removed");
        Ok(())
    }

    // ===== Invitations =====

    pub async fn invite_member(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
        email: &str,
        role: Option<&str>,
    ) -> Result<InvitationRow, HelpdeskError> {
        let email = normalize_email(email)?;
        let role = normalize_role(role.unwrap_or(ROLE_MEMBER))?;
        self.check_is_org_admin(organization_id, ctx.profile_id)
            .await?;

        let pending = self
            .repos
            .invitations
            .find_pending(organization_id, &email)
            .await
            .map_err(internal)?;
        if pending.is_some() {
            return Err(HelpdeskError::conflict(format!(
                "{} already has a pending invitation",
                email
            )));
        }

        let now = Utc::now();
        let invitation = InvitationRow {
            id: Uuid::new_v4(),
            organization_id,
            email,
            role,
            invited_by: Some(ctx.profile_id),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let invitation = self
            .repos
            .invitations
            .create(&invitation)
            .await
            .map_err(internal)?;
        tracing::info!(%organization_id, invitation_id = %invitation.id, "member invited");
        Ok(invitation)
    }

    pub async fn list_invitations(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
    ) -> Result<Vec<InvitationRow>, HelpdeskError> {
        self.check_is_org_admin(organization_id, ctx.profile_id)
            .await?;
        self.repos
            .invitations
            .list_by_organization(organization_id)
            .await
            .map_err(internal)
    }

    /// Pending invitations addressed to the caller; empty without an email
    pub async fn list_my_invitations(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<InvitationRow>, HelpdeskError> {
        let Some(email) = ctx.email.as_deref() else {
            return Ok(Vec::new());
        };
        self.repos
            .invitations
            .list_by_email(email)
            .await
            .map_err(internal)
    }

    /// Join the inviting organization with the invited role
    pub async fn accept_invitation(
        &self,
        ctx: &SecurityContext,
        invitation_id: Uuid,
    ) -> Result<MembershipRow, HelpdeskError> {
        let invitation = self.find_invitation(invitation_id).await?;
        if self.check_invitation_access(ctx, &invitation).await? != InvitationAccess::Invitee {
            return Err(HelpdeskError::forbidden(
                "only the invited identity can accept an invitation",
            ));
        }
        self.require_profile(ctx).await?;

        self.repos
            .organizations
            .find_active(invitation.organization_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("organization", invitation.organization_id))?;

        let existing = self
            .repos
            .memberships
            .find_active(invitation.organization_id, ctx.profile_id)
            .await
            .map_err(internal)?;
        if existing.is_some() {
            return Err(HelpdeskError::conflict(
                "already a member of this organization",
            ));
        }

        let now = Utc::now();
        let membership = MembershipRow {
            id: Uuid::new_v4(),
            organization_id: invitation.organization_id,
            profile_id: ctx.profile_id,
            role: invitation.role.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let membership = self
            .repos
            .invitations
            .accept(invitation.id, &membership, now)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("invitation", invitation.id))?;

        tracing::info!(
            organization_id = %membership.organization_id,
            profile_id = %ctx.profile_id,
            "invitation accepted"
        );
        Ok(membership)
    }

    /// Revoked by an admin or declined by the invitee
    pub async fn revoke_invitation(
        &self,
        ctx: &SecurityContext,
        invitation_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        let invitation = self.find_invitation(invitation_id).await?;
        self.check_invitation_access(ctx, &invitation).await?;
        self.repos
            .invitations
            .soft_delete(invitation.id, Utc::now())
            .await
            .map_err(internal)?;
        Ok(())
    }

    // ===== Tickets =====

    pub async fn list_tickets(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
        mut filter: TicketFilter,
    ) -> Result<Vec<TicketRow>, HelpdeskError> {
        self.check_is_org_member(organization_id, ctx.profile_id)
            .await?;
        filter.limit = Some(
            filter
                .limit
                .unwrap_or(self.config.default_page_size)
                .clamp(1, self.config.max_page_size),
        );
        self.repos
            .tickets
            .list(organization_id, &filter)
            .await
            .map_err(internal)
    }

    pub async fn get_ticket(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
    ) -> Result<TicketRow, HelpdeskError> {
        self.ticket_access(ctx, ticket_id)
            .await
            .map(|(ticket, _)| ticket)
    }

    pub async fn create_ticket(
        &self,
        ctx: &SecurityContext,
        ticket: TicketInsert,
    ) -> Result<TicketRow, HelpdeskError> {
        let title = require_text("title", &ticket.title)?;
        if ticket.created_by != ctx.profile_id {
            return Err(HelpdeskError::forbidden(
                "created_by must be the authenticated profile",
            ));
        }
        self.check_is_org_member(ticket.organization_id, ctx.profile_id)
            .await?;
        if let Some(assignee) = ticket.assigned_to {
            self.ensure_assignable(ticket.organization_id, assignee)
                .await?;
        }

        let now = Utc::now();
        let row = TicketRow {
            id: ticket.id.unwrap_or_else(Uuid::new_v4),
            organization_id: ticket.organization_id,
            created_by: ticket.created_by,
            assigned_to: ticket.assigned_to,
            title,
            description: optional_text(ticket.description),
            status: ticket.status.unwrap_or_default(),
            priority: ticket.priority.unwrap_or_default(),
            created_at: ticket.created_at.unwrap_or(now),
            updated_at: ticket.updated_at.unwrap_or(now),
            deleted_at: None,
        };
        let row = self.repos.tickets.create(&row).await.map_err(internal)?;
        tracing::info!(ticket_id = %row.id, organization_id = %row.organization_id, "ticket created");
        Ok(row)
    }

    pub async fn update_ticket(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
        mut patch: TicketUpdate,
    ) -> Result<TicketRow, HelpdeskError> {
        let (ticket, _) = self.ticket_access(ctx, ticket_id).await?;
        reject_immutable(&[
            ("id", patch.id.is_some()),
            ("organization_id", patch.organization_id.is_some()),
            ("created_by", patch.created_by.is_some()),
            ("created_at", patch.created_at.is_some()),
            ("deleted_at", patch.deleted_at.is_some()),
        ])?;
        if let Some(title) = patch.title.take() {
            patch.title = Some(require_text("title", &title)?);
        }
        if let Some(description) = patch.description.take() {
            patch.description = Some(optional_text(description));
        }
        if let Some(Some(assignee)) = patch.assigned_to {
            self.ensure_assignable(ticket.organization_id, assignee)
                .await?;
        }
        patch.updated_at = Some(Utc::now());

        self.repos
            .tickets
            .update(ticket_id, &patch)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("ticket", ticket_id))
    }

    /// Soft delete by the ticket's creator or an organization admin
    pub async fn delete_ticket(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        let (ticket, membership) = self.ticket_access(ctx, ticket_id).await?;
        if ticket.created_by != ctx.profile_id && !is_admin_role(&membership.role) {
            return Err(HelpdeskError::forbidden(
                "only the creator or an admin can delete a ticket",
            ));
        }
        self.repos
            .tickets
            .soft_delete(ticket_id, Utc::now())
            .await
            .map_err(internal)?;
        tracing::info!(%ticket_id, profile_id = %ctx.profile_id, "ticket deleted");
        Ok(())
    }

    // ===== Comments =====

    pub async fn list_comments(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketCommentRow>, HelpdeskError> {
        self.ticket_access(ctx, ticket_id).await?;
        self.repos
            .comments
            .list_by_ticket(ticket_id)
            .await
            .map_err(internal)
    }

    pub async fn add_comment(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
        comment: &str,
    ) -> Result<TicketCommentRow, HelpdeskError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(HelpdeskError::validation("comment is required"));
        }
        self.ticket_access(ctx, ticket_id).await?;

        let now = Utc::now();
        let row = TicketCommentRow {
            id: Uuid::new_v4(),
            ticket_id,
            user_id: ctx.profile_id,
            comment: comment.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.repos.comments.create(&row).await.map_err(internal)
    }

    /// Soft delete by the author or an organization admin
    pub async fn delete_comment(
        &self,
        ctx: &SecurityContext,
        comment_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        let comment = self
            .repos
            .comments
            .find_active(comment_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("comment", comment_id))?;
        let (_, membership) = self.ticket_access(ctx, comment.ticket_id).await?;
        if comment.user_id != ctx.profile_id && !is_admin_role(&membership.role) {
            return Err(HelpdeskError::forbidden(
                "only the author or an admin can delete a comment",
            ));
        }
        self.repos
            .comments
            .soft_delete(comment_id, Utc::now())
            .await
            .map_err(internal)?;
        Ok(())
    }

    // ===== Tags =====

    pub async fn list_tag_keys(
        &self,
        ctx: &SecurityContext,
        organization_id: Uuid,
    ) -> Result<Vec<TagKeyRow>, HelpdeskError> {
        self.check_is_org_member(organization_id, ctx.profile_id)
            .await?;
        self.repos
            .tags
            .list_keys(organization_id)
            .await
            .map_err(internal)
    }

    pub async fn create_tag_key(
        &self,
        ctx: &SecurityContext,
        tag_key: TagKeyInsert,
    ) -> Result<TagKeyRow, HelpdeskError> {
        let name = require_text("name", &tag_key.name)?;
        self.check_is_org_admin(tag_key.organization_id, ctx.profile_id)
            .await?;

        let existing = self
            .repos
            .tags
            .list_keys(tag_key.organization_id)
            .await
            .map_err(internal)?;
        if existing.iter().any(|k| k.name.eq_ignore_ascii_case(&name)) {
            return Err(HelpdeskError::conflict(format!(
                "tag key '{}' already exists",
                name
            )));
        }

        let now = Utc::now();
        let row = TagKeyRow {
            id: tag_key.id.unwrap_or_else(Uuid::new_v4),
            organization_id: tag_key.organization_id,
            name,
            tag_type: tag_key.tag_type,
            description: optional_text(tag_key.description),
            created_at: tag_key.created_at.unwrap_or(now),
            updated_at: tag_key.updated_at.unwrap_or(now),
            deleted_at: None,
        };
        self.repos.tags.create_key(&row).await.map_err(internal)
    }

    pub async fn delete_tag_key(
        &self,
        ctx: &SecurityContext,
        tag_key_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        let key = self.find_tag_key(tag_key_id).await?;
        self.check_is_org_admin(key.organization_id, ctx.profile_id)
            .await?;
        self.repos
            .tags
            .soft_delete_key(tag_key_id, Utc::now())
            .await
            .map_err(internal)?;
        Ok(())
    }

    pub async fn add_enum_option(
        &self,
        ctx: &SecurityContext,
        tag_key_id: Uuid,
        value: &str,
    ) -> Result<EnumOptionRow, HelpdeskError> {
        let value = require_text("value", value)?;
        let key = self.find_tag_key(tag_key_id).await?;
        self.check_is_org_admin(key.organization_id, ctx.profile_id)
            .await?;
        if key.tag_type != TagType::Enum {
            return Err(HelpdeskError::validation(format!(
                "tag key '{}' is of type {}, not enum",
                key.name, key.tag_type
            )));
        }

        let options = self
            .repos
            .tags
            .list_options(tag_key_id)
            .await
            .map_err(internal)?;
        if options.iter().any(|o| o.value == value) {
            return Err(HelpdeskError::conflict(format!(
                "option '{}' already exists",
                value
            )));
        }

        let now = Utc::now();
        let row = EnumOptionRow {
            id: Uuid::new_v4(),
            tag_key_id,
            value,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.repos.tags.create_option(&row).await.map_err(internal)
    }

    pub async fn list_enum_options(
        &self,
        ctx: &SecurityContext,
        tag_key_id: Uuid,
    ) -> Result<Vec<EnumOptionRow>, HelpdeskError> {
        let key = self.find_tag_key(tag_key_id).await?;
        self.check_is_org_member(key.organization_id, ctx.profile_id)
            .await?;
        self.repos
            .tags
            .list_options(tag_key_id)
            .await
            .map_err(internal)
    }

    /// Set the single value of a tag on a ticket
    pub async fn set_ticket_tag(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
        tag_key_id: Uuid,
        value: TagValue,
    ) -> Result<TicketTag, HelpdeskError> {
        let (ticket, _) = self.ticket_access(ctx, ticket_id).await?;
        let key = self.find_tag_key(tag_key_id).await?;
        if key.organization_id != ticket.organization_id {
            return Err(HelpdeskError::validation(
                "tag key belongs to a different organization",
            ));
        }
        if value.tag_type() != key.tag_type {
            return Err(HelpdeskError::validation(format!(
                "tag key '{}' expects a {} value, got {}",
                key.name,
                key.tag_type,
                value.tag_type()
            )));
        }
        match &value {
            TagValue::Number(n) if !n.is_finite() => {
                return Err(HelpdeskError::validation("number tag values must be finite"));
            }
            TagValue::Text(text) if text.trim().is_empty() => {
                return Err(HelpdeskError::validation("text tag values must not be empty"));
            }
            TagValue::Enum(option_id) => {
                let option = self
                    .repos
                    .tags
                    .find_active_option(*option_id)
                    .await
                    .map_err(internal)?
                    .ok_or_else(|| HelpdeskError::not_found("enum option", option_id))?;
                if option.tag_key_id != key.id {
                    return Err(HelpdeskError::validation(
                        "enum option belongs to a different tag key",
                    ));
                }
            }
            _ => {}
        }

        let tag = TicketTag {
            tag_key_id,
            ticket_id,
            value,
        };
        self.repos
            .tags
            .set_value(&tag, Utc::now())
            .await
            .map_err(internal)?;
        Ok(tag)
    }

    /// Values of active tag keys on the ticket
    pub async fn list_ticket_tags(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketTag>, HelpdeskError> {
        let (ticket, _) = self.ticket_access(ctx, ticket_id).await?;
        let keys = self
            .repos
            .tags
            .list_keys(ticket.organization_id)
            .await
            .map_err(internal)?;
        let values = self
            .repos
            .tags
            .list_values(ticket_id)
            .await
            .map_err(internal)?;

        Ok(values
            .into_iter()
            .filter(|v| keys.iter().any(|k| k.id == v.tag_key_id))
            .collect())
    }

    pub async fn clear_ticket_tag(
        &self,
        ctx: &SecurityContext,
        ticket_id: Uuid,
        tag_key_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        self.ticket_access(ctx, ticket_id).await?;
        let key = self.find_tag_key(tag_key_id).await?;
        let cleared = self
            .repos
            .tags
            .clear_value(tag_key_id, ticket_id, key.tag_type, Utc::now())
            .await
            .map_err(internal)?;
        if !cleared {
            return Err(HelpdeskError::not_found(
                "ticket tag",
                format!("{}/{}", ticket_id, tag_key_id),
            ));
        }
        Ok(())
    }

    // ===== Helper Methods =====

    async fn require_profile(&self, ctx: &SecurityContext) -> Result<ProfileRow, HelpdeskError> {
        self.repos
            .profiles
            .find_active(ctx.profile_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("profile", ctx.profile_id))
    }

    async fn find_member(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<MembershipRow, HelpdeskError> {
        self.repos
            .memberships
            .find_active(organization_id, profile_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| {
                HelpdeskError::not_found("membership", format!("{}/{}", organization_id, profile_id))
            })
    }

    async fn find_invitation(&self, invitation_id: Uuid) -> Result<InvitationRow, HelpdeskError> {
        self.repos
            .invitations
            .find_active(invitation_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("invitation", invitation_id))
    }

    async fn find_tag_key(&self, tag_key_id: Uuid) -> Result<TagKeyRow, HelpdeskError> {
        self.repos
            .tags
            .find_active_key(tag_key_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("tag key", tag_key_id))
    }

    async fn ensure_assignable(
        &self,
        organization_id: Uuid,
        assignee: Uuid,
    ) -> Result<(), HelpdeskError> {
        let membership = self
            .repos
            .memberships
            .find_active(organization_id, assignee)
            .await
            .map_err(internal)?;
        if membership.is_none() {
            return Err(HelpdeskError::validation(format!(
                "assignee {} is not a member of the organization",
                assignee
            )));
        }
        Ok(())
    }

    /// An organization always keeps at least one admin
    async fn ensure_other_admin(
        &self,
        organization_id: Uuid,
        leaving: Uuid,
    ) -> Result<(), HelpdeskError> {
        let members = self
            .repos
            .memberships
            .list_by_organization(organization_id)
            .await
            .map_err(internal)?;
        let has_other = members
            .iter()
            .any(|m| m.profile_id != leaving && is_admin_role(&m.role));
        if !has_other {
            return Err(HelpdeskError::conflict(
                "organization must keep at least one admin",
            ));
        }
        Ok(())
    }
}
