//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs
//!
//! Every `find_*`/`list_*` method returns active rows only (`deleted_at` is
//! null). Soft deletion sets `deleted_at` and reports whether an active row
//! was affected.

use crate::contract::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, MembershipUpdate, OrganizationRow,
    OrganizationUpdate, ProfileRow, ProfileUpdate, TagKeyRow, TicketCommentRow, TicketRow,
    TicketUpdate,
};
use crate::contract::{TagType, TicketFilter, TicketTag};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert the organization and its first admin membership atomically
    async fn create_with_admin(
        &self,
        organization: &OrganizationRow,
        admin: &MembershipRow,
    ) -> Result<OrganizationRow>;

    async fn find_active(&self, id: Uuid) -> Result<Option<OrganizationRow>>;

    /// Active organizations among `ids`, ordered by name
    async fn find_active_by_ids(&self, ids: &[Uuid]) -> Result<Vec<OrganizationRow>>;

    async fn update(&self, id: Uuid, patch: &OrganizationUpdate)
        -> Result<Option<OrganizationRow>>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: &ProfileRow) -> Result<ProfileRow>;

    async fn find_active(&self, id: Uuid) -> Result<Option<ProfileRow>>;

    async fn update(&self, id: Uuid, patch: &ProfileUpdate) -> Result<Option<ProfileRow>>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_active(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<MembershipRow>>;

    /// Ordered by creation time
    async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<MembershipRow>>;

    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<MembershipRow>>;

    async fn update(&self, id: Uuid, patch: &MembershipUpdate) -> Result<Option<MembershipRow>>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &InvitationRow) -> Result<InvitationRow>;

    async fn find_active(&self, id: Uuid) -> Result<Option<InvitationRow>>;

    async fn find_pending(&self, organization_id: Uuid, email: &str)
        -> Result<Option<InvitationRow>>;

    async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<InvitationRow>>;

    /// `email` is expected to be normalized (lowercase)
    async fn list_by_email(&self, email: &str) -> Result<Vec<InvitationRow>>;

    /// Insert `membership` and soft delete the invitation atomically.
    /// `None` when the invitation is no longer pending; nothing is written.
    async fn accept(
        &self,
        invitation_id: Uuid,
        membership: &MembershipRow,
        at: DateTime<Utc>,
    ) -> Result<Option<MembershipRow>>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: &TicketRow) -> Result<TicketRow>;

    async fn find_active(&self, id: Uuid) -> Result<Option<TicketRow>>;

    /// Newest first; `filter.limit`/`filter.offset` are applied when set
    async fn list(&self, organization_id: Uuid, filter: &TicketFilter) -> Result<Vec<TicketRow>>;

    async fn update(&self, id: Uuid, patch: &TicketUpdate) -> Result<Option<TicketRow>>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &TicketCommentRow) -> Result<TicketCommentRow>;

    async fn find_active(&self, id: Uuid) -> Result<Option<TicketCommentRow>>;

    /// Oldest first
    async fn list_by_ticket(&self, ticket_id: Uuid) -> Result<Vec<TicketCommentRow>>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

/// Tag keys, enum options and the four value tables
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create_key(&self, key: &TagKeyRow) -> Result<TagKeyRow>;

    async fn find_active_key(&self, id: Uuid) -> Result<Option<TagKeyRow>>;

    /// Ordered by name
    async fn list_keys(&self, organization_id: Uuid) -> Result<Vec<TagKeyRow>>;

    async fn soft_delete_key(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;

    async fn create_option(&self, option: &EnumOptionRow) -> Result<EnumOptionRow>;

    async fn find_active_option(&self, id: Uuid) -> Result<Option<EnumOptionRow>>;

    /// Ordered by value
    async fn list_options(&self, tag_key_id: Uuid) -> Result<Vec<EnumOptionRow>>;

    /// Write the single value row for (tag key, ticket) in the table matching
    /// the value's type, reviving a previously cleared row
    async fn set_value(&self, tag: &TicketTag, at: DateTime<Utc>) -> Result<()>;

    /// Active values across all value tables
    async fn list_values(&self, ticket_id: Uuid) -> Result<Vec<TicketTag>>;

    async fn clear_value(
        &self,
        tag_key_id: Uuid,
        ticket_id: Uuid,
        tag_type: TagType,
        at: DateTime<Utc>,
    ) -> Result<bool>;
}
