//! SeaORM repository implementations

use crate::contract::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, MembershipUpdate, OrganizationRow,
    OrganizationUpdate, ProfileRow, ProfileUpdate, TagKeyRow, TicketCommentRow, TicketRow,
    TicketUpdate,
};
use crate::contract::{TagType, TagValue, TicketFilter, TicketTag};
use crate::domain::repository::{
    CommentRepository, InvitationRepository, MembershipRepository, OrganizationRepository,
    ProfileRepository, TagRepository, TicketRepository,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, sea_query::OnConflict, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entity::{
    enum_option, enum_value, invitation, membership, organization, profile, tag_date_value,
    tag_key, tag_number_value, tag_text_value, ticket, ticket_comment,
};

/// Soft delete one active row by id, stamping `deleted_at` and `updated_at`
macro_rules! soft_delete_by_id {
    ($module:ident, $db:expr, $id:expr, $at:expr) => {{
        let result = $module::Entity::update_many()
            .col_expr($module::Column::DeletedAt, Expr::value($at))
            .col_expr($module::Column::UpdatedAt, Expr::value($at))
            .filter($module::Column::Id.eq($id))
            .filter($module::Column::DeletedAt.is_null())
            .exec($db)
            .await?;
        Ok(result.rows_affected > 0)
    }};
}

// ===== Organization Repository =====

pub struct SeaOrmOrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmOrganizationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationRepository for SeaOrmOrganizationRepository {
    async fn create_with_admin(
        &self,
        row: &OrganizationRow,
        admin: &MembershipRow,
    ) -> Result<OrganizationRow> {
        let txn = self.db.begin().await?;

        let active: organization::ActiveModel = row.into();
        organization::Entity::insert(active)
            .exec_without_returning(&txn)
            .await?;
        let active: membership::ActiveModel = admin.into();
        membership::Entity::insert(active)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(row.clone())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<OrganizationRow>> {
        let result = organization::Entity::find_by_id(id)
            .filter(organization::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn find_active_by_ids(&self, ids: &[Uuid]) -> Result<Vec<OrganizationRow>> {
        let results = organization::Entity::find()
            .filter(organization::Column::Id.is_in(ids.iter().copied()))
            .filter(organization::Column::DeletedAt.is_null())
            .order_by_asc(organization::Column::Name)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &OrganizationUpdate,
    ) -> Result<Option<OrganizationRow>> {
        let active: organization::ActiveModel = patch.into();
        organization::Entity::update_many()
            .set(active)
            .filter(organization::Column::Id.eq(id))
            .filter(organization::Column::DeletedAt.is_null())
            .exec(&*self.db)
            .await?;

        self.find_active(id).await
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        soft_delete_by_id!(organization, &*self.db, id, at)
    }
}

// ===== Profile Repository =====

pub struct SeaOrmProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmProfileRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmProfileRepository {
    async fn create(&self, row: &ProfileRow) -> Result<ProfileRow> {
        let active: profile::ActiveModel = row.into();
        profile::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(row.clone())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<ProfileRow>> {
        let result = profile::Entity::find_by_id(id)
            .filter(profile::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, id: Uuid, patch: &ProfileUpdate) -> Result<Option<ProfileRow>> {
        let active: profile::ActiveModel = patch.into();
        profile::Entity::update_many()
            .set(active)
            .filter(profile::Column::Id.eq(id))
            .filter(profile::Column::DeletedAt.is_null())
            .exec(&*self.db)
            .await?;

        self.find_active(id).await
    }
}

// ===== Membership Repository =====

pub struct SeaOrmMembershipRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmMembershipRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MembershipRepository for SeaOrmMembershipRepository {
    async fn find_active(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<MembershipRow>> {
        let result = membership::Entity::find()
            .filter(membership::Column::OrganizationId.eq(organization_id))
            .filter(membership::Column::ProfileId.eq(profile_id))
            .filter(membership::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<MembershipRow>> {
        let results = membership::Entity::find()
            .filter(membership::Column::OrganizationId.eq(organization_id))
            .filter(membership::Column::DeletedAt.is_null())
            .order_by_asc(membership::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<MembershipRow>> {
        let results = membership::Entity::find()
            .filter(membership::Column::ProfileId.eq(profile_id))
            .filter(membership::Column::DeletedAt.is_null())
            .order_by_asc(membership::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, patch: &MembershipUpdate) -> Result<Option<MembershipRow>> {
        let active: membership::ActiveModel = patch.into();
        membership::Entity::update_many()
            .set(active)
            .filter(membership::Column::Id.eq(id))
            .filter(membership::Column::DeletedAt.is_null())
            .exec(&*self.db)
            .await?;

        let result = membership::Entity::find_by_id(id)
            .filter(membership::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        soft_delete_by_id!(membership, &*self.db, id, at)
    }
}

// ===== Invitation Repository =====

pub struct SeaOrmInvitationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmInvitationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvitationRepository for SeaOrmInvitationRepository {
    async fn create(&self, row: &InvitationRow) -> Result<InvitationRow> {
        let active: invitation::ActiveModel = row.into();
        invitation::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(row.clone())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<InvitationRow>> {
        let result = invitation::Entity::find_by_id(id)
            .filter(invitation::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn find_pending(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<InvitationRow>> {
        let result = invitation::Entity::find()
            .filter(invitation::Column::OrganizationId.eq(organization_id))
            .filter(invitation::Column::Email.eq(email))
            .filter(invitation::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<InvitationRow>> {
        let results = invitation::Entity::find()
            .filter(invitation::Column::OrganizationId.eq(organization_id))
            .filter(invitation::Column::DeletedAt.is_null())
            .order_by_asc(invitation::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<InvitationRow>> {
        // Invitations of deleted organizations are hidden as well
        let results = invitation::Entity::find()
            .inner_join(organization::Entity)
            .filter(invitation::Column::Email.eq(email))
            .filter(invitation::Column::DeletedAt.is_null())
            .filter(organization::Column::DeletedAt.is_null())
            .order_by_asc(invitation::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn accept(
        &self,
        invitation_id: Uuid,
        row: &MembershipRow,
        at: DateTime<Utc>,
    ) -> Result<Option<MembershipRow>> {
        let txn = self.db.begin().await?;

        let accepted = invitation::Entity::update_many()
            .col_expr(invitation::Column::DeletedAt, Expr::value(at))
            .col_expr(invitation::Column::UpdatedAt, Expr::value(at))
            .filter(invitation::Column::Id.eq(invitation_id))
            .filter(invitation::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;
        if accepted.rows_affected == 0 {
            return Ok(None);
        }

        let active: membership::ActiveModel = row.into();
        membership::Entity::insert(active)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        soft_delete_by_id!(invitation, &*self.db, id, at)
    }
}

// ===== Ticket Repository =====

pub struct SeaOrmTicketRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTicketRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TicketRepository for SeaOrmTicketRepository {
    async fn create(&self, row: &TicketRow) -> Result<TicketRow> {
        let active: ticket::ActiveModel = row.into();
        ticket::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(row.clone())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<TicketRow>> {
        let result = ticket::Entity::find_by_id(id)
            .filter(ticket::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        result.map(TryInto::try_into).transpose()
    }

    async fn list(&self, organization_id: Uuid, filter: &TicketFilter) -> Result<Vec<TicketRow>> {
        let mut query = ticket::Entity::find()
            .filter(ticket::Column::OrganizationId.eq(organization_id))
            .filter(ticket::Column::DeletedAt.is_null());

        if let Some(status) = filter.status {
            query = query.filter(ticket::Column::Status.eq(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(ticket::Column::Priority.eq(priority.as_str()));
        }
        if let Some(assignee) = filter.assigned_to {
            query = query.filter(ticket::Column::AssignedTo.eq(assignee));
        }

        let results = query
            .order_by_desc(ticket::Column::CreatedAt)
            .order_by_asc(ticket::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>>>()
    }

    async fn update(&self, id: Uuid, patch: &TicketUpdate) -> Result<Option<TicketRow>> {
        let active: ticket::ActiveModel = patch.into();
        ticket::Entity::update_many()
            .set(active)
            .filter(ticket::Column::Id.eq(id))
            .filter(ticket::Column::DeletedAt.is_null())
            .exec(&*self.db)
            .await?;

        self.find_active(id).await
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        soft_delete_by_id!(ticket, &*self.db, id, at)
    }
}

// ===== Comment Repository =====

pub struct SeaOrmCommentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCommentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for SeaOrmCommentRepository {
    async fn create(&self, row: &TicketCommentRow) -> Result<TicketCommentRow> {
        let active: ticket_comment::ActiveModel = row.into();
        ticket_comment::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(row.clone())
    }

    async fn find_active(&self, id: Uuid) -> Result<Option<TicketCommentRow>> {
        let result = ticket_comment::Entity::find_by_id(id)
            .filter(ticket_comment::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn list_by_ticket(&self, ticket_id: Uuid) -> Result<Vec<TicketCommentRow>> {
        let results = ticket_comment::Entity::find()
            .filter(ticket_comment::Column::TicketId.eq(ticket_id))
            .filter(ticket_comment::Column::DeletedAt.is_null())
            .order_by_asc(ticket_comment::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        soft_delete_by_id!(ticket_comment, &*self.db, id, at)
    }
}

// ===== Tag Repository =====

pub struct SeaOrmTagRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTagRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Upsert the (tag key, ticket) row of one value table; a cleared row is
/// revived in place and the unique (ticket, key) index arbitrates racing
/// writers
macro_rules! upsert_value {
    ($module:ident, $db:expr, $tag:expr, $at:expr, $field:ident, $column:ident, $value:expr) => {{
        let active = $module::ActiveModel {
            id: Set(Uuid::new_v4()),
            tag_key_id: Set($tag.tag_key_id),
            ticket_id: Set($tag.ticket_id),
            $field: Set($value),
            created_at: Set($at),
            updated_at: Set($at),
            deleted_at: Set(None),
        };
        $module::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([$module::Column::TicketId, $module::Column::TagKeyId])
                    .update_columns([
                        $module::Column::$column,
                        $module::Column::UpdatedAt,
                        $module::Column::DeletedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning($db)
            .await?;
    }};
}

/// Soft delete the active (tag key, ticket) row of one value table
macro_rules! clear_value_in {
    ($module:ident, $db:expr, $tag_key_id:expr, $ticket_id:expr, $at:expr) => {{
        $module::Entity::update_many()
            .col_expr($module::Column::DeletedAt, Expr::value($at))
            .col_expr($module::Column::UpdatedAt, Expr::value($at))
            .filter($module::Column::TagKeyId.eq($tag_key_id))
            .filter($module::Column::TicketId.eq($ticket_id))
            .filter($module::Column::DeletedAt.is_null())
            .exec($db)
            .await?
            .rows_affected
    }};
}

#[async_trait]
impl TagRepository for SeaOrmTagRepository {
    async fn create_key(&self, row: &TagKeyRow) -> Result<TagKeyRow> {
        let active: tag_key::ActiveModel = row.into();
        tag_key::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(row.clone())
    }

    async fn find_active_key(&self, id: Uuid) -> Result<Option<TagKeyRow>> {
        let result = tag_key::Entity::find_by_id(id)
            .filter(tag_key::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        result.map(TryInto::try_into).transpose()
    }

    async fn list_keys(&self, organization_id: Uuid) -> Result<Vec<TagKeyRow>> {
        let results = tag_key::Entity::find()
            .filter(tag_key::Column::OrganizationId.eq(organization_id))
            .filter(tag_key::Column::DeletedAt.is_null())
            .order_by_asc(tag_key::Column::Name)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>>>()
    }

    async fn soft_delete_key(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        soft_delete_by_id!(tag_key, &*self.db, id, at)
    }

    async fn create_option(&self, row: &EnumOptionRow) -> Result<EnumOptionRow> {
        let active: enum_option::ActiveModel = row.into();
        enum_option::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(row.clone())
    }

    async fn find_active_option(&self, id: Uuid) -> Result<Option<EnumOptionRow>> {
        let result = enum_option::Entity::find_by_id(id)
            .filter(enum_option::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn list_options(&self, tag_key_id: Uuid) -> Result<Vec<EnumOptionRow>> {
        let results = enum_option::Entity::find()
            .filter(enum_option::Column::TagKeyId.eq(tag_key_id))
            .filter(enum_option::Column::DeletedAt.is_null())
            .order_by_asc(enum_option::Column::Value)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn set_value(&self, tag: &TicketTag, at: DateTime<Utc>) -> Result<()> {
        let db = &*self.db;
        match &tag.value {
            TagValue::Text(text) => {
                upsert_value!(tag_text_value, db, tag, at, value, Value, text.clone())
            }
            TagValue::Number(number) => {
                upsert_value!(tag_number_value, db, tag, at, value, Value, *number)
            }
            TagValue::Date(date) => {
                upsert_value!(tag_date_value, db, tag, at, value, Value, *date)
            }
            TagValue::Enum(option_id) => {
                upsert_value!(enum_value, db, tag, at, enum_option_id, EnumOptionId, *option_id)
            }
        }
        Ok(())
    }

    async fn list_values(&self, ticket_id: Uuid) -> Result<Vec<TicketTag>> {
        let db = &*self.db;
        let mut tags = Vec::new();

        let texts = tag_text_value::Entity::find()
            .filter(tag_text_value::Column::TicketId.eq(ticket_id))
            .filter(tag_text_value::Column::DeletedAt.is_null())
            .all(db)
            .await?;
        tags.extend(texts.into_iter().map(|v| TicketTag {
            tag_key_id: v.tag_key_id,
            ticket_id: v.ticket_id,
            value: TagValue::Text(v.value),
        }));

        let numbers = tag_number_value::Entity::find()
            .filter(tag_number_value::Column::TicketId.eq(ticket_id))
            .filter(tag_number_value::Column::DeletedAt.is_null())
            .all(db)
            .await?;
        tags.extend(numbers.into_iter().map(|v| TicketTag {
            tag_key_id: v.tag_key_id,
            ticket_id: v.ticket_id,
            value: TagValue::Number(v.value),
        }));

        let dates = tag_date_value::Entity::find()
            .filter(tag_date_value::Column::TicketId.eq(ticket_id))
            .filter(tag_date_value::Column::DeletedAt.is_null())
            .all(db)
            .await?;
        tags.extend(dates.into_iter().map(|v| TicketTag {
            tag_key_id: v.tag_key_id,
            ticket_id: v.ticket_id,
            value: TagValue::Date(v.value),
        }));

        let enums = enum_value::Entity::find()
            .filter(enum_value::Column::TicketId.eq(ticket_id))
            .filter(enum_value::Column::DeletedAt.is_null())
            .all(db)
            .await?;
        tags.extend(enums.into_iter().map(|v| TicketTag {
            tag_key_id: v.tag_key_id,
            ticket_id: v.ticket_id,
            value: TagValue::Enum(v.enum_option_id),
        }));

        tags.sort_by_key(|t| t.tag_key_id);
        Ok(tags)
    }

    async fn clear_value(
        &self,
        tag_key_id: Uuid,
        ticket_id: Uuid,
        tag_type: TagType,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let db = &*self.db;
        let rows_affected = match tag_type {
            TagType::Text => {
                clear_value_in!(tag_text_value, db, tag_key_id, ticket_id, at)
            }
            TagType::Number => {
                clear_value_in!(tag_number_value, db, tag_key_id, ticket_id, at)
            }
            TagType::Date => {
                clear_value_in!(tag_date_value, db, tag_key_id, ticket_id, at)
            }
            TagType::Enum => {
                clear_value_in!(enum_value, db, tag_key_id, ticket_id, at)
            }
        };
        Ok(rows_affected > 0)
    }
}
