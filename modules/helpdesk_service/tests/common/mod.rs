//! Common test utilities: service builders, mock repositories and fixtures
#![allow(dead_code)]

use helpdesk_service::contract::schema::{ProfileInsert, ProfileRow, TicketInsert, TicketRow};
use helpdesk_service::domain::{Repositories, Service, ServiceConfig};
use helpdesk_service::infra::storage;
use helpdesk_service::SecurityContext;
use std::sync::Arc;
use uuid::Uuid;

/// Service over SeaORM and a fresh in-memory SQLite database
pub async fn sqlite_service() -> Arc<Service> {
    let db = storage::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    storage::migrate(&db).await.expect("apply migrations");
    let repos = storage::repositories(Arc::new(db));
    Arc::new(Service::new(repos, ServiceConfig::default()))
}

/// Service over the in-memory mock repositories
pub fn mock_service() -> Arc<Service> {
    mock_service_with(ServiceConfig::default())
}

pub fn mock_service_with(config: ServiceConfig) -> Arc<Service> {
    Arc::new(Service::new(mocks::repositories(), config))
}

/// A caller with a fresh identity
pub fn caller(email: &str) -> SecurityContext {
    SecurityContext::new(Uuid::new_v4(), Some(email.to_string()))
}

/// Create the caller's own profile
pub async fn with_profile(service: &Service, ctx: &SecurityContext, name: &str) -> ProfileRow {
    service
        .create_profile(
            ctx,
            ProfileInsert {
                id: ctx.profile_id,
                full_name: Some(name.to_string()),
                avatar_url: None,
                created_at: None,
                updated_at: None,
            },
        )
        .await
        .expect("create profile")
}

/// Signed-in caller with a profile
pub async fn signed_up(service: &Service, email: &str) -> SecurityContext {
    let ctx = caller(email);
    let name = email.split('@').next().unwrap_or(email).to_string();
    with_profile(service, &ctx, &name).await;
    ctx
}

pub fn ticket(organization_id: Uuid, created_by: Uuid, title: &str) -> TicketInsert {
    TicketInsert {
        id: None,
        organization_id,
        created_by,
        assigned_to: None,
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        created_at: None,
        updated_at: None,
    }
}

pub async fn open_ticket(
    service: &Service,
    ctx: &SecurityContext,
    organization_id: Uuid,
    title: &str,
) -> TicketRow {
    service
        .create_ticket(ctx, ticket(organization_id, ctx.profile_id, title))
        .await
        .expect("create ticket")
}

// Mock repository implementations for testing
pub mod mocks {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use helpdesk_service::contract::schema::{
        EnumOptionRow, InvitationRow, MembershipRow, MembershipUpdate, OrganizationRow,
        OrganizationUpdate, ProfileUpdate, TagKeyRow, TicketCommentRow, TicketUpdate,
    };
    use helpdesk_service::domain::{
        CommentRepository, InvitationRepository, MembershipRepository, OrganizationRepository,
        ProfileRepository, TagRepository, TicketRepository,
    };
    use helpdesk_service::{TagType, TicketFilter, TicketTag};
    use parking_lot::RwLock;
    use std::collections::HashMap;

    type Table<T> = Arc<RwLock<HashMap<Uuid, T>>>;

    pub fn repositories() -> Repositories {
        // Organizations and invitations write memberships in the same step
        let memberships: Table<MembershipRow> = Arc::default();
        Repositories {
            organizations: Arc::new(MockOrganizationRepo {
                rows: Table::default(),
                memberships: memberships.clone(),
            }),
            profiles: Arc::new(MockProfileRepo::default()),
            memberships: Arc::new(MockMembershipRepo {
                rows: memberships.clone(),
            }),
            invitations: Arc::new(MockInvitationRepo {
                rows: Table::default(),
                memberships,
            }),
            tickets: Arc::new(MockTicketRepo::default()),
            comments: Arc::new(MockCommentRepo::default()),
            tags: Arc::new(MockTagRepo::default()),
        }
    }

    fn set<T>(slot: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *slot = value;
        }
    }

    /// Insert unless the profile already holds an active membership
    fn insert_membership(
        rows: &mut HashMap<Uuid, MembershipRow>,
        membership: &MembershipRow,
    ) -> Result<()> {
        let duplicate = rows.values().any(|m| {
            m.deleted_at.is_none()
                && (m.id == membership.id
                    || (m.organization_id == membership.organization_id
                        && m.profile_id == membership.profile_id))
        });
        if duplicate {
            anyhow::bail!("unique violation: organization_members(organization_id, profile_id)");
        }
        rows.insert(membership.id, membership.clone());
        Ok(())
    }

    pub struct MockOrganizationRepo {
        rows: Table<OrganizationRow>,
        memberships: Table<MembershipRow>,
    }

    #[async_trait]
    impl OrganizationRepository for MockOrganizationRepo {
        async fn create_with_admin(
            &self,
            organization: &OrganizationRow,
            admin: &MembershipRow,
        ) -> Result<OrganizationRow> {
            let mut rows = self.rows.write();
            insert_membership(&mut self.memberships.write(), admin)?;
            rows.insert(organization.id, organization.clone());
            Ok(organization.clone())
        }

        async fn find_active(&self, id: Uuid) -> Result<Option<OrganizationRow>> {
            Ok(self
                .rows
                .read()
                .get(&id)
                .filter(|o| o.deleted_at.is_none())
                .cloned())
        }

        async fn find_active_by_ids(&self, ids: &[Uuid]) -> Result<Vec<OrganizationRow>> {
            let mut rows: Vec<OrganizationRow> = self
                .rows
                .read()
                .values()
                .filter(|o| o.deleted_at.is_none() && ids.contains(&o.id))
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(rows)
        }

        async fn update(
            &self,
            id: Uuid,
            patch: &OrganizationUpdate,
        ) -> Result<Option<OrganizationRow>> {
            let mut rows = self.rows.write();
            let Some(row) = rows.get_mut(&id).filter(|o| o.deleted_at.is_none()) else {
                return Ok(None);
            };
            set(&mut row.name, patch.name.clone());
            set(&mut row.updated_at, patch.updated_at);
            Ok(Some(row.clone()))
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
            let mut rows = self.rows.write();
            match rows.get_mut(&id).filter(|o| o.deleted_at.is_none()) {
                Some(row) => {
                    row.deleted_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    pub struct MockProfileRepo {
        rows: Table<ProfileRow>,
    }

    #[async_trait]
    impl ProfileRepository for MockProfileRepo {
        async fn create(&self, profile: &ProfileRow) -> Result<ProfileRow> {
            self.rows.write().insert(profile.id, profile.clone());
            Ok(profile.clone())
        }

        async fn find_active(&self, id: Uuid) -> Result<Option<ProfileRow>> {
            Ok(self
                .rows
                .read()
                .get(&id)
                .filter(|p| p.deleted_at.is_none())
                .cloned())
        }

        async fn update(&self, id: Uuid, patch: &ProfileUpdate) -> Result<Option<ProfileRow>> {
            let mut rows = self.rows.write();
            let Some(row) = rows.get_mut(&id).filter(|p| p.deleted_at.is_none()) else {
                return Ok(None);
            };
            set(&mut row.full_name, patch.full_name.clone());
            set(&mut row.avatar_url, patch.avatar_url.clone());
            set(&mut row.updated_at, patch.updated_at);
            Ok(Some(row.clone()))
        }
    }

    pub struct MockMembershipRepo {
        rows: Table<MembershipRow>,
    }

    #[async_trait]
    impl MembershipRepository for MockMembershipRepo {
        async fn find_active(
            &self,
            organization_id: Uuid,
            profile_id: Uuid,
        ) -> Result<Option<MembershipRow>> {
            Ok(self
                .rows
                .read()
                .values()
                .find(|m| {
                    m.deleted_at.is_none()
                        && m.organization_id == organization_id
                        && m.profile_id == profile_id
                })
                .cloned())
        }

        async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<MembershipRow>> {
            let mut rows: Vec<MembershipRow> = self
                .rows
                .read()
                .values()
                .filter(|m| m.deleted_at.is_none() && m.organization_id == organization_id)
                .cloned()
                .collect();
            rows.sort_by_key(|m| m.created_at);
            Ok(rows)
        }

        async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<MembershipRow>> {
            Ok(self
                .rows
                .read()
                .values()
                .filter(|m| m.deleted_at.is_none() && m.profile_id == profile_id)
                .cloned()
                .collect())
        }

        async fn update(
            &self,
            id: Uuid,
            patch: &MembershipUpdate,
        ) -> Result<Option<MembershipRow>> {
            let mut rows = self.rows.write();
            let Some(row) = rows.get_mut(&id).filter(|m| m.deleted_at.is_none()) else {
                return Ok(None);
            };
            set(&mut row.role, patch.role.clone());
            set(&mut row.updated_at, patch.updated_at);
            Ok(Some(row.clone()))
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
            let mut rows = self.rows.write();
            match rows.get_mut(&id).filter(|m| m.deleted_at.is_none()) {
                Some(row) => {
                    row.deleted_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    pub struct MockInvitationRepo {
        rows: Table<InvitationRow>,
        memberships: Table<MembershipRow>,
    }

    impl MockInvitationRepo {
        fn active(&self, keep: impl Fn(&InvitationRow) -> bool) -> Vec<InvitationRow> {
            let mut rows: Vec<InvitationRow> = self
                .rows
                .read()
                .values()
                .filter(|i| i.deleted_at.is_none() && keep(i))
                .cloned()
                .collect();
            rows.sort_by_key(|i| i.created_at);
            rows
        }
    }

    #[async_trait]
    impl InvitationRepository for MockInvitationRepo {
        async fn create(&self, invitation: &InvitationRow) -> Result<InvitationRow> {
            self.rows.write().insert(invitation.id, invitation.clone());
            Ok(invitation.clone())
        }

        async fn find_active(&self, id: Uuid) -> Result<Option<InvitationRow>> {
            Ok(self.active(|i| i.id == id).into_iter().next())
        }

        async fn find_pending(
            &self,
            organization_id: Uuid,
            email: &str,
        ) -> Result<Option<InvitationRow>> {
            Ok(self
                .active(|i| i.organization_id == organization_id && i.email == email)
                .into_iter()
                .next())
        }

        async fn list_by_organization(&self, organization_id: Uuid) -> Result<Vec<InvitationRow>> {
            Ok(self.active(|i| i.organization_id == organization_id))
        }

        async fn list_by_email(&self, email: &str) -> Result<Vec<InvitationRow>> {
            Ok(self.active(|i| i.email == email))
        }

        async fn accept(
            &self,
            invitation_id: Uuid,
            membership: &MembershipRow,
            at: DateTime<Utc>,
        ) -> Result<Option<MembershipRow>> {
            let mut rows = self.rows.write();
            let Some(invitation) = rows
                .get_mut(&invitation_id)
                .filter(|i| i.deleted_at.is_none())
            else {
                return Ok(None);
            };
            insert_membership(&mut self.memberships.write(), membership)?;
            invitation.deleted_at = Some(at);
            Ok(Some(membership.clone()))
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
            let mut rows = self.rows.write();
            match rows.get_mut(&id).filter(|i| i.deleted_at.is_none()) {
                Some(row) => {
                    row.deleted_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    pub struct MockTicketRepo {
        rows: Table<TicketRow>,
    }

    #[async_trait]
    impl TicketRepository for MockTicketRepo {
        async fn create(&self, ticket: &TicketRow) -> Result<TicketRow> {
            self.rows.write().insert(ticket.id, ticket.clone());
            Ok(ticket.clone())
        }

        async fn find_active(&self, id: Uuid) -> Result<Option<TicketRow>> {
            Ok(self
                .rows
                .read()
                .get(&id)
                .filter(|t| t.deleted_at.is_none())
                .cloned())
        }

        async fn list(&self, organization_id: Uuid, filter: &TicketFilter) -> Result<Vec<TicketRow>> {
            let mut rows: Vec<TicketRow> = self
                .rows
                .read()
                .values()
                .filter(|t| t.deleted_at.is_none() && t.organization_id == organization_id)
                .filter(|t| filter.status.map_or(true, |s| t.status == s))
                .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
                .filter(|t| filter.assigned_to.map_or(true, |a| t.assigned_to == Some(a)))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let offset = filter.offset.unwrap_or(0) as usize;
            let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
            Ok(rows.into_iter().skip(offset).take(limit).collect())
        }

        async fn update(&self, id: Uuid, patch: &TicketUpdate) -> Result<Option<TicketRow>> {
            let mut rows = self.rows.write();
            let Some(row) = rows.get_mut(&id).filter(|t| t.deleted_at.is_none()) else {
                return Ok(None);
            };
            set(&mut row.assigned_to, patch.assigned_to);
            set(&mut row.title, patch.title.clone());
            set(&mut row.description, patch.description.clone());
            set(&mut row.status, patch.status);
            set(&mut row.priority, patch.priority);
            set(&mut row.updated_at, patch.updated_at);
            Ok(Some(row.clone()))
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
            let mut rows = self.rows.write();
            match rows.get_mut(&id).filter(|t| t.deleted_at.is_none()) {
                Some(row) => {
                    row.deleted_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    pub struct MockCommentRepo {
        rows: Table<TicketCommentRow>,
    }

    #[async_trait]
    impl CommentRepository for MockCommentRepo {
        async fn create(&self, comment: &TicketCommentRow) -> Result<TicketCommentRow> {
            self.rows.write().insert(comment.id, comment.clone());
            Ok(comment.clone())
        }

        async fn find_active(&self, id: Uuid) -> Result<Option<TicketCommentRow>> {
            Ok(self
                .rows
                .read()
                .get(&id)
                .filter(|c| c.deleted_at.is_none())
                .cloned())
        }

        async fn list_by_ticket(&self, ticket_id: Uuid) -> Result<Vec<TicketCommentRow>> {
            let mut rows: Vec<TicketCommentRow> = self
                .rows
                .read()
                .values()
                .filter(|c| c.deleted_at.is_none() && c.ticket_id == ticket_id)
                .cloned()
                .collect();
            rows.sort_by_key(|c| c.created_at);
            Ok(rows)
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
            let mut rows = self.rows.write();
            match rows.get_mut(&id).filter(|c| c.deleted_at.is_none()) {
                Some(row) => {
                    row.deleted_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    pub struct MockTagRepo {
        keys: Table<TagKeyRow>,
        options: Table<EnumOptionRow>,
        values: Arc<RwLock<HashMap<(Uuid, Uuid), TicketTag>>>,
    }

    #[async_trait]
    impl TagRepository for MockTagRepo {
        async fn create_key(&self, key: &TagKeyRow) -> Result<TagKeyRow> {
            self.keys.write().insert(key.id, key.clone());
            Ok(key.clone())
        }

        async fn find_active_key(&self, id: Uuid) -> Result<Option<TagKeyRow>> {
            Ok(self
                .keys
                .read()
                .get(&id)
                .filter(|k| k.deleted_at.is_none())
                .cloned())
        }

        async fn list_keys(&self, organization_id: Uuid) -> Result<Vec<TagKeyRow>> {
            let mut rows: Vec<TagKeyRow> = self
                .keys
                .read()
                .values()
                .filter(|k| k.deleted_at.is_none() && k.organization_id == organization_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(rows)
        }

        async fn soft_delete_key(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
            let mut keys = self.keys.write();
            match keys.get_mut(&id).filter(|k| k.deleted_at.is_none()) {
                Some(row) => {
                    row.deleted_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn create_option(&self, option: &EnumOptionRow) -> Result<EnumOptionRow> {
            self.options.write().insert(option.id, option.clone());
            Ok(option.clone())
        }

        async fn find_active_option(&self, id: Uuid) -> Result<Option<EnumOptionRow>> {
            Ok(self
                .options
                .read()
                .get(&id)
                .filter(|o| o.deleted_at.is_none())
                .cloned())
        }

        async fn list_options(&self, tag_key_id: Uuid) -> Result<Vec<EnumOptionRow>> {
            let mut rows: Vec<EnumOptionRow> = self
                .options
                .read()
                .values()
                .filter(|o| o.deleted_at.is_none() && o.tag_key_id == tag_key_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.value.cmp(&b.value));
            Ok(rows)
        }

        async fn set_value(&self, tag: &TicketTag, _at: DateTime<Utc>) -> Result<()> {
            self.values
                .write()
                .insert((tag.tag_key_id, tag.ticket_id), tag.clone());
            Ok(())
        }

        async fn list_values(&self, ticket_id: Uuid) -> Result<Vec<TicketTag>> {
            let mut rows: Vec<TicketTag> = self
                .values
                .read()
                .values()
                .filter(|t| t.ticket_id == ticket_id)
                .cloned()
                .collect();
            rows.sort_by_key(|t| t.tag_key_id);
            Ok(rows)
        }

        async fn clear_value(
            &self,
            tag_key_id: Uuid,
            ticket_id: Uuid,
            tag_type: TagType,
            _at: DateTime<Utc>,
        ) -> Result<bool> {
            let mut values = self.values.write();
            let matches = values
                .get(&(tag_key_id, ticket_id))
                .is_some_and(|t| t.value.tag_type() == tag_type);
            if matches {
                values.remove(&(tag_key_id, ticket_id));
            }
            Ok(matches)
        }
    }
}
