//! SeaORM repositories against in-memory SQLite

use chrono::Utc;
use helpdesk_service::contract::schema::{InvitationRow, MembershipRow, OrganizationRow, ProfileRow};
use helpdesk_service::domain::Repositories;
use helpdesk_service::infra::storage;
use std::sync::Arc;
use uuid::Uuid;

async fn repositories() -> Repositories {
    let db = storage::connect("sqlite::memory:").await.unwrap();
    storage::migrate(&db).await.unwrap();
    storage::repositories(Arc::new(db))
}

async fn profile(repos: &Repositories) -> Uuid {
    let now = Utc::now();
    let row = ProfileRow {
        id: Uuid::new_v4(),
        full_name: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    repos.profiles.create(&row).await.unwrap().id
}

fn organization(name: &str) -> OrganizationRow {
    let now = Utc::now();
    OrganizationRow {
        id: Uuid::new_v4(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn membership(organization_id: Uuid, profile_id: Uuid, role: &str) -> MembershipRow {
    let now = Utc::now();
    MembershipRow {
        id: Uuid::new_v4(),
        organization_id,
        profile_id,
        role: role.to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn invitation(organization_id: Uuid, email: &str) -> InvitationRow {
    let now = Utc::now();
    InvitationRow {
        id: Uuid::new_v4(),
        organization_id,
        email: email.to_string(),
        role: "agent".to_string(),
        invited_by: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

#[tokio::test]
async fn organization_is_not_kept_when_its_admin_cannot_be_written() {
    let repos = repositories().await;
    let ada = profile(&repos).await;

    let acme = organization("Acme");
    let admin = membership(acme.id, ada, "admin");
    repos.organizations.create_with_admin(&acme, &admin).await.unwrap();

    // Reusing the membership id makes the second write fail
    let globex = organization("Globex");
    let clash = MembershipRow {
        organization_id: globex.id,
        ..admin.clone()
    };
    assert!(repos.organizations.create_with_admin(&globex, &clash).await.is_err());

    assert!(repos.organizations.find_active(globex.id).await.unwrap().is_none());
    assert!(repos.organizations.find_active(acme.id).await.unwrap().is_some());
    assert_eq!(repos.memberships.list_by_profile(ada).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_acceptance_leaves_the_invitation_pending() {
    let repos = repositories().await;
    let ada = profile(&repos).await;
    let bob = profile(&repos).await;

    let acme = organization("Acme");
    let admin = membership(acme.id, ada, "admin");
    repos.organizations.create_with_admin(&acme, &admin).await.unwrap();
    let invite = invitation(acme.id, "bob@example.com");
    repos.invitations.create(&invite).await.unwrap();

    let clash = MembershipRow {
        profile_id: bob,
        ..admin.clone()
    };
    assert!(repos
        .invitations
        .accept(invite.id, &clash, Utc::now())
        .await
        .is_err());
    assert!(repos.invitations.find_active(invite.id).await.unwrap().is_some());
    assert!(repos.memberships.find_active(acme.id, bob).await.unwrap().is_none());

    let joined = membership(acme.id, bob, "agent");
    let accepted = repos
        .invitations
        .accept(invite.id, &joined, Utc::now())
        .await
        .unwrap();
    assert_eq!(accepted, Some(joined.clone()));
    assert!(repos.invitations.find_active(invite.id).await.unwrap().is_none());
    assert!(repos.memberships.find_active(acme.id, bob).await.unwrap().is_some());

    // Already accepted: nothing more is written
    let again = membership(acme.id, bob, "agent");
    assert_eq!(
        repos.invitations.accept(invite.id, &again, Utc::now()).await.unwrap(),
        None
    );
    assert_eq!(repos.memberships.list_by_organization(acme.id).await.unwrap().len(), 2);
}
