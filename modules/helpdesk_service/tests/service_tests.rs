//! Integration tests for the helpdesk domain service

mod common;

use chrono::NaiveDate;
use common::{caller, mock_service, mock_service_with, open_ticket, signed_up, sqlite_service, ticket};
use helpdesk_service::contract::schema::{OrganizationUpdate, ProfileInsert, TagKeyInsert, TicketUpdate};
use helpdesk_service::domain::ServiceConfig;
use helpdesk_service::{
    HelpdeskError, TagType, TagValue, TicketFilter, TicketPriority, TicketStatus,
};
use uuid::Uuid;

fn tag_key(organization_id: Uuid, name: &str, tag_type: TagType) -> TagKeyInsert {
    TagKeyInsert {
        id: None,
        organization_id,
        name: name.to_string(),
        tag_type,
        description: None,
        created_at: None,
        updated_at: None,
    }
}

// ===== Organizations =====

#[tokio::test]
async fn creating_acme_records_one_organization_and_an_admin_creator() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;

    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    assert_eq!(acme.name, "Acme");
    assert!(acme.deleted_at.is_none());

    let organizations = service.list_organizations(&ada).await.unwrap();
    assert_eq!(organizations.len(), 1);
    assert_eq!(organizations[0].id, acme.id);

    let members = service.list_members(&ada, acme.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].profile_id, ada.profile_id);
    assert_eq!(members[0].role, "admin");
}

#[tokio::test]
async fn blank_organization_name_is_rejected() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;

    let err = service.create_organization(&ada, "   ").await.unwrap_err();
    assert_eq!(err, HelpdeskError::validation("name is required"));
    assert!(service.list_organizations(&ada).await.unwrap().is_empty());
}

#[tokio::test]
async fn organization_creation_requires_a_profile() {
    let service = mock_service();
    let ghost = caller("ghost@example.com");

    let err = service.create_organization(&ghost, "Acme").await.unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[tokio::test]
async fn soft_deleted_organization_disappears_from_listings() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let globex = service.create_organization(&ada, "Globex").await.unwrap();

    service.delete_organization(&ada, acme.id).await.unwrap();

    let names: Vec<String> = service
        .list_organizations(&ada)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.name)
        .collect();
    assert_eq!(names, vec!["Globex".to_string()]);
    assert_eq!(
        service.get_organization(&ada, acme.id).await.unwrap_err().code(),
        "not_found"
    );
    assert!(service.get_organization(&ada, globex.id).await.is_ok());
}

#[tokio::test]
async fn organization_update_is_admin_only_and_rejects_immutable_columns() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let bob = signed_up(&service, "bob@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();

    let rename = OrganizationUpdate {
        name: Some("Acme Corp".to_string()),
        ..Default::default()
    };
    let err = service
        .update_organization(&bob, acme.id, rename.clone())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");

    let renamed = service
        .update_organization(&ada, acme.id, rename)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Acme Corp");

    let undelete = OrganizationUpdate {
        deleted_at: Some(None),
        ..Default::default()
    };
    let err = service
        .update_organization(&ada, acme.id, undelete)
        .await
        .unwrap_err();
    assert_eq!(err, HelpdeskError::validation("cannot update column(s): deleted_at"));
}

// ===== Profiles =====

#[tokio::test]
async fn profile_id_must_match_the_caller() {
    let service = mock_service();
    let ada = caller("ada@example.com");

    let err = service
        .create_profile(
            &ada,
            ProfileInsert {
                id: Uuid::new_v4(),
                full_name: None,
                avatar_url: None,
                created_at: None,
                updated_at: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "forbidden");
}

#[tokio::test]
async fn duplicate_profile_is_a_conflict() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;

    let err = service
        .create_profile(
            &ada,
            ProfileInsert {
                id: ada.profile_id,
                full_name: Some("Ada again".to_string()),
                avatar_url: None,
                created_at: None,
                updated_at: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conflict");
}

// ===== Members and invitations =====

#[tokio::test]
async fn non_members_cannot_read_an_organization() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let mallory = signed_up(&service, "mallory@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();

    let err = service.list_tickets(&mallory, acme.id, TicketFilter::default()).await.unwrap_err();
    assert_eq!(err.code(), "forbidden");
    assert!(service.list_organizations(&mallory).await.unwrap().is_empty());
}

#[tokio::test]
async fn accepted_invitation_grants_the_invited_role_once() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let bob = signed_up(&service, "bob@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();

    let invitation = service
        .invite_member(&ada, acme.id, "  Bob@Example.com ", Some("agent"))
        .await
        .unwrap();
    assert_eq!(invitation.email, "bob@example.com");
    assert_eq!(invitation.invited_by, Some(ada.profile_id));

    let duplicate = service
        .invite_member(&ada, acme.id, "bob@example.com", None)
        .await
        .unwrap_err();
    assert_eq!(duplicate.code(), "conflict");

    let mine = service.list_my_invitations(&bob).await.unwrap();
    assert_eq!(mine.len(), 1);

    // Admins can see it but only the invitee can accept
    let err = service.accept_invitation(&ada, invitation.id).await.unwrap_err();
    assert_eq!(err.code(), "forbidden");

    let membership = service.accept_invitation(&bob, invitation.id).await.unwrap();
    assert_eq!(membership.role, "agent");
    assert_eq!(membership.organization_id, acme.id);

    assert!(service.list_my_invitations(&bob).await.unwrap().is_empty());
    assert!(service.list_invitations(&ada, acme.id).await.unwrap().is_empty());
    assert_eq!(service.list_members(&bob, acme.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn strangers_cannot_touch_an_invitation() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let eve = signed_up(&service, "eve@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let invitation = service
        .invite_member(&ada, acme.id, "bob@example.com", None)
        .await
        .unwrap();

    assert_eq!(
        service.revoke_invitation(&eve, invitation.id).await.unwrap_err().code(),
        "forbidden"
    );
    service.revoke_invitation(&ada, invitation.id).await.unwrap();
    assert_eq!(
        service.revoke_invitation(&ada, invitation.id).await.unwrap_err().code(),
        "not_found"
    );
}

#[tokio::test]
async fn last_admin_cannot_leave_or_be_demoted() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let bob = signed_up(&service, "bob@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let invitation = service
        .invite_member(&ada, acme.id, "bob@example.com", None)
        .await
        .unwrap();
    service.accept_invitation(&bob, invitation.id).await.unwrap();

    let err = service.remove_member(&ada, acme.id, ada.profile_id).await.unwrap_err();
    assert_eq!(err.code(), "conflict");
    let err = service
        .update_member_role(&ada, acme.id, ada.profile_id, "member")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conflict");

    service
        .update_member_role(&ada, acme.id, bob.profile_id, "admin")
        .await
        .unwrap();
    service.remove_member(&ada, acme.id, ada.profile_id).await.unwrap();

    let members = service.list_members(&bob, acme.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].profile_id, bob.profile_id);
}

#[tokio::test]
async fn members_may_leave_but_not_remove_others() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let bob = signed_up(&service, "bob@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let invitation = service
        .invite_member(&ada, acme.id, "bob@example.com", None)
        .await
        .unwrap();
    service.accept_invitation(&bob, invitation.id).await.unwrap();

    let err = service.remove_member(&bob, acme.id, ada.profile_id).await.unwrap_err();
    assert_eq!(err.code(), "forbidden");
    service.remove_member(&bob, acme.id, bob.profile_id).await.unwrap();
    assert!(service.list_organizations(&bob).await.unwrap().is_empty());
}

// ===== Tickets and comments =====

#[tokio::test]
async fn ticket_defaults_and_filters() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();

    let printer = open_ticket(&service, &ada, acme.id, "Printer on fire").await;
    assert_eq!(printer.status, TicketStatus::Open);
    assert_eq!(printer.priority, TicketPriority::Medium);
    assert_eq!(printer.created_by, ada.profile_id);

    let mut urgent = ticket(acme.id, ada.profile_id, "VPN down");
    urgent.priority = Some(TicketPriority::Urgent);
    urgent.assigned_to = Some(ada.profile_id);
    let vpn = service.create_ticket(&ada, urgent).await.unwrap();

    let filter = TicketFilter {
        priority: Some(TicketPriority::Urgent),
        ..Default::default()
    };
    let found = service.list_tickets(&ada, acme.id, filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, vpn.id);

    let filter = TicketFilter {
        assigned_to: Some(ada.profile_id),
        ..Default::default()
    };
    assert_eq!(service.list_tickets(&ada, acme.id, filter).await.unwrap().len(), 1);
}

#[tokio::test]
async fn tickets_are_created_as_the_caller_and_assigned_to_members() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();

    let forged = ticket(acme.id, Uuid::new_v4(), "Spoofed");
    assert_eq!(
        service.create_ticket(&ada, forged).await.unwrap_err().code(),
        "forbidden"
    );

    let mut outsider = ticket(acme.id, ada.profile_id, "Assigned away");
    outsider.assigned_to = Some(Uuid::new_v4());
    assert_eq!(
        service.create_ticket(&ada, outsider).await.unwrap_err().code(),
        "validation"
    );
}

#[tokio::test]
async fn ticket_update_changes_status_and_clears_assignee() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let mut insert = ticket(acme.id, ada.profile_id, "Printer on fire");
    insert.assigned_to = Some(ada.profile_id);
    insert.description = Some("Smoke everywhere".to_string());
    let printer = service.create_ticket(&ada, insert).await.unwrap();

    let patch = TicketUpdate {
        status: Some(TicketStatus::Resolved),
        assigned_to: Some(None),
        ..Default::default()
    };
    let updated = service.update_ticket(&ada, printer.id, patch).await.unwrap();
    assert_eq!(updated.status, TicketStatus::Resolved);
    assert_eq!(updated.assigned_to, None);
    assert_eq!(updated.description.as_deref(), Some("Smoke everywhere"));
    assert_eq!(updated.title, "Printer on fire");

    let moved = TicketUpdate {
        organization_id: Some(Uuid::new_v4()),
        ..Default::default()
    };
    assert_eq!(
        service.update_ticket(&ada, printer.id, moved).await.unwrap_err().code(),
        "validation"
    );
}

#[tokio::test]
async fn soft_deleted_tickets_and_comments_are_hidden() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let keep = open_ticket(&service, &ada, acme.id, "Keep me").await;
    let drop = open_ticket(&service, &ada, acme.id, "Drop me").await;

    let first = service.add_comment(&ada, keep.id, "first").await.unwrap();
    service.add_comment(&ada, keep.id, "second").await.unwrap();
    service.delete_comment(&ada, first.id).await.unwrap();
    service.delete_ticket(&ada, drop.id).await.unwrap();

    let tickets = service
        .list_tickets(&ada, acme.id, TicketFilter::default())
        .await
        .unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, keep.id);
    assert_eq!(
        service.get_ticket(&ada, drop.id).await.unwrap_err().code(),
        "not_found"
    );

    let comments = service.list_comments(&ada, keep.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment, "second");
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let printer = open_ticket(&service, &ada, acme.id, "Printer on fire").await;

    let err = service.add_comment(&ada, printer.id, "  ").await.unwrap_err();
    assert_eq!(err, HelpdeskError::validation("comment is required"));
}

#[tokio::test]
async fn ticket_page_size_is_clamped() {
    let service = mock_service_with(ServiceConfig {
        default_page_size: 2,
        max_page_size: 3,
    });
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    for n in 0..5 {
        open_ticket(&service, &ada, acme.id, &format!("Ticket {}", n)).await;
    }

    let default_page = service
        .list_tickets(&ada, acme.id, TicketFilter::default())
        .await
        .unwrap();
    assert_eq!(default_page.len(), 2);

    let oversized = TicketFilter {
        limit: Some(100),
        ..Default::default()
    };
    assert_eq!(service.list_tickets(&ada, acme.id, oversized).await.unwrap().len(), 3);
}

// ===== Statistics =====

#[tokio::test]
async fn macro_statistics_count_active_rows_only() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();

    let mut assigned = ticket(acme.id, ada.profile_id, "Assigned");
    assigned.assigned_to = Some(ada.profile_id);
    assigned.priority = Some(TicketPriority::High);
    service.create_ticket(&ada, assigned).await.unwrap();
    open_ticket(&service, &ada, acme.id, "Unassigned").await;
    let gone = open_ticket(&service, &ada, acme.id, "Deleted").await;
    service.delete_ticket(&ada, gone.id).await.unwrap();

    let stats = service.get_macro_statistics(&ada, acme.id).await.unwrap();
    assert_eq!(stats.total_tickets, 2);
    assert_eq!(stats.unassigned_tickets, 1);
    assert_eq!(stats.member_count, 1);
    assert_eq!(stats.by_status["open"], 2);
    assert_eq!(stats.by_status["closed"], 0);
    assert_eq!(stats.by_priority["high"], 1);
    assert_eq!(stats.by_priority["medium"], 1);
    assert_eq!(stats.by_priority.len(), 4);
}

// ===== Tags =====

#[tokio::test]
async fn typed_tags_keep_one_value_per_key_and_ticket() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let printer = open_ticket(&service, &ada, acme.id, "Printer on fire").await;

    let floor = service
        .create_tag_key(&ada, tag_key(acme.id, "floor", TagType::Number))
        .await
        .unwrap();
    let due = service
        .create_tag_key(&ada, tag_key(acme.id, "due", TagType::Date))
        .await
        .unwrap();

    service
        .set_ticket_tag(&ada, printer.id, floor.id, TagValue::Number(3.0))
        .await
        .unwrap();
    service
        .set_ticket_tag(&ada, printer.id, floor.id, TagValue::Number(4.0))
        .await
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    service
        .set_ticket_tag(&ada, printer.id, due.id, TagValue::Date(date))
        .await
        .unwrap();

    let tags = service.list_ticket_tags(&ada, printer.id).await.unwrap();
    assert_eq!(tags.len(), 2);
    let floor_value = tags.iter().find(|t| t.tag_key_id == floor.id).unwrap();
    assert_eq!(floor_value.value, TagValue::Number(4.0));

    let mismatch = service
        .set_ticket_tag(&ada, printer.id, floor.id, TagValue::Text("four".to_string()))
        .await
        .unwrap_err();
    assert_eq!(mismatch.code(), "validation");

    service.clear_ticket_tag(&ada, printer.id, floor.id).await.unwrap();
    assert_eq!(
        service.clear_ticket_tag(&ada, printer.id, floor.id).await.unwrap_err().code(),
        "not_found"
    );
    let tags = service.list_ticket_tags(&ada, printer.id).await.unwrap();
    assert_eq!(tags.len(), 1);

    // A cleared value can be set again
    service
        .set_ticket_tag(&ada, printer.id, floor.id, TagValue::Number(5.0))
        .await
        .unwrap();
    assert_eq!(service.list_ticket_tags(&ada, printer.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn racing_tag_writes_leave_a_single_value() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let printer = open_ticket(&service, &ada, acme.id, "Printer on fire").await;
    let floor = service
        .create_tag_key(&ada, tag_key(acme.id, "floor", TagType::Number))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        service.set_ticket_tag(&ada, printer.id, floor.id, TagValue::Number(1.0)),
        service.set_ticket_tag(&ada, printer.id, floor.id, TagValue::Number(2.0)),
    );
    first.unwrap();
    second.unwrap();

    let tags = service.list_ticket_tags(&ada, printer.id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert!(matches!(tags[0].value, TagValue::Number(n) if n == 1.0 || n == 2.0));
}

#[tokio::test]
async fn enum_tags_only_accept_their_own_options() {
    let service = sqlite_service().await;
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let printer = open_ticket(&service, &ada, acme.id, "Printer on fire").await;

    let severity = service
        .create_tag_key(&ada, tag_key(acme.id, "severity", TagType::Enum))
        .await
        .unwrap();
    let area = service
        .create_tag_key(&ada, tag_key(acme.id, "area", TagType::Enum))
        .await
        .unwrap();
    let sev1 = service.add_enum_option(&ada, severity.id, "sev1").await.unwrap();
    let hardware = service.add_enum_option(&ada, area.id, "hardware").await.unwrap();

    assert_eq!(
        service.add_enum_option(&ada, severity.id, "sev1").await.unwrap_err().code(),
        "conflict"
    );

    let wrong = service
        .set_ticket_tag(&ada, printer.id, severity.id, TagValue::Enum(hardware.id))
        .await
        .unwrap_err();
    assert_eq!(wrong.code(), "validation");

    let tag = service
        .set_ticket_tag(&ada, printer.id, severity.id, TagValue::Enum(sev1.id))
        .await
        .unwrap();
    assert_eq!(tag.value, TagValue::Enum(sev1.id));

    let options = service.list_enum_options(&ada, severity.id).await.unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "sev1");
}

#[tokio::test]
async fn tag_keys_are_unique_per_organization_and_hidden_once_deleted() {
    let service = mock_service();
    let ada = signed_up(&service, "ada@example.com").await;
    let acme = service.create_organization(&ada, "Acme").await.unwrap();
    let printer = open_ticket(&service, &ada, acme.id, "Printer on fire").await;

    let floor = service
        .create_tag_key(&ada, tag_key(acme.id, "Floor", TagType::Text))
        .await
        .unwrap();
    let err = service
        .create_tag_key(&ada, tag_key(acme.id, "floor", TagType::Number))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "conflict");

    let not_enum = service.add_enum_option(&ada, floor.id, "x").await.unwrap_err();
    assert_eq!(not_enum.code(), "validation");

    service
        .set_ticket_tag(&ada, printer.id, floor.id, TagValue::Text("3rd".to_string()))
        .await
        .unwrap();
    service.delete_tag_key(&ada, floor.id).await.unwrap();

    assert!(service.list_tag_keys(&ada, acme.id).await.unwrap().is_empty());
    assert!(service.list_ticket_tags(&ada, printer.id).await.unwrap().is_empty());
}
