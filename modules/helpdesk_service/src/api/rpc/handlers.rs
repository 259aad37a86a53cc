//! HTTP request handlers - decode each call, dispatch it to the domain
//! service and encode the result

use super::dto::{RpcCall, RpcRequest, RpcResponse, RpcResult};
use super::error::map_rejection;
use super::routes::RpcState;
use crate::contract::ops::{
    AddCommentInput, AddEnumOptionInput, CommentRef, CreateOrganizationInput, InvitationRef,
    InviteMemberInput, ListTicketsInput, MemberRef, OrganizationRef, SetTicketTagInput,
    TagKeyRef, TicketRef, TicketTagRef, UpdateMemberRoleInput,
};
use crate::contract::schema::{
    parse_insert, parse_update, Organizations, Profiles, Relation, TagKeys, Tickets,
};
use crate::contract::{ErrorBody, HelpdeskError, Operation, SecurityContext};
use crate::domain::Service;
use axum::{
    extract::rejection::JsonRejection,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// `POST /rpc`
#[utoipa::path(
    post,
    path = "/rpc",
    request_body = RpcRequest,
    responses(
        (status = 200, description = "Per-call results in call order", body = RpcResponse),
        (status = 401, description = "Missing or invalid bearer token; every call fails", body = RpcResponse),
        (status = 400, description = "Malformed batch body (problem details)"),
    ),
    tag = "rpc"
)]
pub async fn rpc(
    Extension(state): Extension<Arc<RpcState>>,
    headers: HeaderMap,
    body: Result<Json<RpcRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return map_rejection(rejection).into_response(),
    };

    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let ctx = match state.verifier.verify_header(header) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!(calls = request.calls.len(), "rejected unauthenticated batch");
            let body = ErrorBody::from(&err);
            let results = request
                .calls
                .into_iter()
                .map(|call| RpcResult::err(call.id, body.clone()))
                .collect();
            return (StatusCode::UNAUTHORIZED, Json(RpcResponse { results })).into_response();
        }
    };

    let mut results = Vec::with_capacity(request.calls.len());
    for call in request.calls {
        results.push(run_call(&state.service, &ctx, call).await);
    }

    (StatusCode::OK, Json(RpcResponse { results })).into_response()
}

/// `GET /health`
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Service is up", body = String)), tag = "rpc")]
pub async fn health() -> &'static str {
    "ok"
}

async fn run_call(service: &Service, ctx: &SecurityContext, call: RpcCall) -> RpcResult {
    let RpcCall { id, op, input } = call;
    let outcome = match op.parse::<Operation>() {
        Ok(op) => {
            tracing::debug!(%op, call_id = %id, profile_id = %ctx.profile_id, "dispatching call");
            dispatch(service, ctx, op, input).await
        }
        Err(unknown) => Err(HelpdeskError::validation(unknown.to_string())),
    };

    match outcome {
        Ok(data) => RpcResult::ok(id, data),
        Err(err) => RpcResult::err(id, ErrorBody::from(&err)),
    }
}

/// Decode an operation input; `null` is treated as an empty object
fn decode<T: DeserializeOwned>(input: Value) -> Result<T, HelpdeskError> {
    let input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input
    };
    serde_json::from_value(input)
        .map_err(|e| HelpdeskError::validation(format!("invalid input: {}", e)))
}

/// Split the `patch` member off an update input and check it against the
/// column metadata of `R`; the remainder carries the target ids
fn split_patch<R: Relation>(input: Value) -> Result<(Value, R::Update), HelpdeskError> {
    let mut input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input
    };
    let patch = input
        .as_object_mut()
        .and_then(|object| object.remove("patch"))
        .unwrap_or(Value::Null);
    Ok((input, parse_update::<R>(patch)?))
}

fn encode<T: Serialize>(output: T) -> Result<Value, HelpdeskError> {
    serde_json::to_value(output).map_err(|e| {
        tracing::error!(error = %e, "failed to encode result");
        HelpdeskError::Internal
    })
}

/// Run one operation against the service as `ctx`
pub async fn dispatch(
    service: &Service,
    ctx: &SecurityContext,
    op: Operation,
    input: Value,
) -> Result<Value, HelpdeskError> {
    match op {
        Operation::ListOrganizations => encode(service.list_organizations(ctx).await?),
        Operation::GetOrganization => {
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.get_organization(ctx, organization_id).await?)
        }
        Operation::CreateOrganization => {
            let CreateOrganizationInput { name } = decode(input)?;
            encode(service.create_organization(ctx, &name).await?)
        }
        Operation::UpdateOrganization => {
            let (input, patch) = split_patch::<Organizations>(input)?;
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.update_organization(ctx, organization_id, patch).await?)
        }
        Operation::DeleteOrganization => {
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.delete_organization(ctx, organization_id).await?)
        }
        Operation::GetMacroStatistics => {
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.get_macro_statistics(ctx, organization_id).await?)
        }

        Operation::GetMyProfile => encode(service.get_my_profile(ctx).await?),
        Operation::CreateProfile => {
            let profile = parse_insert::<Profiles>(input)?;
            encode(service.create_profile(ctx, profile).await?)
        }
        Operation::UpdateProfile => {
            let (_, patch) = split_patch::<Profiles>(input)?;
            encode(service.update_profile(ctx, patch).await?)
        }

        Operation::ListMembers => {
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.list_members(ctx, organization_id).await?)
        }
        Operation::UpdateMemberRole => {
            let UpdateMemberRoleInput {
                organization_id,
                profile_id,
                role,
            } = decode(input)?;
            encode(
                service
                    .update_member_role(ctx, organization_id, profile_id, &role)
                    .await?,
            )
        }
        Operation::RemoveMember => {
            let MemberRef {
                organization_id,
                profile_id,
            } = decode(input)?;
            encode(service.remove_member(ctx, organization_id, profile_id).await?)
        }

        Operation::InviteMember => {
            let InviteMemberInput {
                organization_id,
                email,
                role,
            } = decode(input)?;
            encode(
                service
                    .invite_member(ctx, organization_id, &email, role.as_deref())
                    .await?,
            )
        }
        Operation::ListInvitations => {
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.list_invitations(ctx, organization_id).await?)
        }
        Operation::ListMyInvitations => encode(service.list_my_invitations(ctx).await?),
        Operation::AcceptInvitation => {
            let InvitationRef { invitation_id } = decode(input)?;
            encode(service.accept_invitation(ctx, invitation_id).await?)
        }
        Operation::RevokeInvitation => {
            let InvitationRef { invitation_id } = decode(input)?;
            encode(service.revoke_invitation(ctx, invitation_id).await?)
        }

        Operation::ListTickets => {
            let ListTicketsInput {
                organization_id,
                filter,
            } = decode(input)?;
            encode(service.list_tickets(ctx, organization_id, filter).await?)
        }
        Operation::GetTicket => {
            let TicketRef { ticket_id } = decode(input)?;
            encode(service.get_ticket(ctx, ticket_id).await?)
        }
        Operation::CreateTicket => {
            let ticket = parse_insert::<Tickets>(input)?;
            encode(service.create_ticket(ctx, ticket).await?)
        }
        Operation::UpdateTicket => {
            let (input, patch) = split_patch::<Tickets>(input)?;
            let TicketRef { ticket_id } = decode(input)?;
            encode(service.update_ticket(ctx, ticket_id, patch).await?)
        }
        Operation::DeleteTicket => {
            let TicketRef { ticket_id } = decode(input)?;
            encode(service.delete_ticket(ctx, ticket_id).await?)
        }

        Operation::ListComments => {
            let TicketRef { ticket_id } = decode(input)?;
            encode(service.list_comments(ctx, ticket_id).await?)
        }
        Operation::AddComment => {
            let AddCommentInput { ticket_id, comment } = decode(input)?;
            encode(service.add_comment(ctx, ticket_id, &comment).await?)
        }
        Operation::DeleteComment => {
            let CommentRef { comment_id } = decode(input)?;
            encode(service.delete_comment(ctx, comment_id).await?)
        }

        Operation::ListTagKeys => {
            let OrganizationRef { organization_id } = decode(input)?;
            encode(service.list_tag_keys(ctx, organization_id).await?)
        }
        Operation::CreateTagKey => {
            let tag_key = parse_insert::<TagKeys>(input)?;
            encode(service.create_tag_key(ctx, tag_key).await?)
        }
        Operation::DeleteTagKey => {
            let TagKeyRef { tag_key_id } = decode(input)?;
            encode(service.delete_tag_key(ctx, tag_key_id).await?)
        }
        Operation::AddEnumOption => {
            let AddEnumOptionInput { tag_key_id, value } = decode(input)?;
            encode(service.add_enum_option(ctx, tag_key_id, &value).await?)
        }
        Operation::ListEnumOptions => {
            let TagKeyRef { tag_key_id } = decode(input)?;
            encode(service.list_enum_options(ctx, tag_key_id).await?)
        }
        Operation::SetTicketTag => {
            let SetTicketTagInput {
                ticket_id,
                tag_key_id,
                value,
            } = decode(input)?;
            encode(
                service
                    .set_ticket_tag(ctx, ticket_id, tag_key_id, value)
                    .await?,
            )
        }
        Operation::ListTicketTags => {
            let TicketRef { ticket_id } = decode(input)?;
            encode(service.list_ticket_tags(ctx, ticket_id).await?)
        }
        Operation::ClearTicketTag => {
            let TicketTagRef {
                ticket_id,
                tag_key_id,
            } = decode(input)?;
            encode(service.clear_ticket_tag(ctx, ticket_id, tag_key_id).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ops::NoInput;
    use serde_json::json;

    #[test]
    fn null_input_decodes_as_empty_object() {
        let _: NoInput = decode(Value::Null).unwrap();
    }

    #[test]
    fn bad_input_is_a_validation_error() {
        let err = decode::<TicketRef>(json!({"ticket_id": "nope"})).unwrap_err();
        assert_eq!(err.code(), "validation");
        assert!(err.message().starts_with("invalid input:"), "{}", err.message());
    }

    #[test]
    fn update_patches_are_checked_against_the_catalog() {
        let ticket_id = uuid::Uuid::new_v4();

        let err = split_patch::<Tickets>(json!({"ticket_id": ticket_id, "patch": {"title": null}}))
            .unwrap_err();
        assert_eq!(err.code(), "validation");
        assert!(err.message().contains("column 'title' is not nullable"), "{}", err.message());

        let err = split_patch::<Tickets>(json!({"ticket_id": ticket_id})).unwrap_err();
        assert!(err.message().contains("payload must be a JSON object"), "{}", err.message());

        let (rest, patch) =
            split_patch::<Tickets>(json!({"ticket_id": ticket_id, "patch": {"assigned_to": null}}))
                .unwrap();
        assert_eq!(rest, json!({"ticket_id": ticket_id}));
        assert_eq!(patch.assigned_to, Some(None));
    }

    #[test]
    fn unit_results_encode_as_null() {
        assert_eq!(encode(()).unwrap(), Value::Null);
    }
}
