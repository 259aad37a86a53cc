//! Remote client - posts named operations to `{api_url}/rpc`
//!
//! Every request carries `Authorization` built from the session store at
//! send time, so signing in or out takes effect on the next call. Failures
//! are returned as-is; nothing is retried.

use crate::api::rpc::dto::{RpcCall, RpcRequest, RpcResponse, RpcResult};
use crate::auth::SessionStore;
use crate::config::ClientConfig;
use crate::contract::ops::{
    AddCommentInput, AddEnumOptionInput, CommentRef, CreateOrganizationInput, InvitationRef,
    InviteMemberInput, ListTicketsInput, MemberRef, NoInput, OrganizationRef, SetTicketTagInput,
    TagKeyRef, TicketRef, TicketTagRef, UpdateMemberRoleInput, UpdateOrganizationInput,
    UpdateProfileInput, UpdateTicketInput,
};
use crate::contract::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, OrganizationRow, OrganizationUpdate,
    ProfileInsert, ProfileRow, ProfileUpdate, TagKeyInsert, TagKeyRow, TicketCommentRow,
    TicketInsert, TicketRow, TicketUpdate,
};
use crate::contract::{
    HelpdeskApi, HelpdeskError, MacroStatistics, Operation, TagValue, TicketFilter, TicketTag,
};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    api_url: String,
    sessions: SessionStore,
}

impl RemoteClient {
    pub fn new(http: reqwest::Client, config: &ClientConfig, sessions: SessionStore) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Send a batch and return the per-call results in call order
    pub async fn batch(&self, calls: Vec<RpcCall>) -> Result<Vec<RpcResult>, HelpdeskError> {
        let url = format!("{}/rpc", self.api_url);
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.sessions.authorization_header())
            .json(&RpcRequest { calls })
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        match serde_json::from_str::<RpcResponse>(&text) {
            // A rejected batch still carries per-call errors
            Ok(body) => Ok(body.results),
            Err(_) if status == reqwest::StatusCode::UNAUTHORIZED => {
                Err(HelpdeskError::unauthorized("not signed in"))
            }
            Err(e) => {
                tracing::warn!(%status, error = %e, "unreadable RPC response");
                Err(HelpdeskError::Rpc {
                    code: status.as_u16().to_string(),
                    message: problem_detail(&text)
                        .unwrap_or_else(|| format!("RPC request failed ({})", status)),
                })
            }
        }
    }

    async fn call<I, O>(&self, op: Operation, input: I) -> Result<O, HelpdeskError>
    where
        I: Serialize + Send,
        O: DeserializeOwned,
    {
        let input = serde_json::to_value(input).map_err(|e| {
            tracing::error!(%op, error = %e, "failed to encode input");
            HelpdeskError::Internal
        })?;
        let call = RpcCall {
            id: "0".to_string(),
            op: op.as_str().to_string(),
            input,
        };

        let result = self
            .batch(vec![call])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HelpdeskError::Rpc {
                code: "empty".to_string(),
                message: format!("no result for {}", op),
            })?;

        if let Some(error) = result.error {
            tracing::debug!(%op, code = %error.code, "remote call failed");
            return Err(error.into());
        }
        serde_json::from_value(result.data.unwrap_or(Value::Null)).map_err(|e| {
            HelpdeskError::Rpc {
                code: "decode".to_string(),
                message: format!("unexpected result for {}: {}", op, e),
            }
        })
    }
}

fn transport(err: reqwest::Error) -> HelpdeskError {
    tracing::warn!(error = %err, "RPC endpoint unreachable");
    HelpdeskError::Transport {
        message: err.to_string(),
    }
}

/// `detail` or `title` of a problem+json body
fn problem_detail(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    value
        .get("detail")
        .or_else(|| value.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl HelpdeskApi for RemoteClient {
    async fn list_organizations(&self) -> Result<Vec<OrganizationRow>, HelpdeskError> {
        self.call(Operation::ListOrganizations, NoInput {}).await
    }

    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<OrganizationRow, HelpdeskError> {
        self.call(Operation::GetOrganization, OrganizationRef { organization_id })
            .await
    }

    async fn create_organization(&self, name: &str) -> Result<OrganizationRow, HelpdeskError> {
        let input = CreateOrganizationInput {
            name: name.to_string(),
        };
        self.call(Operation::CreateOrganization, input).await
    }

    async fn update_organization(
        &self,
        organization_id: Uuid,
        patch: OrganizationUpdate,
    ) -> Result<OrganizationRow, HelpdeskError> {
        let input = UpdateOrganizationInput {
            organization_id,
            patch,
        };
        self.call(Operation::UpdateOrganization, input).await
    }

    async fn delete_organization(&self, organization_id: Uuid) -> Result<(), HelpdeskError> {
        self.call(Operation::DeleteOrganization, OrganizationRef { organization_id })
            .await
    }

    async fn get_macro_statistics(
        &self,
        organization_id: Uuid,
    ) -> Result<MacroStatistics, HelpdeskError> {
        self.call(Operation::GetMacroStatistics, OrganizationRef { organization_id })
            .await
    }

    async fn get_my_profile(&self) -> Result<ProfileRow, HelpdeskError> {
        self.call(Operation::GetMyProfile, NoInput {}).await
    }

    async fn create_profile(&self, profile: ProfileInsert) -> Result<ProfileRow, HelpdeskError> {
        self.call(Operation::CreateProfile, profile).await
    }

    async fn update_profile(&self, patch: ProfileUpdate) -> Result<ProfileRow, HelpdeskError> {
        self.call(Operation::UpdateProfile, UpdateProfileInput { patch })
            .await
    }

    async fn list_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MembershipRow>, HelpdeskError> {
        self.call(Operation::ListMembers, OrganizationRef { organization_id })
            .await
    }

    async fn update_member_role(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
        role: &str,
    ) -> Result<MembershipRow, HelpdeskError> {
        let input = UpdateMemberRoleInput {
            organization_id,
            profile_id,
            role: role.to_string(),
        };
        self.call(Operation::UpdateMemberRole, input).await
    }

    async fn remove_member(
        &self,
        organization_id: Uuid,
        profile_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        let input = MemberRef {
            organization_id,
            profile_id,
        };
        self.call(Operation::RemoveMember, input).await
    }

    async fn invite_member(
        &self,
        organization_id: Uuid,
        email: &str,
        role: Option<&str>,
    ) -> Result<InvitationRow, HelpdeskError> {
        let input = InviteMemberInput {
            organization_id,
            email: email.to_string(),
            role: role.map(str::to_string),
        };
        self.call(Operation::InviteMember, input).await
    }

    async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<InvitationRow>, HelpdeskError> {
        self.call(Operation::ListInvitations, OrganizationRef { organization_id })
            .await
    }

    async fn list_my_invitations(&self) -> Result<Vec<InvitationRow>, HelpdeskError> {
        self.call(Operation::ListMyInvitations, NoInput {}).await
    }

    async fn accept_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<MembershipRow, HelpdeskError> {
        self.call(Operation::AcceptInvitation, InvitationRef { invitation_id })
            .await
    }

    async fn revoke_invitation(&self, invitation_id: Uuid) -> Result<(), HelpdeskError> {
        self.call(Operation::RevokeInvitation, InvitationRef { invitation_id })
            .await
    }

    async fn list_tickets(
        &self,
        organization_id: Uuid,
        filter: TicketFilter,
    ) -> Result<Vec<TicketRow>, HelpdeskError> {
        let input = ListTicketsInput {
            organization_id,
            filter,
        };
        self.call(Operation::ListTickets, input).await
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketRow, HelpdeskError> {
        self.call(Operation::GetTicket, TicketRef { ticket_id }).await
    }

    async fn create_ticket(&self, ticket: TicketInsert) -> Result<TicketRow, HelpdeskError> {
        self.call(Operation::CreateTicket, ticket).await
    }

    async fn update_ticket(
        &self,
        ticket_id: Uuid,
        patch: TicketUpdate,
    ) -> Result<TicketRow, HelpdeskError> {
        self.call(Operation::UpdateTicket, UpdateTicketInput { ticket_id, patch })
            .await
    }

    async fn delete_ticket(&self, ticket_id: Uuid) -> Result<(), HelpdeskError> {
        self.call(Operation::DeleteTicket, TicketRef { ticket_id }).await
    }

    async fn list_comments(
        &self,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketCommentRow>, HelpdeskError> {
        self.call(Operation::ListComments, TicketRef { ticket_id }).await
    }

    async fn add_comment(
        &self,
        ticket_id: Uuid,
        comment: &str,
    ) -> Result<TicketCommentRow, HelpdeskError> {
        let input = AddCommentInput {
            ticket_id,
            comment: comment.to_string(),
        };
        self.call(Operation::AddComment, input).await
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<(), HelpdeskError> {
        self.call(Operation::DeleteComment, CommentRef { comment_id })
            .await
    }

    async fn list_tag_keys(&self, organization_id: Uuid) -> Result<Vec<TagKeyRow>, HelpdeskError> {
        self.call(Operation::ListTagKeys, OrganizationRef { organization_id })
            .await
    }

    async fn create_tag_key(&self, tag_key: TagKeyInsert) -> Result<TagKeyRow, HelpdeskError> {
        self.call(Operation::CreateTagKey, tag_key).await
    }

    async fn delete_tag_key(&self, tag_key_id: Uuid) -> Result<(), HelpdeskError> {
        self.call(Operation::DeleteTagKey, TagKeyRef { tag_key_id })
            .await
    }

    async fn add_enum_option(
        &self,
        tag_key_id: Uuid,
        value: &str,
    ) -> Result<EnumOptionRow, HelpdeskError> {
        let input = AddEnumOptionInput {
            tag_key_id,
            value: value.to_string(),
        };
        self.call(Operation::AddEnumOption, input).await
    }

    async fn list_enum_options(
        &self,
        tag_key_id: Uuid,
    ) -> Result<Vec<EnumOptionRow>, HelpdeskError> {
        self.call(Operation::ListEnumOptions, TagKeyRef { tag_key_id })
            .await
    }

    async fn set_ticket_tag(
        &self,
        ticket_id: Uuid,
        tag_key_id: Uuid,
        value: TagValue,
    ) -> Result<TicketTag, HelpdeskError> {
        let input = SetTicketTagInput {
            ticket_id,
            tag_key_id,
            value,
        };
        self.call(Operation::SetTicketTag, input).await
    }

    async fn list_ticket_tags(&self, ticket_id: Uuid) -> Result<Vec<TicketTag>, HelpdeskError> {
        self.call(Operation::ListTicketTags, TicketRef { ticket_id })
            .await
    }

    async fn clear_ticket_tag(
        &self,
        ticket_id: Uuid,
        tag_key_id: Uuid,
    ) -> Result<(), HelpdeskError> {
        let input = TicketTagRef {
            ticket_id,
            tag_key_id,
        };
        self.call(Operation::ClearTicketTag, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_detail_prefers_detail() {
        let body = r#"{"type":"about:blank","title":"Bad Request","status":400,"detail":"missing field `calls`"}"#;
        assert_eq!(problem_detail(body).as_deref(), Some("missing field `calls`"));
        assert_eq!(problem_detail("not json"), None);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig {
            api_url: "http://localhost:8087/".to_string(),
            ..ClientConfig::default()
        };
        let client = RemoteClient::new(reqwest::Client::new(), &config, SessionStore::new());
        assert_eq!(client.api_url, "http://localhost:8087");
    }
}
