//! Route registration with OpenAPI documentation

use super::{auth::TokenVerifier, dto::*, handlers};
use crate::contract::schema::{
    EnumOptionRow, InvitationRow, MembershipRow, OrganizationRow, ProfileRow, TagKeyRow,
    TicketCommentRow, TicketRow,
};
use crate::contract::{
    ErrorBody, MacroStatistics, TagType, TagValue, TicketFilter, TicketPriority, TicketStatus,
    TicketTag,
};
use crate::domain::Service;
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;

/// Largest accepted batch body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state of the RPC endpoint
pub struct RpcState {
    pub service: Arc<Service>,
    pub verifier: TokenVerifier,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Helpdesk RPC", description = "Batched named operations over the helpdesk store"),
    paths(handlers::rpc, handlers::health),
    components(schemas(
        RpcRequest,
        RpcCall,
        RpcResponse,
        RpcResult,
        ErrorBody,
        OrganizationRow,
        ProfileRow,
        MembershipRow,
        InvitationRow,
        TicketRow,
        TicketCommentRow,
        TagKeyRow,
        EnumOptionRow,
        TicketStatus,
        TicketPriority,
        TagType,
        TagValue,
        TicketTag,
        TicketFilter,
        MacroStatistics,
    ))
)]
pub struct ApiDoc;

/// Build the endpoint router
pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route("/rpc", post(handlers::rpc))
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi_handler))
        .layer(Extension(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
