//! Wire DTOs for the batch endpoint

use crate::contract::ErrorBody;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Batch of named operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RpcRequest {
    pub calls: Vec<RpcCall>,
}

/// One named operation within a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RpcCall {
    /// Caller-chosen correlation id, echoed in the result
    #[schema(example = "1")]
    pub id: String,

    /// Operation name
    #[schema(example = "list_organizations")]
    pub op: String,

    /// Operation input; `null` or absent is treated as `{}`
    #[serde(default)]
    pub input: serde_json::Value,
}

/// Results in call order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RpcResponse {
    pub results: Vec<RpcResult>,
}

/// Outcome of one call: `data` on success, `error` on failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RpcResult {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl RpcResult {
    pub fn ok(id: String, data: serde_json::Value) -> Self {
        Self {
            id,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(id: String, error: ErrorBody) -> Self {
        Self {
            id,
            data: None,
            error: Some(error),
        }
    }
}
