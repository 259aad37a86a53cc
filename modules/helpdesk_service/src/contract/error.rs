//! Contract error types for the helpdesk service
//!
//! These errors are transport-agnostic: the RPC endpoint encodes them as a
//! `{code, message}` pair and the remote client decodes them back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::PayloadError;

/// Helpdesk service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelpdeskError {
    /// Caught before any remote or storage call (missing field, bad value,
    /// password mismatch)
    #[error("{message}")]
    Validation { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// No session, or the bearer credential was rejected
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Authenticated but not allowed in this organization
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Authentication service failure; the message is shown verbatim
    #[error("{message}")]
    Auth { message: String },

    /// Remote procedure failure carrying the server-provided message
    #[error("{message}")]
    Rpc { code: String, message: String },

    /// Network-level failure reaching a remote collaborator
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Internal error")]
    Internal,
}

impl HelpdeskError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Stable machine-readable code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Auth { .. } => "auth",
            Self::Rpc { .. } => "rpc",
            Self::Transport { .. } => "transport",
            Self::Internal => "internal",
        }
    }

    /// The collaborator could not answer: network failure or a server-side
    /// fault. Authoritative answers (not found, forbidden, ...) are excluded.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Internal => true,
            Self::Rpc { code, .. } => {
                code == "internal" || code.parse::<u16>().is_ok_and(|status| status >= 500)
            }
            _ => false,
        }
    }

    /// Human-readable message for inline display
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Auth { message }
            | Self::Rpc { message, .. }
            | Self::Transport { message } => message.clone(),
            Self::Conflict { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<PayloadError> for HelpdeskError {
    fn from(err: PayloadError) -> Self {
        Self::Validation {
            message: err.to_string(),
        }
    }
}

/// Wire representation of a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&HelpdeskError> for ErrorBody {
    fn from(err: &HelpdeskError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.message(),
        }
    }
}

impl From<ErrorBody> for HelpdeskError {
    /// Codes the client can act on are restored; everything else surfaces
    /// as an RPC error with the server's message.
    fn from(body: ErrorBody) -> Self {
        match body.code.as_str() {
            "validation" => Self::Validation {
                message: body.message,
            },
            "unauthorized" => Self::Unauthorized {
                message: body.message,
            },
            "forbidden" => Self::Forbidden {
                message: body.message,
            },
            _ => Self::Rpc {
                code: body.code,
                message: body.message,
            },
        }
    }
}
