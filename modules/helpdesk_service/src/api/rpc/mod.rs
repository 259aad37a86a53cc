//! RPC endpoint - batched named operations over HTTP

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use auth::{Claims, TokenVerifier};
pub use routes::{router, ApiDoc, RpcState};
