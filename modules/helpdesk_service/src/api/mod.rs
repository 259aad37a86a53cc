//! API layer - transports over the domain service
//!
//! `native` calls the service in-process, `rpc` exposes it over HTTP and
//! `remote` is the HTTP client for that endpoint.

pub mod native;
pub mod remote;
pub mod rpc;
