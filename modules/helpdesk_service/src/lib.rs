//! Helpdesk Service Module
//!
//! Organizations, tickets, comments and typed ticket tags behind a named
//! operation façade. The schema contract lives in [`contract::schema`];
//! [`HelpdeskApi`] is the façade, served in-process by the native client
//! and over HTTP by the RPC endpoint and its remote client.

// Public exports
pub mod contract;
pub use contract::{
    client::HelpdeskApi, error::HelpdeskError, MacroStatistics, Operation, SecurityContext,
    TagType, TagValue, TicketFilter, TicketPriority, TicketStatus, TicketTag,
};

pub mod app;
pub mod auth;
pub mod config;
pub use config::{ClientConfig, Config};

pub mod module;
pub use module::HelpdeskModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
