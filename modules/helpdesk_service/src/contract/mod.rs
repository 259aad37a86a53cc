//! Contract layer - public API shared by every transport
//!
//! Relation shapes, the façade trait, operation names and errors. Schema
//! shapes carry serde derives because they are the payloads that cross the
//! system boundary.

pub mod client;
pub mod error;
pub mod model;
pub mod ops;
pub mod schema;

pub use client::HelpdeskApi;
pub use error::{ErrorBody, HelpdeskError};
pub use model::{
    is_admin_role, MacroStatistics, SecurityContext, TagType, TagValue, TicketFilter,
    TicketPriority, TicketStatus, TicketTag, ROLE_ADMIN, ROLE_MEMBER,
};
pub use ops::Operation;
