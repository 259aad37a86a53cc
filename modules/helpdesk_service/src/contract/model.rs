//! Contract models shared by every transport
//!
//! Column enumerations, the caller's security context, and the composite
//! values (statistics, ticket tags) that do not map onto a single relation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role granting organization administration.
pub const ROLE_ADMIN: &str = "admin";

/// Role assigned when none is given.
pub const ROLE_MEMBER: &str = "member";

/// Whether a free-form membership role is admin-equivalent
pub fn is_admin_role(role: &str) -> bool {
    role.eq_ignore_ascii_case(ROLE_ADMIN)
}

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub const VALUES: &'static [&'static str] = &["open", "in_progress", "resolved", "closed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    pub const VALUES: &'static [&'static str] = &["low", "medium", "high", "urgent"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Which value table a tag key writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    Text,
    Number,
    Date,
    Enum,
}

impl TagType {
    pub const VALUES: &'static [&'static str] = &["text", "number", "date", "enum"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Enum => "enum",
        }
    }
}

/// Error returned when a stored or submitted enumeration value is unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! impl_str_enum {
    ($ty:ty, $kind:literal, [$($variant:ident),+]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == <$ty>::$variant.as_str() {
                        return Ok(<$ty>::$variant);
                    }
                )+
                Err(UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_str_enum!(TicketStatus, "ticket status", [Open, InProgress, Resolved, Closed]);
impl_str_enum!(TicketPriority, "ticket priority", [Low, Medium, High, Urgent]);
impl_str_enum!(TagType, "tag type", [Text, Number, Date, Enum]);

/// Identity of the caller, threaded explicitly through every service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    /// Profile id (equal to the auth identity id)
    pub profile_id: Uuid,
    /// Email claimed by the auth identity, used for invitation access
    pub email: Option<String>,
}

impl SecurityContext {
    pub fn new(profile_id: Uuid, email: Option<String>) -> Self {
        Self {
            profile_id,
            email: email.map(|e| e.trim().to_lowercase()),
        }
    }
}

/// Filters for ticket listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Organization-level ticket statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MacroStatistics {
    pub organization_id: Uuid,
    pub total_tickets: u64,
    pub unassigned_tickets: u64,
    pub member_count: u64,
    /// Keyed by status name; every status is present
    pub by_status: BTreeMap<String, u64>,
    /// Keyed by priority name; every priority is present
    pub by_priority: BTreeMap<String, u64>,
}

/// Value of a tag on a ticket, one variant per value table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TagValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Selected enum option id
    Enum(Uuid),
}

impl TagValue {
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::Text(_) => TagType::Text,
            Self::Number(_) => TagType::Number,
            Self::Date(_) => TagType::Date,
            Self::Enum(_) => TagType::Enum,
        }
    }
}

/// A tag value attached to a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketTag {
    pub tag_key_id: Uuid,
    pub ticket_id: Uuid,
    pub value: TagValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_strings() {
        for status in TicketStatus::ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>().ok(), Some(status));
        }
        for priority in TicketPriority::ALL {
            assert_eq!(priority.as_str().parse::<TicketPriority>().ok(), Some(priority));
        }
        assert_eq!("enum".parse::<TagType>().ok(), Some(TagType::Enum));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = "blocked".parse::<TicketStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown ticket status 'blocked'");
    }

    #[test]
    fn admin_role_is_case_insensitive() {
        assert!(is_admin_role("admin"));
        assert!(is_admin_role("Admin"));
        assert!(!is_admin_role("member"));
        assert!(!is_admin_role("owner"));
    }

    #[test]
    fn tag_value_wire_shape() {
        let value = serde_json::to_value(TagValue::Number(4.5)).unwrap();
        assert_eq!(value, serde_json::json!({"type": "number", "value": 4.5}));
        let date: TagValue =
            serde_json::from_value(serde_json::json!({"type": "date", "value": "2024-03-01"}))
                .unwrap();
        assert_eq!(date.tag_type(), TagType::Date);
    }
}
