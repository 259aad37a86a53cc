//! Domain layer - business logic and services

pub mod access;
pub mod repository;
pub mod service;
pub mod validation;

pub use access::InvitationAccess;
pub use repository::{
    CommentRepository, InvitationRepository, MembershipRepository, OrganizationRepository,
    ProfileRepository, TagRepository, TicketRepository,
};
pub use service::{Repositories, Service, ServiceConfig};
