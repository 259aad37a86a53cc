//! Storage layer - database entities and repositories

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repositories;

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

use crate::domain::Repositories;
use repositories::{
    SeaOrmCommentRepository, SeaOrmInvitationRepository, SeaOrmMembershipRepository,
    SeaOrmOrganizationRepository, SeaOrmProfileRepository, SeaOrmTagRepository,
    SeaOrmTicketRepository,
};

/// Open a connection pool; in-memory SQLite is pinned to one connection so
/// every query sees the same database
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);
    if database_url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }

    Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", redact(database_url)))
}

/// Apply all pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
    migrations::Migrator::up(db, None)
        .await
        .context("failed to run helpdesk migrations")
}

/// SeaORM-backed repositories sharing one connection
pub fn repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        organizations: Arc::new(SeaOrmOrganizationRepository::new(db.clone())),
        profiles: Arc::new(SeaOrmProfileRepository::new(db.clone())),
        memberships: Arc::new(SeaOrmMembershipRepository::new(db.clone())),
        invitations: Arc::new(SeaOrmInvitationRepository::new(db.clone())),
        tickets: Arc::new(SeaOrmTicketRepository::new(db.clone())),
        comments: Arc::new(SeaOrmCommentRepository::new(db.clone())),
        tags: Arc::new(SeaOrmTagRepository::new(db)),
    }
}

/// Strip credentials from a connection URL before it reaches a log line
fn redact(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => database_url.to_string(),
    }
}
