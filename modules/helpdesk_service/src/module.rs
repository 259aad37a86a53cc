//! Helpdesk module lifecycle: init, router and serve

use crate::api::native::NativeClient;
use crate::api::rpc::{self, RpcState, TokenVerifier};
use crate::config::Config;
use crate::contract::SecurityContext;
use crate::domain::Service;
use crate::infra::storage;
use anyhow::{Context, Result};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Helpdesk service module
pub struct HelpdeskModule {
    config: Config,
    db: Arc<DatabaseConnection>,
    service: Arc<Service>,
}

impl HelpdeskModule {
    /// Connect, migrate and build the domain service
    pub async fn init(config: Config) -> Result<Self> {
        config.validate()?;
        if config.jwt_secret.is_empty() {
            tracing::warn!("jwt_secret is empty; every bearer token will be rejected");
        }

        let db = Arc::new(storage::connect(&config.database_url).await?);
        storage::migrate(&db).await?;

        let repos = storage::repositories(db.clone());
        let service = Arc::new(Service::new(repos, config.service()));

        tracing::info!("Helpdesk service initialized");
        Ok(Self {
            config,
            db,
            service,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Arc<DatabaseConnection> {
        &self.db
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client acting as `ctx`
    pub fn native_client(&self, ctx: SecurityContext) -> NativeClient {
        NativeClient::new(self.service.clone(), ctx)
    }

    pub fn router(&self) -> Router {
        let state = Arc::new(RpcState {
            service: self.service.clone(),
            verifier: TokenVerifier::new(&self.config.jwt_secret, &self.config.jwt_audience),
        });
        rpc::router(state)
    }

    /// Serve the RPC endpoint until `cancel` fires
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.config.bind_addr))?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "Helpdesk RPC endpoint listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .context("server error")?;

        tracing::info!("Helpdesk RPC endpoint stopped");
        Ok(())
    }
}
