pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use reqwest::Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::policy::visibility::VisibilityMode;
use crate::services::{
    admin_service::AdminService,
    client_service::ClientService,
    crew_service::CrewService,
    file_store::{DiskFileStore, FileStore},
    identity_service::{IdentityService, SessionKeys},
    notification_service::{build_notifier, Notifier},
    reminder_service::ReminderService,
    request_service::RequestService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub identity: IdentityService,
    pub admin_service: AdminService,
    pub client_service: ClientService,
    pub crew_service: CrewService,
    pub request_service: RequestService,
    pub reminder_service: ReminderService,
    pub notifier: Arc<dyn Notifier>,
    pub file_store: Arc<dyn FileStore>,
    pub visibility: VisibilityMode,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let notifier = build_notifier(
            http_client,
            config.notify_webhook_url.clone(),
            config.webhook_secret.clone(),
        );
        let file_store: Arc<dyn FileStore> = Arc::new(DiskFileStore::new(&config.uploads_dir));
        Ok(Self::with_collaborators(pool, config, notifier, file_store))
    }

    /// Wires the services around externally supplied collaborators.
    pub fn with_collaborators(
        pool: PgPool,
        config: &Config,
        notifier: Arc<dyn Notifier>,
        file_store: Arc<dyn FileStore>,
    ) -> Self {
        let admin_service = AdminService::new(pool.clone());
        let client_service = ClientService::new(pool.clone());
        let identity = IdentityService::new(
            SessionKeys::new(config.jwt_secret.clone(), config.jwt_ttl_hours),
            admin_service.clone(),
            client_service.clone(),
        );
        let crew_service = CrewService::new(pool.clone(), client_service.clone());
        let request_service = RequestService::new(
            pool.clone(),
            crew_service.clone(),
            client_service.clone(),
            notifier.clone(),
            config.crew_visibility,
        );
        let reminder_service = ReminderService::new(pool.clone());

        Self {
            pool,
            identity,
            admin_service,
            client_service,
            crew_service,
            request_service,
            reminder_service,
            notifier,
            file_store,
            visibility: config.crew_visibility,
        }
    }
}
