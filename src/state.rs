use std::sync::Arc;

use crate::auth::{CredentialVerifier, JwtError, TokenIssuer};
use crate::config::{AppConfig, ConfigError};
use crate::services::{GalleryService, MemoryGalleryService, ServiceError};
use crate::upload::UploadStore;

/// Everything a request handler needs. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<CredentialVerifier>,
    pub uploads: Arc<UploadStore>,
    pub service: Arc<dyn GalleryService>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error("Cannot prepare uploads directory: {0}")]
    Uploads(#[from] std::io::Error),

    #[error("Cannot seed admin account: {0}")]
    Seed(#[from] ServiceError),
}

impl AppState {
    /// Assemble state around an existing collaborator
    pub fn new(config: AppConfig, service: Arc<dyn GalleryService>) -> Result<Self, InitError> {
        config.validate()?;
        let uploads = UploadStore::open(&config.uploads.dir)?;
        let verifier = CredentialVerifier::new(&config.security.jwt_secret);

        Ok(Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            uploads: Arc::new(uploads),
            service,
        })
    }
}

/// Build state backed by the in-memory gallery, seeding the configured admin
pub fn init_app_state(config: AppConfig) -> Result<AppState, InitError> {
    config.validate()?;
    let issuer = TokenIssuer::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
    let mut service =
        MemoryGalleryService::new(issuer).with_hash_cost(config.security.password_hash_cost);

    if let (Some(email), Some(password)) = (
        config.security.admin_email.as_deref(),
        config.security.admin_password.as_deref(),
    ) {
        tracing::info!("Seeding admin account {}", email);
        service = service.with_admin("Administrator", email, password)?;
    }

    AppState::new(config, Arc::new(service))
}
