#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tokio::net::TcpListener;

use afriart_api::auth::TokenIssuer;
use afriart_api::config::AppConfig;
use afriart_api::services::{GalleryService, MemoryGalleryService};
use afriart_api::state::AppState;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@afriart.test";
pub const ADMIN_PASSWORD: &str = "gallery-admin";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub uploads_dir: PathBuf,
    issuer: TokenIssuer,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn admin_token(&self) -> String {
        self.issuer.issue("1", "Gallery Admin", true).expect("admin token")
    }

    pub fn user_token(&self) -> String {
        self.issuer.issue("42", "Visitor", false).expect("user token")
    }

    /// Admin token that lapsed a day ago
    pub fn expired_token(&self) -> String {
        self.issuer
            .issue_at("1", "Gallery Admin", true, Utc::now() - Duration::hours(25))
            .expect("expired token")
    }

    pub fn stored_uploads(&self) -> usize {
        std::fs::read_dir(&self.uploads_dir).map(|d| d.count()).unwrap_or(0)
    }
}

fn test_config(port: u16) -> AppConfig {
    let mut config = AppConfig::development();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = port;
    config.api.enable_request_logging = false;
    config.security.jwt_secret = SECRET.to_string();
    config.security.jwt_expiry_hours = 24;
    config.security.admin_email = Some(ADMIN_EMAIL.to_string());
    config.security.admin_password = Some(ADMIN_PASSWORD.to_string());
    config.uploads.dir = std::env::temp_dir().join(format!(
        "afriart-it-{}",
        uuid::Uuid::new_v4().simple()
    ));
    config
}

/// Start a server backed by the in-memory gallery with a seeded admin
pub async fn spawn_server() -> Result<TestServer> {
    let issuer = TokenIssuer::new(SECRET, 24)?;
    let service = MemoryGalleryService::new(issuer)
        .with_hash_cost(afriart_api::config::BCRYPT_MIN_COST)
        .with_admin("Gallery Admin", ADMIN_EMAIL, ADMIN_PASSWORD)?;
    spawn_with(Arc::new(service)).await
}

/// Start a server around any collaborator
pub async fn spawn_with(service: Arc<dyn GalleryService>) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let config = test_config(port);
    let bind_addr = config.bind_addr();

    let state = AppState::new(config, service)?;
    let uploads_dir = state.uploads.dir().to_path_buf();

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, afriart_api::app(state)).await;
    });

    Ok(TestServer {
        port,
        base_url: format!("http://{}", bind_addr),
        uploads_dir,
        issuer: TokenIssuer::new(SECRET, 24)?,
    })
}

pub fn assert_cors(res: &reqwest::Response) {
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
}
