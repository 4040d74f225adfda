use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// bcrypt cost for stored passwords
    pub password_hash_cost: u32,
    pub admin_email: Option<String>,
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded images are written to and served from
    pub dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    PartialAdminAccount,

    #[error("SECURITY_JWT_EXPIRY_HOURS must be between 1 and {}, got {0}", MAX_JWT_EXPIRY_HOURS)]
    InvalidJwtExpiry(u64),

    #[error(
        "SECURITY_PASSWORD_HASH_COST must be between {} and {}, got {0}",
        BCRYPT_MIN_COST,
        BCRYPT_MAX_COST
    )]
    InvalidPasswordHashCost(u32),
}

/// Cost bounds enforced by `bcrypt` (the crate keeps its own constants private)
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Longest token lifetime accepted (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("AFRIART_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.server.port = port;
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_HASH_COST") {
            self.security.password_hash_cost =
                v.parse().unwrap_or(self.security.password_hash_cost);
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.security.admin_email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.security.admin_password = Some(v);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }

        self
    }

    /// Reject combinations the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(ConfigError::InvalidJwtExpiry(self.security.jwt_expiry_hours));
        }
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.security.password_hash_cost) {
            return Err(ConfigError::InvalidPasswordHashCost(self.security.password_hash_cost));
        }
        if self.security.admin_email.is_some() != self.security.admin_password.is_some() {
            return Err(ConfigError::PartialAdminAccount);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: "afriart-development-secret".to_string(),
                jwt_expiry_hours: 24,
                password_hash_cost: bcrypt::DEFAULT_COST,
                admin_email: Some("admin@afriart.local".to_string()),
                admin_password: Some("admin123".to_string()),
            },
            uploads: UploadConfig {
                dir: PathBuf::from("public/uploads"),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 8 * 1024 * 1024, // 8MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                password_hash_cost: bcrypt::DEFAULT_COST,
                admin_email: None,
                admin_password: None,
            },
            uploads: UploadConfig {
                dir: PathBuf::from("public/uploads"),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 8 * 1024 * 1024, // 8MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                password_hash_cost: bcrypt::DEFAULT_COST,
                admin_email: None,
                admin_password: None,
            },
            uploads: UploadConfig {
                dir: PathBuf::from("public/uploads"),
            },
        }
    }
}
