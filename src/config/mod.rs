use once_cell::sync::Lazy;
use std::env;

/// Process-wide configuration, resolved once at startup from environment
/// variables. Secrets (JWT key, admin credential pair) are injected via env;
/// the built-in values exist only so a bare `cargo run` works in development.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. When unset the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let port = env::var("GRIDREF_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let jwt_secret = match env::var("GRIDREF_JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                if environment == Environment::Production {
                    tracing::warn!("GRIDREF_JWT_SECRET not set; using development fallback key");
                }
                "gridref-dev-secret".to_string()
            }
        };

        let jwt_expiry_hours = env::var("GRIDREF_JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        let admin_username = env::var("GRIDREF_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = env::var("GRIDREF_ADMIN_PASSWORD").unwrap_or_else(|_| "1234".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Self {
            environment,
            server: ServerConfig { port },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours,
                admin_username,
                admin_password,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok(),
                max_connections,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
