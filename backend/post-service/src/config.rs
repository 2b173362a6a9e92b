/// Configuration management for Post Service
///
/// Loads configuration from environment variables. A `.env` file is honoured
/// when the binary calls `dotenvy::dotenv()` before [`Config::from_env`].
use anyhow::{anyhow, Context, Result};
use crypto_core::jwt::{JwtConfig, DEFAULT_TOKEN_TTL_SECS};
use serde::{Deserialize, Serialize};

/// Development-only signing secret, refused when `APP_ENV=production`
const DEV_JWT_SECRET: &str = "devconnect-development-secret-do-not-deploy";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token signing configuration
    pub jwt: JwtSettings,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL; `None` selects the in-memory stores
    pub url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    #[serde(skip_serializing)]
    pub secret: String,
    pub ttl_secs: i64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 5000)?,
        };
        let production = app.is_production();

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if production => {
                    return Err(anyhow!("CORS_ALLOWED_ORIGINS must be set in production"))
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if production && allowed_origins.trim() == "*" {
                return Err(anyhow!("CORS_ALLOWED_ORIGINS cannot be '*' in production"));
            }

            CorsConfig { allowed_origins }
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
        };

        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if production => return Err(anyhow!("JWT_SECRET must be set in production")),
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt = JwtSettings {
            secret,
            ttl_secs: parse_var("JWT_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
        };

        let config = Config {
            app,
            cors,
            database,
            jwt,
        };
        config
            .jwt_config()
            .validate(production)
            .context("invalid JWT configuration")?;

        Ok(config)
    }

    /// Signing configuration handed to the token guard
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt.secret.clone(), self.jwt.ttl_secs)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &[&str] = &[
        "APP_ENV",
        "APP_HOST",
        "PORT",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "JWT_SECRET",
        "JWT_TTL_SECS",
        "CORS_ALLOWED_ORIGINS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_development_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 5000);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.ttl_secs, 36_000);
        assert_eq!(config.jwt.secret, DEV_JWT_SECRET);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
    }

    #[test]
    #[serial_test::serial]
    fn test_overrides_from_env() {
        clear_env();
        std::env::set_var("PORT", "8088");
        std::env::set_var("DATABASE_URL", "postgres://localhost/devconnect");
        std::env::set_var("JWT_TTL_SECS", "600");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 8088);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/devconnect")
        );
        assert_eq!(config.jwt_config().token_ttl().num_seconds(), 600);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_port_rejected() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_production_requires_secret_and_origins() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://devconnect.dev");
        assert!(Config::from_env().is_err());

        std::env::set_var("JWT_SECRET", "too-short");
        assert!(Config::from_env().is_err());

        std::env::set_var("JWT_SECRET", "a-production-secret-that-is-long-enough");
        assert!(Config::from_env().is_ok());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_debug_redacts_secret() {
        let settings = JwtSettings {
            secret: "super-secret-value".to_string(),
            ttl_secs: 60,
        };
        assert!(!format!("{:?}", settings).contains("super-secret-value"));
    }
}
