use std::env;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub media_root: PathBuf,
    pub media_url: String,
    pub frontend_url: String,
    pub rate_limit_burst: u32,
    pub max_upload_bytes: usize,
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            media_root: PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string())),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", 60)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            sendgrid_api_key: env::var("SENDGRID_API_KEY").ok().filter(|k| !k.is_empty()),
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| "no-reply@localhost".to_string()),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Cable Market".to_string()),
        })
    }

    /// Configuration with local defaults for everything but the secrets.
    pub fn with_defaults(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            bind_addr: "0.0.0.0:3000".to_string(),
            media_root: env::temp_dir().join("cable-market-media"),
            media_url: "/media".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            rate_limit_burst: 10_000,
            max_upload_bytes: 10 * 1024 * 1024,
            sendgrid_api_key: None,
            from_email: "no-reply@localhost".to_string(),
            from_name: "Cable Market".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
