use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_idle: u32,
    pub jwt_secret: String,
    pub log_level: String,
    /// Endpoint of the external AI agent service the chat relay forwards to.
    pub agent_url: String,
    pub agent_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env if present
        let _ = dotenvy::dotenv();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8002".to_string())
            .parse::<u16>()
            .context("PORT must be a valid u16")?;
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid u32")?;
        let db_min_idle = std::env::var("DB_MIN_IDLE")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .context("DB_MIN_IDLE must be a valid u32")?;
        let log_level =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".to_string());

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(val) => val,
            Err(_) if cfg!(debug_assertions) => "super-secret-change-me".to_string(),
            Err(err) => {
                Err(anyhow::anyhow!(err)).context("JWT_SECRET is required in release builds")?
            }
        };

        let agent_url = std::env::var("AGENT_URL")
            .unwrap_or_else(|_| "http://localhost:8100/api/agent".to_string());
        let agent_api_key = std::env::var("AGENT_API_KEY").ok();

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
            db_min_idle,
            jwt_secret,
            log_level,
            agent_url,
            agent_api_key,
        })
    }
}
