//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Path to the gym directory JSON file
    pub gyms_data_path: String,
    /// Path to the session store JSON file
    pub session_store_path: String,
    /// Seconds between scheduled occupancy refreshes
    pub refresh_interval_secs: u64,
    /// Shared secret for payment webhook signatures
    pub payments_webhook_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gyms_data_path: env::var("GYMS_DATA_PATH")
                .unwrap_or_else(|_| "data/gyms.json".to_string()),
            session_store_path: env::var("SESSION_STORE_PATH")
                .unwrap_or_else(|_| "data/session.json".to_string()),
            refresh_interval_secs: env::var("REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::services::refresh::DEFAULT_REFRESH_INTERVAL_SECS),
            payments_webhook_secret: env::var("PAYMENTS_WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PAYMENTS_WEBHOOK_SECRET"))?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            gyms_data_path: "data/gyms.json".to_string(),
            session_store_path: "data/session.json".to_string(),
            refresh_interval_secs: 30,
            payments_webhook_secret: "test_webhook_secret".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("PAYMENTS_WEBHOOK_SECRET", "whsec_test");
        env::set_var("PORT", "9090");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.payments_webhook_secret, "whsec_test");
        assert_eq!(config.port, 9090);
        assert_eq!(config.gyms_data_path, "data/gyms.json");
    }
}
