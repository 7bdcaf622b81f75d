//! Configuration module for the Clientes backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default Google Sheets API endpoint.
const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Default base URL for the human-facing spreadsheet view.
const DEFAULT_SHEETS_VIEW_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// Default identity provider endpoint (Google Identity Toolkit).
const DEFAULT_AUTH_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity provider API key (authentication is disabled when absent)
    pub auth_api_key: Option<String>,
    /// Identity provider endpoint base URL
    pub auth_api_base: String,
    /// Spreadsheet API endpoint base URL
    pub sheets_api_base: String,
    /// Base URL for the spreadsheet display link
    pub sheets_view_base: String,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let auth_api_key = env::var("CLIENTES_AUTH_API_KEY").ok();

        let auth_api_base = env::var("CLIENTES_AUTH_API_BASE")
            .unwrap_or_else(|_| DEFAULT_AUTH_API_BASE.to_string());

        let sheets_api_base = env::var("CLIENTES_SHEETS_API_BASE")
            .unwrap_or_else(|_| DEFAULT_SHEETS_API_BASE.to_string());

        let sheets_view_base = env::var("CLIENTES_SHEETS_VIEW_BASE")
            .unwrap_or_else(|_| DEFAULT_SHEETS_VIEW_BASE.to_string());

        let db_path = env::var("CLIENTES_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let bind_addr = env::var("CLIENTES_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid CLIENTES_BIND_ADDR format");

        let log_level = env::var("CLIENTES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            auth_api_key,
            auth_api_base,
            sheets_api_base,
            sheets_view_base,
            db_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("CLIENTES_AUTH_API_KEY");
        env::remove_var("CLIENTES_AUTH_API_BASE");
        env::remove_var("CLIENTES_SHEETS_API_BASE");
        env::remove_var("CLIENTES_SHEETS_VIEW_BASE");
        env::remove_var("CLIENTES_DB_PATH");
        env::remove_var("CLIENTES_BIND_ADDR");
        env::remove_var("CLIENTES_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.auth_api_key.is_none());
        assert_eq!(config.auth_api_base, DEFAULT_AUTH_API_BASE);
        assert_eq!(config.sheets_api_base, DEFAULT_SHEETS_API_BASE);
        assert_eq!(config.sheets_view_base, DEFAULT_SHEETS_VIEW_BASE);
        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}
