//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `LEADFLOW_DB_PATH` is missing or a value is invalid, falls back to
//!    loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LEADFLOW_DB_PATH`: Database file path (required)
//! - `LEADFLOW_DB_POOL_SIZE`: Connection pool size
//! - `LEADFLOW_DB_ENCRYPTION_KEY`: SQLCipher key
//! - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`
//! - `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`, `GOOGLE_USERINFO_URL`,
//!   `GOOGLE_CALENDAR_API_BASE`: endpoint overrides
//! - `LEADFLOW_SYNC_INTERVAL_SECS`: Minimum interval between syncs
//! - `LEADFLOW_SYNC_ENABLED`: Whether periodic sync runs (true/false)
//! - `LEADFLOW_SYNC_TICK_CRON`: Scheduler tick expression
//! - `LEADFLOW_BIND_ADDR`: HTTP listen address
//!
//! An empty `GOOGLE_CLIENT_ID` is accepted here; authorization fails later
//! with a configuration error.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./leadflow.{json,toml}` or `./config.{json,toml}` (current directory)
//! 2. Parent directories (up to 2 levels)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use leadflow_domain::{
    Config, DatabaseConfig, GoogleConfig, LeadflowError, Result, ServerConfig, SyncConfig,
};

const CONFIG_FILE_NAMES: &[&str] =
    &["leadflow.json", "leadflow.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LeadflowError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `LEADFLOW_DB_PATH` is required; everything else has a default.
///
/// # Errors
/// Returns `LeadflowError::Config` if the database path is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = GoogleConfig::default();

    let database = DatabaseConfig {
        path: env_var("LEADFLOW_DB_PATH")?,
        pool_size: env_parse("LEADFLOW_DB_POOL_SIZE", 8)?,
        encryption_key: env_opt("LEADFLOW_DB_ENCRYPTION_KEY"),
    };

    let google = GoogleConfig {
        client_id: env_opt("GOOGLE_CLIENT_ID").unwrap_or_default(),
        client_secret: env_opt("GOOGLE_CLIENT_SECRET"),
        redirect_uri: env_opt("GOOGLE_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
        auth_url: env_opt("GOOGLE_AUTH_URL").unwrap_or(defaults.auth_url),
        token_url: env_opt("GOOGLE_TOKEN_URL").unwrap_or(defaults.token_url),
        userinfo_url: env_opt("GOOGLE_USERINFO_URL").unwrap_or(defaults.userinfo_url),
        calendar_api_base: env_opt("GOOGLE_CALENDAR_API_BASE")
            .unwrap_or(defaults.calendar_api_base),
    };

    let sync_defaults = SyncConfig::default();
    let sync = SyncConfig {
        interval_seconds: env_parse("LEADFLOW_SYNC_INTERVAL_SECS", sync_defaults.interval_seconds)?,
        enabled: env_bool("LEADFLOW_SYNC_ENABLED", true),
        tick_cron: env_opt("LEADFLOW_SYNC_TICK_CRON").unwrap_or(sync_defaults.tick_cron),
    };

    let server = ServerConfig {
        bind_addr: env_opt("LEADFLOW_BIND_ADDR").unwrap_or_else(|| ServerConfig::default().bind_addr),
    };

    Ok(Config { database, google, sync, server })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LeadflowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LeadflowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LeadflowError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LeadflowError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LeadflowError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current directory, up to two parent directories, then the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| LeadflowError::Config(format!("Missing required environment variable: {key}")))
}

/// Non-empty environment variable, if set.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key).map_or(Ok(default), |raw| {
        raw.trim().parse::<T>().map_err(|e| LeadflowError::Config(format!("Invalid {key}: {e}")))
    })
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    const ENV_KEYS: &[&str] = &[
        "LEADFLOW_DB_PATH",
        "LEADFLOW_DB_POOL_SIZE",
        "LEADFLOW_DB_ENCRYPTION_KEY",
        "GOOGLE_CLIENT_ID",
        "GOOGLE_CLIENT_SECRET",
        "GOOGLE_REDIRECT_URI",
        "GOOGLE_TOKEN_URL",
        "LEADFLOW_SYNC_INTERVAL_SECS",
        "LEADFLOW_SYNC_ENABLED",
        "LEADFLOW_BIND_ADDR",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_env_bool_parsing() {
        for (value, expected) in [("1", true), ("TRUE", true), ("on", true), ("0", false), ("no", false)] {
            std::env::set_var("LEADFLOW_TEST_BOOL", value);
            assert_eq!(env_bool("LEADFLOW_TEST_BOOL", !expected), expected, "value {value}");
        }
        std::env::remove_var("LEADFLOW_TEST_BOOL");
        assert!(env_bool("LEADFLOW_TEST_BOOL", true));
    }

    #[test]
    #[serial]
    fn test_load_from_env_all_vars_set() {
        clear_env();
        std::env::set_var("LEADFLOW_DB_PATH", "/tmp/leadflow.db");
        std::env::set_var("LEADFLOW_DB_POOL_SIZE", "4");
        std::env::set_var("LEADFLOW_DB_ENCRYPTION_KEY", "test-key");
        std::env::set_var("GOOGLE_CLIENT_ID", "client-123");
        std::env::set_var("GOOGLE_CLIENT_SECRET", "secret");
        std::env::set_var("GOOGLE_TOKEN_URL", "http://127.0.0.1:9999/token");
        std::env::set_var("LEADFLOW_SYNC_INTERVAL_SECS", "120");
        std::env::set_var("LEADFLOW_SYNC_ENABLED", "false");
        std::env::set_var("LEADFLOW_BIND_ADDR", "0.0.0.0:9000");

        let config = load_from_env().unwrap();

        assert_eq!(config.database.path, "/tmp/leadflow.db");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.database.encryption_key.as_deref(), Some("test-key"));
        assert_eq!(config.google.client_id, "client-123");
        assert_eq!(config.google.client_secret.as_deref(), Some("secret"));
        assert_eq!(config.google.token_url, "http://127.0.0.1:9999/token");
        assert_eq!(config.google.auth_url, leadflow_domain::config::GOOGLE_AUTH_URL);
        assert_eq!(config.sync.interval_seconds, 120);
        assert!(!config.sync.enabled);
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults_without_google_client() {
        clear_env();
        std::env::set_var("LEADFLOW_DB_PATH", "/tmp/leadflow.db");

        let config = load_from_env().unwrap();

        assert!(config.google.client_id.is_empty());
        assert_eq!(config.sync.interval_seconds, 300);
        assert_eq!(config.sync.tick_cron, "0 * * * * *");
        assert!(config.sync.enabled);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_env_missing_db_path() {
        clear_env();

        let err = load_from_env().unwrap_err();

        assert!(matches!(err, LeadflowError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_load_from_env_invalid_number() {
        clear_env();
        std::env::set_var("LEADFLOW_DB_PATH", "/tmp/leadflow.db");
        std::env::set_var("LEADFLOW_SYNC_INTERVAL_SECS", "five minutes");

        let err = load_from_env().unwrap_err();

        assert!(matches!(err, LeadflowError::Config(msg) if msg.contains("LEADFLOW_SYNC_INTERVAL_SECS")));
        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "leadflow.toml",
            r#"
[database]
path = "leadflow.db"
pool_size = 6

[google]
client_id = "from-file"

[sync]
interval_seconds = 600
enabled = false
"#,
        );

        let config = load_from_file(Some(path)).unwrap();

        assert_eq!(config.database.pool_size, 6);
        assert_eq!(config.google.client_id, "from-file");
        assert_eq!(config.sync.interval_seconds, 600);
        assert!(!config.sync.enabled);
        assert_eq!(config.server.bind_addr, "127.0.0.1:8787");
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.json", r#"{"database": {"path": "leadflow.db"}}"#);

        let config = load_from_file(Some(path)).unwrap();

        assert_eq!(config.database.path, "leadflow.db");
        assert_eq!(config.database.pool_size, 8);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/leadflow.toml"))).unwrap_err();
        assert!(matches!(err, LeadflowError::Config(_)));
    }

    #[test]
    fn test_parse_config_invalid_and_unsupported() {
        assert!(parse_config(r#"{ "database": "#, Path::new("x.json")).is_err());
        assert!(parse_config("database: {}", Path::new("x.yaml")).is_err());
    }
}
