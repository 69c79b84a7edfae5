use std::fmt;

use serde::Deserialize;

use crate::dialect::Dialect;
use crate::error::{Result, ScourError};

/// SSL/TLS connection mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Never use TLS.
    Disable,
    /// Try TLS first, fall back to plaintext.
    #[default]
    Prefer,
    /// Require TLS, fail if the handshake fails.
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = ScourError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" | "disabled" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" | "required" => Ok(SslMode::Require),
            _ => Err(ScourError::ConfigError(format!(
                "Invalid SSL mode '{}'. Use 'disable', 'prefer', or 'require'.",
                s
            ))),
        }
    }
}

/// Top-level configuration for Scour.
#[derive(Debug, Clone, Default)]
pub struct ScourConfig {
    pub database: DatabaseConfig,
    pub schemas: SchemaSettings,
}

/// Database connection configuration.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub connect_retries: u32,
    pub ssl_mode: SslMode,
    pub connect_timeout_secs: u32,
    pub statement_timeout_secs: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            connect_retries: 0,
            ssl_mode: SslMode::Prefer,
            connect_timeout_secs: 30,
            statement_timeout_secs: 0,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("connect_retries", &self.connect_retries)
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("statement_timeout_secs", &self.statement_timeout_secs)
            .finish()
    }
}

/// Which schemas to manage, and how.
#[derive(Debug, Clone)]
pub struct SchemaSettings {
    /// Explicit dialect. When `None` it is detected from the URL.
    pub dialect: Option<Dialect>,
    pub schemas: Vec<String>,
    pub clean_enabled: bool,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            dialect: None,
            schemas: vec!["public".to_string()],
            clean_enabled: false,
        }
    }
}

// ── TOML deserialization structs ──

#[derive(Deserialize, Default)]
struct TomlConfig {
    database: Option<TomlDatabaseConfig>,
    scour: Option<TomlSchemaSettings>,
}

#[derive(Deserialize, Default)]
struct TomlDatabaseConfig {
    url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    connect_retries: Option<u32>,
    ssl_mode: Option<String>,
    connect_timeout: Option<u32>,
    statement_timeout: Option<u32>,
}

#[derive(Deserialize, Default)]
struct TomlSchemaSettings {
    dialect: Option<String>,
    schemas: Option<Vec<String>>,
    clean_enabled: Option<bool>,
}

/// CLI overrides that take highest priority.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub url: Option<String>,
    pub dialect: Option<String>,
    pub schemas: Option<Vec<String>>,
    pub connect_retries: Option<u32>,
    pub ssl_mode: Option<String>,
    pub connect_timeout: Option<u32>,
    pub statement_timeout: Option<u32>,
}

impl ScourConfig {
    /// Load configuration with the following priority (highest wins):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. TOML config file
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>, overrides: &CliOverrides) -> Result<Self> {
        let mut config = ScourConfig::default();

        // Layer 3: TOML config file
        let toml_path = config_path.unwrap_or("scour.toml");
        if let Ok(content) = std::fs::read_to_string(toml_path) {
            // Warn if config file has overly permissive permissions (Unix only)
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(meta) = std::fs::metadata(toml_path) {
                    let mode = meta.permissions().mode();
                    if mode & 0o077 != 0 {
                        tracing::warn!(
                            path = %toml_path,
                            mode = format!("{:o}", mode),
                            "Config file has overly permissive permissions. Consider chmod 600."
                        );
                    }
                }
            }
            let toml_config: TomlConfig = toml::from_str(&content).map_err(|e| {
                ScourError::ConfigError(format!("Failed to parse config file '{}': {}", toml_path, e))
            })?;
            config.apply_toml(toml_config)?;
        } else if config_path.is_some() {
            return Err(ScourError::ConfigError(format!(
                "Config file '{}' not found",
                toml_path
            )));
        }

        // Layer 2: Environment variables
        config.apply_env()?;

        // Layer 1: CLI overrides
        config.apply_cli(overrides)?;

        if config.schemas.schemas.is_empty() {
            return Err(ScourError::ConfigError(
                "At least one schema must be configured".to_string(),
            ));
        }
        for schema in &config.schemas.schemas {
            crate::db::validate_identifier(schema)?;
        }

        if config.database.connect_retries > 20 {
            config.database.connect_retries = 20;
            tracing::warn!("connect_retries capped at 20");
        }

        Ok(config)
    }

    fn apply_toml(&mut self, toml: TomlConfig) -> Result<()> {
        if let Some(db) = toml.database {
            if let Some(v) = db.url { self.database.url = Some(v); }
            if let Some(v) = db.host { self.database.host = Some(v); }
            if let Some(v) = db.port { self.database.port = Some(v); }
            if let Some(v) = db.user { self.database.user = Some(v); }
            if let Some(v) = db.password { self.database.password = Some(v); }
            if let Some(v) = db.database { self.database.database = Some(v); }
            if let Some(v) = db.connect_retries { self.database.connect_retries = v; }
            if let Some(v) = db.ssl_mode { self.database.ssl_mode = v.parse()?; }
            if let Some(v) = db.connect_timeout { self.database.connect_timeout_secs = v; }
            if let Some(v) = db.statement_timeout { self.database.statement_timeout_secs = v; }
        }

        if let Some(s) = toml.scour {
            if let Some(v) = s.dialect { self.schemas.dialect = Some(v.parse()?); }
            if let Some(v) = s.schemas { self.schemas.schemas = v; }
            if let Some(v) = s.clean_enabled { self.schemas.clean_enabled = v; }
        }

        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("SCOUR_DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = std::env::var("SCOUR_DATABASE_HOST") {
            self.database.host = Some(v);
        }
        if let Ok(v) = std::env::var("SCOUR_DATABASE_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.database.port = Some(port);
            }
        }
        if let Ok(v) = std::env::var("SCOUR_DATABASE_USER") {
            self.database.user = Some(v);
        }
        if let Ok(v) = std::env::var("SCOUR_DATABASE_PASSWORD") {
            self.database.password = Some(v);
        }
        if let Ok(v) = std::env::var("SCOUR_DATABASE_NAME") {
            self.database.database = Some(v);
        }
        if let Ok(v) = std::env::var("SCOUR_CONNECT_RETRIES") {
            if let Ok(n) = v.parse::<u32>() {
                self.database.connect_retries = n;
            }
        }
        if let Ok(v) = std::env::var("SCOUR_SSL_MODE") {
            self.database.ssl_mode = v.parse()?;
        }
        if let Ok(v) = std::env::var("SCOUR_CONNECT_TIMEOUT") {
            if let Ok(n) = v.parse::<u32>() {
                self.database.connect_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SCOUR_STATEMENT_TIMEOUT") {
            if let Ok(n) = v.parse::<u32>() {
                self.database.statement_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SCOUR_DIALECT") {
            self.schemas.dialect = Some(v.parse()?);
        }
        if let Ok(v) = std::env::var("SCOUR_SCHEMAS") {
            self.schemas.schemas = split_list(&v);
        }
        if let Ok(v) = std::env::var("SCOUR_CLEAN_ENABLED") {
            self.schemas.clean_enabled = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    fn apply_cli(&mut self, overrides: &CliOverrides) -> Result<()> {
        if let Some(ref v) = overrides.url {
            self.database.url = Some(v.clone());
        }
        if let Some(ref v) = overrides.dialect {
            self.schemas.dialect = Some(v.parse()?);
        }
        if let Some(ref v) = overrides.schemas {
            self.schemas.schemas = v.clone();
        }
        if let Some(v) = overrides.connect_retries {
            self.database.connect_retries = v;
        }
        if let Some(ref v) = overrides.ssl_mode {
            self.database.ssl_mode = v.parse()?;
        }
        if let Some(v) = overrides.connect_timeout {
            self.database.connect_timeout_secs = v;
        }
        if let Some(v) = overrides.statement_timeout {
            self.database.statement_timeout_secs = v;
        }
        Ok(())
    }

    /// The configured dialect, else the one detected from the URL, else PostgreSQL.
    pub fn dialect(&self) -> Dialect {
        self.schemas
            .dialect
            .or_else(|| self.database.url.as_deref().and_then(Dialect::detect))
            .unwrap_or(Dialect::Postgres)
    }

    /// Build a PostgreSQL connection string from the config.
    /// Prefers `url` if set; otherwise builds from individual fields.
    /// JDBC-style URLs have the `jdbc:` prefix stripped and their `user`
    /// and `password` query parameters moved into the authority.
    pub fn connection_string(&self) -> Result<String> {
        if let Some(ref url) = self.database.url {
            return Ok(normalize_jdbc_url(url));
        }

        let host = self.database.host.as_deref().unwrap_or("localhost");
        let port = self.database.port.unwrap_or(5432);
        let user = self.database.user.as_deref().ok_or_else(|| {
            ScourError::ConfigError("Database user is required".to_string())
        })?;
        let database = self.database.database.as_deref().ok_or_else(|| {
            ScourError::ConfigError("Database name is required".to_string())
        })?;

        let mut url = format!("host={} port={} user={} dbname={}", host, port, user, database);

        if let Some(ref password) = self.database.password {
            url.push_str(&format!(" password={}", password));
        }

        Ok(url)
    }
}

/// Split a comma-separated list, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Normalize a JDBC-style URL to a standard PostgreSQL connection string.
///
/// Handles:
///   - `jdbc:postgresql://host:port/db?user=x&password=y`  →  `postgresql://x:y@host:port/db`
///   - `postgresql://...` passed through as-is
///   - `postgres://...` passed through as-is
fn normalize_jdbc_url(url: &str) -> String {
    let url = url.strip_prefix("jdbc:").unwrap_or(url);

    if let Some((base, query)) = url.split_once('?') {
        let mut user = None;
        let mut password = None;
        let mut other_params = Vec::new();

        for param in query.split('&') {
            if let Some((key, value)) = param.split_once('=') {
                match key.to_lowercase().as_str() {
                    "user" => user = Some(value.to_string()),
                    "password" => password = Some(value.to_string()),
                    _ => other_params.push(param.to_string()),
                }
            }
        }

        if user.is_some() || password.is_some() {
            if let Some(rest) = base.strip_prefix("postgresql://").or_else(|| base.strip_prefix("postgres://")) {
                let scheme = if base.starts_with("postgresql://") {
                    "postgresql"
                } else {
                    "postgres"
                };

                let auth = match (user, password) {
                    (Some(u), Some(p)) => format!("{}:{}@", u, p),
                    (Some(u), None) => format!("{}@", u),
                    (None, Some(p)) => format!(":{p}@"),
                    (None, None) => String::new(),
                };

                let mut result = format!("{}://{}{}", scheme, auth, rest);
                if !other_params.is_empty() {
                    result.push('?');
                    result.push_str(&other_params.join("&"));
                }
                return result;
            }
        }

        if other_params.is_empty() {
            return base.to_string();
        }
        return format!("{}?{}", base, other_params.join("&"));
    }

    url.to_string()
}
