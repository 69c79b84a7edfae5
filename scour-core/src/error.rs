use thiserror::Error;

/// Boxed driver error carried inside [`ScourError::CatalogQuery`].
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Extract the full error message from a tokio_postgres::Error,
/// including the underlying DbError details that Display hides.
pub fn format_db_error(e: &tokio_postgres::Error) -> String {
    // The source chain contains the actual DbError with message/detail/hint
    if let Some(db_err) = e.as_db_error() {
        let mut msg = db_err.message().to_string();
        if let Some(detail) = db_err.detail() {
            msg.push_str(&format!("\n  Detail: {}", detail));
        }
        if let Some(hint) = db_err.hint() {
            msg.push_str(&format!("\n  Hint: {}", hint));
        }
        if let Some(position) = db_err.position() {
            msg.push_str(&format!("\n  Position: {:?}", position));
        }
        return msg;
    }
    format_error_chain(e)
}

/// Join an error and its sources into a single line.
pub fn format_error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        msg.push_str(&format!(": {}", s));
        source = s.source();
    }
    msg
}

#[derive(Error, Debug)]
pub enum ScourError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {}", format_db_error(.0))]
    DatabaseError(#[from] tokio_postgres::Error),

    /// A metadata or DDL statement was rejected by the database.
    #[error("Catalog query failed: {reason}\n  Statement: {sql}")]
    CatalogQuery {
        sql: String,
        reason: String,
        #[source]
        source: DriverError,
    },

    /// The dialect does not offer this capability. Callers are expected to branch on it.
    #[error("Operation '{operation}' is not supported by dialect {dialect}")]
    Unsupported {
        dialect: String,
        operation: String,
    },

    #[error("Query resource '{name}' is not bundled for dialect {dialect}")]
    ResourceLoad { dialect: String, name: String },

    #[error("Template placeholder '{{{key}}}' has no value in: {template}")]
    TemplateError { key: String, template: String },

    #[error("Clean is disabled. Pass --allow-clean to enable it or set clean_enabled = true in config.")]
    CleanDisabled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScourError {
    /// Wrap a driver error raised while running `sql`.
    pub fn catalog<E>(sql: &str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ScourError::CatalogQuery {
            sql: sql.to_string(),
            reason: format_error_chain(&error),
            source: Box::new(error),
        }
    }

    /// Whether this error is the contractual "not offered by this dialect" signal.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ScourError::Unsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScourError>;
