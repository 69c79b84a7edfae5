pub mod assets;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod object;
pub mod schema;
pub mod support;
pub mod template;

use config::ScourConfig;
use error::{Result, ScourError};
use executor::CatalogQueryExecutor;
use tokio_postgres::Client;

pub use catalog::SchemaObjectCatalog;
pub use commands::info::SchemaInfo;
pub use config::CliOverrides;
pub use dialect::{Dialect, DialectProfile};
pub use object::{ObjectDescriptor, ObjectHandle, ObjectKind, Table};
pub use schema::{CleanReport, DropReport, KindCount, Schema, SchemaDropOutcome};
pub use support::DbSupport;

/// Main entry point for the Scour library.
///
/// Create a `Scour` instance with a config and use its methods to
/// inspect and clean the managed schemas programmatically.
pub struct Scour<E = Client> {
    pub config: ScourConfig,
    support: DbSupport<E>,
}

impl Scour<Client> {
    /// Create a new Scour instance, connecting to the database.
    ///
    /// Only PostgreSQL has a bundled driver. For other dialects connect
    /// yourself and use [`Scour::with_executor`].
    pub async fn new(config: ScourConfig) -> Result<Self> {
        let dialect = config.dialect();
        if dialect != Dialect::Postgres {
            return Err(ScourError::ConfigError(format!(
                "No bundled driver for dialect {}; supply an executor with Scour::with_executor",
                dialect
            )));
        }

        let conn_string = config.connection_string()?;
        let client = db::connect_with_config(
            &conn_string,
            &config.database.ssl_mode,
            config.database.connect_retries,
            config.database.connect_timeout_secs,
            config.database.statement_timeout_secs,
        )
        .await?;
        Ok(Self::with_executor(config, client))
    }
}

impl<E: CatalogQueryExecutor> Scour<E> {
    /// Create a new Scour instance over an existing session.
    pub fn with_executor(config: ScourConfig, executor: E) -> Self {
        let support = DbSupport::new(executor, config.dialect());
        Self { config, support }
    }

    pub fn support(&self) -> &DbSupport<E> {
        &self.support
    }

    /// Drop all objects in managed schemas.
    pub async fn clean(&self, allow_clean: bool) -> Result<Vec<CleanReport>> {
        commands::clean::execute(&self.support, &self.config, allow_clean).await
    }

    /// Drop managed schemas, or clean them where the dialect cannot drop a schema.
    pub async fn drop_schemas(&self, allow_clean: bool) -> Result<Vec<DropReport>> {
        commands::drop::execute(&self.support, &self.config, allow_clean).await
    }

    /// Create managed schemas that do not exist yet.
    pub async fn create(&self) -> Result<Vec<String>> {
        commands::create::execute(&self.support, &self.config).await
    }

    /// Show what each managed schema holds.
    pub async fn info(&self) -> Result<Vec<SchemaInfo>> {
        commands::info::execute(&self.support, &self.config).await
    }

    pub async fn current_schema(&self) -> Result<String> {
        self.support.current_schema().await
    }

    pub async fn set_current_schema(&self, schema: &str) -> Result<()> {
        db::validate_identifier(schema)?;
        self.support.set_current_schema(schema).await
    }
}
