//! Drop all objects in managed schemas (destructive).

use crate::config::ScourConfig;
use crate::error::{Result, ScourError};
use crate::executor::CatalogQueryExecutor;
use crate::schema::CleanReport;
use crate::support::DbSupport;

/// Refuse destructive commands unless the config or the caller allows them.
pub(crate) fn ensure_clean_allowed(config: &ScourConfig, allow_clean: bool) -> Result<()> {
    if !config.schemas.clean_enabled && !allow_clean {
        return Err(ScourError::CleanDisabled);
    }
    Ok(())
}

/// Execute the clean command.
///
/// Cleans each configured schema in turn, stopping at the first failure.
/// Requires clean_enabled=true or allow_clean=true.
pub async fn execute<E: CatalogQueryExecutor>(
    support: &DbSupport<E>,
    config: &ScourConfig,
    allow_clean: bool,
) -> Result<Vec<CleanReport>> {
    ensure_clean_allowed(config, allow_clean)?;

    let mut reports = Vec::with_capacity(config.schemas.schemas.len());
    for name in &config.schemas.schemas {
        let schema = support.schema(name);
        if !schema.exists().await? {
            tracing::info!(schema = %name, "Schema does not exist, nothing to clean");
            reports.push(CleanReport {
                schema: name.clone(),
                dropped: Vec::new(),
                vanished: Vec::new(),
            });
            continue;
        }
        reports.push(schema.clean().await?);
    }

    Ok(reports)
}
