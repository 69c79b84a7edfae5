//! Drop managed schemas (destructive).

use crate::config::ScourConfig;
use crate::error::Result;
use crate::executor::CatalogQueryExecutor;
use crate::schema::DropReport;
use crate::support::DbSupport;

use super::clean::ensure_clean_allowed;

/// Execute the drop command.
///
/// Schemas that do not exist are skipped. Guarded the same way as clean.
pub async fn execute<E: CatalogQueryExecutor>(
    support: &DbSupport<E>,
    config: &ScourConfig,
    allow_clean: bool,
) -> Result<Vec<DropReport>> {
    ensure_clean_allowed(config, allow_clean)?;

    let mut reports = Vec::new();
    for name in &config.schemas.schemas {
        let schema = support.schema(name);
        if !schema.exists().await? {
            tracing::info!(schema = %name, "Schema does not exist, skipping drop");
            continue;
        }
        reports.push(schema.drop().await?);
    }

    Ok(reports)
}
