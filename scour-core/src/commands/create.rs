//! Create missing managed schemas.

use crate::config::ScourConfig;
use crate::error::Result;
use crate::executor::CatalogQueryExecutor;
use crate::support::DbSupport;

/// Execute the create command. Returns the names of the schemas that were created.
pub async fn execute<E: CatalogQueryExecutor>(
    support: &DbSupport<E>,
    config: &ScourConfig,
) -> Result<Vec<String>> {
    let mut created = Vec::new();
    for name in &config.schemas.schemas {
        let schema = support.schema(name);
        if schema.exists().await? {
            tracing::debug!(schema = %name, "Schema already exists");
            continue;
        }
        schema.create().await?;
        created.push(name.clone());
    }
    Ok(created)
}
