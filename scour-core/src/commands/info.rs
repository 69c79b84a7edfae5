use serde::Serialize;

use crate::config::ScourConfig;
use crate::error::Result;
use crate::executor::CatalogQueryExecutor;
use crate::object::ObjectDescriptor;
use crate::schema::KindCount;
use crate::support::DbSupport;

/// What a managed schema currently holds.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub schema: String,
    pub exists: bool,
    pub empty: bool,
    /// Per-kind counts in drop order. Empty when the schema does not exist.
    pub objects: Vec<KindCount>,
    /// Every object, in the order clean would drop them.
    pub details: Vec<ObjectDescriptor>,
}

impl SchemaInfo {
    pub fn total(&self) -> usize {
        self.objects.iter().map(|c| c.count).sum()
    }
}

/// Execute the info command: existence and object inventory of each managed schema.
pub async fn execute<E: CatalogQueryExecutor>(
    support: &DbSupport<E>,
    config: &ScourConfig,
) -> Result<Vec<SchemaInfo>> {
    let mut infos = Vec::with_capacity(config.schemas.schemas.len());

    for name in &config.schemas.schemas {
        let schema = support.schema(name);
        if !schema.exists().await? {
            infos.push(SchemaInfo {
                schema: name.clone(),
                exists: false,
                empty: true,
                objects: Vec::new(),
                details: Vec::new(),
            });
            continue;
        }

        let details = schema.all_objects().await?;
        let objects = schema.count_by_kind(&details);
        infos.push(SchemaInfo {
            schema: name.clone(),
            exists: true,
            empty: details.is_empty(),
            objects,
            details,
        });
    }

    Ok(infos)
}
