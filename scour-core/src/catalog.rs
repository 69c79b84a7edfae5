//! Enumeration of schema objects from catalog metadata.

use crate::assets;
use crate::dialect::Enumeration;
use crate::error::{Result, ScourError};
use crate::executor::CatalogQueryExecutor;
use crate::object::{ObjectDescriptor, ObjectKind};
use crate::support::DbSupport;

const PARAM_LIST_COLUMN: &str = "PARAM_LIST";

/// Lists the objects of a schema, one catalog query per kind.
///
/// Schema names are matched exactly as stored by the catalog, so callers
/// must pass the canonical stored-case name (`TESTADM`, not `testadm`, on DB2).
pub struct SchemaObjectCatalog<'a, E> {
    support: &'a DbSupport<E>,
}

impl<'a, E: CatalogQueryExecutor> SchemaObjectCatalog<'a, E> {
    pub(crate) fn new(support: &'a DbSupport<E>) -> Self {
        Self { support }
    }

    /// Enumerate the objects of one kind, in catalog order.
    pub async fn list(&self, schema: &str, kind: ObjectKind) -> Result<Vec<ObjectDescriptor>> {
        let profile = self.support.profile();
        let kind_support = profile.kind_support(kind);
        let executor = self.support.executor();

        let objects: Vec<ObjectDescriptor> = match kind_support.enumeration {
            Enumeration::None => Vec::new(),
            Enumeration::Names { sql } => executor
                .query_string_list(sql, &[schema])
                .await?
                .iter()
                .map(|name| ObjectDescriptor::new(kind, name.trim_end()))
                .collect(),
            Enumeration::Signatures {
                asset,
                name_column,
                binds,
            } => {
                let sql = assets::load(profile.dialect, asset)?;
                let params = vec![schema; binds];
                let rows = executor.query_rows(sql, &params).await?;

                let mut objects = Vec::with_capacity(rows.len());
                for row in rows {
                    let name = row.get(name_column).ok_or_else(|| {
                        ScourError::catalog(
                            sql,
                            std::io::Error::new(
                                std::io::ErrorKind::InvalidData,
                                format!("result has no {} column", name_column),
                            ),
                        )
                    })?;
                    let signature = row
                        .get(PARAM_LIST_COLUMN)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default();
                    objects.push(ObjectDescriptor::with_signature(
                        kind,
                        name.trim_end(),
                        signature,
                    ));
                }
                objects
            }
        };

        let objects: Vec<ObjectDescriptor> = objects
            .into_iter()
            .filter(|d| !kind_support.excluded_names.contains(&d.name.as_str()))
            .collect();

        tracing::debug!(schema = %schema, kind = %kind, count = objects.len(), "Enumerated objects");
        Ok(objects)
    }

    pub async fn tables(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Table).await
    }

    pub async fn views(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::View).await
    }

    pub async fn aliases(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Alias).await
    }

    pub async fn sequences(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Sequence).await
    }

    pub async fn procedures(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Procedure).await
    }

    pub async fn functions(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Function).await
    }

    pub async fn triggers(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Trigger).await
    }

    pub async fn types(&self, schema: &str) -> Result<Vec<ObjectDescriptor>> {
        self.list(schema, ObjectKind::Type).await
    }
}
