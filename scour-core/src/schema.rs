//! Schema-level operations: existence, emptiness, create, drop and the ordered clean.

use serde::Serialize;

use crate::error::{Result, ScourError};
use crate::executor::CatalogQueryExecutor;
use crate::object::{ObjectDescriptor, ObjectHandle, ObjectKind, Table};
use crate::support::DbSupport;

/// What `clean` did to one schema.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub schema: String,
    /// Objects dropped, in the order their DROP statements ran.
    pub dropped: Vec<ObjectDescriptor>,
    /// Objects whose DROP failed because something else had already removed them.
    pub vanished: Vec<ObjectDescriptor>,
}

/// How a schema drop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchemaDropOutcome {
    /// The namespace itself was dropped.
    Dropped,
    /// The dialect cannot drop the namespace; its contents were cleaned instead.
    CleanedOnly,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropReport {
    pub outcome: SchemaDropOutcome,
    pub clean: CleanReport,
}

/// Number of objects of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: ObjectKind,
    pub count: usize,
}

/// A schema in the connected database.
///
/// Holds only the name; every answer is re-derived from the catalog.
pub struct Schema<'a, E> {
    support: &'a DbSupport<E>,
    name: String,
}

impl<'a, E: CatalogQueryExecutor> Schema<'a, E> {
    pub(crate) fn new(support: &'a DbSupport<E>, name: &str) -> Self {
        Self {
            support,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn exists(&self) -> Result<bool> {
        let count = self
            .support
            .executor()
            .query_scalar_int(self.support.profile().schema_exists_query, &[self.name.as_str()])
            .await?;
        Ok(count > 0)
    }

    /// True when every kind enumerates zero objects.
    pub async fn is_empty(&self) -> Result<bool> {
        let counts = self.object_counts().await?;
        Ok(counts.iter().all(|c| c.count == 0))
    }

    /// Object counts for every kind, in the dialect's drop order.
    pub async fn object_counts(&self) -> Result<Vec<KindCount>> {
        let objects = self.all_objects().await?;
        Ok(self.count_by_kind(&objects))
    }

    /// Every object in the schema, grouped by kind in drop order.
    pub async fn all_objects(&self) -> Result<Vec<ObjectDescriptor>> {
        let catalog = self.support.catalog();
        let mut objects = Vec::new();
        for kind in self.support.profile().kinds_in_drop_order() {
            objects.extend(catalog.list(&self.name, kind).await?);
        }
        Ok(objects)
    }

    /// Tally already-enumerated objects per kind, in drop order, zeros included.
    pub fn count_by_kind(&self, objects: &[ObjectDescriptor]) -> Vec<KindCount> {
        self.support
            .profile()
            .kinds_in_drop_order()
            .into_iter()
            .map(|kind| KindCount {
                kind,
                count: objects.iter().filter(|d| d.kind == kind).count(),
            })
            .collect()
    }

    pub async fn create(&self) -> Result<()> {
        let sql = self
            .support
            .render(self.support.profile().create_schema, &self.name, None, None)?;
        tracing::info!(schema = %self.name, "Creating schema");
        self.support.executor().execute(&sql).await
    }

    /// Clean the schema, then drop the namespace where the dialect allows it.
    ///
    /// On dialects without a namespace-level DROP the schema survives empty
    /// and the report says [`SchemaDropOutcome::CleanedOnly`].
    pub async fn drop(&self) -> Result<DropReport> {
        let clean = self.clean().await?;

        let Some(template) = self.support.profile().drop_schema else {
            tracing::info!(
                schema = %self.name,
                dialect = %self.support.dialect(),
                "Dialect cannot drop schemas; schema was cleaned instead"
            );
            return Ok(DropReport {
                outcome: SchemaDropOutcome::CleanedOnly,
                clean,
            });
        };

        let sql = self.support.render(template, &self.name, None, None)?;
        tracing::info!(schema = %self.name, "Dropping schema");
        self.support.executor().execute(&sql).await?;

        Ok(DropReport {
            outcome: SchemaDropOutcome::Dropped,
            clean,
        })
    }

    /// Drop every object in the schema, kind by kind in the dialect's drop order.
    ///
    /// Each kind is enumerated just before it is dropped. The first DROP the
    /// database rejects aborts the clean; drops already issued stay applied
    /// and later kinds are not touched. Re-running is safe: whatever was
    /// dropped no longer enumerates.
    ///
    /// When the dialect drops some kinds by bare name, the schema is made
    /// current for the duration of the clean and the previous current
    /// schema is restored afterwards, whether the clean succeeded or not.
    pub async fn clean(&self) -> Result<CleanReport> {
        tracing::warn!(
            schema = %self.name,
            dialect = %self.support.dialect(),
            "Starting clean, every object in the schema will be dropped"
        );

        let previous = self.enter().await?;
        let result = self.drop_all_objects().await;
        if let Some(previous) = previous {
            if let Err(restore) = self.support.set_current_schema(&previous).await {
                tracing::error!(
                    schema = %previous,
                    error = %restore,
                    "Failed to restore current schema after clean"
                );
                if result.is_ok() {
                    return Err(restore);
                }
            }
        }
        let report = result?;

        tracing::warn!(
            schema = %self.name,
            objects_dropped = report.dropped.len(),
            "Clean completed"
        );

        Ok(report)
    }

    /// Make this schema current if bare-name drops need it. Returns the
    /// schema to switch back to, or `None` when nothing was changed.
    async fn enter(&self) -> Result<Option<String>> {
        let profile = self.support.profile();
        if !profile.drops_resolve_in_current_schema() {
            return Ok(None);
        }
        if profile.set_current_schema.is_none() {
            tracing::warn!(
                schema = %self.name,
                dialect = %self.support.dialect(),
                "Dialect cannot switch schemas; unqualified drops resolve against the session schema"
            );
            return Ok(None);
        }

        let previous = self.support.current_schema().await?;
        if previous == self.name {
            return Ok(None);
        }
        self.support.set_current_schema(&self.name).await?;
        Ok(Some(previous))
    }

    async fn drop_all_objects(&self) -> Result<CleanReport> {
        let catalog = self.support.catalog();
        let mut report = CleanReport {
            schema: self.name.clone(),
            dropped: Vec::new(),
            vanished: Vec::new(),
        };

        for kind in self.support.profile().kinds_in_drop_order() {
            for descriptor in catalog.list(&self.name, kind).await? {
                let handle = self.object(descriptor);
                match handle.drop().await {
                    Ok(()) => report.dropped.push(handle.into_descriptor()),
                    Err(e @ ScourError::CatalogQuery { .. }) => {
                        let still_listed = handle.exists().await;
                        match still_listed {
                            Ok(false) => {
                                tracing::warn!(
                                    schema = %self.name,
                                    object = %handle.descriptor(),
                                    "Object disappeared before it could be dropped"
                                );
                                report.vanished.push(handle.into_descriptor());
                            }
                            Ok(true) => {
                                tracing::error!(
                                    schema = %self.name,
                                    object = %handle.descriptor(),
                                    error = %e,
                                    "Drop failed, aborting clean"
                                );
                                return Err(e);
                            }
                            Err(check) => {
                                tracing::error!(
                                    schema = %self.name,
                                    object = %handle.descriptor(),
                                    error = %e,
                                    check_error = %check,
                                    "Drop failed and the object could not be looked up, aborting clean"
                                );
                                return Err(e);
                            }
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(report)
    }

    pub fn table(&self, name: &str) -> Table<'a, E> {
        Table::new(self.support, &self.name, name)
    }

    /// All base tables, as lockable handles.
    pub async fn tables(&self) -> Result<Vec<Table<'a, E>>> {
        let names = self.support.catalog().tables(&self.name).await?;
        Ok(names.iter().map(|d| self.table(&d.name)).collect())
    }

    pub fn object(&self, descriptor: ObjectDescriptor) -> ObjectHandle<'a, E> {
        ObjectHandle::new(self.support, &self.name, descriptor)
    }
}
