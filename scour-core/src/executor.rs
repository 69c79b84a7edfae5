//! The query-execution seam the schema engine runs every statement through.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// One result row, keyed by upper-cased column label. SQL NULL reads as an empty string.
pub type CatalogRow = HashMap<String, String>;

/// Executes parameterized SQL against one live database session.
///
/// Parameters are bound positionally using the placeholder syntax of the
/// connected database (`?` for DB2, `$1` for PostgreSQL). Implementations
/// map driver failures to [`ScourError::CatalogQuery`](crate::error::ScourError::CatalogQuery).
#[async_trait]
pub trait CatalogQueryExecutor: Send + Sync {
    /// First column of the first row as an integer.
    async fn query_scalar_int(&self, sql: &str, params: &[&str]) -> Result<i64>;

    /// First column of the first row as a string.
    async fn query_scalar_string(&self, sql: &str, params: &[&str]) -> Result<String>;

    /// First column of every row.
    async fn query_string_list(&self, sql: &str, params: &[&str]) -> Result<Vec<String>>;

    async fn query_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>>;

    /// Run a statement that returns no rows.
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Run a statement and return the affected row count.
    async fn execute_update(&self, sql: &str) -> Result<u64>;
}

#[async_trait]
impl<T> CatalogQueryExecutor for &T
where
    T: CatalogQueryExecutor + ?Sized,
{
    async fn query_scalar_int(&self, sql: &str, params: &[&str]) -> Result<i64> {
        (**self).query_scalar_int(sql, params).await
    }

    async fn query_scalar_string(&self, sql: &str, params: &[&str]) -> Result<String> {
        (**self).query_scalar_string(sql, params).await
    }

    async fn query_string_list(&self, sql: &str, params: &[&str]) -> Result<Vec<String>> {
        (**self).query_string_list(sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        (**self).query_rows(sql, params).await
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        (**self).execute(sql).await
    }

    async fn execute_update(&self, sql: &str) -> Result<u64> {
        (**self).execute_update(sql).await
    }
}
