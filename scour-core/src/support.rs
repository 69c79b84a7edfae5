//! Dialect capabilities bound to a live session.

use crate::catalog::SchemaObjectCatalog;
use crate::dialect::{Dialect, DialectProfile};
use crate::error::{Result, ScourError};
use crate::executor::CatalogQueryExecutor;
use crate::schema::Schema;
use crate::template;

/// A dialect profile paired with the executor for one database session.
///
/// All quoting, boolean-literal and current-schema decisions go through here.
pub struct DbSupport<E> {
    executor: E,
    profile: &'static DialectProfile,
}

impl<E: CatalogQueryExecutor> DbSupport<E> {
    pub fn new(executor: E, dialect: Dialect) -> Self {
        Self::with_profile(executor, dialect.profile())
    }

    /// Use a custom profile, e.g. a variant of a bundled one.
    pub fn with_profile(executor: E, profile: &'static DialectProfile) -> Self {
        Self { executor, profile }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn profile(&self) -> &'static DialectProfile {
        self.profile
    }

    pub fn dialect(&self) -> Dialect {
        self.profile.dialect
    }

    pub fn catalog(&self) -> SchemaObjectCatalog<'_, E> {
        SchemaObjectCatalog::new(self)
    }

    /// Handle on a schema. Nothing is queried until one of its methods runs.
    pub fn schema(&self, name: &str) -> Schema<'_, E> {
        Schema::new(self, name)
    }

    pub fn quote_identifier(&self, identifier: &str) -> String {
        self.profile.quote(identifier)
    }

    /// `"SCHEMA"."NAME"`
    pub fn quote_qualified(&self, schema: &str, name: &str) -> String {
        format!("{}.{}", self.profile.quote(schema), self.profile.quote(name))
    }

    pub fn boolean_literal(&self, value: bool) -> &'static str {
        self.profile.boolean_literal(value)
    }

    /// If false, a sequence of DROPs is not atomic and a failure part-way
    /// leaves a partially cleaned schema.
    pub fn supports_ddl_transactions(&self) -> bool {
        self.profile.supports_ddl_transactions
    }

    pub fn catalog_is_schema(&self) -> bool {
        self.profile.catalog_is_schema
    }

    pub async fn current_schema(&self) -> Result<String> {
        let name = self
            .executor
            .query_scalar_string(self.profile.current_schema_query, &[])
            .await?;
        Ok(name.trim_end().to_string())
    }

    /// Switch the session's current schema.
    ///
    /// Fails with [`ScourError::Unsupported`] without touching the session
    /// when the dialect has no mutable current schema.
    pub async fn set_current_schema(&self, schema: &str) -> Result<()> {
        let Some(template) = self.profile.set_current_schema else {
            return Err(ScourError::Unsupported {
                dialect: self.dialect().to_string(),
                operation: "set current schema".to_string(),
            });
        };
        let sql = self.render(template, schema, None, None)?;
        tracing::debug!(schema = %schema, "Changing current schema");
        self.executor.execute(&sql).await
    }

    pub async fn current_user(&self) -> Result<String> {
        let user = self
            .executor
            .query_scalar_string(self.profile.current_user_query, &[])
            .await?;
        Ok(user.trim_end().to_string())
    }

    /// Render a profile template for `schema` and optionally one object in it.
    pub(crate) fn render(
        &self,
        template: &str,
        schema: &str,
        name: Option<&str>,
        signature: Option<&str>,
    ) -> Result<String> {
        let qschema = self.quote_identifier(schema);
        let qname = name.map(|n| self.quote_identifier(n));

        let mut values: Vec<(&str, &str)> = vec![("schema", schema), ("qschema", qschema.as_str())];
        if let (Some(name), Some(qname)) = (name, qname.as_deref()) {
            values.push(("name", name));
            values.push(("qname", qname));
        }
        if let Some(signature) = signature {
            values.push(("signature", signature));
        }
        template::render(template, &values)
    }
}
