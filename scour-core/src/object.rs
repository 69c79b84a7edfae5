//! Schema-scoped database objects: kinds, descriptors and the handles that drop them.

use std::fmt;

use serde::Serialize;

use crate::dialect::Enumeration;
use crate::error::{Result, ScourError};
use crate::executor::CatalogQueryExecutor;
use crate::support::DbSupport;

/// The kinds of object a schema can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ObjectKind {
    Table,
    View,
    Alias,
    Sequence,
    Procedure,
    Function,
    Trigger,
    Type,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 8] = [
        ObjectKind::Table,
        ObjectKind::View,
        ObjectKind::Alias,
        ObjectKind::Sequence,
        ObjectKind::Procedure,
        ObjectKind::Function,
        ObjectKind::Trigger,
        ObjectKind::Type,
    ];

    /// SQL keyword naming this kind in DDL.
    pub fn keyword(self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::Alias => "ALIAS",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Procedure => "PROCEDURE",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Trigger => "TRIGGER",
            ObjectKind::Type => "TYPE",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Table => write!(f, "Table"),
            ObjectKind::View => write!(f, "View"),
            ObjectKind::Alias => write!(f, "Alias"),
            ObjectKind::Sequence => write!(f, "Sequence"),
            ObjectKind::Procedure => write!(f, "Procedure"),
            ObjectKind::Function => write!(f, "Function"),
            ObjectKind::Trigger => write!(f, "Trigger"),
            ObjectKind::Type => write!(f, "Type"),
        }
    }
}

/// An object as reported by the catalog at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDescriptor {
    pub kind: ObjectKind,
    pub name: String,
    /// Parameter type list for routines; needed to drop one overload of many.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ObjectDescriptor {
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            signature: None,
        }
    }

    pub fn with_signature(
        kind: ObjectKind,
        name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            signature: Some(signature.into()),
        }
    }

    /// Whether `other` names the same catalog object. A descriptor without a
    /// signature matches every overload of its name.
    pub fn matches(&self, other: &ObjectDescriptor) -> bool {
        if self.kind != other.kind || self.name != other.name {
            return false;
        }
        match (&self.signature, &other.signature) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.signature {
            Some(sig) => write!(f, "{}: {}({})", self.kind, self.name, sig),
            None => write!(f, "{}: {}", self.kind, self.name),
        }
    }
}

/// A handle on one object of a schema, able to check its existence and drop it.
pub struct ObjectHandle<'a, E> {
    support: &'a DbSupport<E>,
    schema: String,
    descriptor: ObjectDescriptor,
}

impl<'a, E: CatalogQueryExecutor> ObjectHandle<'a, E> {
    pub(crate) fn new(support: &'a DbSupport<E>, schema: &str, descriptor: ObjectDescriptor) -> Self {
        Self {
            support,
            schema: schema.to_string(),
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &ObjectDescriptor {
        &self.descriptor
    }

    pub fn into_descriptor(self) -> ObjectDescriptor {
        self.descriptor
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Re-enumerate this object's kind and look for it.
    pub async fn exists(&self) -> Result<bool> {
        let present = self
            .support
            .catalog()
            .list(&self.schema, self.descriptor.kind)
            .await?;
        Ok(present.iter().any(|d| d.matches(&self.descriptor)))
    }

    /// The DROP statement for this object in this dialect.
    pub fn drop_statement(&self) -> Result<String> {
        let kind = self.descriptor.kind;
        let support = self.support.profile().kind_support(kind);
        if matches!(support.enumeration, Enumeration::None) {
            return Err(ScourError::Unsupported {
                dialect: self.support.dialect().to_string(),
                operation: format!("drop {}", kind.keyword().to_lowercase()),
            });
        }
        self.support.render(
            support.drop,
            &self.schema,
            Some(&self.descriptor.name),
            self.descriptor.signature.as_deref(),
        )
    }

    pub async fn drop(&self) -> Result<()> {
        let sql = self.drop_statement()?;
        tracing::debug!(schema = %self.schema, object = %self.descriptor, sql = %sql, "Dropping object");
        self.support.executor().execute(&sql).await
    }
}

/// A table handle. Adds exclusive locking on top of [`ObjectHandle`].
pub struct Table<'a, E> {
    handle: ObjectHandle<'a, E>,
}

impl<'a, E: CatalogQueryExecutor> Table<'a, E> {
    pub(crate) fn new(support: &'a DbSupport<E>, schema: &str, name: &str) -> Self {
        Self {
            handle: ObjectHandle::new(support, schema, ObjectDescriptor::new(ObjectKind::Table, name)),
        }
    }

    pub fn name(&self) -> &str {
        &self.handle.descriptor.name
    }

    pub fn schema(&self) -> &str {
        self.handle.schema()
    }

    pub async fn exists(&self) -> Result<bool> {
        self.handle.exists().await
    }

    pub async fn drop(&self) -> Result<()> {
        self.handle.drop().await
    }

    /// Take the dialect's exclusive table lock for the rest of the current transaction.
    ///
    /// The lock is advisory with respect to this engine: only callers that
    /// lock before touching the table are serialized by it.
    pub async fn lock_exclusive(&self) -> Result<()> {
        let support = self.handle.support;
        let sql = support.render(
            support.profile().lock_table,
            self.schema(),
            Some(self.name()),
            None,
        )?;
        tracing::debug!(schema = %self.schema(), table = %self.name(), "Locking table");
        support.executor().execute_update(&sql).await?;
        Ok(())
    }
}

impl<E> fmt::Display for Table<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.handle.schema, self.handle.descriptor.name)
    }
}
