//! Per-database-product behaviour described as data.
//!
//! Each supported product has one immutable [`DialectProfile`]. Adding a
//! dialect means adding a profile (and its query assets), not new
//! orchestration code.

pub mod db2i;
pub mod postgres;

use std::fmt;

use serde::Serialize;

use crate::error::{Result, ScourError};
use crate::object::ObjectKind;

/// Supported database products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Db2i,
}

static POSTGRES: DialectProfile = postgres::PROFILE;
static DB2I: DialectProfile = db2i::PROFILE;

impl Dialect {
    pub fn profile(self) -> &'static DialectProfile {
        match self {
            Dialect::Postgres => &POSTGRES,
            Dialect::Db2i => &DB2I,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Db2i => "db2i",
        }
    }

    /// Guess the dialect from a connection URL.
    ///
    /// Recognizes JDBC URLs (`jdbc:as400:`, `jdbc:postgresql:`), PostgreSQL
    /// URLs and libpq key/value strings.
    pub fn detect(url: &str) -> Option<Dialect> {
        let lower = url.trim().to_lowercase();
        let lower = lower.strip_prefix("jdbc:").unwrap_or(&lower);
        if lower.starts_with("as400:") || lower.starts_with("db2i:") {
            Some(Dialect::Db2i)
        } else if lower.starts_with("postgresql:")
            || lower.starts_with("postgres:")
            || lower.contains("host=")
            || lower.contains("dbname=")
        {
            Some(Dialect::Postgres)
        } else {
            None
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = ScourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "db2i" | "db2-iseries" | "db2iseries" | "as400" => Ok(Dialect::Db2i),
            _ => Err(ScourError::ConfigError(format!(
                "Unknown dialect '{}'. Use 'postgres' or 'db2i'.",
                s
            ))),
        }
    }
}

/// How the objects of one kind are listed from the catalog.
#[derive(Debug, Clone, Copy)]
pub enum Enumeration {
    /// The dialect has no such objects (or drops them implicitly with others).
    None,
    /// A single-column name query bound once with the schema name.
    Names { sql: &'static str },
    /// A bundled query asset yielding a name column plus a `PARAM_LIST`
    /// column, bound `binds` times with the schema name.
    Signatures {
        asset: &'static str,
        name_column: &'static str,
        binds: usize,
    },
}

/// Catalog query and drop template for one object kind.
///
/// Drop templates may use `{schema}`, `{qschema}`, `{name}`, `{qname}` and
/// `{signature}`; the `q` forms are quoted identifiers.
#[derive(Debug, Clone, Copy)]
pub struct KindSupport {
    pub enumeration: Enumeration,
    pub drop: &'static str,
    /// Names the catalog reports that are never application objects.
    pub excluded_names: &'static [&'static str],
}

impl KindSupport {
    pub const NONE: KindSupport = KindSupport {
        enumeration: Enumeration::None,
        drop: "",
        excluded_names: &[],
    };
}

/// Immutable description of one database product's SQL and catalog conventions.
#[derive(Debug, Clone, Copy)]
pub struct DialectProfile {
    pub dialect: Dialect,
    pub quote_open: char,
    pub quote_close: char,
    pub boolean_true: &'static str,
    pub boolean_false: &'static str,
    /// Whether DDL participates in transactions and rolls back.
    pub supports_ddl_transactions: bool,
    pub catalog_is_schema: bool,
    pub current_schema_query: &'static str,
    /// `None` when the session has no mutable current schema.
    pub set_current_schema: Option<&'static str>,
    pub current_user_query: &'static str,
    pub schema_exists_query: &'static str,
    pub create_schema: &'static str,
    /// `None` when the namespace itself cannot be dropped; dropping a
    /// schema then only cleans it.
    pub drop_schema: Option<&'static str>,
    pub lock_table: &'static str,
    /// Kinds in the order `clean` drops them. Kinds left out are dropped
    /// after the listed ones; see [`DialectProfile::kinds_in_drop_order`].
    pub drop_order: &'static [ObjectKind],
    pub table: KindSupport,
    pub view: KindSupport,
    pub alias: KindSupport,
    pub sequence: KindSupport,
    pub procedure: KindSupport,
    pub function: KindSupport,
    pub trigger: KindSupport,
    pub user_type: KindSupport,
}

impl DialectProfile {
    pub fn kind_support(&self, kind: ObjectKind) -> &KindSupport {
        match kind {
            ObjectKind::Table => &self.table,
            ObjectKind::View => &self.view,
            ObjectKind::Alias => &self.alias,
            ObjectKind::Sequence => &self.sequence,
            ObjectKind::Procedure => &self.procedure,
            ObjectKind::Function => &self.function,
            ObjectKind::Trigger => &self.trigger,
            ObjectKind::Type => &self.user_type,
        }
    }

    /// Every kind, in drop order: the explicit order first, then any kind it omits.
    ///
    /// Both `clean` and the emptiness check walk this sequence, so a partial
    /// order never leaves a kind that is counted but not dropped.
    pub fn kinds_in_drop_order(&self) -> Vec<ObjectKind> {
        let mut kinds: Vec<ObjectKind> = Vec::with_capacity(ObjectKind::ALL.len());
        for &kind in self.drop_order.iter().chain(ObjectKind::ALL.iter()) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    /// Whether some drop template names objects without their schema, so
    /// the statement resolves against the session's current schema.
    pub fn drops_resolve_in_current_schema(&self) -> bool {
        ObjectKind::ALL.iter().any(|&kind| {
            let support = self.kind_support(kind);
            !matches!(support.enumeration, Enumeration::None) && support.drop.contains("{name}")
        })
    }

    /// Wrap an identifier in quotes, doubling embedded closing quotes.
    pub fn quote(&self, identifier: &str) -> String {
        let mut escaped = String::with_capacity(identifier.len() + 2);
        escaped.push(self.quote_open);
        for c in identifier.chars() {
            if c == self.quote_close {
                escaped.push(c);
            }
            escaped.push(c);
        }
        escaped.push(self.quote_close);
        escaped
    }

    pub fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            self.boolean_true
        } else {
            self.boolean_false
        }
    }
}
