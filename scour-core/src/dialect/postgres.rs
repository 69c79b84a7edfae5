//! PostgreSQL.
//!
//! Covers tables, views, sequences, procedures, functions (plain
//! aggregates included, dropped with `DROP ROUTINE`) and enum or composite
//! types. Materialized views, ordered-set aggregates, domains, foreign
//! tables and extension-owned objects are not enumerated: `clean` leaves
//! them in place and `is_empty` does not see them.

use super::{Dialect, DialectProfile, Enumeration, KindSupport};
use crate::object::ObjectKind;

pub const DROP_ORDER: &[ObjectKind] = &[
    ObjectKind::View,
    ObjectKind::Alias,
    ObjectKind::Table,
    ObjectKind::Sequence,
    ObjectKind::Trigger,
    ObjectKind::Procedure,
    ObjectKind::Function,
    ObjectKind::Type,
];

// Triggers go with their tables and PostgreSQL has no aliases, so neither kind is enumerated.
pub const PROFILE: DialectProfile = DialectProfile {
    dialect: Dialect::Postgres,
    quote_open: '"',
    quote_close: '"',
    boolean_true: "TRUE",
    boolean_false: "FALSE",
    supports_ddl_transactions: true,
    catalog_is_schema: false,
    current_schema_query: "SELECT current_schema()",
    set_current_schema: Some("SET search_path TO {qschema}"),
    current_user_query: "SELECT current_user",
    schema_exists_query: "SELECT COUNT(*) FROM pg_namespace WHERE nspname = $1",
    create_schema: "CREATE SCHEMA {qschema}",
    drop_schema: Some("DROP SCHEMA {qschema} CASCADE"),
    lock_table: "LOCK TABLE {qschema}.{qname} IN ACCESS EXCLUSIVE MODE",
    drop_order: DROP_ORDER,
    table: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT tablename FROM pg_tables WHERE schemaname = $1 ORDER BY tablename",
        },
        drop: "DROP TABLE IF EXISTS {qschema}.{qname} CASCADE",
        excluded_names: &[],
    },
    view: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT table_name FROM information_schema.views \
                  WHERE table_schema = $1 ORDER BY table_name",
        },
        drop: "DROP VIEW IF EXISTS {qschema}.{qname} CASCADE",
        excluded_names: &[],
    },
    alias: KindSupport::NONE,
    sequence: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT sequence_name FROM information_schema.sequences \
                  WHERE sequence_schema = $1 ORDER BY sequence_name",
        },
        drop: "DROP SEQUENCE IF EXISTS {qschema}.{qname} CASCADE",
        excluded_names: &[],
    },
    procedure: KindSupport {
        enumeration: Enumeration::Signatures {
            asset: "select_procedures.sql",
            name_column: "PROCEDURE_NAME",
            binds: 1,
        },
        drop: "DROP PROCEDURE IF EXISTS {qschema}.{qname}({signature}) CASCADE",
        excluded_names: &[],
    },
    function: KindSupport {
        enumeration: Enumeration::Signatures {
            asset: "select_functions.sql",
            name_column: "FUNCTION_NAME",
            binds: 1,
        },
        drop: "DROP ROUTINE IF EXISTS {qschema}.{qname}({signature}) CASCADE",
        excluded_names: &[],
    },
    trigger: KindSupport::NONE,
    user_type: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT t.typname \
                  FROM pg_type t \
                  JOIN pg_namespace n ON t.typnamespace = n.oid \
                  LEFT JOIN pg_class c ON c.oid = t.typrelid \
                  WHERE n.nspname = $1 \
                  AND t.typtype IN ('e', 'c') \
                  AND (t.typrelid = 0 OR c.relkind = 'c') \
                  AND t.typname NOT LIKE '\\_%' \
                  ORDER BY t.typname",
        },
        drop: "DROP TYPE IF EXISTS {qschema}.{qname} CASCADE",
        excluded_names: &[],
    },
};
