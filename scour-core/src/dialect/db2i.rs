//! DB2 for IBM i (iSeries / AS400).
//!
//! The catalog reports no foreign-key, view or trigger dependencies in a
//! form usable for ordering, so `clean` relies on the fixed drop order
//! below. A namespace (library) can only be dropped when the job runs at
//! commit level NONE and the library is outside the library list, so this
//! profile has no schema drop: dropping a schema cleans it.

use super::{Dialect, DialectProfile, Enumeration, KindSupport};
use crate::object::ObjectKind;

/// System catalog views DB2 for i creates inside every SQL schema.
pub const SYSTEM_VIEWS: &[&str] = &[
    "SYSTABLES",
    "SYSINDEXES",
    "SYSCOLUMNS",
    "SYSKEYS",
    "SYSVIEWDEP",
    "SYSVIEWS",
    "SYSPACKAGE",
    "SYSCST",
    "SYSREFCST",
    "SYSKEYCST",
    "SYSCSTDEP",
    "SYSCSTCOL",
    "SYSCHKCST",
    "SYSTRIGGERS",
    "SYSTRIGDEP",
    "SYSTRIGCOL",
    "SYSTRIGUPD",
    "SYSTABLEDEP",
    "SYSFIELDS",
];

pub const DROP_ORDER: &[ObjectKind] = &[
    ObjectKind::View,
    ObjectKind::Alias,
    ObjectKind::Table,
    ObjectKind::Sequence,
    ObjectKind::Procedure,
    ObjectKind::Trigger,
    ObjectKind::Function,
    ObjectKind::Type,
];

pub const PROFILE: DialectProfile = DialectProfile {
    dialect: Dialect::Db2i,
    quote_open: '"',
    quote_close: '"',
    boolean_true: "1",
    boolean_false: "0",
    supports_ddl_transactions: true,
    catalog_is_schema: false,
    current_schema_query: "SELECT CURRENT_SCHEMA FROM SYSIBM.SYSDUMMY1",
    set_current_schema: Some("SET SCHEMA {qschema}"),
    current_user_query: "SELECT USER FROM SYSIBM.SYSDUMMY1",
    schema_exists_query: "SELECT COUNT(*) FROM SYSIBM.SCHEMATA WHERE SCHEMA_NAME = ?",
    create_schema: "CREATE SCHEMA {qschema}",
    drop_schema: None,
    lock_table: "LOCK TABLE {qschema}.{qname} IN EXCLUSIVE MODE",
    drop_order: DROP_ORDER,
    table: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT TABLE_NAME FROM SYSIBM.TABLES \
                  WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME",
        },
        drop: "DROP TABLE {qschema}.{qname}",
        excluded_names: &[],
    },
    view: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT TABLE_NAME FROM SYSIBM.VIEWS WHERE TABLE_SCHEMA = ? ORDER BY TABLE_NAME",
        },
        drop: "DROP VIEW {name}",
        excluded_names: SYSTEM_VIEWS,
    },
    alias: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT TABLE_NAME FROM SYSIBM.TABLES \
                  WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'ALIAS' ORDER BY TABLE_NAME",
        },
        drop: "DROP ALIAS {name}",
        excluded_names: &[],
    },
    sequence: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT SYSTEM_SEQ_NAME FROM QSYS2.SYSSEQUENCES \
                  WHERE SEQUENCE_SCHEMA = ? ORDER BY SYSTEM_SEQ_NAME",
        },
        drop: "DROP SEQUENCE {name}",
        excluded_names: &[],
    },
    procedure: KindSupport {
        enumeration: Enumeration::Signatures {
            asset: "select_procedures.sql",
            name_column: "PROCEDURE_NAME",
            binds: 2,
        },
        drop: "DROP PROCEDURE {name} ( {signature} )",
        excluded_names: &[],
    },
    function: KindSupport {
        enumeration: Enumeration::Signatures {
            asset: "select_functions.sql",
            name_column: "FUNCTION_NAME",
            binds: 2,
        },
        drop: "DROP FUNCTION {qschema}.{qname} ( {signature} )",
        excluded_names: &[],
    },
    trigger: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT TRIGGER_NAME FROM QSYS2.SYSTRIGGERS \
                  WHERE TRIGGER_SCHEMA = ? ORDER BY TRIGGER_NAME",
        },
        drop: "DROP TRIGGER {name}",
        excluded_names: &[],
    },
    user_type: KindSupport {
        enumeration: Enumeration::Names {
            sql: "SELECT USER_DEFINED_TYPE_NAME FROM QSYS2.SYSTYPES \
                  WHERE USER_DEFINED_TYPE_SCHEMA = ? ORDER BY USER_DEFINED_TYPE_NAME",
        },
        drop: "DROP TYPE {qschema}.{qname}",
        excluded_names: &[],
    },
};
