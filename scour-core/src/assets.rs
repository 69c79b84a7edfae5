//! Bundled catalog queries too long or too dialect-specific to inline in a profile.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::dialect::Dialect;
use crate::error::{Result, ScourError};

const BUNDLED: &[(Dialect, &str, &str)] = &[
    (
        Dialect::Db2i,
        "select_procedures.sql",
        include_str!("../queries/db2i/select_procedures.sql"),
    ),
    (
        Dialect::Db2i,
        "select_functions.sql",
        include_str!("../queries/db2i/select_functions.sql"),
    ),
    (
        Dialect::Postgres,
        "select_procedures.sql",
        include_str!("../queries/postgres/select_procedures.sql"),
    ),
    (
        Dialect::Postgres,
        "select_functions.sql",
        include_str!("../queries/postgres/select_functions.sql"),
    ),
];

fn assets() -> &'static HashMap<(Dialect, &'static str), &'static str> {
    static ASSETS: OnceLock<HashMap<(Dialect, &'static str), &'static str>> = OnceLock::new();
    ASSETS.get_or_init(|| {
        BUNDLED
            .iter()
            .map(|(dialect, name, sql)| ((*dialect, *name), *sql))
            .collect()
    })
}

/// Look up the query text bundled for `dialect` under `name`.
pub fn load(dialect: Dialect, name: &str) -> Result<&'static str> {
    assets()
        .get(&(dialect, name))
        .copied()
        .ok_or_else(|| ScourError::ResourceLoad {
            dialect: dialect.to_string(),
            name: name.to_string(),
        })
}
