//! In-memory catalog that answers the queries a dialect profile issues.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use scour_core::dialect::{Dialect, DialectProfile, Enumeration};
use scour_core::error::{Result, ScourError};
use scour_core::executor::{CatalogQueryExecutor, CatalogRow};
use scour_core::{assets, template, ObjectDescriptor, ObjectKind};

#[derive(Debug, Clone)]
pub struct FakeObject {
    pub schema: String,
    pub descriptor: ObjectDescriptor,
}

#[derive(Default)]
struct State {
    schemas: Vec<String>,
    objects: Vec<FakeObject>,
    executed: Vec<String>,
    /// Drops of these names are rejected and the object stays.
    fail_on_drop: Vec<String>,
    /// Drops of these names are rejected but the object is gone afterwards.
    vanish_on_drop: Vec<String>,
    /// List queries for a kind succeed this many times, then fail.
    failing_lists: Vec<(ObjectKind, usize)>,
    list_queries: usize,
}

/// A catalog for one dialect, backed by a list of objects.
pub struct FakeCatalog {
    dialect: Dialect,
    current_schema: Mutex<String>,
    state: Mutex<State>,
}

impl FakeCatalog {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            current_schema: Mutex::new("QGPL      ".to_string()),
            state: Mutex::new(State::default()),
        }
    }

    pub fn db2i() -> Self {
        Self::new(Dialect::Db2i)
    }

    fn profile(&self) -> &'static DialectProfile {
        self.dialect.profile()
    }

    pub fn with_schema(self, schema: &str) -> Self {
        self.state.lock().unwrap().schemas.push(schema.to_string());
        self
    }

    pub fn with_object(self, schema: &str, kind: ObjectKind, name: &str) -> Self {
        self.push(schema, ObjectDescriptor::new(kind, name))
    }

    pub fn with_routine(self, schema: &str, kind: ObjectKind, name: &str, signature: &str) -> Self {
        self.push(schema, ObjectDescriptor::with_signature(kind, name, signature))
    }

    pub fn failing_drop_of(self, name: &str) -> Self {
        self.state.lock().unwrap().fail_on_drop.push(name.to_string());
        self
    }

    pub fn vanishing_drop_of(self, name: &str) -> Self {
        self.state.lock().unwrap().vanish_on_drop.push(name.to_string());
        self
    }

    /// Make listing `kind` fail once it has succeeded `after` times.
    pub fn failing_list_of(self, kind: ObjectKind, after: usize) -> Self {
        self.state.lock().unwrap().failing_lists.push((kind, after));
        self
    }

    pub fn with_current_schema(self, schema: &str) -> Self {
        *self.current_schema.lock().unwrap() = format!("{:<10}", schema);
        self
    }

    pub fn current_schema(&self) -> String {
        self.current_schema.lock().unwrap().trim_end().to_string()
    }

    /// Number of object-listing queries answered or rejected so far.
    pub fn list_queries(&self) -> usize {
        self.state.lock().unwrap().list_queries
    }

    fn push(self, schema: &str, descriptor: ObjectDescriptor) -> Self {
        self.state.lock().unwrap().objects.push(FakeObject {
            schema: schema.to_string(),
            descriptor,
        });
        self
    }

    /// Statements passed to `execute` and `execute_update`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn drops(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|s| s.starts_with("DROP "))
            .collect()
    }

    pub fn remaining(&self, schema: &str) -> Vec<ObjectDescriptor> {
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .filter(|o| o.schema == schema)
            .map(|o| o.descriptor.clone())
            .collect()
    }

    fn kind_for_names_query(&self, sql: &str) -> Option<ObjectKind> {
        ObjectKind::ALL.into_iter().find(|&kind| {
            matches!(self.profile().kind_support(kind).enumeration, Enumeration::Names { sql: q } if q == sql)
        })
    }

    fn kind_for_asset_query(&self, sql: &str) -> Option<(ObjectKind, &'static str)> {
        ObjectKind::ALL.into_iter().find_map(|kind| {
            match self.profile().kind_support(kind).enumeration {
                Enumeration::Signatures {
                    asset, name_column, ..
                } => match assets::load(self.dialect, asset) {
                    Ok(text) if text == sql => Some((kind, name_column)),
                    _ => None,
                },
                _ => None,
            }
        })
    }

    fn check_list(&self, sql: &str, kind: ObjectKind) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.list_queries += 1;
        for (failing, remaining) in state.failing_lists.iter_mut() {
            if *failing == kind {
                if *remaining == 0 {
                    return Err(Self::rejected(sql, "catalog unavailable"));
                }
                *remaining -= 1;
            }
        }
        Ok(())
    }

    /// Bare-name drops only reach objects in the session's current schema.
    fn resolves(&self, object: &FakeObject) -> bool {
        let drop = self.profile().kind_support(object.descriptor.kind).drop;
        !drop.contains("{name}") || object.schema == self.current_schema()
    }

    fn drop_statement(&self, object: &FakeObject) -> String {
        let profile = self.profile();
        let qschema = profile.quote(&object.schema);
        let qname = profile.quote(&object.descriptor.name);
        let signature = object.descriptor.signature.clone().unwrap_or_default();
        template::render(
            profile.kind_support(object.descriptor.kind).drop,
            &[
                ("schema", object.schema.as_str()),
                ("qschema", qschema.as_str()),
                ("name", object.descriptor.name.as_str()),
                ("qname", qname.as_str()),
                ("signature", signature.as_str()),
            ],
        )
        .unwrap()
    }

    fn rejected(sql: &str, message: &str) -> ScourError {
        ScourError::catalog(sql, std::io::Error::other(message.to_string()))
    }
}

#[async_trait]
impl CatalogQueryExecutor for FakeCatalog {
    async fn query_scalar_int(&self, sql: &str, params: &[&str]) -> Result<i64> {
        if sql == self.profile().schema_exists_query {
            let state = self.state.lock().unwrap();
            return Ok(state.schemas.iter().filter(|s| s.as_str() == params[0]).count() as i64);
        }
        Err(Self::rejected(sql, "unexpected scalar query"))
    }

    async fn query_scalar_string(&self, sql: &str, _params: &[&str]) -> Result<String> {
        if sql == self.profile().current_schema_query {
            return Ok(self.current_schema.lock().unwrap().clone());
        }
        if sql == self.profile().current_user_query {
            return Ok("TESTUSER  ".to_string());
        }
        Err(Self::rejected(sql, "unexpected scalar query"))
    }

    async fn query_string_list(&self, sql: &str, params: &[&str]) -> Result<Vec<String>> {
        let kind = self
            .kind_for_names_query(sql)
            .ok_or_else(|| Self::rejected(sql, "unexpected list query"))?;
        self.check_list(sql, kind)?;
        let state = self.state.lock().unwrap();
        // DB2 pads CHAR catalog columns
        Ok(state
            .objects
            .iter()
            .filter(|o| o.schema == params[0] && o.descriptor.kind == kind)
            .map(|o| format!("{:<10}", o.descriptor.name))
            .collect())
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let (kind, name_column) = self
            .kind_for_asset_query(sql)
            .ok_or_else(|| Self::rejected(sql, "unexpected row query"))?;
        self.check_list(sql, kind)?;
        assert!(params.iter().all(|p| *p == params[0]), "every bind is the schema");

        let state = self.state.lock().unwrap();
        Ok(state
            .objects
            .iter()
            .filter(|o| o.schema == params[0] && o.descriptor.kind == kind)
            .map(|o| {
                let mut row = CatalogRow::new();
                row.insert(name_column.to_string(), o.descriptor.name.clone());
                row.insert(
                    "PARAM_LIST".to_string(),
                    o.descriptor.signature.clone().unwrap_or_default(),
                );
                row
            })
            .collect())
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        let profile = self.profile();
        let mut state = self.state.lock().unwrap();
        state.executed.push(sql.to_string());

        if let Some(rest) = sql.strip_prefix("SET SCHEMA ") {
            *self.current_schema.lock().unwrap() = rest.trim_matches('"').to_string();
            return Ok(());
        }
        if let Some(rest) = sql.strip_prefix("SET search_path TO ") {
            *self.current_schema.lock().unwrap() = rest.trim_matches('"').to_string();
            return Ok(());
        }

        let schema_names = state.schemas.clone();
        for schema in schema_names {
            let create = template::render(
                profile.create_schema,
                &[("schema", schema.as_str()), ("qschema", profile.quote(&schema).as_str())],
            )
            .unwrap();
            if create == sql {
                return Err(Self::rejected(sql, "schema already exists"));
            }
        }
        if let Some(quoted) = sql.strip_prefix("CREATE SCHEMA ") {
            state.schemas.push(quoted.trim_matches('"').to_string());
            return Ok(());
        }

        let position = state
            .objects
            .iter()
            .position(|o| self.resolves(o) && self.drop_statement(o) == sql)
            .ok_or_else(|| Self::rejected(sql, "object not found"))?;
        let name = state.objects[position].descriptor.name.clone();

        if state.fail_on_drop.contains(&name) {
            return Err(Self::rejected(sql, "object in use"));
        }
        state.objects.remove(position);
        if state.vanish_on_drop.contains(&name) {
            return Err(Self::rejected(sql, "object not found"));
        }
        Ok(())
    }

    async fn execute_update(&self, sql: &str) -> Result<u64> {
        self.state.lock().unwrap().executed.push(sql.to_string());
        Ok(0)
    }
}
