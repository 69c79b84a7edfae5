//! Schema cleanup against an in-memory DB2 for i catalog.
//!
//! Run with: cargo test --test schema_test

mod common;

use common::FakeCatalog;

use scour_core::config::ScourConfig;
use scour_core::dialect::{db2i, DialectProfile};
use scour_core::error::ScourError;
use scour_core::{DbSupport, Dialect, ObjectDescriptor, ObjectKind, Scour, SchemaDropOutcome};

const SCHEMA: &str = "TESTADM";

/// DB2 for i with an order that only names tables.
static TABLES_FIRST: DialectProfile = DialectProfile {
    drop_order: &[ObjectKind::Table],
    ..db2i::PROFILE
};

fn db2i_config(schemas: &[&str], clean_enabled: bool) -> ScourConfig {
    let mut config = ScourConfig::default();
    config.schemas.dialect = Some(Dialect::Db2i);
    config.schemas.schemas = schemas.iter().map(|s| s.to_string()).collect();
    config.schemas.clean_enabled = clean_enabled;
    config
}

#[tokio::test]
async fn test_clean_drops_table_then_sequence() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .with_object(SCHEMA, ObjectKind::Sequence, "BEAST_SEQ");
    let support = DbSupport::new(&fake, Dialect::Db2i);
    let schema = support.schema(SCHEMA);

    let report = schema.clean().await.expect("clean failed");

    assert_eq!(
        fake.drops(),
        vec![
            "DROP TABLE \"TESTADM\".\"PERSON\"".to_string(),
            "DROP SEQUENCE BEAST_SEQ".to_string(),
        ]
    );
    assert_eq!(report.dropped.len(), 2);
    assert!(report.vanished.is_empty());
    assert!(schema.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_clean_is_idempotent() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V")
        .with_object(SCHEMA, ObjectKind::Table, "PERSON");
    let support = DbSupport::new(&fake, Dialect::Db2i);
    let schema = support.schema(SCHEMA);

    schema.clean().await.unwrap();
    let drops_after_first = fake.drops().len();
    assert_eq!(drops_after_first, 2);

    let second = schema.clean().await.unwrap();
    assert!(second.dropped.is_empty());
    assert_eq!(fake.drops().len(), drops_after_first);
}

#[tokio::test]
async fn test_clean_follows_dialect_drop_order() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Type, "MONEY")
        .with_object(SCHEMA, ObjectKind::Trigger, "PERSON_TRG")
        .with_routine(SCHEMA, ObjectKind::Function, "TAX", "DECIMAL(9, 2)")
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .with_object(SCHEMA, ObjectKind::Alias, "PEOPLE")
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let report = support.schema(SCHEMA).clean().await.unwrap();

    let kinds: Vec<ObjectKind> = report.dropped.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ObjectKind::View,
            ObjectKind::Alias,
            ObjectKind::Table,
            ObjectKind::Trigger,
            ObjectKind::Function,
            ObjectKind::Type,
        ]
    );
    assert_eq!(
        fake.drops(),
        vec![
            "DROP VIEW PERSON_V".to_string(),
            "DROP ALIAS PEOPLE".to_string(),
            "DROP TABLE \"TESTADM\".\"PERSON\"".to_string(),
            "DROP TRIGGER PERSON_TRG".to_string(),
            "DROP FUNCTION \"TESTADM\".\"TAX\" ( DECIMAL(9, 2) )".to_string(),
            "DROP TYPE \"TESTADM\".\"MONEY\"".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_clean_drops_each_procedure_overload() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_routine(SCHEMA, ObjectKind::Procedure, "P1", "INTEGER")
        .with_routine(SCHEMA, ObjectKind::Procedure, "P1", "INTEGER, INTEGER");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let procedures = support.catalog().procedures(SCHEMA).await.unwrap();
    assert_eq!(procedures.len(), 2);

    support.schema(SCHEMA).clean().await.unwrap();

    assert_eq!(
        fake.drops(),
        vec![
            "DROP PROCEDURE P1 ( INTEGER )".to_string(),
            "DROP PROCEDURE P1 ( INTEGER, INTEGER )".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_system_views_are_never_listed_or_dropped() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::View, "SYSTABLES")
        .with_object(SCHEMA, ObjectKind::View, "SYSCOLUMNS")
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let views = support.catalog().views(SCHEMA).await.unwrap();
    assert_eq!(views, vec![ObjectDescriptor::new(ObjectKind::View, "PERSON_V")]);

    let schema = support.schema(SCHEMA);
    schema.clean().await.unwrap();
    assert_eq!(fake.drops(), vec!["DROP VIEW PERSON_V".to_string()]);
    assert!(schema.is_empty().await.unwrap());
    assert_eq!(fake.remaining(SCHEMA).len(), 2);
}

#[tokio::test]
async fn test_exists_reflects_create() {
    let fake = FakeCatalog::db2i();
    let support = DbSupport::new(&fake, Dialect::Db2i);
    let schema = support.schema("FLYWAY_1");

    assert!(!schema.exists().await.unwrap());
    schema.create().await.unwrap();
    assert!(schema.exists().await.unwrap());
    assert!(schema.is_empty().await.unwrap());
    assert_eq!(fake.executed(), vec!["CREATE SCHEMA \"FLYWAY_1\"".to_string()]);
}

#[tokio::test]
async fn test_failed_drop_aborts_with_earlier_drops_applied() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V")
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .with_object(SCHEMA, ObjectKind::Sequence, "BEAST_SEQ")
        .failing_drop_of("PERSON");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let err = support.schema(SCHEMA).clean().await.unwrap_err();

    match err {
        ScourError::CatalogQuery { ref sql, .. } => {
            assert_eq!(sql, "DROP TABLE \"TESTADM\".\"PERSON\"");
        }
        other => panic!("expected CatalogQuery, got {other:?}"),
    }
    let remaining: Vec<String> = fake.remaining(SCHEMA).into_iter().map(|d| d.name).collect();
    assert_eq!(remaining, vec!["PERSON".to_string(), "BEAST_SEQ".to_string()]);
    assert!(!fake.drops().contains(&"DROP SEQUENCE BEAST_SEQ".to_string()));
}

#[tokio::test]
async fn test_object_gone_before_drop_is_skipped() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .with_object(SCHEMA, ObjectKind::Table, "ADDRESS")
        .vanishing_drop_of("PERSON");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let report = support.schema(SCHEMA).clean().await.unwrap();

    assert_eq!(report.vanished, vec![ObjectDescriptor::new(ObjectKind::Table, "PERSON")]);
    assert_eq!(report.dropped, vec![ObjectDescriptor::new(ObjectKind::Table, "ADDRESS")]);
    assert!(fake.remaining(SCHEMA).is_empty());
}

#[tokio::test]
async fn test_drop_schema_only_cleans_on_db2i() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON");
    let support = DbSupport::new(&fake, Dialect::Db2i);
    let schema = support.schema(SCHEMA);

    let report = schema.drop().await.unwrap();

    assert_eq!(report.outcome, SchemaDropOutcome::CleanedOnly);
    assert_eq!(report.clean.dropped.len(), 1);
    assert!(schema.exists().await.unwrap());
    assert!(schema.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_table_lock_uses_exclusive_mode() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON");
    let support = DbSupport::new(&fake, Dialect::Db2i);
    let schema = support.schema(SCHEMA);

    let tables = schema.tables().await.unwrap();
    assert_eq!(tables.len(), 1);
    assert!(tables[0].exists().await.unwrap());
    tables[0].lock_exclusive().await.unwrap();

    assert_eq!(
        fake.executed(),
        vec!["LOCK TABLE \"TESTADM\".\"PERSON\" IN EXCLUSIVE MODE".to_string()]
    );
}

#[tokio::test]
async fn test_current_schema_switch() {
    let fake = FakeCatalog::db2i().with_schema(SCHEMA);
    let support = DbSupport::new(&fake, Dialect::Db2i);

    assert_eq!(support.current_schema().await.unwrap(), "QGPL");
    support.set_current_schema(SCHEMA).await.unwrap();
    assert_eq!(support.current_schema().await.unwrap(), SCHEMA);
    assert_eq!(support.current_user().await.unwrap(), "TESTUSER");
}

#[tokio::test]
async fn test_clean_makes_schema_current_for_bare_name_drops() {
    let fake = FakeCatalog::db2i()
        .with_schema("QGPL")
        .with_schema(SCHEMA)
        .with_object("QGPL", ObjectKind::View, "PERSON_V")
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V")
        .with_object(SCHEMA, ObjectKind::Sequence, "BEAST_SEQ");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    support.schema(SCHEMA).clean().await.unwrap();

    assert_eq!(
        fake.executed(),
        vec![
            "SET SCHEMA \"TESTADM\"".to_string(),
            "DROP VIEW PERSON_V".to_string(),
            "DROP SEQUENCE BEAST_SEQ".to_string(),
            "SET SCHEMA \"QGPL\"".to_string(),
        ]
    );
    assert!(fake.remaining(SCHEMA).is_empty());
    assert_eq!(
        fake.remaining("QGPL"),
        vec![ObjectDescriptor::new(ObjectKind::View, "PERSON_V")]
    );
    assert_eq!(fake.current_schema(), "QGPL");
}

#[tokio::test]
async fn test_clean_restores_current_schema_after_failure() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .failing_drop_of("PERSON");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    assert!(support.schema(SCHEMA).clean().await.is_err());

    assert_eq!(fake.current_schema(), "QGPL");
    assert_eq!(fake.executed().last().map(String::as_str), Some("SET SCHEMA \"QGPL\""));
}

#[tokio::test]
async fn test_clean_of_current_schema_does_not_switch() {
    let fake = FakeCatalog::db2i()
        .with_current_schema(SCHEMA)
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Alias, "PEOPLE");
    let support = DbSupport::new(&fake, Dialect::Db2i);

    support.schema(SCHEMA).clean().await.unwrap();

    assert_eq!(fake.executed(), vec!["DROP ALIAS PEOPLE".to_string()]);
}

#[tokio::test]
async fn test_partial_drop_order_still_empties_schema() {
    let fake = FakeCatalog::db2i()
        .with_current_schema(SCHEMA)
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Sequence, "BEAST_SEQ")
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V")
        .with_object(SCHEMA, ObjectKind::Table, "PERSON");
    let support = DbSupport::with_profile(&fake, &TABLES_FIRST);
    let schema = support.schema(SCHEMA);

    schema.clean().await.unwrap();

    assert_eq!(
        fake.drops(),
        vec![
            "DROP TABLE \"TESTADM\".\"PERSON\"".to_string(),
            "DROP VIEW PERSON_V".to_string(),
            "DROP SEQUENCE BEAST_SEQ".to_string(),
        ]
    );
    assert!(schema.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_rejected_listing_aborts_before_later_kinds() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::View, "PERSON_V")
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .failing_list_of(ObjectKind::View, 0);
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let err = support.schema(SCHEMA).clean().await.unwrap_err();

    match err {
        ScourError::CatalogQuery { ref sql, .. } => assert!(sql.contains("SYSIBM.VIEWS")),
        other => panic!("expected CatalogQuery, got {other:?}"),
    }
    assert!(fake.drops().is_empty());
    assert_eq!(fake.remaining(SCHEMA).len(), 2);
    assert_eq!(fake.current_schema(), "QGPL");
}

#[tokio::test]
async fn test_failed_lookup_after_failed_drop_keeps_drop_error() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .failing_drop_of("PERSON")
        .failing_list_of(ObjectKind::Table, 1);
    let support = DbSupport::new(&fake, Dialect::Db2i);

    let err = support.schema(SCHEMA).clean().await.unwrap_err();

    match err {
        ScourError::CatalogQuery { ref sql, .. } => {
            assert_eq!(sql, "DROP TABLE \"TESTADM\".\"PERSON\"");
        }
        other => panic!("expected CatalogQuery, got {other:?}"),
    }
}

#[tokio::test]
async fn test_postgres_clean_renders_qualified_drops() {
    let fake = FakeCatalog::new(Dialect::Postgres)
        .with_schema("app")
        .with_object("app", ObjectKind::Table, "person")
        .with_object("app", ObjectKind::View, "person_v")
        .with_object("app", ObjectKind::Sequence, "beast_seq")
        .with_routine("app", ObjectKind::Function, "add", "a integer, b integer")
        .with_routine("app", ObjectKind::Procedure, "noop", "")
        .with_object("app", ObjectKind::Type, "mood");
    let support = DbSupport::new(&fake, Dialect::Postgres);
    let schema = support.schema("app");

    let report = schema.clean().await.unwrap();

    assert_eq!(report.dropped.len(), 6);
    assert_eq!(
        fake.executed(),
        vec![
            "DROP VIEW IF EXISTS \"app\".\"person_v\" CASCADE".to_string(),
            "DROP TABLE IF EXISTS \"app\".\"person\" CASCADE".to_string(),
            "DROP SEQUENCE IF EXISTS \"app\".\"beast_seq\" CASCADE".to_string(),
            "DROP PROCEDURE IF EXISTS \"app\".\"noop\"() CASCADE".to_string(),
            "DROP ROUTINE IF EXISTS \"app\".\"add\"(a integer, b integer) CASCADE".to_string(),
            "DROP TYPE IF EXISTS \"app\".\"mood\" CASCADE".to_string(),
        ]
    );
    assert!(schema.is_empty().await.unwrap());
}

// ─── Commands ───

#[tokio::test]
async fn test_clean_command_requires_permission() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON");
    let scour = Scour::with_executor(db2i_config(&[SCHEMA], false), &fake);

    let err = scour.clean(false).await.unwrap_err();
    assert!(matches!(err, ScourError::CleanDisabled));
    assert!(fake.executed().is_empty());

    let reports = scour.clean(true).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].dropped.len(), 1);
}

#[tokio::test]
async fn test_clean_command_skips_missing_schema() {
    let fake = FakeCatalog::db2i().with_schema(SCHEMA);
    let scour = Scour::with_executor(db2i_config(&["MISSING", SCHEMA], true), &fake);

    let reports = scour.clean(false).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.dropped.is_empty()));
}

#[tokio::test]
async fn test_create_and_info_commands() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .with_object(SCHEMA, ObjectKind::Sequence, "BEAST_SEQ");
    let scour = Scour::with_executor(db2i_config(&[SCHEMA, "FLYWAY_1"], false), &fake);

    let created = scour.create().await.unwrap();
    assert_eq!(created, vec!["FLYWAY_1".to_string()]);
    assert!(scour.create().await.unwrap().is_empty());

    let infos = scour.info().await.unwrap();
    assert_eq!(infos.len(), 2);
    assert!(infos[0].exists);
    assert!(!infos[0].empty);
    assert_eq!(infos[0].total(), 2);
    assert_eq!(infos[0].details.len(), 2);
    assert!(infos[1].exists);
    assert!(infos[1].empty);
}

#[tokio::test]
async fn test_info_lists_each_kind_once() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON")
        .with_object(SCHEMA, ObjectKind::Table, "ADDRESS");
    let scour = Scour::with_executor(db2i_config(&[SCHEMA], false), &fake);

    let infos = scour.info().await.unwrap();

    assert_eq!(fake.list_queries(), ObjectKind::ALL.len());
    let tables = infos[0]
        .objects
        .iter()
        .find(|c| c.kind == ObjectKind::Table)
        .unwrap();
    assert_eq!(tables.count, 2);
    assert_eq!(infos[0].objects.len(), ObjectKind::ALL.len());
}

#[tokio::test]
async fn test_drop_command_reports_cleaned_only() {
    let fake = FakeCatalog::db2i()
        .with_schema(SCHEMA)
        .with_object(SCHEMA, ObjectKind::Table, "PERSON");
    let scour = Scour::with_executor(db2i_config(&[SCHEMA, "MISSING"], true), &fake);

    let reports = scour.drop_schemas(false).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, SchemaDropOutcome::CleanedOnly);
}

#[tokio::test]
async fn test_set_current_schema_rejects_bad_identifier() {
    let fake = FakeCatalog::db2i();
    let scour = Scour::with_executor(db2i_config(&[SCHEMA], false), &fake);

    assert!(scour.set_current_schema("X; DROP").await.is_err());
    assert!(fake.executed().is_empty());
}
