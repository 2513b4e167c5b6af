//! Integration tests for gateways, record sets and the catalog over an
//! on-disk SQLite database.

mod common;

use std::sync::Arc;
use std::thread;

use common::{account_types, fixture_file, test_gateway};
use table_gateway::{
    record, Config, Criteria, GatewayCatalog, GatewayError, RecordSet, SqliteDatabase,
    TableDataGateway, Value,
};

// =============================================================================
// Gateway round trips
// =============================================================================

#[test]
fn test_insert_then_find_round_trip() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);

    let id = gw
        .insert(&record([
            ("col1", Value::from("fresh")),
            ("col2", Value::from("17")),
            ("col3", Value::from(false)),
        ]))
        .unwrap();

    let row = gw.find(id).unwrap();
    assert_eq!(row["id"], Value::Integer(id));
    assert_eq!(row["col1"], Value::from("fresh"));
    assert_eq!(row["col2"], Value::Integer(17));
    assert_eq!(row["col3"], Value::Bool(false));
}

#[test]
fn test_changes_persist_across_connections() {
    let (dir, db) = fixture_file();
    let id = test_gateway(db).insert(&record([("col1", "persisted")])).unwrap();

    let path = dir.path().join("fixture.db");
    let reopened = Arc::new(SqliteDatabase::new(path.to_string_lossy().into_owned()));
    let row = test_gateway(reopened).find(id).unwrap();
    assert_eq!(row["col1"], Value::from("persisted"));
}

#[test]
fn test_delete_twice() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);
    assert!(gw.delete(3).unwrap());
    assert!(!gw.delete(3).unwrap());
    assert_eq!(gw.find_all().unwrap().len(), 4);
}

#[test]
fn test_update_counts_affected_rows() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);

    assert_eq!(
        gw.update(&record([("col3", false)]), &record([("col1", "text3")]))
            .unwrap(),
        3
    );
    assert_eq!(
        gw.update(&record([("col3", false)]), &record([("col1", "missing")]))
            .unwrap(),
        0
    );

    let rows = gw.select(&record([("col3", false)])).unwrap();
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_update_by_own_id_then_find() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);

    let mut row = gw.find(2).unwrap();
    row.insert("col2".to_string(), Value::Integer(1000));
    assert_eq!(gw.update(&row, &Criteria::new()).unwrap(), 1);
    assert_eq!(gw.find(2).unwrap()["col2"], Value::Integer(1000));
}

#[test]
fn test_null_values_round_trip() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);

    let id = gw
        .insert(&record([("col1", Value::Null), ("col2", Value::Null)]))
        .unwrap();
    let row = gw.find(id).unwrap();
    assert_eq!(row["col1"], Value::Null);
    assert_eq!(row["col2"], Value::Null);
    assert_eq!(row["col3"], Value::Null);
}

#[test]
fn test_constraint_violation_keeps_gateway_usable() {
    let (_dir, db) = fixture_file();
    let gw = TableDataGateway::new(db, "Account", "id", account_types()).unwrap();

    let err = gw
        .insert(&record([("email", "alice@example.com")]))
        .unwrap_err();
    assert!(matches!(err, GatewayError::ConstraintViolation { .. }));
    assert_eq!(err.exit_code(), 4);

    let id = gw.insert(&record([("email", "carol@example.com")])).unwrap();
    assert_eq!(gw.find(id).unwrap()["email"], Value::from("carol@example.com"));
}

#[test]
fn test_read_only_database_rejects_writes() {
    let (dir, db) = fixture_file();
    drop(db);

    let path = dir.path().join("fixture.db");
    let ro = Arc::new(SqliteDatabase::with_options(
        path.to_string_lossy().into_owned(),
        true,
        false,
    ));
    let gw = test_gateway(ro);
    assert_eq!(gw.find(1).unwrap()["col1"], Value::from("text1"));
    let err = gw.insert(&record([("col1", "x")])).unwrap_err();
    assert!(err.is_database_error());
}

#[test]
fn test_missing_database_without_create_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    let db = Arc::new(SqliteDatabase::with_options(
        path.to_string_lossy().into_owned(),
        false,
        false,
    ));
    let gw = test_gateway(db);
    assert!(matches!(gw.find_all(), Err(GatewayError::Connection(_))));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_shared_gateway_across_threads() {
    let (_dir, db) = fixture_file();
    let gw = Arc::new(test_gateway(db));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let gw = Arc::clone(&gw);
            thread::spawn(move || {
                gw.insert(&record([("col1", Value::from("thread")), ("col2", Value::from(i))]))
                    .unwrap()
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(gw.select(&record([("col1", "thread")])).unwrap().len(), 4);
}

#[test]
fn test_gateways_sharing_a_connection_get_their_own_insert_ids() {
    const ROWS: i64 = 300;

    let (_dir, db) = fixture_file();
    let mut catalog = GatewayCatalog::new(db);
    catalog
        .register_table("Test", common::test_types(), "id")
        .unwrap();
    catalog.register_table("Account", account_types(), "id").unwrap();
    let tests = catalog.get_table_gateway("Test").unwrap();
    let accounts = catalog.get_table_gateway("Account").unwrap();

    let test_writer = {
        let tests = Arc::clone(&tests);
        thread::spawn(move || {
            (0..ROWS)
                .filter(|i| {
                    let id = tests
                        .insert(&record([("col1", Value::from("marker")), ("col2", Value::from(*i))]))
                        .unwrap();
                    let row = tests.find(id).unwrap();
                    row["col1"] != Value::from("marker") || row["col2"] != Value::Integer(*i)
                })
                .count()
        })
    };
    let account_writer = {
        let accounts = Arc::clone(&accounts);
        thread::spawn(move || {
            (0..ROWS)
                .filter(|i| {
                    let email = format!("user{}@example.com", i);
                    let id = accounts
                        .insert(&record([("email", Value::from(email.as_str())), ("owner", Value::from(*i))]))
                        .unwrap();
                    accounts.find(id).unwrap()["email"] != Value::from(email.as_str())
                })
                .count()
        })
    };

    assert_eq!(test_writer.join().unwrap(), 0);
    assert_eq!(account_writer.join().unwrap(), 0);
    assert_eq!(tests.find_all().unwrap().len(), 5 + ROWS as usize);
    assert_eq!(accounts.find_all().unwrap().len(), 1 + ROWS as usize);
}

// =============================================================================
// Record sets
// =============================================================================

#[test]
fn test_record_set_over_gateway() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);

    let mut set = RecordSet::new(&gw, gw.select(&record([("col1", "text3")])).unwrap()).unwrap();
    assert_eq!(set.ids().collect::<Vec<_>>(), vec![3, 4, 5]);
    assert_eq!(set.find(&record([("col2", 45)])), Some(4));

    let id = set
        .add(record([("col1", Value::from("text3")), ("col2", Value::from(47))]))
        .unwrap();
    assert_eq!(id, 6);
    assert_eq!(set.count(), 4);
    assert_eq!(gw.find(6).unwrap()["col2"], Value::Integer(47));

    set.set(3, "col2", 0).unwrap();
    assert_eq!(gw.find(3).unwrap()["col2"], Value::Integer(44));
}

#[test]
fn test_record_set_add_with_id_is_rejected_by_gateway() {
    let (_dir, db) = fixture_file();
    let gw = test_gateway(db);
    let mut set = RecordSet::new(&gw, gw.find_all().unwrap()).unwrap();

    let err = set
        .add(record([("id", Value::from(50)), ("col1", Value::from("x"))]))
        .unwrap_err();
    assert!(matches!(err, GatewayError::Database(_)));
    assert_eq!(set.count(), 5);
}

// =============================================================================
// Catalog and configuration
// =============================================================================

#[test]
fn test_catalog_hands_out_singletons() {
    let (_dir, db) = fixture_file();
    let mut catalog = GatewayCatalog::new(db);
    catalog
        .register_table("Test", common::test_types(), "id")
        .unwrap();
    catalog.register_table("Account", account_types(), "id").unwrap();

    let a = catalog.get_table_gateway("Account").unwrap();
    let b = catalog.get_table_gateway("Account").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.find(1).unwrap()["email"], Value::from("alice@example.com"));

    assert!(matches!(
        catalog.get_table_gateway("Missing"),
        Err(GatewayError::Config(_))
    ));
}

#[test]
fn test_config_to_catalog() {
    let (dir, db) = fixture_file();
    drop(db);

    let yaml = format!(
        r#"
database:
  type: sqlite
  path: "{}"
  create_if_missing: false
tables:
  Test:
    columns:
      id: integer
      col1: string
      col2: integer
      col3: boolean
"#,
        dir.path().join("fixture.db").display()
    );

    let catalog = Config::from_yaml(&yaml).unwrap().build_catalog().unwrap();
    let gw = catalog.get_table_gateway("Test").unwrap();
    let rows = gw.select(&record([("col3", true)])).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["col3"] == Value::Bool(true)));
}
