//! Disk-backed databases.

use kvdoc::{Database, DatabaseConfig, Error, Key, QueryOptions, RangeOptions, Value, INSTANCE_KEY};
use kvdoc_serde_store::parse_json;

fn doc(text: &str) -> Value {
    parse_json(text).unwrap()
}

#[test]
fn data_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");

    let db = Database::open(DatabaseConfig::new(&path)).unwrap();
    db.set("users:1", doc(r#"{"name": "Alice", "langs": ["rust", "go"]}"#))
        .unwrap();
    db.set("hits", 41i64).unwrap();
    db.close().unwrap();

    let db = Database::open(DatabaseConfig::new(&path)).unwrap();
    assert_eq!(db.increase_value("hits", 1i64).unwrap(), Value::Integer(42));

    let found = db.find_one(&doc(r#"{"langs": ["rust"]}"#)).unwrap();
    assert_eq!(found.key, Some(Key::parse("users:1").unwrap()));
}

#[test]
fn missing_directory_without_create_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::new(dir.path().join("absent")).create_if_missing(false);

    assert!(matches!(Database::open(config), Err(Error::Ll(_))));
}

#[test]
fn empty_path_is_rejected() {
    assert!(matches!(
        Database::open(DatabaseConfig::new("")),
        Err(Error::InvalidArgument { .. })
    ));
}

#[test]
fn instance_change_wipes_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");

    let db = Database::open(DatabaseConfig::new(&path).instance_id("one")).unwrap();
    db.set("k", "v").unwrap();
    assert_eq!(db.get(INSTANCE_KEY).unwrap(), Some(Value::from("one")));
    db.close().unwrap();

    let same = Database::open(DatabaseConfig::new(&path).instance_id("one")).unwrap();
    assert_eq!(same.get("k").unwrap(), Some(Value::from("v")));
    same.close().unwrap();

    let other = Database::open(DatabaseConfig::new(&path).instance_id("two")).unwrap();
    assert_eq!(other.get("k").unwrap(), None);
    assert_eq!(other.get(INSTANCE_KEY).unwrap(), Some(Value::from("two")));
    other.close().unwrap();

    let anonymous = Database::open(DatabaseConfig::new(&path)).unwrap();
    assert!(anonymous.is_empty().unwrap());
}

#[test]
fn unowned_data_is_claimed_without_wiping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");

    let db = Database::open(DatabaseConfig::new(&path)).unwrap();
    db.set("k", "v").unwrap();
    db.close().unwrap();

    let db = Database::open(DatabaseConfig::new(&path).instance_id("first")).unwrap();
    assert_eq!(db.get("k").unwrap(), Some(Value::from("v")));
    assert_eq!(db.get(INSTANCE_KEY).unwrap(), Some(Value::from("first")));
}

#[test]
fn transactions_commit_atomically_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(DatabaseConfig::new(dir.path().join("db"))).unwrap();

    db.transaction(|txn| {
        for i in 0..5 {
            txn.set(format!("item:{i}"), doc(&format!(r#"{{"i": {i}}}"#)))?;
        }
        Ok(())
    })
    .unwrap();

    let failed: Result<(), Error> = db.transaction(|txn| {
        txn.remove("item:0")?;
        Err(Error::aborted("no"))
    });
    assert!(failed.is_err());

    assert_eq!(db.list("item:").unwrap().len(), 5);
    let odd = db
        .find_many(&QueryOptions::new(doc(r#"{"i": [1, 3]}"#)))
        .unwrap();
    assert_eq!(odd.len(), 2);

    let last_two = db
        .get_range(&RangeOptions::all().reverse(true).limit(2))
        .unwrap();
    assert_eq!(last_two[0].key.as_str(), "item:4");
}

#[test]
fn binary_values_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(DatabaseConfig::new(dir.path().join("db"))).unwrap();

    db.set("blob", Value::Bytes(vec![0, 159, 146, 150])).unwrap();
    assert_eq!(
        db.get("blob").unwrap(),
        Some(Value::Bytes(vec![0, 159, 146, 150]))
    );
    assert_eq!(
        db.get_binary("blob").unwrap().as_deref(),
        Some(&br#"{"$binary":"AJ+Slg=="}"#[..])
    );
}

#[test]
fn drop_database_removes_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db");

    let db = Database::open(DatabaseConfig::new(&path)).unwrap();
    db.set("k", "v").unwrap();
    db.drop_database().unwrap();

    assert!(!path.exists());
}
