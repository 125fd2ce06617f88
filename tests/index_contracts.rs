mod helpers;

use minidb::error::DbError;
use minidb::types::Value;

use helpers::{
    data::{letters_sql, row},
    harness::TestDB,
};

fn letters(db: &mut TestDB) {
    for sql in letters_sql() {
        db.exec(&sql).unwrap();
    }
}

#[test]
fn index_is_reloaded_from_its_document() {
    let mut db = TestDB::new();
    letters(&mut db);
    db.reopen();

    assert_eq!(
        db.query("SELECT * FROM t WHERE id = 4").unwrap(),
        vec![row(4, &["d"])]
    );

    // leaf links are rebuilt on load, so the scan crosses every leaf
    assert_eq!(db.query("SELECT * FROM t WHERE id > 1").unwrap().len(), 4);
    assert_eq!(db.query("SELECT * FROM t WHERE id < 5").unwrap().len(), 4);
}

#[test]
fn inserts_after_reload_extend_the_persisted_tree() {
    let mut db = TestDB::new();
    letters(&mut db);
    db.reopen();

    db.exec("INSERT INTO t VALUES (6, 'f')").unwrap();
    db.reopen();

    let tree = db.db.indexes_mut().loaded("t", "id").unwrap().unwrap();
    assert_eq!(tree.len(), 6);
    tree.assert_invariants();
}

#[test]
fn update_is_invisible_to_tree_lookups() {
    let mut db = TestDB::new();
    letters(&mut db);

    db.exec("UPDATE t SET name = 'z' WHERE id = 3").unwrap();

    assert_eq!(
        db.query("SELECT * FROM t WHERE id = 3").unwrap(),
        vec![row(3, &["c"])]
    );
    assert_eq!(
        db.query("SELECT * FROM t WHERE name = 'z'").unwrap(),
        vec![row(3, &["z"])]
    );
}

#[test]
fn truncate_keeps_index_documents() {
    let mut db = TestDB::new();
    letters(&mut db);

    db.exec("TRUNCATE TABLE t").unwrap();

    assert!(db.dir().join("t_id_index.json").is_file());
    assert!(db.query("SELECT * FROM t").unwrap().is_empty());
    assert_eq!(
        db.query("SELECT * FROM t WHERE id = 1").unwrap(),
        vec![row(1, &["a"])]
    );
}

#[test]
fn only_the_first_column_gets_a_tree() {
    let mut db = TestDB::new();
    letters(&mut db);

    assert!(db.dir().join("t_id_index.json").is_file());
    assert!(!db.dir().join("t_name_index.json").exists());
    assert!(db.db.indexes_mut().loaded("t", "name").unwrap().is_none());
}

#[test]
fn configured_order_shapes_the_tree() {
    let mut db = TestDB::with_order(2);
    letters(&mut db);

    let tree = db.db.indexes_mut().loaded("t", "id").unwrap().unwrap();
    assert_eq!(tree.order(), 2);
    assert_eq!(tree.depth(), 3);
    tree.assert_invariants();
}

#[test]
fn text_first_column_is_indexed_too() {
    let mut db = TestDB::new();
    db.exec("CREATE TABLE tags (tag TEXT, uses INT)").unwrap();
    for (tag, uses) in [("rust", 5), ("go", 3), ("zig", 1), ("c", 9), ("ada", 2)] {
        db.exec(&format!("INSERT INTO tags VALUES ('{tag}', {uses})"))
            .unwrap();
    }

    let tags: Vec<_> = db
        .query("SELECT tag FROM tags WHERE tag > 'c'")
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(
        tags,
        vec![Value::from("go"), Value::from("rust"), Value::from("zig")]
    );
}

#[test]
fn corrupt_index_document_is_reported() {
    let mut db = TestDB::new();
    letters(&mut db);
    std::fs::write(db.dir().join("t_id_index.json"), r#"{"is_leaf":true,"keys":[1],"children":[]}"#)
        .unwrap();
    db.reopen();

    assert!(matches!(
        db.db.query("SELECT * FROM t WHERE id = 1"),
        Err(DbError::CorruptDocument { .. })
    ));
}

#[test]
fn reopening_with_a_smaller_order_keeps_the_tree_usable() {
    let mut db = TestDB::with_order(4);
    letters(&mut db);
    db.reopen_with_order(2);

    assert_eq!(
        db.query("SELECT * FROM t WHERE id = 1").unwrap(),
        vec![row(1, &["a"])]
    );
    db.exec("INSERT INTO t VALUES (6, 'f')").unwrap();
    assert_eq!(
        db.query("SELECT * FROM t WHERE id > 4").unwrap(),
        vec![row(5, &["e"]), row(6, &["f"])]
    );

    let tree = db.db.indexes_mut().loaded("t", "id").unwrap().unwrap();
    assert_eq!(tree.order(), 3);
    assert_eq!(tree.len(), 6);
    tree.assert_invariants();
}

#[test]
fn insert_writes_nothing_when_the_index_fails_to_load() {
    let mut db = TestDB::new();
    letters(&mut db);
    std::fs::write(db.dir().join("t_id_index.json"), "{ not json").unwrap();
    db.reopen();

    assert!(matches!(
        db.db.query("INSERT INTO t VALUES (6, 'f')"),
        Err(DbError::CorruptDocument { .. })
    ));
    assert_eq!(db.query("SELECT * FROM t").unwrap().len(), 5);
    assert_eq!(
        std::fs::read_to_string(db.dir().join("t_id_index.json")).unwrap(),
        "{ not json"
    );
}
