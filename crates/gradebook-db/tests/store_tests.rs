use std::collections::HashSet;
use std::sync::Arc;

use gradebook_db::{Database, DatabaseSource, DbError, GradeStore, NewGrade};
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("data").join("gradebook.db")
}

// ============================================================
// On-disk database lifecycle
// ============================================================

#[test]
fn test_open_creates_file_and_parent_dir() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    let db = Database::open_at(&path).unwrap();

    assert!(db.is_new());
    assert!(path.exists());
}

#[test]
fn test_reopen_keeps_existing_rows() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    {
        let db = Database::open_at(&path).unwrap();
        let grades = db.grades().unwrap();
        grades.insert(&NewGrade::new("123456789", "A")).unwrap();
        grades.insert(&NewGrade::new("987654321", "B")).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert!(!db.is_new());

    let all = db.grades().unwrap().list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].subject_id, "987654321");
    assert_eq!(all[1].subject_id, "123456789");
}

#[test]
fn test_ids_not_reused_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    let deleted = {
        let db = Database::open_at(&path).unwrap();
        let grades = db.grades().unwrap();
        grades.insert(&NewGrade::new("123456789", "A")).unwrap();
        let id = grades.insert(&NewGrade::new("123456789", "B")).unwrap();
        assert_eq!(grades.delete_by_id(id).unwrap(), 1);
        id
    };

    let db = Database::open_at(&path).unwrap();
    let next = db
        .grades()
        .unwrap()
        .insert(&NewGrade::new("123456789", "C"))
        .unwrap();
    assert!(next > deleted);
}

#[test]
fn test_open_garbage_file_is_storage_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.db");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();

    let err = match Database::open_at(&path) {
        Ok(db) => db.grades().unwrap().list_all().unwrap_err(),
        Err(e) => e,
    };
    assert!(err.is_storage_failure());
    assert!(matches!(err, DbError::StorageFailure(_)));
}

#[test]
fn test_open_empty_file_creates_schema() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"").unwrap();

    let id = {
        let db = Database::open_at(&path).unwrap();
        assert!(db.is_new());
        let id = db
            .grades()
            .unwrap()
            .insert(&NewGrade::new("123456789", "A"))
            .unwrap();
        id
    };

    let db = Database::open_at(&path).unwrap();
    assert!(!db.is_new());
    let all = db.grades().unwrap().list_all().unwrap();
    assert_eq!(all, vec![NewGrade::new("123456789", "A").saved_as(id)]);
}

#[test]
fn test_open_unversioned_file_without_table_creates_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leftover.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE scratch (x INTEGER);")
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert!(db.is_new());
    assert!(db.grades().unwrap().list_all().unwrap().is_empty());
    db.grades()
        .unwrap()
        .insert(&NewGrade::new("123456789", "A"))
        .unwrap();
    assert_eq!(db.grades().unwrap().count().unwrap(), 1);
}

#[test]
fn test_open_unversioned_file_with_table_is_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE grades (id INTEGER PRIMARY KEY AUTOINCREMENT, sid TEXT NOT NULL, grade TEXT NOT NULL);
             INSERT INTO grades (sid, grade) VALUES ('123456789', 'A');",
        )
        .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert!(!db.is_new());
    assert_eq!(db.grades().unwrap().count().unwrap(), 1);
}

// ============================================================
// Store properties
// ============================================================

#[test]
fn test_every_insert_is_listed_once_with_fresh_id() {
    let db = Database::open_in_memory().unwrap();
    let grades = db.grades().unwrap();
    let mut seen = HashSet::new();

    for (sid, grade) in [("111111111", "A"), ("222222222", "B"), ("111111111", "A")] {
        let id = grades.insert(&NewGrade::new(sid, grade)).unwrap();
        assert!(seen.insert(id), "id {} handed out twice", id);

        let all = grades.list_all().unwrap();
        let matching: Vec<_> = all.iter().filter(|g| g.id == id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].subject_id, sid);
        assert_eq!(matching[0].grade, grade);
    }
}

#[test]
fn test_delete_reduces_count_by_one() {
    let db = Database::open_in_memory().unwrap();
    let grades = db.grades().unwrap();
    for n in 0..3 {
        grades
            .insert(&NewGrade::new("123456789", format!("{}", n)))
            .unwrap();
    }

    assert!(grades.delete_by_id(2).unwrap() > 0);
    assert_eq!(grades.delete_by_id(2).unwrap(), 0);
    assert_eq!(grades.count().unwrap(), 2);
}

// ============================================================
// Async store
// ============================================================

#[tokio::test]
async fn test_store_scenario_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = GradeStore::new(DatabaseSource::Path(db_path(&dir)));
    store.open().await.unwrap();

    let a = store.insert(&NewGrade::new("123456789", "A")).await.unwrap();
    let b = store.insert(&NewGrade::new("987654321", "B")).await.unwrap();
    assert_eq!((a, b), (1, 2));

    let all = store.list_all().await.unwrap();
    assert_eq!(all.iter().map(|g| g.id).collect::<Vec<_>>(), vec![2, 1]);

    let edited = all[1].with_grade("A+");
    assert_eq!(store.update(&edited).await.unwrap(), 1);
    assert_eq!(store.delete_by_id(2).await.unwrap(), 1);

    let all = store.list_all().await.unwrap();
    assert_eq!(all, vec![edited]);
}

#[tokio::test]
async fn test_store_open_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    // A directory where the database file should be cannot be opened.
    let path = dir.path().join("taken");
    std::fs::create_dir_all(&path).unwrap();

    let store = GradeStore::new(DatabaseSource::Path(path));
    let err = store.list_all().await.unwrap_err();

    assert!(err.is_storage_failure());
    assert!(!store.is_open());
}

#[tokio::test]
async fn test_injected_database_is_shared() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let store = GradeStore::from_database(Arc::clone(&db));

    store.insert(&NewGrade::new("123456789", "A")).await.unwrap();

    assert_eq!(db.grades().unwrap().count().unwrap(), 1);
}
