use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_round_trips_values() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("completedLessons").await.unwrap(), None);

    repo.set("completedLessons", br#"["5-array"]"#).await.unwrap();
    repo.set("completedLessons", br#"["5-array","7-puntatori"]"#)
        .await
        .unwrap();
    let stored = repo.get("completedLessons").await.unwrap().expect("value");
    assert_eq!(stored, br#"["5-array","7-puntatori"]"#.to_vec());

    repo.remove("completedLessons").await.unwrap();
    assert_eq!(repo.get("completedLessons").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("courseProgress", b"{}").await.unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(
        repo.get("courseProgress").await.unwrap(),
        Some(b"{}".to_vec())
    );
}

#[tokio::test]
async fn storage_sqlite_exposes_kv() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set("k", b"v").await.unwrap();
    assert_eq!(storage.kv.get("k").await.unwrap(), Some(b"v".to_vec()));
}
