use std::fs;

use airprep_core::object_store::{
    BlobStore, LocalBlobStore, MemoryBlobStore, StoreError, OCTET_STREAM,
};
use tempfile::tempdir;

#[test]
fn local_store_round_trips_nested_keys() {
    let root = tempdir().expect("temp dir");
    let store = LocalBlobStore::new(root.path());

    store
        .write_bytes("bucket", "csv/2024/jan.csv", b"a,b\n1,2\n", "text/csv")
        .expect("write");
    store
        .write_bytes("bucket", "csv/feb.csv", b"", "text/csv")
        .expect("write empty");
    store
        .write_bytes("bucket", "other/readme.txt", b"hi", "text/plain")
        .expect("write other");

    let keys = store.list("bucket", "csv/").expect("list");
    assert_eq!(keys, ["csv/2024/jan.csv", "csv/feb.csv"]);

    assert!(store.exists("bucket", "csv/feb.csv").expect("exists"));
    assert!(!store.exists("bucket", "csv/mar.csv").expect("exists"));
    assert_eq!(store.size("bucket", "csv/feb.csv").expect("size"), 0);
    assert_eq!(
        store.read_bytes("bucket", "csv/2024/jan.csv").expect("read"),
        b"a,b\n1,2\n"
    );
}

#[test]
fn local_store_overwrites_without_leaving_partial_files() {
    let root = tempdir().expect("temp dir");
    let store = LocalBlobStore::new(root.path());

    store
        .write_bytes("bucket", "out/table.zip", b"first", OCTET_STREAM)
        .expect("first write");
    store
        .write_bytes("bucket", "out/table.zip", b"second", OCTET_STREAM)
        .expect("second write");

    assert_eq!(
        store.read_bytes("bucket", "out/table.zip").expect("read"),
        b"second"
    );
    let entries: Vec<_> = fs::read_dir(root.path().join("bucket/out"))
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn local_store_rejects_escaping_keys() {
    let root = tempdir().expect("temp dir");
    let store = LocalBlobStore::new(root.path());

    for key in ["../secret", "/etc/passwd", "a//b", "a\\b", ""] {
        assert!(
            matches!(
                store.read_bytes("bucket", key),
                Err(StoreError::InvalidKey(_))
            ),
            "key {key:?} should be rejected"
        );
    }
    assert!(matches!(
        store.list("..", ""),
        Err(StoreError::InvalidContainer(_))
    ));
}

#[test]
fn local_store_missing_objects() {
    let root = tempdir().expect("temp dir");
    let store = LocalBlobStore::new(root.path());

    assert!(store.list("absent", "").expect("list").is_empty());
    assert!(matches!(
        store.read_bytes("absent", "x.csv"),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.size("absent", "x.csv"),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn memory_store_scopes_by_container_and_records_content_type() {
    let store = MemoryBlobStore::new();
    store.insert("a", "csv/one.csv", "x\n1\n");
    store.insert("b", "csv/two.csv", "x\n2\n");
    store
        .write_bytes("a", "out/table.zip", b"zip", OCTET_STREAM)
        .expect("write");

    assert_eq!(store.list("a", "csv/").expect("list"), ["csv/one.csv"]);
    assert_eq!(store.size("b", "csv/two.csv").expect("size"), 4);
    assert_eq!(store.len(), 3);

    let object = store.object("a", "out/table.zip").expect("stored");
    assert_eq!(object.content_type, OCTET_STREAM);
    assert_eq!(object.bytes, b"zip");
    assert!(matches!(
        store.read_bytes("b", "out/table.zip"),
        Err(StoreError::NotFound { .. })
    ));
}
