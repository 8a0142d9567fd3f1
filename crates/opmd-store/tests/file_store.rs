use std::path::PathBuf;

use opmd_core::{AttrValue, DataBuffer, Shape};
use opmd_store::{content_hash, ensure_group_path, FileStore, Store, StoreError};
use proptest::prelude::*;

fn scratch_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("opmd_store_{tag}_{}.opmd", std::process::id()))
}

#[test]
fn close_persists_and_open_reads_back() {
    let path = scratch_path("persist");
    let mut store = FileStore::create(&path);
    let root = store.root();
    store.set_attr(root, "openPMD", "1.1.0".into()).unwrap();
    let it = ensure_group_path(&mut store, "/data/0/").unwrap();
    store.set_attr(it, "dt", AttrValue::F64(0.5)).unwrap();
    store
        .create_dataset(
            it,
            "numParticles",
            DataBuffer::U64(vec![32, 32, 32, 32]),
            Shape::from_slice(&[4]),
        )
        .unwrap();

    assert!(!path.exists(), "nothing is written before close");
    store.close().unwrap();
    assert!(path.exists());
    assert!(!store.path().with_extension("opmd.tmp").exists());

    let reopened = FileStore::open(&path).unwrap();
    assert!(reopened.is_closed());
    assert_eq!(
        content_hash(&reopened).unwrap(),
        content_hash(&store).unwrap()
    );
    let n = reopened.tree().lookup("/data/0/numParticles").unwrap();
    assert_eq!(
        reopened.dataset(n).unwrap().data,
        DataBuffer::U64(vec![32, 32, 32, 32])
    );

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn close_is_idempotent_and_blocks_mutation() {
    let path = scratch_path("idempotent");
    let mut store = FileStore::create(&path);
    store.close().unwrap();
    store.close().unwrap();
    let root = store.root();
    assert!(matches!(
        store.create_group(root, "data"),
        Err(StoreError::Closed)
    ));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn open_missing_file_is_io_error() {
    let path = scratch_path("missing");
    assert!(matches!(FileStore::open(&path), Err(StoreError::Io(_))));
}

#[test]
fn failed_rename_removes_temp_file() {
    // A non-empty directory at the destination makes the rename fail.
    let path = scratch_path("rename");
    std::fs::create_dir_all(path.join("occupied")).unwrap();
    let mut store = FileStore::create(&path);
    let root = store.root();
    store.set_attr(root, "openPMD", "1.1.0".into()).unwrap();

    assert!(matches!(store.close(), Err(StoreError::Io(_))));
    assert!(!store.is_closed());
    let mut tmp = path.clone().into_os_string();
    tmp.push(".tmp");
    assert!(!PathBuf::from(tmp).exists());
    std::fs::remove_dir_all(&path).unwrap();
}

#[test]
fn close_into_missing_directory_fails_cleanly() {
    let path = std::env::temp_dir()
        .join(format!("opmd_no_such_dir_{}", std::process::id()))
        .join("out.opmd");
    let mut store = FileStore::create(&path);
    assert!(matches!(store.close(), Err(StoreError::Io(_))));
    assert!(!store.is_closed());
}

proptest! {
    #[test]
    fn reopened_container_hashes_equal(
        groups in prop::collection::vec("[a-z]{1,6}", 1..6),
        values in prop::collection::vec(any::<f32>(), 1..32),
    ) {
        let path = scratch_path("prop");
        let mut store = FileStore::create(&path);
        let mut parent = store.root();
        for g in &groups {
            parent = opmd_store::ensure_child_group(&mut store, parent, g).unwrap();
        }
        let n = values.len() as u64;
        store
            .create_dataset(parent, "payload", DataBuffer::F32(values), Shape::from_slice(&[n]))
            .unwrap();
        store.close().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        prop_assert_eq!(content_hash(&reopened).unwrap(), content_hash(&store).unwrap());
        std::fs::remove_file(&path).unwrap();
    }
}
