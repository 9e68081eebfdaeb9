use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use qr_campus::io::ScanStore;
use qr_campus::models::PendingScan;
use serde_json::json;
use uuid::Uuid;

fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{}-{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos(),
        Uuid::new_v4()
    ))
}

fn scan(matricule: &str) -> PendingScan {
    PendingScan {
        id: Uuid::new_v4(),
        kind: "student-id".to_string(),
        data: json!({"type": "student-id", "matricule": matricule}),
        timestamp: 1_700_000_000_000,
    }
}

#[tokio::test]
async fn empty_store_has_nothing_pending() {
    let store = ScanStore::new(temp_dir("qr-campus-empty"));
    store.prepare().await.expect("prepare");
    assert!(store.pending_scans().await.is_empty());
    assert_eq!(store.last_sync().await, None);
}

#[tokio::test]
async fn pending_scans_accumulate_in_order() {
    let store = ScanStore::new(temp_dir("qr-campus-order"));
    store.prepare().await.expect("prepare");
    let first = scan("FE21A001");
    let second = scan("FE21A002");
    store.save_pending_scan(first.clone()).await.expect("save");
    store.save_pending_scan(second.clone()).await.expect("save");

    assert_eq!(store.pending_scans().await, vec![first.clone(), second.clone()]);

    let reopened = ScanStore::new(store.dir().to_path_buf());
    assert_eq!(reopened.pending_scans().await, vec![first, second]);
}

#[tokio::test]
async fn clearing_returns_what_was_pending() {
    let store = ScanStore::new(temp_dir("qr-campus-clear"));
    store.prepare().await.expect("prepare");
    let only = scan("FE21A003");
    store.save_pending_scan(only.clone()).await.expect("save");

    assert_eq!(store.clear_pending_scans().await.expect("clear"), vec![only]);
    assert!(store.pending_scans().await.is_empty());
    assert!(store.clear_pending_scans().await.expect("clear").is_empty());
}

#[tokio::test]
async fn corrupt_file_is_never_overwritten() {
    let dir = temp_dir("qr-campus-corrupt");
    let store = ScanStore::new(dir.clone());
    store.prepare().await.expect("prepare");
    std::fs::write(dir.join("pending-scans.json"), b"{not a list").expect("write");
    std::fs::write(dir.join("last-sync.json"), b"\"yesterday\"").expect("write");

    assert!(store.pending_scans().await.is_empty());
    assert_eq!(store.last_sync().await, None);

    assert!(store.save_pending_scan(scan("FE21A004")).await.is_err());
    assert!(store.clear_pending_scans().await.is_err());
    assert_eq!(
        std::fs::read(dir.join("pending-scans.json")).expect("read"),
        b"{not a list".to_vec()
    );
}

#[tokio::test]
async fn stored_list_survives_an_interrupted_write() {
    let dir = temp_dir("qr-campus-interrupted");
    let store = ScanStore::new(dir.clone());
    store.prepare().await.expect("prepare");
    let first = scan("FE21A005");
    store.save_pending_scan(first.clone()).await.expect("save");

    // leftover of a write that never reached the rename
    std::fs::write(dir.join("pending-scans.json.tmp"), b"[{\"id\":").expect("write");
    assert_eq!(store.pending_scans().await, vec![first.clone()]);

    let second = scan("FE21A006");
    store.save_pending_scan(second.clone()).await.expect("save");
    assert_eq!(store.pending_scans().await, vec![first, second]);
    assert!(!dir.join("pending-scans.json.tmp").exists());
}

#[tokio::test]
async fn last_sync_reads_while_syncing() {
    let store = ScanStore::new(temp_dir("qr-campus-sync-race"));
    store.prepare().await.expect("prepare");
    store.update_last_sync().await.expect("sync");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let writer = store.clone();
        handles.push(tokio::spawn(async move {
            writer.update_last_sync().await.expect("sync");
        }));
        let reader = store.clone();
        handles.push(tokio::spawn(async move {
            assert!(reader.last_sync().await.is_some());
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }
}

#[tokio::test]
async fn last_sync_is_recorded() {
    let store = ScanStore::new(temp_dir("qr-campus-sync"));
    store.prepare().await.expect("prepare");
    let stamped = store.update_last_sync().await.expect("sync");
    assert!(stamped > 0);
    assert_eq!(store.last_sync().await, Some(stamped));
}

#[tokio::test]
async fn concurrent_saves_are_not_lost() {
    let store = ScanStore::new(temp_dir("qr-campus-concurrent"));
    store.prepare().await.expect("prepare");

    let mut handles = Vec::new();
    for n in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .save_pending_scan(scan(&format!("FE21B{:03}", n)))
                .await
                .expect("save");
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }
    assert_eq!(store.pending_scans().await.len(), 16);
}
