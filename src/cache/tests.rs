use chrono::Utc;

use super::*;

fn record(upc: &str, confidence: u8) -> EnrichmentRecord {
    EnrichmentRecord {
        upc: upc.to_string(),
        brand: "DIBS Beauty".to_string(),
        product_name: "Lip Liner".to_string(),
        size: Some("0.08 oz".to_string()),
        color: None,
        msrp: Some(24.0),
        image_url: None,
        description: None,
        confidence_score: confidence,
        reasoning: "test".to_string(),
        sources: vec![CandidateSource {
            name: "upcdb".to_string(),
            url: None,
            found_upc: true,
            raw_attributes: None,
        }],
        verification: None,
        image_verification: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn memory_store_upsert_and_get() {
    let store = MemoryStore::new();
    store.upsert(record("123456789012", 85)).await.unwrap();

    let fetched = store.get("123456789012").await.unwrap().unwrap();
    assert_eq!(fetched.confidence_score, 85);
    assert!(store.get("000000000000").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_store_upsert_replaces_same_upc() {
    let store = MemoryStore::new();
    store.upsert(record("123456789012", 40)).await.unwrap();
    store.upsert(record("123456789012", 90)).await.unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].confidence_score, 90);
}

#[tokio::test]
async fn memory_store_idempotent_upsert() {
    let store = MemoryStore::new();
    let rec = record("123456789012", 85);
    store.upsert(rec.clone()).await.unwrap();
    store.upsert(rec.clone()).await.unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], rec);
}

#[tokio::test]
async fn memory_store_clear_returns_count() {
    let store = MemoryStore::new();
    store.upsert(record("111111111111", 50)).await.unwrap();
    store.upsert(record("222222222222", 60)).await.unwrap();

    assert_eq!(store.clear().await.unwrap(), 2);
    assert!(store.get_all().await.unwrap().is_empty());
    assert_eq!(store.clear().await.unwrap(), 0);
}

#[tokio::test]
async fn memory_store_get_all_is_ordered_by_upc() {
    let store = MemoryStore::new();
    store.upsert(record("99999999", 50)).await.unwrap();
    store.upsert(record("11111111", 60)).await.unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all[0].upc, "11111111");
    assert_eq!(all[1].upc, "99999999");
}

#[tokio::test]
async fn file_store_round_trips_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    let rec = record("123456789012", 85);
    store.upsert(rec.clone()).await.unwrap();

    let fetched = store.get("123456789012").await.unwrap().unwrap();
    assert_eq!(fetched, rec);
}

#[tokio::test]
async fn file_store_upsert_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    store.upsert(record("123456789012", 40)).await.unwrap();
    store.upsert(record("123456789012", 90)).await.unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].confidence_score, 90);
}

#[tokio::test]
async fn file_store_clear_removes_only_record_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    store.upsert(record("111111111111", 50)).await.unwrap();
    store.upsert(record("222222222222", 60)).await.unwrap();
    tokio::fs::write(dir.path().join("notes.txt"), b"keep me")
        .await
        .unwrap();

    assert_eq!(store.clear().await.unwrap(), 2);
    assert!(store.get_all().await.unwrap().is_empty());
    assert!(dir.path().join("notes.txt").exists());
}

#[tokio::test]
async fn file_store_skips_corrupt_entries_on_listing() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();

    store.upsert(record("123456789012", 85)).await.unwrap();
    tokio::fs::write(dir.path().join("999999999999.json"), b"{not json")
        .await
        .unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].upc, "123456789012");
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.upsert(record("123456789012", 85)).await.unwrap();
    }

    let reopened = JsonFileStore::open(dir.path()).await.unwrap();
    let fetched = reopened.get("123456789012").await.unwrap().unwrap();
    assert_eq!(fetched.upc, "123456789012");
}

#[tokio::test]
async fn file_store_get_missing_upc_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();
    assert!(store.get("000000000000").await.unwrap().is_none());
}

#[tokio::test]
async fn file_store_get_corrupt_entry_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).await.unwrap();
    tokio::fs::write(dir.path().join("123456789012.json"), b"{not json")
        .await
        .unwrap();

    let err = store.get("123456789012").await.unwrap_err();
    assert!(matches!(err, CacheError::Corrupt { .. }));
}
