//! Postgres-backed store tests.
//!
//! Run with `--features db-tests` against a database reachable through the
//! `TESSERA_DB_*` variables. Each test creates uniquely named records and
//! filters on its own actor so runs do not interfere.

#![cfg(feature = "db-tests")]

use std::sync::Arc;

use futures_util::TryStreamExt;
use tessera_api::{DbConfig, PgRecordStore, RecordService};
use tessera_core::{new_record_id, NameValidator};
use tessera_test_utils::*;

async fn test_store() -> TesseraResult<PgRecordStore> {
    let config = DbConfig::from_env();
    let store = PgRecordStore::from_config(&config).map_err(|e| StorageError::Backend {
        reason: e.to_string(),
    })?;
    store.migrate().await?;
    Ok(store)
}

fn unique_actor() -> Actor {
    Actor::new(format!("db-test-{}", new_record_id()))
}

fn candidate_by(name: &str, actor: &Actor) -> Record {
    Record::candidate(&RecordInput::new(name), actor, chrono::Utc::now())
}

#[tokio::test]
async fn migrate_is_idempotent() -> TesseraResult<()> {
    let store = test_store().await?;
    store.migrate().await?;
    store.migrate().await
}

#[tokio::test]
async fn create_fetch_overwrite_delete() -> TesseraResult<()> {
    let store = test_store().await?;
    let actor = unique_actor();

    let created = store.create(&candidate_by("db milk", &actor)).await?;
    assert!(!created.id.is_empty());
    assert_eq!(created.created_by, actor.as_str());

    let fetched = store.fetch_by_id(&created.id).await?;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "db milk");

    let replacement = candidate_by("db bread", &Actor::new("someone-else"))
        .with_provenance_of(&fetched);
    let overwritten = store.overwrite_by_id(&replacement, &created.id).await?;
    assert_eq!(overwritten.name, "db bread");
    assert_eq!(overwritten.created_by, actor.as_str());
    assert_eq!(overwritten.updated_by, "someone-else");

    store.soft_delete_by_id(&created.id).await?;
    assert!(store.fetch_by_id(&created.id).await.unwrap_err().is_not_found());
    assert!(store
        .soft_delete_by_id(&created.id)
        .await
        .unwrap_err()
        .is_not_found());
    Ok(())
}

#[tokio::test]
async fn count_and_page_honour_filter_and_order() -> TesseraResult<()> {
    let store = test_store().await?;
    let actor = unique_actor();
    for i in 0..7 {
        store.create(&candidate_by(&format!("paged {}", i), &actor)).await?;
    }
    let filter = RecordFilter {
        name: None,
        created_by: Some(actor.as_str().to_string()),
    };

    assert_eq!(store.count(&filter).await?, 7);

    let page = store.fetch_page(&filter, 5, 5).await?;
    let names: Vec<_> = page.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["paged 5", "paged 6"]);

    let filter = RecordFilter {
        name: Some("PAGED 3".to_string()),
        ..filter
    };
    assert_eq!(store.count(&filter).await?, 1);
    Ok(())
}

#[tokio::test]
async fn scan_skips_deleted() -> TesseraResult<()> {
    let store = test_store().await?;
    let actor = unique_actor();
    let kept = store.create(&candidate_by("scan kept", &actor)).await?;
    let gone = store.create(&candidate_by("scan gone", &actor)).await?;
    store.soft_delete_by_id(&gone.id).await?;

    let scanned: Vec<Record> = store.scan_active().await?.try_collect().await?;
    assert!(scanned.iter().any(|r| r.id == kept.id));
    assert!(scanned.iter().all(|r| r.id != gone.id));
    Ok(())
}

#[tokio::test]
async fn service_round_trip_over_postgres() -> TesseraResult<()> {
    let store = Arc::new(test_store().await?);
    let service = RecordService::new(
        store,
        Arc::new(InMemoryRecordCache::new()),
        Arc::new(NameValidator),
    );
    let actor = unique_actor();

    let created = service.create(&RecordInput::new("svc milk"), &actor).await?;
    let fetched = service.get(&created.id).await?;
    assert_eq!(fetched, created);

    service.delete(&created.id).await?;
    Ok(())
}
