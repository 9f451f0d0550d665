//! Integration tests for the synchronization orchestrator.
//!
//! These run the real `SyncService` against in-memory implementations of the
//! remote source, the local store and the activity log. No external services
//! are required.
//!
//! Covered behavior:
//! - every fetched record is accounted for as written or failed
//! - re-running over unchanged data does not grow the store
//! - a failing kind does not stop the kinds after it
//! - rate-limit and network errors are retried with bounded attempts
//! - authentication errors abort the run without retrying
//! - one activity entry per kind, in processing order
//! - logging failures never abort a run
//! - overlapping runs over the same kinds are refused

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use skateshop_admin::services::ActivityLog;
use skateshop_admin::shopify::RemotePage;
use skateshop_admin::sync::{LocalStore, RemoteError, SyncError};
use skateshop_core::{ActivityLogFilter, EntityKind, MAX_QUERY_LIMIT, SyncOutcome};
use skateshop_integration_tests::{
    MemoryActivityLog, MemoryStore, ScriptedRemote, order, page, product, record_for,
    sync_service, untitled_product,
};

fn seams(
    remote: ScriptedRemote,
    store: MemoryStore,
    log: MemoryActivityLog,
) -> (Arc<ScriptedRemote>, Arc<MemoryStore>, Arc<MemoryActivityLog>) {
    (Arc::new(remote), Arc::new(store), Arc::new(log))
}

// ============================================================================
// Counting
// ============================================================================

#[tokio::test]
async fn test_two_products_are_fetched_and_written() {
    let (remote, store, log) = seams(
        ScriptedRemote::new().with_records(EntityKind::Product, vec![product("p1"), product("p2")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store.clone(), log);

    let summary = service.run(&[EntityKind::Product], None).await.unwrap();

    let result = summary.result_for(EntityKind::Product).unwrap();
    assert_eq!(result.items_fetched, 2);
    assert_eq!(result.items_written, 2);
    assert_eq!(result.items_failed, 0);
    assert_eq!(result.outcome, SyncOutcome::Success);
    assert!(summary.success);
    assert!(store.get(EntityKind::Product, "p1").is_some());
    assert!(store.get(EntityKind::Product, "p2").is_some());
}

#[tokio::test]
async fn test_fetched_equals_written_plus_failed_for_every_kind() {
    let mut remote = ScriptedRemote::new();
    for (i, kind) in EntityKind::ALL.into_iter().enumerate() {
        let records = (0..=i).map(|n| record_for(kind, &format!("{kind}-{n}"))).collect();
        remote = remote.with_records(kind, records);
    }
    let (remote, store, log) = seams(remote, MemoryStore::new().rejecting("order-1"), MemoryActivityLog::new());
    let service = sync_service(remote, store, log);

    let summary = service.run_full(Some("ops")).await.unwrap();

    assert_eq!(summary.results.len(), EntityKind::ALL.len());
    for (i, result) in summary.results.iter().enumerate() {
        assert_eq!(result.entity_kind, EntityKind::ALL[i]);
        assert_eq!(result.items_fetched, u64::try_from(i).unwrap() + 1);
        assert_eq!(
            result.items_fetched,
            result.items_written + result.items_failed,
            "{} counts do not add up",
            result.entity_kind
        );
    }
}

#[tokio::test]
async fn test_records_across_pages_are_fetched_in_order() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .then(EntityKind::Product, Ok(page(vec![product("p1")], "c1")))
            .then(EntityKind::Product, Ok(page(vec![product("p2")], "c2")))
            .with_records(EntityKind::Product, vec![product("p3")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote.clone(), store.clone(), log);

    let summary = service.run(&[EntityKind::Product], None).await.unwrap();

    assert_eq!(summary.results[0].items_written, 3);
    assert_eq!(
        remote.cursors(EntityKind::Product),
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
    let written: Vec<String> = store.upserts().into_iter().map(|(_, id)| id).collect();
    assert_eq!(written, vec!["p1", "p2", "p3"]);
}

// ============================================================================
// Idempotence
// ============================================================================

#[tokio::test]
async fn test_second_run_over_unchanged_data_keeps_count() {
    let (remote, store, log) = seams(
        ScriptedRemote::new().with_records(
            EntityKind::Product,
            vec![product("p1"), product("p2"), product("p3")],
        ),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store.clone(), log);

    service.run(&[EntityKind::Product], None).await.unwrap();
    let after_first = store.count(EntityKind::Product).await.unwrap();

    let second = service.run(&[EntityKind::Product], None).await.unwrap();
    let after_second = store.count(EntityKind::Product).await.unwrap();

    assert_eq!(after_first, 3);
    assert_eq!(after_second, after_first);
    assert_eq!(second.results[0].outcome, SyncOutcome::Success);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_protocol_error_on_customers_does_not_stop_orders() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .with_records(EntityKind::Product, vec![product("p1")])
            .then(
                EntityKind::Customer,
                Err(RemoteError::Protocol("unexpected payload".to_string())),
            )
            .with_records(EntityKind::Order, vec![order("o1")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote.clone(), store, log);

    let summary = service.run_full(None).await.unwrap();

    let customers = summary.result_for(EntityKind::Customer).unwrap();
    assert_eq!(customers.outcome, SyncOutcome::Error);
    assert_eq!(customers.items_written, 0);
    assert_eq!(customers.fetch_attempts, 1, "protocol errors are not retried");
    assert!(customers.error_message.as_deref().unwrap().contains("unexpected payload"));
    assert_eq!(remote.calls(EntityKind::Customer), 1);

    let orders = summary.result_for(EntityKind::Order).unwrap();
    assert_eq!(orders.outcome, SyncOutcome::Success);
    assert_eq!(orders.items_written, 1);

    assert!(!summary.success);
    assert_eq!(summary.unsuccessful_kinds(), vec![EntityKind::Customer]);
}

#[tokio::test]
async fn test_constraint_violation_skips_only_that_record() {
    let (remote, store, log) = seams(
        ScriptedRemote::new().with_records(
            EntityKind::Product,
            vec![product("p1"), product("p2"), product("p3")],
        ),
        MemoryStore::new().rejecting("p2"),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store.clone(), log);

    let summary = service.run(&[EntityKind::Product], None).await.unwrap();

    let result = &summary.results[0];
    assert_eq!(result.outcome, SyncOutcome::Warning);
    assert_eq!(result.items_fetched, 3);
    assert_eq!(result.items_written, 2);
    assert_eq!(result.items_failed, 1);
    assert!(result.error_message.as_deref().unwrap().contains("p2"));
    assert!(store.get(EntityKind::Product, "p3").is_some());
}

#[tokio::test]
async fn test_missing_required_field_is_tallied_without_reaching_store() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .with_records(EntityKind::Product, vec![untitled_product("p1"), product("p2")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store.clone(), log);

    let summary = service.run(&[EntityKind::Product], None).await.unwrap();

    assert_eq!(summary.results[0].items_failed, 1);
    assert_eq!(summary.results[0].items_written, 1);
    assert!(
        summary.results[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("p1: title is required")
    );
    assert_eq!(store.upserts(), vec![(EntityKind::Product, "p2".to_string())]);
}

#[tokio::test]
async fn test_cursor_that_does_not_advance_fails_the_kind() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .then(EntityKind::Product, Ok(page(vec![product("p1")], "same")))
            .then(EntityKind::Product, Ok(page(vec![product("p2")], "same"))),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store.clone(), log);

    let summary = service.run(&[EntityKind::Product], None).await.unwrap();

    let result = &summary.results[0];
    assert_eq!(result.outcome, SyncOutcome::Error);
    assert_eq!(result.items_fetched, 2);
    assert!(store.upserts().is_empty(), "nothing is written for a failed fetch");
}

#[tokio::test]
async fn test_more_pages_without_cursor_fails_the_kind() {
    let (remote, store, log) = seams(
        ScriptedRemote::new().then(
            EntityKind::Collection,
            Ok(RemotePage {
                records: vec![],
                has_more: true,
                next_cursor: None,
            }),
        ),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store, log);

    let summary = service.run(&[EntityKind::Collection], None).await.unwrap();

    assert_eq!(summary.results[0].outcome, SyncOutcome::Error);
    assert!(
        summary.results[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("without a cursor")
    );
}

// ============================================================================
// Retry
// ============================================================================

#[tokio::test]
async fn test_rate_limited_twice_then_success() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .then(EntityKind::Product, Err(RemoteError::RateLimited { retry_after_secs: 1 }))
            .then(EntityKind::Product, Err(RemoteError::RateLimited { retry_after_secs: 1 }))
            .with_records(EntityKind::Product, vec![product("p1")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote.clone(), store, log);

    let summary = service.run(&[EntityKind::Product], None).await.unwrap();

    let result = &summary.results[0];
    assert_eq!(result.outcome, SyncOutcome::Success);
    assert_eq!(result.fetch_attempts, 3);
    assert_eq!(result.items_written, 1);
    assert_eq!(remote.calls(EntityKind::Product), 3);
}

#[tokio::test]
async fn test_network_error_then_success() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .then(
                EntityKind::Customer,
                Err(RemoteError::TransientNetwork("connection reset".to_string())),
            )
            .with_records(EntityKind::Customer, vec![record_for(EntityKind::Customer, "c1")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote.clone(), store.clone(), log);

    let summary = service.run(&[EntityKind::Customer], None).await.unwrap();

    let result = &summary.results[0];
    assert_eq!(result.outcome, SyncOutcome::Success);
    assert_eq!(result.fetch_attempts, 2);
    assert_eq!(result.items_written, 1);
    assert_eq!(result.error_message, None);
    assert_eq!(remote.calls(EntityKind::Customer), 2);
    assert!(store.get(EntityKind::Customer, "c1").is_some());
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mut remote = ScriptedRemote::new();
    for _ in 0..5 {
        remote = remote.then(
            EntityKind::Order,
            Err(RemoteError::TransientNetwork("connection reset".to_string())),
        );
    }
    let (remote, store, log) = seams(remote, MemoryStore::new(), MemoryActivityLog::new());
    let service = sync_service(remote.clone(), store, log);

    let summary = service.run(&[EntityKind::Order], None).await.unwrap();

    let result = &summary.results[0];
    assert_eq!(result.outcome, SyncOutcome::Error);
    assert_eq!(result.fetch_attempts, 3);
    assert_eq!(remote.calls(EntityKind::Order), 3);
    assert!(result.error_message.as_deref().unwrap().contains("connection reset"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_authentication_error_aborts_run_without_retry() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .with_records(EntityKind::Product, vec![product("p1")])
            .then(
                EntityKind::Collection,
                Err(RemoteError::Authentication("invalid access token".to_string())),
            )
            .with_records(EntityKind::Customer, vec![record_for(EntityKind::Customer, "c1")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote.clone(), store, log.clone());

    let err = service.run_full(Some("ops")).await.unwrap_err();

    assert!(matches!(err, SyncError::Authentication(ref m) if m.contains("invalid access token")));
    assert_eq!(remote.calls(EntityKind::Collection), 1);
    assert_eq!(remote.calls(EntityKind::Customer), 0, "run stops at the failing kind");

    let entries = log.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].entity_kind, EntityKind::Collection);
    assert_eq!(entries[1].outcome, SyncOutcome::Error);
}

// ============================================================================
// Activity log
// ============================================================================

#[tokio::test]
async fn test_one_entry_per_kind_in_processing_order() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .with_records(EntityKind::Product, vec![product("p1")])
            .with_records(EntityKind::Order, vec![order("o1")]),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store, log.clone());
    let kinds = [EntityKind::Product, EntityKind::Collection, EntityKind::Order];

    service.run(&kinds, Some("ops")).await.unwrap();

    let newest_first = log.query(&ActivityLogFilter::default()).await.unwrap();
    let logged: Vec<EntityKind> = newest_first.iter().map(|e| e.entity_kind).collect();
    assert_eq!(
        logged,
        vec![EntityKind::Order, EntityKind::Collection, EntityKind::Product]
    );
    assert!(newest_first.iter().all(|e| e.actor_id.as_deref() == Some("ops")));
    assert_eq!(newest_first[2].action, "sync.product");
    assert_eq!(newest_first[2].metadata["items_written"], 1);
}

#[tokio::test]
async fn test_logging_failure_does_not_abort_run() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .with_records(EntityKind::Product, vec![product("p1")])
            .with_records(EntityKind::Order, vec![order("o1")]),
        MemoryStore::new(),
        MemoryActivityLog::failing(),
    );
    let service = sync_service(remote, store.clone(), log.clone());

    let summary = service
        .run(&[EntityKind::Product, EntityKind::Order], None)
        .await
        .unwrap();

    assert!(summary.success);
    assert_eq!(summary.results.len(), 2);
    assert!(store.get(EntityKind::Order, "o1").is_some());
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_query_filters_and_clamps_limit() {
    let (remote, store, log) = seams(
        ScriptedRemote::new()
            .then(
                EntityKind::Customer,
                Err(RemoteError::Protocol("bad cursor".to_string())),
            ),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote, store, log.clone());

    for _ in 0..3 {
        service.run_full(None).await.unwrap();
    }

    let errors = log
        .query(&ActivityLogFilter {
            outcome: Some(SyncOutcome::Error),
            ..ActivityLogFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(errors.len(), 1, "only the first customers fetch was scripted to fail");
    assert_eq!(errors[0].entity_kind, EntityKind::Customer);

    let all = log
        .query(&ActivityLogFilter {
            limit: Some(MAX_QUERY_LIMIT * 10),
            ..ActivityLogFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 15);

    let one = log
        .query(&ActivityLogFilter {
            limit: Some(0),
            ..ActivityLogFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(one.len(), 1);

    let stats = log.statistics(None, None).await.unwrap();
    assert_eq!(stats.total_runs, 15);
    assert_eq!(stats.error_count, 1);
    assert_eq!(stats.success_count, 14);
}

// ============================================================================
// Run guard
// ============================================================================

#[tokio::test]
async fn test_overlapping_run_is_refused() {
    let (remote, store, log) = seams(
        ScriptedRemote::new(),
        MemoryStore::new(),
        MemoryActivityLog::new(),
    );
    let service = sync_service(remote.clone(), store, log.clone());

    let permit = service
        .guard()
        .try_acquire(&[EntityKind::Promotion])
        .unwrap();

    let err = service.run_full(None).await.unwrap_err();
    assert_eq!(err, SyncError::AlreadyRunning(vec![EntityKind::Promotion]));
    assert_eq!(remote.calls(EntityKind::Product), 0);
    assert!(log.entries().is_empty());

    drop(permit);
    assert!(service.run_promotions(None).await.unwrap().success);
}
