//! Synchronization orchestrator.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use skateshop_core::{EntityKind, EntitySyncResult, NewActivityLogEntry, SyncRunSummary};
use tracing::instrument;

use crate::config::SyncConfig;
use crate::services::ActivityLogger;
use crate::shopify::{RemotePage, RemoteRecord};

use super::{
    LocalStore, RemoteError, RemoteSource, RetryPolicy, SyncError, SyncGuard, SyncPhase, mapping,
};

/// Drives fetch → map → upsert → log for each requested entity kind.
///
/// Cheap to clone; clones share the remote client, the store and the run
/// guard.
#[derive(Clone)]
pub struct SyncService {
    remote: Arc<dyn RemoteSource>,
    store: Arc<dyn LocalStore>,
    logger: ActivityLogger,
    retry: RetryPolicy,
    page_size: i64,
    guard: SyncGuard,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("retry", &self.retry)
            .field("page_size", &self.page_size)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

/// A kind whose pages could not all be fetched.
struct FetchFailure {
    error: RemoteError,
    records_fetched: u64,
    attempts: u32,
}

impl SyncService {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteSource>,
        store: Arc<dyn LocalStore>,
        logger: ActivityLogger,
        config: &SyncConfig,
    ) -> Self {
        Self {
            remote,
            store,
            logger,
            retry: RetryPolicy::from(config),
            page_size: config.page_size,
            guard: SyncGuard::new(),
        }
    }

    /// The run guard, shared by every clone of this service.
    #[must_use]
    pub const fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    /// Synchronize every entity kind.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub async fn run_full(&self, actor_id: Option<&str>) -> Result<SyncRunSummary, SyncError> {
        self.run(&EntityKind::ALL, actor_id).await
    }

    /// Synchronize promotions only.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub async fn run_promotions(
        &self,
        actor_id: Option<&str>,
    ) -> Result<SyncRunSummary, SyncError> {
        self.run(&[EntityKind::Promotion], actor_id).await
    }

    /// Synchronize `kinds` in order, recording one activity entry per kind.
    ///
    /// A kind that fails does not stop the kinds after it; its failure is
    /// reported in the returned summary.
    ///
    /// # Errors
    ///
    /// - `SyncError::AlreadyRunning` if another run holds any of `kinds`
    /// - `SyncError::Authentication` if Shopify rejects the credentials; the
    ///   failing kind is logged before the run is aborted
    #[instrument(skip(self), fields(kinds = ?kinds))]
    pub async fn run(
        &self,
        kinds: &[EntityKind],
        actor_id: Option<&str>,
    ) -> Result<SyncRunSummary, SyncError> {
        let _permit = self.guard.try_acquire(kinds)?;

        let started_at = Utc::now();
        let mut results = Vec::with_capacity(kinds.len());
        enter_phase(SyncPhase::Idle);

        for &kind in kinds {
            let (result, auth_failure) = self.sync_kind(kind).await;

            enter_phase(SyncPhase::Logging(kind));
            self.logger
                .record(NewActivityLogEntry::from_sync_result(&result, actor_id))
                .await;

            if let Some(message) = auth_failure {
                tracing::error!(
                    entity_kind = %kind,
                    error = %message,
                    "Shopify rejected credentials, aborting synchronization"
                );
                return Err(SyncError::Authentication(message));
            }

            results.push(result);
        }

        enter_phase(SyncPhase::Done);
        let summary = SyncRunSummary::from_results(results, started_at, Utc::now());

        if summary.success {
            tracing::info!(
                written = summary.total_written(),
                duration_ms = summary.duration_ms(),
                "Synchronization complete"
            );
        } else {
            tracing::warn!(
                failed_kinds = ?summary.unsuccessful_kinds(),
                duration_ms = summary.duration_ms(),
                "Synchronization finished with problems"
            );
        }

        Ok(summary)
    }

    /// Synchronize one kind. Returns the result and, for authentication
    /// failures, the message the run must abort with.
    async fn sync_kind(&self, kind: EntityKind) -> (EntitySyncResult, Option<String>) {
        let started = Instant::now();

        enter_phase(SyncPhase::Fetching(kind));
        let (records, attempts) = match self.fetch_all(kind).await {
            Ok(fetched) => fetched,
            Err(failure) => {
                tracing::error!(
                    entity_kind = %kind,
                    error = %failure.error,
                    attempts = failure.attempts,
                    "Failed to fetch from Shopify"
                );
                let message = failure.error.to_string();
                let auth_failure = failure.error.is_authentication().then(|| message.clone());
                let result = EntitySyncResult::failed(
                    kind,
                    failure.records_fetched,
                    message,
                    elapsed_ms(started),
                    failure.attempts,
                );
                return (result, auth_failure);
            }
        };

        enter_phase(SyncPhase::Writing(kind));
        let items_fetched = records.len() as u64;
        let mut items_written: u64 = 0;
        let mut items_failed: u64 = 0;
        let mut first_failure: Option<String> = None;

        for record in records {
            let shopify_id = record.external_id().to_string();
            let written = match mapping::map_record(record) {
                Ok(local) => self.store.upsert(&local).await,
                Err(e) => Err(e),
            };

            match written {
                Ok(n) => items_written += n,
                Err(e) => {
                    tracing::warn!(
                        entity_kind = %kind,
                        shopify_id = %shopify_id,
                        error = %e,
                        "Failed to write record"
                    );
                    items_failed += 1;
                    if first_failure.is_none() {
                        first_failure = Some(e.to_string());
                    }
                }
            }
        }

        let result = EntitySyncResult::completed(
            kind,
            items_fetched,
            items_written,
            items_failed,
            elapsed_ms(started),
            attempts,
            first_failure,
        );

        tracing::info!(
            entity_kind = %kind,
            fetched = result.items_fetched,
            written = result.items_written,
            failed = result.items_failed,
            outcome = %result.outcome,
            "Synchronized entity kind"
        );

        (result, None)
    }

    /// Fetch every page for `kind`. Pages are requested one after another.
    async fn fetch_all(&self, kind: EntityKind) -> Result<(Vec<RemoteRecord>, u32), FetchFailure> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut attempts: u32 = 0;

        loop {
            let failure = |error: RemoteError, records: &Vec<RemoteRecord>, attempts: u32| {
                FetchFailure {
                    error,
                    records_fetched: records.len() as u64,
                    attempts,
                }
            };

            let page = match self
                .fetch_with_retry(kind, cursor.clone(), &mut attempts)
                .await
            {
                Ok(page) => page,
                Err(e) => return Err(failure(e, &records, attempts)),
            };

            let RemotePage {
                records: page_records,
                has_more,
                next_cursor,
            } = page;
            records.extend(page_records);

            if !has_more {
                break;
            }

            match next_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                Some(_) => {
                    let error = RemoteError::Protocol(format!(
                        "{} pagination cursor did not advance",
                        kind.plural()
                    ));
                    return Err(failure(error, &records, attempts));
                }
                None => {
                    let error = RemoteError::Protocol(format!(
                        "{} page reported more results without a cursor",
                        kind.plural()
                    ));
                    return Err(failure(error, &records, attempts));
                }
            }
        }

        Ok((records, attempts))
    }

    /// Fetch one page, retrying rate-limit and network errors with backoff.
    ///
    /// `attempts` is incremented for every call made to the remote.
    async fn fetch_with_retry(
        &self,
        kind: EntityKind,
        cursor: Option<String>,
        attempts: &mut u32,
    ) -> Result<RemotePage, RemoteError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            *attempts += 1;

            match self
                .remote
                .fetch_page(kind, cursor.clone(), self.page_size)
                .await
            {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && self.retry.can_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    if let RemoteError::RateLimited { retry_after_secs } = &e {
                        tracing::debug!(retry_after_secs, "Shopify sent a rate-limit hint");
                    }
                    tracing::warn!(
                        entity_kind = %kind,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Retrying Shopify page fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn enter_phase(phase: SyncPhase) {
    tracing::debug!(phase = %phase, "Sync phase");
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
