// Application Layer - Use Cases and Engines

pub mod admission;
pub mod departure;
pub mod ledger;
pub mod promotion;
pub mod query;
pub mod retry;

// Re-exports
pub use admission::RegisterRequest;
pub use ledger::{LedgerSnapshot, QueueLedger};
pub use query::QueueReport;
pub use retry::RetryPolicy;

use std::sync::Arc;

use crate::domain::{EntryStatus, LocationRegistry};
use crate::error::Result;
use crate::port::{EntryStore, Notifier, TimeProvider};

/// Queue Service - the admission/promotion engine pair parameterized by
/// location.
///
/// Holds no authoritative state; every decision derives from a fresh
/// store snapshot and every mutation is a conditional store write, so any
/// number of service instances may run against the same store. Transient
/// store faults are retried here at the boundary per the configured
/// policy.
pub struct QueueService {
    store: Arc<dyn EntryStore>,
    notifier: Arc<dyn Notifier>,
    registry: Arc<LocationRegistry>,
    time_provider: Arc<dyn TimeProvider>,
    retry: RetryPolicy,
}

impl QueueService {
    pub fn new(
        store: Arc<dyn EntryStore>,
        notifier: Arc<dyn Notifier>,
        registry: Arc<LocationRegistry>,
        time_provider: Arc<dyn TimeProvider>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            registry,
            time_provider,
            retry,
        }
    }

    /// Register an arrival; returns the computed status (Active or
    /// Buffered). Safe to retry: creation is conditional on the key.
    pub async fn register(&self, req: RegisterRequest) -> Result<EntryStatus> {
        retry::with_retries(&self.retry, || {
            let store = Arc::clone(&self.store);
            let notifier = Arc::clone(&self.notifier);
            let registry = Arc::clone(&self.registry);
            let time_provider = Arc::clone(&self.time_provider);
            let req = req.clone();
            async move {
                admission::execute(&store, &notifier, &registry, &time_provider, req).await
            }
        })
        .await
    }

    /// Mark an entry Departed; returns the status it held. Does not
    /// reconcile - see [`QueueService::depart_and_reconcile`].
    pub async fn depart(&self, location_id: &str, entry_id: &str) -> Result<EntryStatus> {
        retry::with_retries(&self.retry, || {
            let store = Arc::clone(&self.store);
            let registry = Arc::clone(&self.registry);
            let location_id = location_id.to_string();
            let entry_id = entry_id.to_string();
            async move { departure::execute(&store, &registry, &location_id, &entry_id).await }
        })
        .await
    }

    /// Departure plus the reconcile it triggers when an Active slot was
    /// freed. Returns the held status and the number of promotions.
    pub async fn depart_and_reconcile(
        &self,
        location_id: &str,
        entry_id: &str,
    ) -> Result<(EntryStatus, usize)> {
        let held = self.depart(location_id, entry_id).await?;
        let promoted = if held == EntryStatus::Active {
            self.reconcile(location_id).await?
        } else {
            0
        };
        Ok((held, promoted))
    }

    /// Recompute vacancies and promote buffered entries oldest-first.
    /// Idempotent; returns the number of promotions committed.
    pub async fn reconcile(&self, location_id: &str) -> Result<usize> {
        retry::with_retries(&self.retry, || {
            let store = Arc::clone(&self.store);
            let notifier = Arc::clone(&self.notifier);
            let registry = Arc::clone(&self.registry);
            let location_id = location_id.to_string();
            async move { promotion::execute(&store, &notifier, &registry, &location_id).await }
        })
        .await
    }

    /// Ordered status report for display; read-only.
    pub async fn list(&self, location_id: &str) -> Result<QueueReport> {
        retry::with_retries(&self.retry, || {
            let store = Arc::clone(&self.store);
            let registry = Arc::clone(&self.registry);
            let location_id = location_id.to_string();
            async move { query::execute(&store, &registry, &location_id).await }
        })
        .await
    }
}
