// Status listing - read-only report of a location's queue

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ledger::QueueLedger;
use crate::domain::{EntryStatus, LocationRegistry, QueueEntry};
use crate::error::{EngineError, Result};
use crate::port::EntryStore;

/// One line of the report, positions numbered for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub position: usize,
    pub entry_id: String,
    pub secondary_tag: Option<String>,
    pub status: EntryStatus,
}

impl ReportLine {
    fn from_entry(position: usize, entry: &QueueEntry) -> Self {
        Self {
            position,
            entry_id: entry.entry_id.clone(),
            secondary_tag: entry.secondary_tag.clone(),
            status: entry.status,
        }
    }
}

/// Ordered report: Active entries then Buffered entries, each in arrival
/// order. Positions number across both partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueReport {
    pub location_id: String,
    pub capacity: u32,
    pub active: Vec<ReportLine>,
    pub buffered: Vec<ReportLine>,
}

impl QueueReport {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.buffered.is_empty()
    }
}

/// Execute the list use case; read-only, no side effects.
pub async fn execute(
    store: &Arc<dyn EntryStore>,
    registry: &LocationRegistry,
    location_id: &str,
) -> Result<QueueReport> {
    let location = registry
        .get(location_id)
        .ok_or_else(|| EngineError::UnknownLocation(location_id.to_string()))?;

    let ledger = QueueLedger::new(Arc::clone(store));
    let snapshot = ledger.snapshot(location_id).await?;

    let active: Vec<ReportLine> = snapshot
        .active
        .iter()
        .enumerate()
        .map(|(i, e)| ReportLine::from_entry(i + 1, e))
        .collect();
    let offset = active.len();
    let buffered: Vec<ReportLine> = snapshot
        .buffered
        .iter()
        .enumerate()
        .map(|(i, e)| ReportLine::from_entry(offset + i + 1, e))
        .collect();

    Ok(QueueReport {
        location_id: location_id.to_string(),
        capacity: location.capacity,
        active,
        buffered,
    })
}
