// Departure - marks an entry terminal, opening a vacancy

use std::sync::Arc;
use tracing::info;

use crate::domain::{EntryStatus, LocationRegistry};
use crate::error::{EngineError, Result};
use crate::port::EntryStore;

/// Mark an entry Departed and return the status it held.
///
/// Active -> Departed is service completion; Buffered -> Departed is a
/// withdrawal. Both are compare-and-set, so a concurrent promotion cannot
/// be clobbered: if the entry was promoted between our two attempts the
/// Buffered CAS simply misses and the caller gets `InvalidEntry`.
/// Callers run `reconcile` afterwards when an Active slot was freed.
pub async fn execute(
    store: &Arc<dyn EntryStore>,
    registry: &LocationRegistry,
    location_id: &str,
    entry_id: &str,
) -> Result<EntryStatus> {
    if !registry.contains(location_id) {
        return Err(EngineError::UnknownLocation(location_id.to_string()));
    }
    let entry_id = entry_id.trim().to_uppercase();
    if entry_id.is_empty() {
        return Err(EngineError::InvalidEntry(
            "entry_id must not be empty".to_string(),
        ));
    }

    for held in [EntryStatus::Active, EntryStatus::Buffered] {
        if store
            .update_if_status(location_id, &entry_id, held, EntryStatus::Departed)
            .await?
        {
            info!(location_id, entry_id = %entry_id, was = %held, "entry departed");
            return Ok(held);
        }
    }

    Err(EngineError::InvalidEntry(format!(
        "no live entry {entry_id} at {location_id}"
    )))
}
