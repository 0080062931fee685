// Admission Engine - decides active-vs-buffered status at registration

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ledger::QueueLedger;
use crate::domain::{EntryStatus, LocationRegistry, QueueEntry};
use crate::error::{EngineError, Result};
use crate::port::{EntryStore, NotificationIntent, Notifier, TimeProvider};

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub location_id: String,
    /// Vehicle plate; normalized to uppercase
    pub entry_id: String,
    /// Contact handle to notify; opaque to the engine
    pub registrant: String,
    /// Unit tag, display only
    #[serde(default)]
    pub secondary_tag: Option<String>,
}

/// Normalize and validate the request fields.
///
/// Plates and unit tags arrive in mixed case from the transport; they are
/// trimmed and uppercased before becoming keys.
pub fn validate_request(req: &RegisterRequest) -> Result<RegisterRequest> {
    let location_id = req.location_id.trim().to_string();
    let entry_id = req.entry_id.trim().to_uppercase();
    let registrant = req.registrant.trim().to_string();

    if location_id.is_empty() {
        return Err(EngineError::InvalidEntry(
            "location_id must not be empty".to_string(),
        ));
    }
    if entry_id.is_empty() {
        return Err(EngineError::InvalidEntry(
            "entry_id must not be empty".to_string(),
        ));
    }
    if registrant.is_empty() {
        return Err(EngineError::InvalidEntry(
            "registrant must not be empty".to_string(),
        ));
    }

    let secondary_tag = req
        .secondary_tag
        .as_deref()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty());

    Ok(RegisterRequest {
        location_id,
        entry_id,
        registrant,
        secondary_tag,
    })
}

/// Execute the registration use case.
///
/// Snapshot-then-decide: occupancy is always derived from the store at
/// decision time, never from a process-local counter. The conditional
/// create is the only atomic guard; two racing registrations for the same
/// entry_id resolve to exactly one winner. Racing registrations for
/// different entries may both read the same active count and transiently
/// exceed capacity by at most (racers - 1) - an accepted bounded overrun.
pub async fn execute(
    store: &Arc<dyn EntryStore>,
    notifier: &Arc<dyn Notifier>,
    registry: &LocationRegistry,
    time_provider: &Arc<dyn TimeProvider>,
    req: RegisterRequest,
) -> Result<EntryStatus> {
    let req = validate_request(&req)?;

    let location = registry
        .get(&req.location_id)
        .ok_or_else(|| EngineError::UnknownLocation(req.location_id.clone()))?;

    let ledger = QueueLedger::new(Arc::clone(store));
    let snapshot = ledger.snapshot(&req.location_id).await?;

    let status = if snapshot.active_count() < location.capacity as usize {
        EntryStatus::Active
    } else {
        EntryStatus::Buffered
    };

    let entry = QueueEntry::new(
        req.location_id.clone(),
        req.entry_id.clone(),
        req.registrant.clone(),
        status,
        time_provider.now_millis(),
        req.secondary_tag.clone(),
    );

    if !store.create_if_absent(&entry).await? {
        // Live entry already holds the key; rejecting instead of
        // overwriting keeps the original queue position.
        return Err(EngineError::DuplicateEntry {
            location_id: req.location_id,
            entry_id: req.entry_id,
        });
    }

    info!(
        location_id = %entry.location_id,
        entry_id = %entry.entry_id,
        status = %status,
        "entry registered"
    );

    let intent =
        NotificationIntent::registered(&entry.registrant, &entry.location_id, &entry.entry_id, status);
    if let Err(e) = notifier.notify(intent).await {
        // Delivery is the port's problem; the committed entry stands.
        warn!(
            entry_id = %entry.entry_id,
            error = %e,
            "registration notification failed"
        );
    }

    Ok(status)
}
