// Promotion Engine - fills vacancies from the buffer, oldest first

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::ledger::QueueLedger;
use crate::domain::{EntryStatus, LocationRegistry};
use crate::error::{EngineError, Result};
use crate::port::{EntryStore, NotificationIntent, Notifier};

/// Upper bound on consecutive lost CAS rounds before giving up.
/// Every lost round means some other actor changed the entry, so the next
/// snapshot shrinks the candidate set; this bound only guards against a
/// misbehaving store reporting phantom conflicts.
const MAX_CONFLICT_ROUNDS: u32 = 16;

/// Execute the reconcile use case: recompute vacancies and promote
/// Buffered entries oldest-first until the location is full or the buffer
/// is empty. Returns the number of promotions committed.
///
/// Safe to run concurrently for the same location: each promotion is a
/// compare-and-set on status, so a candidate can be won by exactly one
/// reconcile. A lost CAS is absorbed by re-snapshotting - if the vacancy
/// was filled by the concurrent run the fresh snapshot shows zero
/// vacancies and the loop stops; if the candidate merely withdrew, the
/// vacancy is still open and the next-oldest entry is tried. Promotion
/// therefore never blocks on a contested entry and never overfills.
///
/// Idempotent: no vacancy or no buffered entry is a no-op with no intents.
pub async fn execute(
    store: &Arc<dyn EntryStore>,
    notifier: &Arc<dyn Notifier>,
    registry: &LocationRegistry,
    location_id: &str,
) -> Result<usize> {
    let location = registry
        .get(location_id)
        .ok_or_else(|| EngineError::UnknownLocation(location_id.to_string()))?;

    let ledger = QueueLedger::new(Arc::clone(store));
    let mut promoted = 0usize;
    let mut conflict_rounds = 0u32;

    loop {
        let snapshot = ledger.snapshot(location_id).await?;
        let vacancies = snapshot.vacancies(location.capacity);
        if vacancies == 0 {
            break;
        }
        let Some(candidate) = snapshot.oldest_buffered() else {
            break;
        };

        let won = store
            .update_if_status(
                location_id,
                &candidate.entry_id,
                EntryStatus::Buffered,
                EntryStatus::Active,
            )
            .await?;

        if !won {
            // Lost to a concurrent reconcile or a withdrawal; the fresh
            // snapshot on the next round decides whether a vacancy remains.
            conflict_rounds += 1;
            debug!(
                location_id,
                entry_id = %candidate.entry_id,
                "promotion lost to concurrent update, re-snapshotting"
            );
            if conflict_rounds >= MAX_CONFLICT_ROUNDS {
                warn!(
                    location_id,
                    rounds = conflict_rounds,
                    "giving up reconcile after repeated promotion conflicts"
                );
                break;
            }
            continue;
        }

        conflict_rounds = 0;
        promoted += 1;
        info!(
            location_id,
            entry_id = %candidate.entry_id,
            "entry promoted to active"
        );

        let intent = NotificationIntent::promoted(
            &candidate.registrant,
            location_id,
            &candidate.entry_id,
        );
        if let Err(e) = notifier.notify(intent).await {
            warn!(
                entry_id = %candidate.entry_id,
                error = %e,
                "promotion notification failed"
            );
        }
    }

    Ok(promoted)
}
