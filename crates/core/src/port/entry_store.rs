// Entry Store Port (Interface)

use crate::domain::{EntryStatus, QueueEntry};
use crate::error::Result;
use async_trait::async_trait;

/// Keyed persistence for queue entries.
///
/// The store is the single source of truth; the engine holds no
/// authoritative state of its own. All three operations must be atomic
/// with respect to each other for a given `(location_id, entry_id)` -
/// correctness under concurrent engine instances relies on these
/// conditional-write primitives, not on in-process locks.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Create the entry only if no live entry with the same key exists.
    ///
    /// An existing Departed entry counts as absent and is replaced, so a
    /// vehicle that has left the stand can register again. Returns `false`
    /// when a live (Active or Buffered) entry already holds the key.
    async fn create_if_absent(&self, entry: &QueueEntry) -> Result<bool>;

    /// Compare-and-set on status: flip to `new` only if the entry's
    /// current status is still `expected`. Returns `false` if the
    /// precondition no longer holds (or the entry is gone).
    async fn update_if_status(
        &self,
        location_id: &str,
        entry_id: &str,
        expected: EntryStatus,
        new: EntryStatus,
    ) -> Result<bool>;

    /// Read all entries for a location, Departed included.
    ///
    /// A single call is a consistent snapshot relative to the store; no
    /// guarantee holds across calls.
    async fn read_all(&self, location_id: &str) -> Result<Vec<QueueEntry>>;
}

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// In-memory store with the same conditional-write semantics as the
    /// SQLite adapter, plus failure injection for retry tests.
    #[derive(Default)]
    pub struct InMemoryEntryStore {
        entries: Mutex<HashMap<(String, String), QueueEntry>>,
        fail_next: AtomicU32,
    }

    impl InMemoryEntryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `n` store calls fail with StoreUnavailable
        pub fn fail_next(&self, n: u32) {
            self.fail_next.store(n, Ordering::SeqCst);
        }

        fn check_fault(&self) -> Result<()> {
            let remaining = self.fail_next.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_next.store(remaining - 1, Ordering::SeqCst);
                return Err(EngineError::StoreUnavailable(
                    "injected store fault".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EntryStore for InMemoryEntryStore {
        async fn create_if_absent(&self, entry: &QueueEntry) -> Result<bool> {
            self.check_fault()?;
            let mut entries = self.entries.lock().expect("store lock poisoned");
            let key = (entry.location_id.clone(), entry.entry_id.clone());
            match entries.get(&key) {
                Some(existing) if !existing.status.is_terminal() => Ok(false),
                _ => {
                    entries.insert(key, entry.clone());
                    Ok(true)
                }
            }
        }

        async fn update_if_status(
            &self,
            location_id: &str,
            entry_id: &str,
            expected: EntryStatus,
            new: EntryStatus,
        ) -> Result<bool> {
            self.check_fault()?;
            let mut entries = self.entries.lock().expect("store lock poisoned");
            let key = (location_id.to_string(), entry_id.to_string());
            match entries.get_mut(&key) {
                Some(entry) if entry.status == expected => {
                    entry.status = new;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn read_all(&self, location_id: &str) -> Result<Vec<QueueEntry>> {
            self.check_fault()?;
            let entries = self.entries.lock().expect("store lock poisoned");
            Ok(entries
                .values()
                .filter(|e| e.location_id == location_id)
                .cloned()
                .collect())
        }
    }
}
