// Queue Entry Domain Model

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

/// Identifier of a physical queue location (e.g. a stand key)
pub type LocationId = String;

/// Entry key within a location (derived from the vehicle plate)
pub type EntryId = String;

/// Opaque contact handle of whoever gets notified
pub type Registrant = String;

/// Entry status
///
/// Active entries occupy one of the location's limited concurrent-service
/// slots. Buffered entries wait for a slot, FIFO by arrival. Departed is
/// terminal: the entry no longer participates in capacity accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Active,
    Buffered,
    Departed,
}

impl EntryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryStatus::Departed)
    }

    /// Parse the persisted representation
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(EntryStatus::Active),
            "BUFFERED" => Ok(EntryStatus::Buffered),
            "DEPARTED" => Ok(EntryStatus::Departed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Active => write!(f, "ACTIVE"),
            EntryStatus::Buffered => write!(f, "BUFFERED"),
            EntryStatus::Departed => write!(f, "DEPARTED"),
        }
    }
}

/// Queue Entry Entity
///
/// `entry_id` and `created_at` are immutable once created; only `status`
/// mutates post-creation, and only through conditional store writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub location_id: LocationId,
    pub entry_id: EntryId,
    pub registrant: Registrant,
    pub status: EntryStatus,
    /// Epoch millis, set once at creation; FIFO ordering key
    pub created_at: i64,
    /// Free-form sub-identifier (e.g. a unit tag); display only
    pub secondary_tag: Option<String>,
}

impl QueueEntry {
    pub fn new(
        location_id: impl Into<String>,
        entry_id: impl Into<String>,
        registrant: impl Into<String>,
        status: EntryStatus,
        created_at: i64,
        secondary_tag: Option<String>,
    ) -> Self {
        Self {
            location_id: location_id.into(),
            entry_id: entry_id.into(),
            registrant: registrant.into(),
            status,
            created_at,
            secondary_tag,
        }
    }

    /// FIFO ordering key: `created_at` ascending, ties broken by
    /// `entry_id` lexical order for determinism.
    pub fn arrival_key(&self) -> (i64, &str) {
        (self.created_at, &self.entry_id)
    }

    /// Validate a Buffered -> Active transition (promotion)
    pub fn promote(&mut self) -> Result<()> {
        if self.status != EntryStatus::Buffered {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: EntryStatus::Active.to_string(),
            });
        }
        self.status = EntryStatus::Active;
        Ok(())
    }

    /// Validate a transition to Departed (service completion or withdrawal)
    pub fn depart(&mut self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: EntryStatus::Departed.to_string(),
            });
        }
        self.status = EntryStatus::Departed;
        Ok(())
    }
}
