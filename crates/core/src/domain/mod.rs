// Domain Layer - Entities and invariants

pub mod entry;
pub mod error;
pub mod location;

// Re-exports
pub use entry::{EntryId, EntryStatus, LocationId, QueueEntry, Registrant};
pub use error::DomainError;
pub use location::{Location, LocationRegistry};
