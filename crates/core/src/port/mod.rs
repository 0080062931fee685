// Port Layer - Interfaces for external collaborators

pub mod entry_store;
pub mod notifier;
pub mod time_provider;

// Re-exports
pub use entry_store::EntryStore;
pub use notifier::{LogNotifier, MessageKind, NotificationIntent, Notifier};
pub use time_provider::TimeProvider;
