// DispatchQ Infrastructure - SQLite Adapter
// Implements: EntryStore

mod connection;
mod entry_store;
mod migration;

pub use connection::create_pool;
pub use entry_store::SqliteEntryStore;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by a helper function here
// (orphan rules prevent implementing From<sqlx::Error> for EngineError)
