// Notification Port (Interface)

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{EntryStatus, Registrant};

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Terminal outcome of a registration: Active or Buffered
    Registered,
    /// A buffered entry gained a slot
    Promoted,
}

/// A status-change message the engine wants delivered.
///
/// The core only produces these intents; transport I/O belongs to the
/// adapter behind [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub registrant: Registrant,
    pub kind: MessageKind,
    pub payload: serde_json::Value,
}

impl NotificationIntent {
    pub fn registered(
        registrant: impl Into<String>,
        location_id: &str,
        entry_id: &str,
        status: EntryStatus,
    ) -> Self {
        Self {
            registrant: registrant.into(),
            kind: MessageKind::Registered,
            payload: serde_json::json!({
                "location_id": location_id,
                "entry_id": entry_id,
                "status": status.to_string(),
            }),
        }
    }

    pub fn promoted(registrant: impl Into<String>, location_id: &str, entry_id: &str) -> Self {
        Self {
            registrant: registrant.into(),
            kind: MessageKind::Promoted,
            payload: serde_json::json!({
                "location_id": location_id,
                "entry_id": entry_id,
                "status": EntryStatus::Active.to_string(),
            }),
        }
    }
}

/// Delivery port for notification intents.
///
/// The engine never inspects delivery success beyond logging; a failed
/// notification must not roll back a committed status change. Retry is
/// the adapter's own policy.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, intent: NotificationIntent) -> Result<()>;
}

/// Production default until a transport adapter is wired in: emits the
/// intent as a structured log line.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, intent: NotificationIntent) -> Result<()> {
        tracing::info!(
            registrant = %intent.registrant,
            kind = ?intent.kind,
            payload = %intent.payload,
            "notification intent"
        );
        Ok(())
    }
}

pub mod mocks {
    use super::*;
    use crate::error::EngineError;
    use std::sync::Mutex;

    /// Records every intent for assertion in tests
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<NotificationIntent>>,
        fail: Mutex<bool>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent notify call fail
        pub fn fail_all(&self) {
            *self.fail.lock().expect("notifier lock poisoned") = true;
        }

        pub fn sent(&self) -> Vec<NotificationIntent> {
            self.sent.lock().expect("notifier lock poisoned").clone()
        }

        pub fn sent_of_kind(&self, kind: MessageKind) -> Vec<NotificationIntent> {
            self.sent()
                .into_iter()
                .filter(|i| i.kind == kind)
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, intent: NotificationIntent) -> Result<()> {
            if *self.fail.lock().expect("notifier lock poisoned") {
                return Err(EngineError::Notification(
                    "injected delivery failure".to_string(),
                ));
            }
            self.sent
                .lock()
                .expect("notifier lock poisoned")
                .push(intent);
            Ok(())
        }
    }
}
