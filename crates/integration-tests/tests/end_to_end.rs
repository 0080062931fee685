// End-to-end tests: QueueService against the SQLite adapter

use std::sync::Arc;

use dispatchq_core::application::{QueueService, RegisterRequest, RetryPolicy};
use dispatchq_core::domain::{EntryStatus, Location, LocationRegistry};
use dispatchq_core::error::EngineError;
use dispatchq_core::port::notifier::mocks::RecordingNotifier;
use dispatchq_core::port::time_provider::mocks::SteppingClock;
use dispatchq_core::port::MessageKind;
use dispatchq_infra_sqlite::{create_pool, run_migrations, SqliteEntryStore};

struct Harness {
    service: QueueService,
    notifier: Arc<RecordingNotifier>,
    // Held for the lifetime of the test database
    _dir: tempfile::TempDir,
}

async fn harness(capacity: u32) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("queue.db");

    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let service = QueueService::new(
        Arc::new(SqliteEntryStore::new(pool)),
        notifier.clone(),
        Arc::new(LocationRegistry::new([
            Location::new("mall_nusantara", capacity).unwrap()
        ])),
        Arc::new(SteppingClock::new(1_000, 1_000)),
        RetryPolicy::default(),
    );

    Harness {
        service,
        notifier,
        _dir: dir,
    }
}

fn request(entry_id: &str) -> RegisterRequest {
    RegisterRequest {
        location_id: "mall_nusantara".to_string(),
        entry_id: entry_id.to_string(),
        registrant: format!("62812-{entry_id}"),
        secondary_tag: None,
    }
}

#[tokio::test]
async fn test_capacity_three_fourth_arrival_is_buffered() {
    let h = harness(3).await;

    assert_eq!(
        h.service.register(request("R1")).await.unwrap(),
        EntryStatus::Active
    );
    assert_eq!(
        h.service.register(request("R2")).await.unwrap(),
        EntryStatus::Active
    );
    assert_eq!(
        h.service.register(request("R3")).await.unwrap(),
        EntryStatus::Active
    );
    assert_eq!(
        h.service.register(request("R4")).await.unwrap(),
        EntryStatus::Buffered
    );

    // One Registered intent per successful registration
    assert_eq!(h.notifier.sent_of_kind(MessageKind::Registered).len(), 4);
}

#[tokio::test]
async fn test_departure_promotes_and_list_reflects_it() {
    let h = harness(3).await;
    for id in ["R1", "R2", "R3", "R4"] {
        h.service.register(request(id)).await.unwrap();
    }

    let (held, promoted) = h
        .service
        .depart_and_reconcile("mall_nusantara", "R1")
        .await
        .unwrap();
    assert_eq!(held, EntryStatus::Active);
    assert_eq!(promoted, 1);

    let report = h.service.list("mall_nusantara").await.unwrap();
    let active: Vec<_> = report.active.iter().map(|l| l.entry_id.as_str()).collect();
    assert_eq!(active, vec!["R2", "R3", "R4"]);
    assert!(report.buffered.is_empty());

    let intents = h.notifier.sent_of_kind(MessageKind::Promoted);
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].payload["entry_id"], "R4");
    assert_eq!(intents[0].registrant, "62812-R4");
}

#[tokio::test]
async fn test_reconcile_without_vacancy_is_a_no_op() {
    let h = harness(1).await;
    h.service.register(request("R1")).await.unwrap();
    h.service.register(request("R2")).await.unwrap();

    assert_eq!(h.service.reconcile("mall_nusantara").await.unwrap(), 0);

    let report = h.service.list("mall_nusantara").await.unwrap();
    assert_eq!(report.buffered.len(), 1);
    assert!(h.notifier.sent_of_kind(MessageKind::Promoted).is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_rejected_until_departed() {
    let h = harness(2).await;
    h.service.register(request("B1234XYZ")).await.unwrap();

    let result = h.service.register(request("B1234XYZ")).await;
    assert!(matches!(result, Err(EngineError::DuplicateEntry { .. })));

    h.service
        .depart_and_reconcile("mall_nusantara", "B1234XYZ")
        .await
        .unwrap();

    assert_eq!(
        h.service.register(request("B1234XYZ")).await.unwrap(),
        EntryStatus::Active
    );
}

#[tokio::test]
async fn test_list_round_trip_after_mixed_operations() {
    let h = harness(2).await;
    for id in ["R1", "R2", "R3", "R4", "R5"] {
        h.service.register(request(id)).await.unwrap();
    }
    // R3 withdraws from the buffer; R1 departs and frees a slot
    h.service
        .depart_and_reconcile("mall_nusantara", "R3")
        .await
        .unwrap();
    h.service
        .depart_and_reconcile("mall_nusantara", "R1")
        .await
        .unwrap();

    let report = h.service.list("mall_nusantara").await.unwrap();
    let active: Vec<_> = report.active.iter().map(|l| l.entry_id.as_str()).collect();
    let buffered: Vec<_> = report.buffered.iter().map(|l| l.entry_id.as_str()).collect();
    assert_eq!(active, vec!["R2", "R4"]);
    assert_eq!(buffered, vec!["R5"]);
    assert!(report.active.len() <= report.capacity as usize);
}

#[tokio::test]
async fn test_unknown_location_is_rejected() {
    let h = harness(2).await;
    let result = h.service.list("stasiun_gambir").await;
    assert!(matches!(result, Err(EngineError::UnknownLocation(_))));
}

#[tokio::test]
async fn test_departed_row_is_retained_in_storage() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("queue.db");
    let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let service = QueueService::new(
        Arc::new(SqliteEntryStore::new(pool.clone())),
        Arc::new(RecordingNotifier::new()),
        Arc::new(LocationRegistry::new([
            Location::new("mall_nusantara", 2).unwrap()
        ])),
        Arc::new(SteppingClock::new(1_000, 1_000)),
        RetryPolicy::default(),
    );

    service.register(request("R1")).await.unwrap();
    service.register(request("R2")).await.unwrap();
    service
        .depart_and_reconcile("mall_nusantara", "R1")
        .await
        .unwrap();

    // The report no longer shows the departed entry
    let report = service.list("mall_nusantara").await.unwrap();
    assert!(report
        .active
        .iter()
        .chain(report.buffered.iter())
        .all(|line| line.entry_id != "R1"));

    // but its row is retained in the table, marked DEPARTED
    let status: String =
        sqlx::query_scalar("SELECT status FROM entries WHERE location_id = ? AND entry_id = ?")
            .bind("mall_nusantara")
            .bind("R1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "DEPARTED");
}

#[tokio::test]
async fn test_queue_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("queue.db");
    let registry = || {
        Arc::new(LocationRegistry::new([
            Location::new("mall_nusantara", 1).unwrap()
        ]))
    };

    // First process: register two entries
    {
        let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let service = QueueService::new(
            Arc::new(SqliteEntryStore::new(pool)),
            Arc::new(RecordingNotifier::new()),
            registry(),
            Arc::new(SteppingClock::new(1_000, 1_000)),
            RetryPolicy::default(),
        );
        service.register(request("R1")).await.unwrap();
        service.register(request("R2")).await.unwrap();
    }

    // Second process: state restored, promotion still works
    {
        let pool = create_pool(db_path.to_str().unwrap()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let service = QueueService::new(
            Arc::new(SqliteEntryStore::new(pool)),
            Arc::new(RecordingNotifier::new()),
            registry(),
            Arc::new(SteppingClock::new(10_000, 1_000)),
            RetryPolicy::default(),
        );

        let report = service.list("mall_nusantara").await.unwrap();
        assert_eq!(report.active.len(), 1);
        assert_eq!(report.buffered.len(), 1);

        let (_, promoted) = service
            .depart_and_reconcile("mall_nusantara", "R1")
            .await
            .unwrap();
        assert_eq!(promoted, 1);
    }
}
