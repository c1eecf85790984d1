// src/services/build_worker_tests.rs
//
// Build Worker Tests
//
// Drives the worker against in-memory repositories and asserts on the
// applied aggregate and the emitted events.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    use crate::domain::block::{Block, BlockItem, BlockStopScheduling, PlaybackOrder};
    use crate::domain::keys::CollectionKey;
    use crate::domain::media_item::{MediaItem, MediaKind};
    use crate::domain::playout::Playout;
    use crate::domain::template::{PlayoutTemplate, Template, TemplateItem};
    use crate::events::types::{PlayoutBuildFailed, PlayoutBuilt};
    use crate::events::EventBus;
    use crate::repositories::{
        ContentRepository, InMemoryConfigRepository, InMemoryContentRepository,
        InMemoryPlayoutRepository,
    };
    use crate::services::build_worker::{BuildRequest, BuildWorker};
    use crate::services::filler_builder::FillerBuilder;
    use crate::services::playout_builder::PlayoutBuilder;

    // ========================================================================
    // TEST HELPERS
    // ========================================================================

    fn collection() -> CollectionKey {
        CollectionKey::Collection(Uuid::new_v5(&Uuid::NAMESPACE_OID, b"worker-sitcoms"))
    }

    fn episode(n: u32) -> MediaItem {
        MediaItem {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("worker-episode-{}", n).as_bytes()),
            title: Some(format!("Episode {}", n)),
            kind: MediaKind::Episode,
            duration_seconds: 1500,
            release_date: NaiveDate::from_ymd_opt(2020, 1, 1)
                .map(|d| d + chrono::Days::new(n as u64)),
            season_number: Some(1),
            episode_number: Some(n),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn seeded_playout() -> Playout {
        let block_id = Uuid::new_v5(&Uuid::NAMESPACE_OID, b"worker-block");
        let block = Block {
            id: block_id,
            name: "sitcoms".to_string(),
            duration_minutes: 30,
            stop_scheduling: BlockStopScheduling::BeforeDurationEnd,
            items: vec![BlockItem {
                id: Uuid::new_v5(&Uuid::NAMESPACE_OID, b"worker-block-item"),
                block_id,
                index: 0,
                collection: collection(),
                playback_order: PlaybackOrder::Chronological,
            }],
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };

        let mut template = Template::new("daily");
        template.items.push(TemplateItem {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, b"worker-template-item"),
            start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            block,
        });

        let mut playout = Playout::new("worker channel", chrono_tz::UTC, 42);
        playout.templates = vec![PlayoutTemplate::new(template, 0)];
        playout
    }

    fn worker_with(repo: Arc<InMemoryPlayoutRepository>, bus: Arc<EventBus>) -> Arc<BuildWorker> {
        let content = InMemoryContentRepository::new();
        content.insert(collection(), (1..=6).map(episode).collect());
        let content: Arc<dyn ContentRepository> = Arc::new(content);

        Arc::new(BuildWorker::new(
            repo,
            PlayoutBuilder::new(
                Arc::clone(&content),
                Arc::new(InMemoryConfigRepository::new()),
            ),
            FillerBuilder::new(content),
            bus,
        ))
    }

    // ========================================================================
    // PROCESSING
    // ========================================================================

    #[tokio::test]
    async fn test_successful_build_applies_diff_and_emits_event() {
        let repo = Arc::new(InMemoryPlayoutRepository::new());
        let playout = seeded_playout();
        let playout_id = playout.id;
        repo.insert(playout);

        let bus = Arc::new(EventBus::new());
        let built: Arc<Mutex<Vec<PlayoutBuilt>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&built);
        bus.subscribe::<PlayoutBuilt, _>(move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        let worker = worker_with(Arc::clone(&repo), bus);
        worker
            .process(BuildRequest { playout_id }, &CancellationToken::new())
            .await;

        let stored = repo.get(playout_id).unwrap();
        assert!(!stored.items.is_empty());
        assert!(!stored.history.is_empty());

        let events = built.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].playout_id, playout_id);
        assert_eq!(events[0].items_added, stored.items.len());
    }

    #[tokio::test]
    async fn test_unknown_playout_emits_failure_event() {
        let repo = Arc::new(InMemoryPlayoutRepository::new());
        let bus = Arc::new(EventBus::new());

        let failures: Arc<Mutex<Vec<PlayoutBuildFailed>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);
        bus.subscribe::<PlayoutBuildFailed, _>(move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        let worker = worker_with(Arc::clone(&repo), bus);
        let missing = Uuid::new_v5(&Uuid::NAMESPACE_OID, b"missing");
        worker
            .process(BuildRequest { playout_id: missing }, &CancellationToken::new())
            .await;

        let events = failures.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].playout_id, missing);
    }

    #[tokio::test]
    async fn test_missing_playout_does_not_leave_a_lock_behind() {
        let repo = Arc::new(InMemoryPlayoutRepository::new());
        let playout = seeded_playout();
        let playout_id = playout.id;
        repo.insert(playout);

        let worker = worker_with(Arc::clone(&repo), Arc::new(EventBus::new()));
        let missing = Uuid::new_v5(&Uuid::NAMESPACE_OID, b"missing");

        worker
            .process(BuildRequest { playout_id: missing }, &CancellationToken::new())
            .await;
        assert_eq!(worker.lock_count(), 0);

        worker
            .process(BuildRequest { playout_id }, &CancellationToken::new())
            .await;
        assert_eq!(worker.lock_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_requests_for_same_playout_converge() {
        let repo = Arc::new(InMemoryPlayoutRepository::new());
        let playout = seeded_playout();
        let playout_id = playout.id;
        repo.insert(playout);

        let bus = Arc::new(EventBus::new());
        let worker = worker_with(Arc::clone(&repo), bus);

        let token = CancellationToken::new();
        worker.process(BuildRequest { playout_id }, &token).await;
        let after_first = repo.get(playout_id).unwrap().items.len();

        worker.process(BuildRequest { playout_id }, &token).await;
        let after_second = repo.get(playout_id).unwrap().items.len();

        // the second pass found nothing new to schedule
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_worker_loop_drains_the_queue() {
        let repo = Arc::new(InMemoryPlayoutRepository::new());
        let playout = seeded_playout();
        let playout_id = playout.id;
        repo.insert(playout);

        let bus = Arc::new(EventBus::new());
        let worker = worker_with(Arc::clone(&repo), bus);

        let (tx, rx) = tokio::sync::mpsc::channel(8);
        let handle = worker.spawn(rx, CancellationToken::new());

        tx.send(BuildRequest { playout_id }).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(!repo.get(playout_id).unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_worker_stops_without_building() {
        let repo = Arc::new(InMemoryPlayoutRepository::new());
        let playout = seeded_playout();
        let playout_id = playout.id;
        repo.insert(playout);

        let bus = Arc::new(EventBus::new());
        let worker = worker_with(Arc::clone(&repo), bus);

        let token = CancellationToken::new();
        token.cancel();

        let (_tx, rx) = tokio::sync::mpsc::channel::<BuildRequest>(8);
        let handle = worker.spawn(rx, token);
        handle.await.unwrap();

        assert!(repo.get(playout_id).unwrap().items.is_empty());
    }
}
