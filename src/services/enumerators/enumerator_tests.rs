// src/services/enumerators/enumerator_tests.rs
//
// Enumerator Tests
//
// All helpers are deterministic: fixed ids (UUIDv5), fixed timestamps,
// fixed seeds. A rebuild of the same collection with the same persisted
// cursor must reproduce the same playback order.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use crate::domain::media_item::{MediaItem, MediaKind};
    use crate::services::enumerators::{
        ChronologicalMediaCollectionEnumerator, CollectionEnumeratorState,
        MediaCollectionEnumerator, SeasonEpisodeMediaCollectionEnumerator,
        ShuffledMediaCollectionEnumerator,
    };

    // ========================================================================
    // TEST HELPERS
    // ========================================================================

    fn deterministic_item(n: u32, duration_seconds: u32) -> MediaItem {
        MediaItem {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("media-{}", n).as_bytes()),
            title: Some(format!("Item {}", n)),
            kind: MediaKind::Episode,
            duration_seconds,
            release_date: NaiveDate::from_ymd_opt(2020, 1, 1)
                .map(|d| d + chrono::Days::new(n as u64)),
            season_number: Some(1),
            episode_number: Some(n),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn items(count: u32) -> Vec<MediaItem> {
        (1..=count).map(|n| deterministic_item(n, 1500)).collect()
    }

    // ========================================================================
    // CHRONOLOGICAL
    // ========================================================================

    #[test]
    fn test_chronological_orders_by_release_date() {
        let mut list = items(3);
        list.reverse();

        let enumerator =
            ChronologicalMediaCollectionEnumerator::new(list, CollectionEnumeratorState::start(0));
        assert_eq!(enumerator.current().unwrap().episode_number, Some(1));
    }

    #[test]
    fn test_chronological_missing_release_date_sorts_last() {
        let mut list = items(2);
        list[0].release_date = None;
        let first_id = list[1].id;

        let enumerator =
            ChronologicalMediaCollectionEnumerator::new(list, CollectionEnumeratorState::start(0));
        assert_eq!(enumerator.current().unwrap().id, first_id);
    }

    #[test]
    fn test_chronological_wraps_around() {
        let mut enumerator = ChronologicalMediaCollectionEnumerator::new(
            items(3),
            CollectionEnumeratorState::start(0),
        );
        for _ in 0..3 {
            enumerator.move_next();
        }
        assert_eq!(enumerator.state().index, 0);
        assert_eq!(enumerator.current().unwrap().episode_number, Some(1));
    }

    #[test]
    fn test_empty_collection_has_no_current() {
        let mut enumerator = ChronologicalMediaCollectionEnumerator::new(
            Vec::new(),
            CollectionEnumeratorState::start(0),
        );
        assert!(enumerator.current().is_none());
        enumerator.move_next();
        assert!(enumerator.current().is_none());
        assert!(enumerator.minimum_duration().is_none());
    }

    // ========================================================================
    // SEASON / EPISODE
    // ========================================================================

    #[test]
    fn test_season_episode_orders_by_season_then_episode() {
        let mut list = items(2);
        list[0].season_number = Some(2);
        list[0].episode_number = Some(1);
        list[1].season_number = Some(1);
        list[1].episode_number = Some(9);

        let enumerator =
            SeasonEpisodeMediaCollectionEnumerator::new(list, CollectionEnumeratorState::start(0));
        let current = enumerator.current().unwrap();
        assert_eq!(current.season_number, Some(1));
        assert_eq!(current.episode_number, Some(9));
    }

    #[test]
    fn test_minimum_duration_ignores_zero_length_items() {
        let mut list = items(2);
        list[0].duration_seconds = 0;
        list[1].duration_seconds = 600;

        let enumerator =
            SeasonEpisodeMediaCollectionEnumerator::new(list, CollectionEnumeratorState::start(0));
        assert_eq!(
            enumerator.minimum_duration(),
            Some(chrono::Duration::seconds(600))
        );
    }

    // ========================================================================
    // SHUFFLE
    // ========================================================================

    #[test]
    fn test_shuffle_is_deterministic_for_seed_and_index() {
        let one = ShuffledMediaCollectionEnumerator::new(
            items(10),
            CollectionEnumeratorState { seed: 42, index: 0 },
        );
        let two = ShuffledMediaCollectionEnumerator::new(
            items(10),
            CollectionEnumeratorState { seed: 42, index: 0 },
        );

        assert_eq!(one.current().unwrap().id, two.current().unwrap().id);
    }

    #[test]
    fn test_shuffle_resumes_mid_permutation() {
        let mut walked = ShuffledMediaCollectionEnumerator::new(
            items(10),
            CollectionEnumeratorState { seed: 42, index: 0 },
        );
        let mut played = Vec::new();
        for _ in 0..4 {
            played.push(walked.current().unwrap().id);
            walked.move_next();
        }

        // a fresh enumerator handed the persisted cursor continues the sequence
        let resumed = ShuffledMediaCollectionEnumerator::new(
            items(10),
            CollectionEnumeratorState { seed: 42, index: 4 },
        );
        let next = resumed.current().unwrap().id;
        assert_eq!(next, walked.current().unwrap().id);
        assert!(!played.contains(&next));
    }

    #[test]
    fn test_shuffle_visits_every_item_once_per_pass() {
        let mut enumerator = ShuffledMediaCollectionEnumerator::new(
            items(10),
            CollectionEnumeratorState { seed: 7, index: 0 },
        );
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10 {
            seen.insert(enumerator.current().unwrap().id);
            enumerator.move_next();
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_shuffle_draws_new_permutation_after_full_pass() {
        let mut enumerator = ShuffledMediaCollectionEnumerator::new(
            items(10),
            CollectionEnumeratorState { seed: 7, index: 0 },
        );
        let mut first_pass = Vec::new();
        for _ in 0..10 {
            first_pass.push(enumerator.current().unwrap().id);
            enumerator.move_next();
        }
        let mut second_pass = Vec::new();
        for _ in 0..10 {
            second_pass.push(enumerator.current().unwrap().id);
            enumerator.move_next();
        }

        // same membership, different order
        let a: std::collections::HashSet<_> = first_pass.iter().collect();
        let b: std::collections::HashSet<_> = second_pass.iter().collect();
        assert_eq!(a, b);
        assert_ne!(first_pass, second_pass);
    }

    #[test]
    fn test_shuffle_different_seeds_differ() {
        let collect = |seed: u64| {
            let mut e = ShuffledMediaCollectionEnumerator::new(
                items(64),
                CollectionEnumeratorState { seed, index: 0 },
            );
            let mut order = Vec::new();
            for _ in 0..64 {
                order.push(e.current().unwrap().id);
                e.move_next();
            }
            order
        };
        assert_ne!(collect(1), collect(2));
    }
}
