// src/services/collection_etag.rs
//
// Content fingerprinting. An etag covers both membership and item
// versions, so adding, removing, or editing any item in a collection
// changes the tag and triggers a reschedule of the blocks that use it.

use sha2::{Digest, Sha256};

use crate::domain::media_item::MediaItem;

/// Deterministic fingerprint over a collection's membership and versions.
/// Input order does not matter; items are hashed in id order.
pub fn collection_etag(items: &[MediaItem]) -> String {
    let mut pairs: Vec<(uuid::Uuid, i64)> = items
        .iter()
        .map(|item| (item.id, item.updated_at.timestamp_millis()))
        .collect();
    pairs.sort();

    let mut hasher = Sha256::new();
    for (id, version) in pairs {
        hasher.update(id.as_bytes());
        hasher.update(version.to_be_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::media_item::{MediaItem, MediaKind};

    fn item(n: u32) -> MediaItem {
        MediaItem {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("etag-{}", n).as_bytes()),
            title: None,
            kind: MediaKind::Movie,
            duration_seconds: 5400,
            release_date: None,
            season_number: None,
            episode_number: None,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_etag_ignores_input_order() {
        let forward = vec![item(1), item(2), item(3)];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(collection_etag(&forward), collection_etag(&reversed));
    }

    #[test]
    fn test_etag_changes_on_membership_change() {
        let two = vec![item(1), item(2)];
        let three = vec![item(1), item(2), item(3)];
        assert_ne!(collection_etag(&two), collection_etag(&three));
    }

    #[test]
    fn test_etag_changes_on_item_version_change() {
        let before = vec![item(1), item(2)];
        let mut after = before.clone();
        after[1].updated_at += Duration::seconds(1);
        assert_ne!(collection_etag(&before), collection_etag(&after));
    }

    #[test]
    fn test_empty_collection_has_a_stable_etag() {
        assert_eq!(collection_etag(&[]), collection_etag(&[]));
    }
}
