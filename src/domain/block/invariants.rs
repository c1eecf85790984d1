// src/domain/block/invariants.rs

use super::entity::Block;
use crate::domain::{DomainError, DomainResult};

/// Validates all Block invariants
pub fn validate_block(block: &Block) -> DomainResult<()> {
    validate_duration(block)?;
    validate_item_indexes(block)?;
    Ok(())
}

/// A block must claim a positive wall-clock span; a zero-minute block can
/// never schedule anything and would produce zero-length occurrences.
fn validate_duration(block: &Block) -> DomainResult<()> {
    if block.duration_minutes == 0 {
        return Err(DomainError::NonPositiveBlockDuration {
            minutes: block.duration_minutes,
        });
    }
    Ok(())
}

/// Item indexes define the scheduling order and must be unique within the
/// block; duplicates would make the walk order ambiguous.
fn validate_item_indexes(block: &Block) -> DomainResult<()> {
    let mut seen = std::collections::HashSet::new();
    for item in &block.items {
        if !seen.insert(item.index) {
            return Err(DomainError::DuplicateBlockItemIndex { index: item.index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::{BlockItem, PlaybackOrder};
    use crate::domain::keys::CollectionKey;
    use uuid::Uuid;

    #[test]
    fn test_valid_block() {
        let mut block = Block::new("Morning Cartoons", 30);
        block.items.push(BlockItem::new(
            block.id,
            1,
            CollectionKey::Collection(Uuid::new_v4()),
            PlaybackOrder::Chronological,
        ));
        assert!(validate_block(&block).is_ok());
    }

    #[test]
    fn test_zero_duration_fails() {
        let block = Block::new("Empty", 0);
        assert!(validate_block(&block).is_err());
    }

    #[test]
    fn test_duplicate_index_fails() {
        let mut block = Block::new("Morning Cartoons", 30);
        let collection = CollectionKey::Collection(Uuid::new_v4());
        block
            .items
            .push(BlockItem::new(block.id, 1, collection, PlaybackOrder::Shuffle));
        block
            .items
            .push(BlockItem::new(block.id, 1, collection, PlaybackOrder::Shuffle));
        assert!(validate_block(&block).is_err());
    }
}
