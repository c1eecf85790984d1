pub mod entity;
pub mod invariants;

pub use entity::{Block, BlockItem, BlockStopScheduling, PlaybackOrder};
pub use invariants::validate_block;
