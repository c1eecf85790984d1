pub mod entity;

pub use entity::{
    BuildResult, Deco, DecoMode, DecoTemplateItem, FillerKind, Playout, PlayoutHistory, PlayoutItem,
    PlayoutReferenceData,
};
