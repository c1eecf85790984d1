pub mod entity;
pub mod invariants;

pub use entity::{DateRange, PlayoutTemplate, Template, TemplateItem};
pub use invariants::validate_playout_template;
