//! Mode-specific version selectors

mod generation;
mod pattern;

pub use generation::GenerationVersionSelector;
pub use pattern::PatternVersionSelector;
