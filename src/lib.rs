pub mod analyzer;
pub mod backend;
pub mod cascade;
pub mod error;
pub mod protocol;
pub mod snapshot;
pub mod tree;

pub use analyzer::{
    analyze_page, FontSizeAnalysis, NodeFontData, LEGIBLE_FONT_SIZE_PX, MAX_NODES_TO_ANALYZE,
};
pub use backend::{StyleBackend, StyleSheetWatch};
pub use cascade::{compute_specificity, resolve_governing_rule, SourceRule};
pub use error::{Error, Result, SnapshotError};
