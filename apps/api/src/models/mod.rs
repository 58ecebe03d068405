pub mod insight;
pub mod resume;

pub use insight::{AnalysisResponse, Source};
