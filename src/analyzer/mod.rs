//! Decision engine: which release type a trigger asks for, and which version results

pub mod label_analyzer;
pub mod next_version;

pub use label_analyzer::LabelAnalyzer;
pub use next_version::resolve_next_version;
