pub mod pipeline;

pub use pipeline::{MovieAnalysis, MovieAnalyzer, TriggerFailure};
