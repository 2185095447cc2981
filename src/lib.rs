pub mod core;
pub mod export;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod reconcile;
pub mod report;

pub use crate::core::config::RosterConfig;
pub use crate::core::model::{PlayerRecord, RawLine, Report};
pub use pipeline::RosterPipeline;
