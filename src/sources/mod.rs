//! Work item sources
//!
//! Each adapter yields the normalized [`RawWorkItem`] shape; the metrics core
//! never branches on where items came from.

mod local;

pub use local::LocalJsonSource;

use crate::config::SourceConfig;
use crate::error::{FlowError, Result};
use crate::models::RawWorkItem;

/// Anything that can produce a batch of work items
pub trait WorkItemSource {
    fn work_items(&self) -> Result<Vec<RawWorkItem>>;
}

/// Adapter for the configured source
pub fn open(config: &SourceConfig) -> Result<Box<dyn WorkItemSource>> {
    match config.kind.as_str() {
        "local" => {
            let file = config
                .file
                .as_ref()
                .ok_or_else(|| FlowError::missing_config("source.file"))?;
            Ok(Box::new(LocalJsonSource::new(file)))
        }
        // Tracker adapters live outside this crate.
        "jira" | "fogbugz" | "trello" => Err(FlowError::UnsupportedSource(config.kind.clone())),
        other => Err(FlowError::Configuration(format!(
            "unknown source type '{}'",
            other
        ))),
    }
}
