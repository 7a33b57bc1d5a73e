use crate::error::{FlowError, Result};
use crate::models::{parse_timestamp, RawWorkItem, StateTransition, WorkItem};
use crate::sources::WorkItemSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Work items cached as a JSON array on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalJsonSource {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemRecord {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "type")]
    item_type: String,
    category: String,
    date_created: String,
    state: String,
    #[serde(default)]
    state_transitions: Option<Vec<TransitionRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TransitionRecord {
    #[serde(default)]
    from: Option<String>,
    timestamp: String,
    to: String,
}

impl ItemRecord {
    fn into_raw(self) -> Result<RawWorkItem> {
        let state_transitions = self
            .state_transitions
            .unwrap_or_default()
            .into_iter()
            .map(|t| {
                Ok(StateTransition {
                    from_state: t.from,
                    to_state: t.to,
                    timestamp: parse_timestamp(&t.timestamp)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawWorkItem {
            id: self.id,
            title: self.title,
            state: self.state,
            item_type: self.item_type,
            category: self.category,
            date_created: parse_timestamp(&self.date_created)?,
            state_transitions,
        })
    }

    fn from_raw(raw: RawWorkItem) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            item_type: raw.item_type,
            category: raw.category,
            date_created: raw.date_created.to_rfc3339(),
            state: raw.state,
            state_transitions: Some(
                raw.state_transitions
                    .into_iter()
                    .map(|t| TransitionRecord {
                        from: t.from_state,
                        timestamp: t.timestamp.to_rfc3339(),
                        to: t.to_state,
                    })
                    .collect(),
            ),
        }
    }
}

impl LocalJsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `items` in the cache format, replacing any existing file
    pub fn save(path: impl AsRef<Path>, items: &[WorkItem]) -> Result<()> {
        let records: Vec<ItemRecord> = items
            .iter()
            .map(|item| ItemRecord::from_raw(item.to_raw()))
            .collect();
        fs::write(path.as_ref(), serde_json::to_vec_pretty(&records)?)?;

        tracing::info!(
            path = %path.as_ref().display(),
            items = records.len(),
            "Saved work items"
        );
        Ok(())
    }
}

impl WorkItemSource for LocalJsonSource {
    /// Malformed entries are logged and skipped; an unreadable file fails
    fn work_items(&self) -> Result<Vec<RawWorkItem>> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Cannot open work item file");
            FlowError::missing_config(format!("source.file {}", self.path.display()))
        })?;
        let entries: Vec<Value> = serde_json::from_str(&contents)?;
        let total = entries.len();

        let items: Vec<RawWorkItem> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                match serde_json::from_value::<ItemRecord>(entry)
                    .map_err(FlowError::from)
                    .and_then(ItemRecord::into_raw)
                {
                    Ok(raw) => Some(raw),
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Skipping malformed work item");
                        None
                    }
                }
            })
            .collect();

        tracing::info!(
            path = %self.path.display(),
            loaded = items.len(),
            skipped = total - items.len(),
            "Loaded work items"
        );
        Ok(items)
    }
}
