use crate::error::{FlowError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Named groups of work item types, e.g. `failure = ["Defect"]`.
///
/// Labels are compared trimmed and lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeGroupings {
    groups: BTreeMap<String, BTreeSet<String>>,
}

pub(crate) fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

impl TypeGroupings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(groups: &BTreeMap<String, Vec<String>>) -> Self {
        groups
            .iter()
            .fold(Self::new(), |acc, (name, labels)| acc.with_group(name, labels))
    }

    pub fn with_group<I, S>(mut self, name: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.groups.insert(
            name.to_string(),
            labels.into_iter().map(|l| normalize_label(l.as_ref())).collect(),
        );
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, grouping: &str) -> bool {
        self.groups.contains_key(grouping)
    }

    /// Whether `item_type` belongs to `grouping`
    pub fn matches(&self, grouping: &str, item_type: &str) -> Result<bool> {
        let labels = self
            .groups
            .get(grouping)
            .ok_or_else(|| FlowError::UnknownTypeGrouping(grouping.to_string()))?;
        Ok(labels.contains(&normalize_label(item_type)))
    }

    /// First of `groupings` that `item_type` belongs to
    pub fn first_match<'a>(
        &self,
        groupings: &'a [String],
        item_type: &str,
    ) -> Result<Option<&'a str>> {
        for grouping in groupings {
            if self.matches(grouping, item_type)? {
                return Ok(Some(grouping.as_str()));
            }
        }
        Ok(None)
    }

    /// Fail fast when a report names a grouping we do not know
    pub fn check(&self, groupings: &[String]) -> Result<()> {
        match groupings.iter().find(|g| !self.contains(g)) {
            Some(unknown) => Err(FlowError::UnknownTypeGrouping(unknown.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groupings() -> TypeGroupings {
        TypeGroupings::new()
            .with_group("value", ["Data Request", "Improve Feature"])
            .with_group("failure", ["Defect"])
            .with_group("overhead", ["Task", "Infrastructure"])
    }

    #[test]
    fn test_matching_is_normalized() {
        let groupings = groupings();
        assert!(groupings.matches("failure", "  defect ").unwrap());
        assert!(groupings.matches("value", "DATA REQUEST").unwrap());
        assert!(!groupings.matches("value", "Defect").unwrap());
    }

    #[test]
    fn test_first_match_wins() {
        let groupings = groupings().with_group("everything", ["Defect", "Task"]);
        let order = vec!["everything".to_string(), "failure".to_string()];
        assert_eq!(groupings.first_match(&order, "Defect").unwrap(), Some("everything"));

        let order = vec!["value".to_string()];
        assert_eq!(groupings.first_match(&order, "Defect").unwrap(), None);
    }

    #[test]
    fn test_unknown_grouping_is_reported() {
        let err = groupings().matches("features", "Story").unwrap_err();
        assert!(matches!(err, FlowError::UnknownTypeGrouping(ref g) if g == "features"));
        assert!(groupings().check(&["failure".to_string(), "nope".to_string()]).is_err());
    }
}
