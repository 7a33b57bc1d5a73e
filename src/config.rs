use crate::analytics::{ReportSpec, StateOrder};
use crate::error::{FlowError, Result};
use crate::models::{cycle_set_from_specs, CycleDefinition, CycleSet, CycleSpec, TypeGroupings};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Flow metrics configuration as written by the user.
///
/// Required keys are optional here so that their absence surfaces as a
/// [`FlowError::MissingConfigItem`] naming the key rather than a generic
/// deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Where work items come from
    #[serde(default)]
    pub source: Option<SourceConfig>,

    /// Category name → tracker query
    #[serde(default)]
    pub categories: Option<BTreeMap<String, String>>,

    /// Cycle name → boundary or set definition
    #[serde(default)]
    pub cycles: Option<BTreeMap<String, CycleSpec>>,

    /// Type grouping name → type labels
    #[serde(default)]
    pub types: Option<BTreeMap<String, Vec<String>>>,

    /// States in which an item counts as done
    #[serde(default)]
    pub counts_towards_throughput: Option<OneOrMany>,

    /// Canonical workflow order for cumulative flow
    #[serde(default)]
    pub states: Vec<String>,

    #[serde(default = "default_initial_state")]
    pub initial_state: String,

    /// Fixed reporting end date; defaults to today
    #[serde(default)]
    pub until_date: Option<NaiveDate>,

    /// Reports produced by `flow-metrics report`
    #[serde(default)]
    pub reports: Vec<ReportSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Adapter name: `local`, `jira`, `fogbugz` or `trello`
    #[serde(rename = "type")]
    pub kind: String,

    /// Cache file for the `local` adapter
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// A single value or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_set(&self) -> BTreeSet<String> {
        match self {
            OneOrMany::One(value) => BTreeSet::from([value.clone()]),
            OneOrMany::Many(values) => values.iter().cloned().collect(),
        }
    }
}

/// Sections keyed by user-chosen names. The `config` builder lowercases
/// every key, so these are read straight from the file to keep their case.
#[derive(Debug, Default, Deserialize)]
struct NamedSections {
    #[serde(default)]
    categories: Option<BTreeMap<String, String>>,
    #[serde(default)]
    cycles: Option<BTreeMap<String, CycleSpec>>,
    #[serde(default)]
    types: Option<BTreeMap<String, Vec<String>>>,
}

impl NamedSections {
    fn parse(contents: &str, format: config::FileFormat) -> Result<Self> {
        match format {
            config::FileFormat::Json => Ok(serde_json::from_str(contents)?),
            _ => toml::from_str(contents).map_err(|e| FlowError::Configuration(e.to_string())),
        }
    }
}

impl MetricsConfig {
    /// Load from a TOML or JSON file, overridden by `FLOW_METRICS__*`
    /// environment variables
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FlowError::missing_config(format!(
                "config file {}",
                path.display()
            )));
        }

        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => config::FileFormat::Json,
            _ => config::FileFormat::Toml,
        };
        let contents = std::fs::read_to_string(path)?;

        let mut config: Self = config::Config::builder()
            .add_source(config::File::from_str(&contents, format))
            .add_source(
                config::Environment::with_prefix("FLOW_METRICS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.restore_named_sections(NamedSections::parse(&contents, format)?);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Self::from_str_with_format(contents, config::FileFormat::Toml)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Self::from_str_with_format(contents, config::FileFormat::Json)
    }

    fn from_str_with_format(contents: &str, format: config::FileFormat) -> Result<Self> {
        let mut config: Self = config::Config::builder()
            .add_source(config::File::from_str(contents, format))
            .build()?
            .try_deserialize()?;
        config.restore_named_sections(NamedSections::parse(contents, format)?);
        Ok(config)
    }

    fn restore_named_sections(&mut self, sections: NamedSections) {
        if sections.categories.is_some() {
            self.categories = sections.categories;
        }
        if sections.cycles.is_some() {
            self.cycles = sections.cycles;
        }
        if sections.types.is_some() {
            self.types = sections.types;
        }
    }

    pub fn source(&self) -> Result<&SourceConfig> {
        self.source
            .as_ref()
            .ok_or_else(|| FlowError::missing_config("source"))
    }

    pub fn categories(&self) -> Result<&BTreeMap<String, String>> {
        self.categories
            .as_ref()
            .ok_or_else(|| FlowError::missing_config("categories"))
    }

    /// Validated cycle definitions, failing on the first malformed one
    pub fn cycle_definitions(&self) -> Result<CycleSet> {
        let specs = self
            .cycles
            .as_ref()
            .ok_or_else(|| FlowError::missing_config("cycles"))?;
        cycle_set_from_specs(specs)
    }

    pub fn type_groupings(&self) -> Result<TypeGroupings> {
        self.types
            .as_ref()
            .map(TypeGroupings::from_map)
            .ok_or_else(|| FlowError::missing_config("types"))
    }

    pub fn counting_states(&self) -> Result<BTreeSet<String>> {
        self.counts_towards_throughput
            .as_ref()
            .map(OneOrMany::to_set)
            .ok_or_else(|| FlowError::missing_config("counts_towards_throughput"))
    }

    /// Everything the metrics core needs, checked up front
    pub fn settings(&self) -> Result<FlowSettings> {
        self.categories()?;
        Ok(FlowSettings {
            cycles: self.cycle_definitions()?,
            groupings: self.type_groupings()?,
            counting_states: self.counting_states()?,
            state_order: StateOrder::new(self.states.iter().cloned()),
            initial_state: self.initial_state.clone(),
        })
    }

    /// Fail fast on any missing or malformed key, including those of the
    /// report plan
    pub fn validate(&self) -> Result<()> {
        self.source()?;
        let settings = self.settings()?;
        for report in &self.reports {
            report.validate(&settings)?;
        }
        Ok(())
    }
}

/// Validated settings threaded through the metrics core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub cycles: CycleSet,
    pub groupings: TypeGroupings,
    pub counting_states: BTreeSet<String>,
    pub state_order: StateOrder,
    pub initial_state: String,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            cycles: CycleSet::new(),
            groupings: TypeGroupings::new(),
            counting_states: BTreeSet::new(),
            state_order: StateOrder::default(),
            initial_state: default_initial_state(),
        }
    }
}

impl FlowSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cycle(mut self, name: &str, definition: CycleDefinition) -> Self {
        self.cycles.insert(name.to_string(), definition);
        self
    }

    pub fn with_type_grouping<I, S>(mut self, name: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.groupings = self.groupings.with_group(name, labels);
        self
    }

    pub fn with_counting_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.counting_states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_state_order<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state_order = StateOrder::new(states);
        self
    }

    pub fn with_initial_state(mut self, state: &str) -> Self {
        self.initial_state = state.to_string();
        self
    }
}

fn default_initial_state() -> String {
    "Open".to_string()
}
