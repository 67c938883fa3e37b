use crate::pattern::Pattern;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

/// Per-document facts handed to the engine by the hosting pipeline.
///
/// `path` is the source file of the document being processed, when the host
/// knows it. Root-value functions and the exclude matcher consume this.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    pub path: Option<Utf8PathBuf>,
}

impl DocumentInput {
    pub fn anonymous() -> Self {
        Self { path: None }
    }

    pub fn from_path(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

/// Conversion divisor/multiplier, either fixed or derived per document.
///
/// A `PerDocument` function is evaluated once per document and the result is
/// cached for every declaration in that document.
#[derive(Clone)]
pub enum RootValue {
    Value(f64),
    PerDocument(Arc<dyn Fn(&DocumentInput) -> f64 + Send + Sync>),
}

impl RootValue {
    pub fn per_document(f: impl Fn(&DocumentInput) -> f64 + Send + Sync + 'static) -> Self {
        RootValue::PerDocument(Arc::new(f))
    }

    /// Resolves the root value for one document.
    pub fn resolve(&self, input: &DocumentInput) -> f64 {
        match self {
            RootValue::Value(v) => *v,
            RootValue::PerDocument(f) => f(input),
        }
    }
}

impl From<f64> for RootValue {
    fn from(value: f64) -> Self {
        RootValue::Value(value)
    }
}

impl fmt::Debug for RootValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            RootValue::PerDocument(_) => f.write_str("PerDocument(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for RootValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(RootValue::Value)
    }
}

/// File-exclusion rule set: either a pattern list or a host predicate.
#[derive(Clone)]
pub enum ExcludeSpec {
    Patterns(Vec<Pattern>),
    Predicate(Arc<dyn Fn(&Utf8Path) -> bool + Send + Sync>),
}

impl ExcludeSpec {
    pub fn predicate(f: impl Fn(&Utf8Path) -> bool + Send + Sync + 'static) -> Self {
        ExcludeSpec::Predicate(Arc::new(f))
    }
}

impl Default for ExcludeSpec {
    fn default() -> Self {
        ExcludeSpec::Patterns(Vec::new())
    }
}

impl fmt::Debug for ExcludeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExcludeSpec::Patterns(p) => f.debug_tuple("Patterns").field(p).finish(),
            ExcludeSpec::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for ExcludeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Pattern>::deserialize(deserializer).map(ExcludeSpec::Patterns)
    }
}

impl From<Vec<Pattern>> for ExcludeSpec {
    fn from(patterns: Vec<Pattern>) -> Self {
        ExcludeSpec::Patterns(patterns)
    }
}

/// Fully resolved engine configuration.
///
/// Presets own their defaults; the `Default` here carries the generic
/// px-to-rem baseline.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    pub prop_list: Vec<Pattern>,
    pub selector_black_list: Vec<Pattern>,
    pub exclude: ExcludeSpec,
    pub unit_precision: u32,
    pub min_value: f64,
    pub replace: bool,
    pub media_query: bool,
    pub root_value: RootValue,
    pub target_unit: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            prop_list: vec![Pattern::from("*")],
            selector_black_list: Vec::new(),
            exclude: ExcludeSpec::default(),
            unit_precision: 5,
            min_value: 0.0,
            replace: true,
            media_query: false,
            root_value: RootValue::Value(16.0),
            target_unit: "rem".to_string(),
        }
    }
}

/// Partial user configuration, layered over a preset's defaults.
///
/// Every field is optional; sequence-valued fields replace the default
/// sequence wholesale rather than being merged element-wise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteOptions {
    pub prop_list: Option<Vec<Pattern>>,
    pub selector_black_list: Option<Vec<Pattern>>,
    pub exclude: Option<ExcludeSpec>,
    pub unit_precision: Option<u32>,
    pub min_value: Option<f64>,
    pub replace: Option<bool>,
    pub media_query: Option<bool>,
    pub root_value: Option<RootValue>,
    pub target_unit: Option<String>,
}

impl RewriteOptions {
    /// Layers these options over `defaults`, producing an effective config.
    ///
    /// Neither input is mutated. An absent field takes the default; a present
    /// sequence field is taken verbatim (so `prop_list: ["color"]` over a
    /// default of `["*"]` yields `["color"]`, never a concatenation).
    pub fn merge_over(&self, defaults: &RewriteConfig) -> RewriteConfig {
        RewriteConfig {
            prop_list: self
                .prop_list
                .clone()
                .unwrap_or_else(|| defaults.prop_list.clone()),
            selector_black_list: self
                .selector_black_list
                .clone()
                .unwrap_or_else(|| defaults.selector_black_list.clone()),
            exclude: self
                .exclude
                .clone()
                .unwrap_or_else(|| defaults.exclude.clone()),
            unit_precision: self.unit_precision.unwrap_or(defaults.unit_precision),
            min_value: self.min_value.unwrap_or(defaults.min_value),
            replace: self.replace.unwrap_or(defaults.replace),
            media_query: self.media_query.unwrap_or(defaults.media_query),
            root_value: self
                .root_value
                .clone()
                .unwrap_or_else(|| defaults.root_value.clone()),
            target_unit: self
                .target_unit
                .clone()
                .unwrap_or_else(|| defaults.target_unit.clone()),
        }
    }
}
