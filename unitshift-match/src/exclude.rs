use crate::matches_any;
use camino::Utf8Path;
use unitshift_types::ExcludeSpec;

/// File-path exclusion matcher.
///
/// An absent path never matches, regardless of the spec: a document the host
/// cannot attribute to a file is processed normally.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    spec: ExcludeSpec,
}

impl ExcludeMatcher {
    pub fn new(spec: ExcludeSpec) -> Self {
        Self { spec }
    }

    pub fn matches(&self, path: Option<&Utf8Path>) -> bool {
        let Some(path) = path else {
            return false;
        };
        match &self.spec {
            ExcludeSpec::Patterns(patterns) => matches_any(patterns, path.as_str()),
            ExcludeSpec::Predicate(pred) => pred(path),
        }
    }
}
