use crate::matches_any;
use unitshift_types::Pattern;

/// Selector blacklist with a tri-state result.
///
/// `matches` returns `None` when the caller has no selector context at all
/// (a declaration outside any rule), which is distinct from "the selector is
/// not blacklisted". Policy code branches on that difference.
#[derive(Debug, Clone, Default)]
pub struct SelectorBlacklist {
    patterns: Vec<Pattern>,
}

impl SelectorBlacklist {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, selector: Option<&str>) -> Option<bool> {
        let selector = selector?;
        Some(matches_any(&self.patterns, selector))
    }
}
