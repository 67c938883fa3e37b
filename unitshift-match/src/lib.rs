//! Pattern matching for the unitshift engine.
//!
//! Three matchers share one primitive (`matches_any`): the prop-list matcher
//! with its glob dialect, the selector blacklist, and the file exclude list.
//! All are built once from a resolved config and reused for every declaration
//! in a run.

mod exclude;
mod prop_list;
mod selector;

pub use exclude::ExcludeMatcher;
pub use prop_list::PropListMatcher;
pub use selector::SelectorBlacklist;

use unitshift_types::Pattern;

/// True iff any pattern matches `candidate`. An empty list matches nothing.
pub fn matches_any(patterns: &[Pattern], candidate: &str) -> bool {
    patterns.iter().any(|p| p.matches(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_list_matches_nothing() {
        assert!(!matches_any(&[], "anything"));
    }

    #[test]
    fn any_single_match_is_enough() {
        let patterns = vec![
            Pattern::from(".keep"),
            Pattern::regex("^body$").unwrap(),
        ];
        assert!(matches_any(&patterns, "body"));
        assert!(matches_any(&patterns, "main .keep-me"));
        assert!(!matches_any(&patterns, "body .child"));
    }
}
