use unitshift_types::Pattern;

/// Property-name matcher over the glob dialect.
///
/// Exact-string patterns are classified into eight lexical buckets when the
/// matcher is built, so testing a property against a list is a handful of
/// string comparisons rather than a per-declaration parse:
///
/// - `margin` exact, `*margin*` contains, `margin*` starts-with,
///   `*margin` ends-with, and the four `!`-negated counterparts.
/// - A lone `*` with no other patterns matches every property.
/// - Negation always wins over inclusion.
///
/// Regex patterns participate as inclusion rules.
#[derive(Debug, Clone)]
pub struct PropListMatcher {
    match_all: bool,
    has_wild: bool,
    exact: Vec<String>,
    contain: Vec<String>,
    start_with: Vec<String>,
    end_with: Vec<String>,
    not_exact: Vec<String>,
    not_contain: Vec<String>,
    not_start_with: Vec<String>,
    not_end_with: Vec<String>,
    regexes: Vec<regex::Regex>,
}

impl PropListMatcher {
    pub fn new(prop_list: &[Pattern]) -> Self {
        let tokens: Vec<&str> = prop_list.iter().filter_map(Pattern::as_exact).collect();
        let has_wild = tokens.iter().any(|t| *t == "*");

        let regexes = prop_list
            .iter()
            .filter_map(|p| match p {
                Pattern::Regex(re) => Some(re.clone()),
                Pattern::Exact(_) => None,
            })
            .collect::<Vec<_>>();

        Self {
            match_all: has_wild && prop_list.len() == 1,
            has_wild,
            exact: collect(&tokens, is_exact, |t| t.to_string()),
            contain: collect(&tokens, is_contain, |t| t[1..t.len() - 1].to_string()),
            start_with: collect(&tokens, is_start_with, |t| t[..t.len() - 1].to_string()),
            end_with: collect(&tokens, is_end_with, |t| t[1..].to_string()),
            not_exact: collect(&tokens, is_not_exact, |t| t[1..].to_string()),
            not_contain: collect(&tokens, is_not_contain, |t| t[2..t.len() - 1].to_string()),
            not_start_with: collect(&tokens, is_not_start_with, |t| {
                t[1..t.len() - 1].to_string()
            }),
            not_end_with: collect(&tokens, is_not_end_with, |t| t[2..].to_string()),
            regexes,
        }
    }

    pub fn matches(&self, prop: &str) -> bool {
        if self.match_all {
            return true;
        }

        let include = self.has_wild
            || self.exact.iter().any(|m| m == prop)
            || self.contain.iter().any(|m| prop.contains(m.as_str()))
            || self.start_with.iter().any(|m| prop.starts_with(m.as_str()))
            || self.end_with.iter().any(|m| prop.ends_with(m.as_str()))
            || self.regexes.iter().any(|re| re.is_match(prop));

        let exclude = self.not_exact.iter().any(|m| m == prop)
            || self.not_contain.iter().any(|m| prop.contains(m.as_str()))
            || self
                .not_start_with
                .iter()
                .any(|m| prop.starts_with(m.as_str()))
            || self.not_end_with.iter().any(|m| prop.ends_with(m.as_str()));

        include && !exclude
    }
}

fn collect(tokens: &[&str], pred: fn(&str) -> bool, strip: fn(&str) -> String) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| pred(t))
        .map(|t| strip(t))
        .collect()
}

// Bucket predicates mirror the lexical shapes of the dialect. They are not
// mutually exclusive for degenerate tokens like `!margin*`, which lands in
// both not-exact and not-starts-with; property names never contain `*`, so
// the extra not-exact entry can never fire.

fn is_exact(t: &str) -> bool {
    !t.is_empty() && !t.contains('*') && !t.contains('!')
}

fn is_contain(t: &str) -> bool {
    t.len() >= 3 && t.starts_with('*') && t.ends_with('*')
}

fn is_start_with(t: &str) -> bool {
    t.len() >= 2 && t.ends_with('*') && is_exact(&t[..t.len() - 1])
}

fn is_end_with(t: &str) -> bool {
    t.len() >= 2 && t.starts_with('*') && !t[1..].contains('*')
}

fn is_not_exact(t: &str) -> bool {
    t.len() >= 2 && t.starts_with('!') && !t[1..].starts_with('*')
}

fn is_not_contain(t: &str) -> bool {
    t.len() >= 4 && t.starts_with("!*") && t.ends_with('*')
}

fn is_not_start_with(t: &str) -> bool {
    t.len() >= 3 && t.starts_with('!') && t.ends_with('*') && !t[1..t.len() - 1].contains('*')
}

fn is_not_end_with(t: &str) -> bool {
    t.len() >= 3 && t.starts_with("!*") && !t[2..].contains('*')
}
