use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single rule in a prop list, selector blacklist, or exclude list.
///
/// `Exact` patterns use substring semantics everywhere except the prop-list
/// matcher, which additionally interprets the glob dialect (`*`, `x*`, `*x`,
/// `*x*`, and `!`-negated forms). `Regex` patterns test the whole candidate
/// with `is_match`.
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Regex(Regex),
}

impl Pattern {
    /// Compiles a regex pattern.
    pub fn regex(source: &str) -> Result<Self, regex::Error> {
        Ok(Pattern::Regex(Regex::new(source)?))
    }

    /// Does this pattern match `candidate`?
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Pattern::Exact(s) => candidate.contains(s.as_str()),
            Pattern::Regex(re) => re.is_match(candidate),
        }
    }

    /// The literal text of an `Exact` pattern, if this is one.
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            Pattern::Exact(s) => Some(s.as_str()),
            Pattern::Regex(_) => None,
        }
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::Exact(value.to_string())
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Pattern::Exact(value)
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Pattern::Regex(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Exact(a), Pattern::Exact(b)) => a == b,
            (Pattern::Regex(a), Pattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Wire form: a bare string is an exact pattern, `{"regex": "..."}` compiles
/// to a regex pattern.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PatternRepr {
    Exact(String),
    Regex { regex: String },
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Pattern::Exact(s) => PatternRepr::Exact(s.clone()),
            Pattern::Regex(re) => PatternRepr::Regex {
                regex: re.as_str().to_string(),
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PatternRepr::deserialize(deserializer)? {
            PatternRepr::Exact(s) => Ok(Pattern::Exact(s)),
            PatternRepr::Regex { regex } => Pattern::regex(&regex).map_err(D::Error::custom),
        }
    }
}
