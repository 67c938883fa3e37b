//! Scanner for `<number><unit>` occurrences in stylesheet value strings.
//!
//! The scanner compiles a single alternation where protected spans (quoted
//! strings, `url(...)`, `var(...)`) are listed before the numeric+unit
//! alternative. Alternation in the regex engine is leftmost-first, so a
//! numeric-looking substring inside a protected span surfaces as a protected
//! match and is never rewritten. See the excluding-alternation write-up at
//! <http://www.rexegg.com/regex-best-trick.html>.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Default numeric literal shape: `5`, `5.5`, `.5`. A trailing dot with no
/// following digit (`5.`) is not numeric.
pub const DEFAULT_NUMBER_PATTERN: &str = r"\d+(?:\.\d+)?|\.\d+";

/// Errors surfaced while building a [`UnitScanner`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("unit list is empty")]
    EmptyUnits,

    #[error("invalid number pattern `{pattern}`")]
    InvalidNumberPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

/// Options controlling how the scanning rule is built.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Overrides [`DEFAULT_NUMBER_PATTERN`]. Must not contain capture groups.
    pub number_pattern: Option<String>,
    pub skip_double_quoted: bool,
    pub skip_single_quoted: bool,
    pub skip_url: bool,
    pub skip_var: bool,
    /// Off by default: `40PX` is not `px` unless the caller opts in.
    pub case_insensitive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            number_pattern: None,
            skip_double_quoted: true,
            skip_single_quoted: true,
            skip_url: true,
            skip_var: true,
            case_insensitive: false,
        }
    }
}

/// One occurrence reported by [`UnitScanner::find_all`].
///
/// A match without a numeric capture is a protected span and must be passed
/// through unchanged by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMatch<'t> {
    text: &'t str,
    number: Option<&'t str>,
}

impl<'t> ScanMatch<'t> {
    /// The full matched text, unit included for numeric matches.
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// The numeric literal, absent for protected spans.
    pub fn number(&self) -> Option<&'t str> {
        self.number
    }

    pub fn is_protected(&self) -> bool {
        self.number.is_none()
    }
}

/// Compiled scanning rule for a fixed set of source units.
///
/// Stateless after construction; cheap to share across documents.
#[derive(Debug, Clone)]
pub struct UnitScanner {
    regex: Regex,
    units: Vec<String>,
    case_insensitive: bool,
}

impl UnitScanner {
    /// Builds a scanner for `units` with default options.
    pub fn for_units<S: AsRef<str>>(units: &[S]) -> Result<Self, ScanError> {
        Self::new(units, &ScanOptions::default())
    }

    pub fn new<S: AsRef<str>>(units: &[S], options: &ScanOptions) -> Result<Self, ScanError> {
        if units.is_empty() {
            return Err(ScanError::EmptyUnits);
        }

        let mut parts: Vec<String> = Vec::new();
        if options.skip_double_quoted {
            parts.push(r#""[^"]+""#.to_string());
        }
        if options.skip_single_quoted {
            parts.push(r"'[^']+'".to_string());
        }
        if options.skip_url {
            parts.push(r"url\([^)]+\)".to_string());
        }
        if options.skip_var {
            parts.push(r"var\([^)]+\)".to_string());
        }

        // Longest unit first, so a unit that is a textual prefix of another
        // (`px` vs `pxx`) cannot shadow the longer alternative.
        let mut units: Vec<String> = units.iter().map(|u| u.as_ref().to_string()).collect();
        units.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        units.dedup();

        let unit_part = units
            .iter()
            .map(|u| regex::escape(u))
            .collect::<Vec<_>>()
            .join("|");

        let number_pattern = options
            .number_pattern
            .as_deref()
            .unwrap_or(DEFAULT_NUMBER_PATTERN);
        parts.push(format!("({number_pattern})(?:{unit_part})"));

        let pattern = parts.join("|");
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|source| ScanError::InvalidNumberPattern {
                pattern: number_pattern.to_string(),
                source: Box::new(source),
            })?;

        Ok(Self {
            regex,
            units,
            case_insensitive: options.case_insensitive,
        })
    }

    /// The units this scanner targets, longest first.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Cheap substring pre-check: can `value` contain any target unit at all?
    ///
    /// False positives are fine (a full scan follows); false negatives are
    /// not, so the check honors case-insensitivity.
    pub fn probably_contains(&self, value: &str) -> bool {
        if self.case_insensitive {
            let lowered = value.to_ascii_lowercase();
            self.units
                .iter()
                .any(|u| lowered.contains(&u.to_ascii_lowercase()))
        } else {
            self.units.iter().any(|u| value.contains(u.as_str()))
        }
    }

    /// All occurrences in `value`, protected spans included, left to right.
    pub fn find_all<'s, 't>(&'s self, value: &'t str) -> impl Iterator<Item = ScanMatch<'t>> + 's
    where
        't: 's,
    {
        self.regex.captures_iter(value).map(|caps| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            ScanMatch {
                text: whole,
                number: caps.get(1).map(|m| m.as_str()),
            }
        })
    }

    /// Rewrites every occurrence through `replacer`. Protected spans reach the
    /// replacer too (with `number() == None`) so it can pass them through.
    pub fn replace_all(&self, value: &str, mut replacer: impl FnMut(&ScanMatch<'_>) -> String) -> String {
        self.regex
            .replace_all(value, |caps: &regex::Captures<'_>| {
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                let m = ScanMatch {
                    text: whole,
                    number: caps.get(1).map(|m| m.as_str()),
                };
                replacer(&m)
            })
            .into_owned()
    }
}
