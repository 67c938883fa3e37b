use crate::context::RewriteContext;
use crate::decl::{declaration_exists, DeclarationView};
use tracing::debug;
use unitshift_match::{ExcludeMatcher, PropListMatcher, SelectorBlacklist};
use unitshift_rewrite::{preserve_unit, ConversionRule, UnitReplacer};
use unitshift_scan::{ScanError, ScanMatch, ScanOptions, UnitScanner};
use unitshift_types::{DocumentInput, RewriteConfig, RootValue};

/// Replacer for one document, with the resolved root value baked in.
pub type DocumentReplacer = Box<dyn Fn(&ScanMatch<'_>) -> String + Send + Sync>;

/// Builds a per-document replacer from the document's resolved root value.
///
/// Presets with per-occurrence special cases (marker units, one-px opt-out)
/// supply their own implementation; everything else uses
/// [`StandardReplacerFactory`].
pub trait ReplacerFactory: Send + Sync {
    fn for_document(&self, root_value: f64) -> DocumentReplacer;
}

/// The default factory: convert, round, cut off below the minimum, render
/// zero unitless.
#[derive(Debug, Clone)]
pub struct StandardReplacerFactory {
    pub rule: ConversionRule,
    pub unit_precision: u32,
    pub min_value: f64,
    pub target_unit: String,
}

impl ReplacerFactory for StandardReplacerFactory {
    fn for_document(&self, root_value: f64) -> DocumentReplacer {
        let replacer = UnitReplacer::new(
            self.rule.resolve(root_value),
            self.unit_precision,
            self.min_value,
            self.target_unit.clone(),
        );
        Box::new(move |m| replacer.replace(m.text(), m.number()))
    }
}

/// What a blacklisted selector means. The two behaviors are mutually
/// exclusive policies chosen by the preset, never inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistPolicy {
    /// Leave blacklisted declarations untouched.
    Skip,
    /// Rewrite blacklisted declarations to a platform-reserved unit,
    /// preserving the magnitude.
    PreserveUnit(String),
}

/// Why a declaration was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DocumentDisabled,
    FileExcluded,
    NoSourceUnit,
    AlreadyProcessed,
    PropListMiss,
    SelectorBlacklisted,
    NoChange,
    DuplicateSibling,
}

/// How the host should apply a rewritten value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Mutate the declaration's value in place.
    Replace,
    /// Append a sibling declaration carrying the new value immediately after
    /// this one, keeping the original as a fallback.
    CloneAfter,
}

/// Terminal state for one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationOutcome {
    Skip(SkipReason),
    Rewritten { value: String, mode: ApplyMode },
}

impl DeclarationOutcome {
    pub fn should_rewrite(&self) -> bool {
        matches!(self, DeclarationOutcome::Rewritten { .. })
    }

    pub fn new_value(&self) -> Option<&str> {
        match self {
            DeclarationOutcome::Rewritten { value, .. } => Some(value),
            DeclarationOutcome::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            DeclarationOutcome::Skip(reason) => Some(*reason),
            DeclarationOutcome::Rewritten { .. } => None,
        }
    }
}

/// Decides, for one `(property, value, selector)` triple, whether and how to
/// rewrite. Stateless across documents; all per-document state lives in the
/// [`RewriteContext`] it hands out.
pub struct DeclarationPolicy {
    scanner: UnitScanner,
    prop_list: PropListMatcher,
    blacklist: SelectorBlacklist,
    exclude: ExcludeMatcher,
    blacklist_policy: BlacklistPolicy,
    replace: bool,
    media_query: bool,
    root_value: RootValue,
    factory: Box<dyn ReplacerFactory>,
}

impl DeclarationPolicy {
    /// Builds a policy from a resolved config, scanning for `units` and
    /// converting along `rule`, with default scan options.
    pub fn new<S: AsRef<str>>(
        config: &RewriteConfig,
        units: &[S],
        rule: ConversionRule,
    ) -> Result<Self, ScanError> {
        let scanner = UnitScanner::new(units, &ScanOptions::default())?;
        Ok(Self::with_scanner(config, scanner, rule))
    }

    /// As [`new`](Self::new), but with a caller-built scanner (custom number
    /// pattern, case-insensitive units, `var()` scanning).
    pub fn with_scanner(config: &RewriteConfig, scanner: UnitScanner, rule: ConversionRule) -> Self {
        let factory = StandardReplacerFactory {
            rule,
            unit_precision: config.unit_precision,
            min_value: config.min_value,
            target_unit: config.target_unit.clone(),
        };
        Self::with_factory(config, scanner, Box::new(factory))
    }

    /// Full-control constructor for presets with their own replacer factory.
    pub fn with_factory(
        config: &RewriteConfig,
        scanner: UnitScanner,
        factory: Box<dyn ReplacerFactory>,
    ) -> Self {
        Self {
            scanner,
            prop_list: PropListMatcher::new(&config.prop_list),
            blacklist: SelectorBlacklist::new(config.selector_black_list.clone()),
            exclude: ExcludeMatcher::new(config.exclude.clone()),
            blacklist_policy: BlacklistPolicy::Skip,
            replace: config.replace,
            media_query: config.media_query,
            root_value: config.root_value.clone(),
            factory,
        }
    }

    pub fn with_blacklist_policy(mut self, policy: BlacklistPolicy) -> Self {
        self.blacklist_policy = policy;
        self
    }

    pub fn scanner(&self) -> &UnitScanner {
        &self.scanner
    }

    /// Opens a fresh per-document context: resolves the root value once,
    /// decides the file-exclusion verdict, and builds the document replacer.
    pub fn begin_document(&self, input: DocumentInput) -> RewriteContext {
        let excluded = self.exclude.matches(input.path.as_deref());
        let root_value = self.root_value.resolve(&input);
        if excluded {
            debug!(path = ?input.path, "document excluded by file path");
        }
        let replacer = self.factory.for_document(root_value);
        RewriteContext::new(input, excluded, root_value, replacer)
    }

    /// Runs the per-declaration state machine.
    pub fn evaluate(
        &self,
        ctx: &mut RewriteContext,
        decl: &DeclarationView<'_>,
    ) -> DeclarationOutcome {
        use DeclarationOutcome::Skip;

        if ctx.is_disabled() {
            return Skip(SkipReason::DocumentDisabled);
        }
        if ctx.is_excluded() {
            return Skip(SkipReason::FileExcluded);
        }
        if !ctx.processed.insert(decl.id) {
            return Skip(SkipReason::AlreadyProcessed);
        }
        if !self.scanner.probably_contains(decl.value) {
            return Skip(SkipReason::NoSourceUnit);
        }
        if !self.prop_list.matches(decl.prop) {
            debug!(prop = decl.prop, "prop list miss");
            return Skip(SkipReason::PropListMiss);
        }

        let blacklisted = self.is_blacklisted(ctx, decl);
        let preserve = match (blacklisted, &self.blacklist_policy) {
            (false, _) => None,
            (true, BlacklistPolicy::Skip) => {
                debug!(selector = ?decl.selector, "selector blacklisted");
                return Skip(SkipReason::SelectorBlacklisted);
            }
            (true, BlacklistPolicy::PreserveUnit(unit)) => Some(unit.as_str()),
        };

        let new_value = match preserve {
            Some(unit) => self
                .scanner
                .replace_all(decl.value, |m| preserve_unit(m.text(), m.number(), unit)),
            None => self.scanner.replace_all(decl.value, |m| (ctx.replacer)(m)),
        };

        if new_value == decl.value {
            return Skip(SkipReason::NoChange);
        }
        if declaration_exists(decl.siblings, decl.prop, &new_value) {
            return Skip(SkipReason::DuplicateSibling);
        }

        debug!(prop = decl.prop, from = decl.value, to = %new_value, "rewrite");
        DeclarationOutcome::Rewritten {
            value: new_value,
            mode: if self.replace {
                ApplyMode::Replace
            } else {
                ApplyMode::CloneAfter
            },
        }
    }

    /// Rewrites `@media` parameter strings when the config opts in.
    /// Returns `None` when nothing should change.
    pub fn rewrite_media_params(&self, ctx: &RewriteContext, params: &str) -> Option<String> {
        if !self.media_query || ctx.is_disabled() || ctx.is_excluded() {
            return None;
        }
        if !self.scanner.probably_contains(params) {
            return None;
        }
        let rewritten = self.scanner.replace_all(params, |m| (ctx.replacer)(m));
        (rewritten != params).then_some(rewritten)
    }

    fn is_blacklisted(&self, ctx: &mut RewriteContext, decl: &DeclarationView<'_>) -> bool {
        if self.blacklist.is_empty() {
            return false;
        }
        let Some(selector) = decl.selector else {
            // No selector context at all: the blacklist is not applicable,
            // which is distinct from "not blacklisted" but rewrites equally.
            return false;
        };
        match decl.rule {
            Some(rule) => *ctx
                .blacklist_cache
                .entry(rule)
                .or_insert_with(|| self.blacklist.matches(Some(selector)).unwrap_or(false)),
            None => self.blacklist.matches(Some(selector)).unwrap_or(false),
        }
    }
}
