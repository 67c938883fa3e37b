use crate::decl::{DeclarationId, RuleId};
use crate::policy::DocumentReplacer;
use std::collections::{HashMap, HashSet};
use unitshift_types::DocumentInput;

/// Per-document state, created by
/// [`DeclarationPolicy::begin_document`](crate::DeclarationPolicy::begin_document)
/// and discarded when the document's declarations have all been processed.
///
/// Holds everything that must not leak across documents: the resolved root
/// value (a root-value function runs once per document), the explicit
/// document-disabled flag, the processed-declaration set, and the
/// selector-blacklist memo keyed by rule identity. Never share a context
/// between documents or concurrent runs; build a fresh one per document.
pub struct RewriteContext {
    input: DocumentInput,
    disabled: bool,
    excluded: bool,
    root_value: f64,
    pub(crate) replacer: DocumentReplacer,
    pub(crate) processed: HashSet<DeclarationId>,
    pub(crate) blacklist_cache: HashMap<RuleId, bool>,
}

impl RewriteContext {
    pub(crate) fn new(
        input: DocumentInput,
        excluded: bool,
        root_value: f64,
        replacer: DocumentReplacer,
    ) -> Self {
        Self {
            input,
            disabled: false,
            excluded,
            root_value,
            replacer,
            processed: HashSet::new(),
            blacklist_cache: HashMap::new(),
        }
    }

    pub fn input(&self) -> &DocumentInput {
        &self.input
    }

    /// Root value resolved for this document.
    pub fn root_value(&self) -> f64 {
        self.root_value
    }

    /// Whether the whole document is excluded by file path.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// Document-wide disable marker, set by the host when it encounters an
    /// explicit skip directive. Modeled as context state, never as a hidden
    /// side channel on the AST.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}
