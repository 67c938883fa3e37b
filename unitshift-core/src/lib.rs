//! Per-document orchestration for the unitshift engine.
//!
//! This crate owns *when* a declaration is rewritten; the leaf crates own
//! *how* (matching in `unitshift-match`, scanning in `unitshift-scan`,
//! numeric conversion in `unitshift-rewrite`). The hosting stylesheet
//! pipeline walks its AST and feeds each declaration through
//! [`DeclarationPolicy::evaluate`], then applies the returned
//! [`DeclarationOutcome`] to its own tree.

mod context;
mod decl;
mod policy;

pub use context::RewriteContext;
pub use decl::{declaration_exists, DeclarationId, DeclarationView, RuleId, Sibling};
pub use policy::{
    ApplyMode, BlacklistPolicy, DeclarationOutcome, DeclarationPolicy, DocumentReplacer,
    ReplacerFactory, SkipReason, StandardReplacerFactory,
};
