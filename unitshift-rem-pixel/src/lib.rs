//! Rem-to-pixel preset: rewrites `rem` lengths back into absolute units,
//! multiplying by a configurable root size. With a per-document root value
//! this turns rem-authored stylesheets into fixed-pixel output sized for
//! whichever device class the document belongs to.

use serde::Deserialize;
use unitshift_core::{DeclarationPolicy, RewriteContext};
use unitshift_rewrite::ConversionRule;
use unitshift_scan::ScanError;
use unitshift_types::{DocumentInput, ExcludeSpec, Pattern, RewriteConfig, RootValue};

/// Configuration for the rem-to-pixel transform.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemPixelOptions {
    /// Pixels per rem.
    pub root_value: RootValue,
    pub unit_precision: u32,
    pub prop_list: Vec<Pattern>,
    pub selector_black_list: Vec<Pattern>,
    pub exclude: ExcludeSpec,
    pub replace: bool,
    pub media_query: bool,
    /// Values below this many rem are left alone.
    pub min_rem_value: f64,
    /// Absolute unit to emit, `px` or a platform pixel like `rpx`.
    pub transform_unit: String,
    /// When set, the transform is a no-op for every document.
    pub disabled: bool,
}

impl Default for RemPixelOptions {
    fn default() -> Self {
        Self {
            root_value: RootValue::Value(16.0),
            unit_precision: 5,
            prop_list: vec![Pattern::from("*")],
            selector_black_list: Vec::new(),
            exclude: ExcludeSpec::default(),
            replace: true,
            media_query: false,
            min_rem_value: 0.0,
            transform_unit: "px".to_string(),
            disabled: false,
        }
    }
}

/// The built preset: a [`DeclarationPolicy`] scanning `rem`.
pub struct RemToPixel {
    policy: DeclarationPolicy,
    disabled: bool,
}

impl RemToPixel {
    pub fn new(options: RemPixelOptions) -> Result<Self, ScanError> {
        let config = RewriteConfig {
            prop_list: options.prop_list,
            selector_black_list: options.selector_black_list,
            exclude: options.exclude,
            unit_precision: options.unit_precision,
            min_value: options.min_rem_value,
            replace: options.replace,
            media_query: options.media_query,
            root_value: options.root_value,
            target_unit: options.transform_unit,
        };
        let policy = DeclarationPolicy::new(&config, &["rem"], ConversionRule::MultiplyByRoot)?;
        Ok(Self {
            policy,
            disabled: options.disabled,
        })
    }

    /// As [`DeclarationPolicy::begin_document`], honoring the `disabled`
    /// flag for the whole document.
    pub fn begin_document(&self, input: DocumentInput) -> RewriteContext {
        let mut ctx = self.policy.begin_document(input);
        if self.disabled {
            ctx.set_disabled(true);
        }
        ctx
    }

    pub fn policy(&self) -> &DeclarationPolicy {
        &self.policy
    }
}

impl std::ops::Deref for RemToPixel {
    type Target = DeclarationPolicy;

    fn deref(&self) -> &Self::Target {
        &self.policy
    }
}
