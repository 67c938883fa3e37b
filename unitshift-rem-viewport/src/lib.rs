//! Rem-to-viewport preset: rewrites `rem` lengths into viewport units
//! (`vw` by default) so typography scales with the viewport instead of the
//! root font size.
//!
//! The conversion assumes the usual 16px root font size: a value of `r` rem
//! becomes `r * 100 * 16 / root_value` viewport units, where `root_value` is
//! the design viewport width in pixels (375 by default).

use serde::Deserialize;
use unitshift_core::{DeclarationPolicy, RewriteContext};
use unitshift_rewrite::ConversionRule;
use unitshift_scan::ScanError;
use unitshift_types::{DocumentInput, ExcludeSpec, Pattern, RewriteConfig, RootValue};

/// Root font size the rem-to-viewport math assumes.
pub const BASE_FONT_SIZE: f64 = 16.0;

fn default_prop_list() -> Vec<Pattern> {
    ["font", "font-size", "line-height", "letter-spacing"]
        .map(Pattern::from)
        .to_vec()
}

fn default_exclude() -> ExcludeSpec {
    ExcludeSpec::Patterns(vec![
        Pattern::regex("(?i)node_modules").expect("static pattern")
    ])
}

/// Configuration for the rem-to-viewport transform.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemViewportOptions {
    /// Design viewport width in pixels.
    pub root_value: RootValue,
    pub unit_precision: u32,
    pub prop_list: Vec<Pattern>,
    pub selector_black_list: Vec<Pattern>,
    pub exclude: ExcludeSpec,
    pub replace: bool,
    pub media_query: bool,
    /// Values below this many rem are left alone.
    pub min_rem_value: f64,
    /// Viewport unit to emit, `vw` or `vmin`.
    pub transform_unit: String,
    /// When set, the transform is a no-op for every document.
    pub disabled: bool,
}

impl Default for RemViewportOptions {
    fn default() -> Self {
        Self {
            root_value: RootValue::Value(375.0),
            unit_precision: 16,
            prop_list: default_prop_list(),
            selector_black_list: Vec::new(),
            exclude: default_exclude(),
            replace: true,
            media_query: false,
            min_rem_value: 0.0,
            transform_unit: "vw".to_string(),
            disabled: false,
        }
    }
}

/// The built preset: a [`DeclarationPolicy`] scanning `rem`.
pub struct RemToViewport {
    policy: DeclarationPolicy,
    disabled: bool,
}

impl RemToViewport {
    pub fn new(options: RemViewportOptions) -> Result<Self, ScanError> {
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
        let policy = DeclarationPolicy::new(
            &config,
            &["rem"],
            ConversionRule::ViewportFromRoot {
                base_font_size: BASE_FONT_SIZE,
            },
        )?;
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

impl std::ops::Deref for RemToViewport {
    type Target = DeclarationPolicy;

    fn deref(&self) -> &Self::Target {
        &self.policy
    }
}
