//! Pixel-transform preset: rewrites `px` (and platform pixel variants) into
//! the unit each target platform expects, scaling by a design-width-derived
//! root value.
//!
//! The platform table mirrors the cross-platform mini-app ecosystem this
//! preset serves: `weapp` emits `rpx`, `h5` emits `rem`/`vw`, `rn` and
//! `quickapp` emit rescaled `px`, and `harmony` emits `px` while reserving
//! `ch` for values that must keep their magnitude (blacklisted selectors and
//! the `Px`/`PX`/`pX` author markers).

mod replacer;

use replacer::PxReplacerFactory;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use unitshift_core::{BlacklistPolicy, DeclarationPolicy};
use unitshift_scan::{ScanError, ScanOptions, UnitScanner};
use unitshift_types::{DocumentInput, ExcludeSpec, Pattern, RootValue};

/// Author markers that always keep their magnitude on harmony.
pub const SPECIAL_PIXEL_UNITS: [&str; 3] = ["Px", "PX", "pX"];

/// Unit reserved on harmony for unconverted magnitudes.
pub const HARMONY_PRESERVE_UNIT: &str = "ch";

const DEFAULT_BASE_FONT_SIZE: f64 = 20.0;

/// Target platform for the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Weapp,
    H5,
    Rn,
    Quickapp,
    Harmony,
}

/// Unit the transform emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetUnit {
    Rpx,
    Rem,
    Px,
    Vw,
    Vmin,
}

impl TargetUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetUnit::Rpx => "rpx",
            TargetUnit::Rem => "rem",
            TargetUnit::Px => "px",
            TargetUnit::Vw => "vw",
            TargetUnit::Vmin => "vmin",
        }
    }
}

/// Reference viewport width, fixed or derived per document.
#[derive(Clone)]
pub enum DesignWidth {
    Value(u32),
    PerDocument(Arc<dyn Fn(&DocumentInput) -> u32 + Send + Sync>),
}

impl DesignWidth {
    pub fn per_document(f: impl Fn(&DocumentInput) -> u32 + Send + Sync + 'static) -> Self {
        DesignWidth::PerDocument(Arc::new(f))
    }

    fn resolve(&self, input: &DocumentInput) -> u32 {
        match self {
            DesignWidth::Value(v) => *v,
            DesignWidth::PerDocument(f) => f(input),
        }
    }
}

impl From<u32> for DesignWidth {
    fn from(value: u32) -> Self {
        DesignWidth::Value(value)
    }
}

impl fmt::Debug for DesignWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignWidth::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DesignWidth::PerDocument(_) => f.write_str("PerDocument(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for DesignWidth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(DesignWidth::Value)
    }
}

/// Scaling ratio per known design width.
pub fn default_device_ratio() -> BTreeMap<u32, f64> {
    BTreeMap::from([
        (375, 2.0),
        (640, 2.34 / 2.0),
        (750, 1.0),
        (828, 1.81 / 2.0),
    ])
}

/// Errors surfaced while building a [`PxTransform`] policy.
#[derive(Debug, Error)]
pub enum PxError {
    #[error("design width {0} has no device ratio")]
    UnknownDesignWidth(u32),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Configuration for the pixel transform.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PxOptions {
    pub platform: Platform,
    pub design_width: DesignWidth,
    pub device_ratio: BTreeMap<u32, f64>,
    /// Overrides the platform's derived target unit (weapp and h5 only).
    pub target_unit: Option<TargetUnit>,
    /// Overrides the platform's derived root value entirely.
    pub root_value: Option<RootValue>,
    pub base_font_size: Option<f64>,
    /// Legacy alias for `base_font_size`, honored when `>= 1`.
    pub min_root_size: Option<f64>,
    pub unit_precision: u32,
    pub prop_list: Vec<Pattern>,
    pub selector_black_list: Vec<Pattern>,
    pub exclude: ExcludeSpec,
    pub replace: bool,
    pub media_query: bool,
    pub min_pixel_value: f64,
    /// When false, exact `1px` values are left alone (harmony: preserved).
    pub one_px_transform: bool,
}

impl Default for PxOptions {
    fn default() -> Self {
        Self {
            platform: Platform::Weapp,
            design_width: DesignWidth::Value(750),
            device_ratio: default_device_ratio(),
            target_unit: None,
            root_value: None,
            base_font_size: None,
            min_root_size: None,
            unit_precision: 5,
            prop_list: vec![Pattern::from("*")],
            selector_black_list: Vec::new(),
            exclude: ExcludeSpec::default(),
            replace: true,
            media_query: false,
            min_pixel_value: 0.0,
            one_px_transform: true,
        }
    }
}

impl PxOptions {
    fn base_font_size(&self) -> f64 {
        if let Some(base) = self.base_font_size {
            return base;
        }
        match self.min_root_size {
            Some(size) if size >= 1.0 => size,
            _ => DEFAULT_BASE_FONT_SIZE,
        }
    }
}

/// Units scanned and the unit emitted, per platform and target.
#[derive(Debug, Clone)]
struct Resolution {
    units: Vec<&'static str>,
    target_unit: &'static str,
    preserve_unit: Option<&'static str>,
    root_factor: RootFactor,
}

/// How the per-document root value derives from the design-width ratio.
#[derive(Debug, Clone, Copy)]
enum RootFactor {
    /// `design_width / 100` (viewport targets).
    ViewportHundredth,
    /// `2 / ratio` (rescaled-pixel targets).
    DoubleInverseRatio,
    /// `base_font_size * 2 / ratio` (rem targets).
    RemBase(f64),
    /// `1 / ratio` (rpx and harmony).
    InverseRatio,
    /// Constant `1` (quickapp).
    Unit,
}

fn resolve(options: &PxOptions) -> Resolution {
    let base = options.base_font_size();
    match options.platform {
        Platform::H5 => {
            let target = options.target_unit.unwrap_or(TargetUnit::Rem);
            let root_factor = match target {
                TargetUnit::Vw | TargetUnit::Vmin => RootFactor::ViewportHundredth,
                TargetUnit::Px => RootFactor::DoubleInverseRatio,
                _ => RootFactor::RemBase(base),
            };
            Resolution {
                units: vec!["px", "rpx"],
                target_unit: target.as_str(),
                preserve_unit: None,
                root_factor,
            }
        }
        Platform::Rn => Resolution {
            units: vec!["px"],
            target_unit: TargetUnit::Px.as_str(),
            preserve_unit: None,
            root_factor: RootFactor::DoubleInverseRatio,
        },
        Platform::Quickapp => Resolution {
            units: vec!["px"],
            target_unit: TargetUnit::Px.as_str(),
            preserve_unit: None,
            root_factor: RootFactor::Unit,
        },
        Platform::Harmony => {
            let mut units = vec!["px"];
            units.extend(SPECIAL_PIXEL_UNITS);
            Resolution {
                units,
                target_unit: TargetUnit::Px.as_str(),
                preserve_unit: Some(HARMONY_PRESERVE_UNIT),
                root_factor: RootFactor::InverseRatio,
            }
        }
        Platform::Weapp => {
            let target = options.target_unit.unwrap_or(TargetUnit::Rpx);
            let root_factor = match target {
                TargetUnit::Rem => RootFactor::RemBase(base),
                TargetUnit::Px => RootFactor::DoubleInverseRatio,
                _ => RootFactor::InverseRatio,
            };
            Resolution {
                units: vec!["px"],
                target_unit: target.as_str(),
                preserve_unit: None,
                root_factor,
            }
        }
    }
}

fn ratio_for(device_ratio: &BTreeMap<u32, f64>, design_width: u32) -> Option<f64> {
    device_ratio.get(&design_width).copied()
}

fn derived_root_value(options: &PxOptions, factor: RootFactor) -> Result<RootValue, PxError> {
    // A fixed design width is validated now; a per-document function can
    // only be checked when each document arrives, so unknown widths fall
    // back to ratio 1 with a warning instead of failing mid-run.
    if let DesignWidth::Value(width) = options.design_width {
        if !matches!(factor, RootFactor::Unit | RootFactor::ViewportHundredth)
            && ratio_for(&options.device_ratio, width).is_none()
        {
            return Err(PxError::UnknownDesignWidth(width));
        }
    }

    let design_width = options.design_width.clone();
    let device_ratio = options.device_ratio.clone();
    Ok(RootValue::per_document(move |input| {
        let width = design_width.resolve(input);
        match factor {
            RootFactor::Unit => 1.0,
            RootFactor::ViewportHundredth => f64::from(width) / 100.0,
            RootFactor::DoubleInverseRatio => 2.0 / lookup_ratio(&device_ratio, width),
            RootFactor::RemBase(base) => base * 2.0 / lookup_ratio(&device_ratio, width),
            RootFactor::InverseRatio => 1.0 / lookup_ratio(&device_ratio, width),
        }
    }))
}

fn lookup_ratio(device_ratio: &BTreeMap<u32, f64>, width: u32) -> f64 {
    match ratio_for(device_ratio, width) {
        Some(ratio) => ratio,
        None => {
            warn!(width, "design width has no device ratio, assuming 1");
            1.0
        }
    }
}

/// The built preset: a [`DeclarationPolicy`] scanning pixel units.
pub struct PxTransform {
    policy: DeclarationPolicy,
}

impl fmt::Debug for PxTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PxTransform").finish_non_exhaustive()
    }
}

impl PxTransform {
    pub fn new(options: PxOptions) -> Result<Self, PxError> {
        let resolution = resolve(&options);

        let root_value = match &options.root_value {
            Some(root) => root.clone(),
            None => derived_root_value(&options, resolution.root_factor)?,
        };

        let scanner = UnitScanner::new(&resolution.units, &ScanOptions::default())?;
        let factory = PxReplacerFactory {
            unit_precision: options.unit_precision,
            min_pixel_value: options.min_pixel_value,
            one_px_transform: options.one_px_transform,
            target_unit: resolution.target_unit.to_string(),
            preserve_unit: resolution.preserve_unit.map(str::to_string),
        };

        let config = unitshift_types::RewriteConfig {
            prop_list: options.prop_list.clone(),
            selector_black_list: options.selector_black_list.clone(),
            exclude: options.exclude.clone(),
            unit_precision: options.unit_precision,
            min_value: options.min_pixel_value,
            replace: options.replace,
            media_query: options.media_query,
            root_value,
            target_unit: resolution.target_unit.to_string(),
        };

        let blacklist_policy = match resolution.preserve_unit {
            Some(unit) => BlacklistPolicy::PreserveUnit(unit.to_string()),
            None => BlacklistPolicy::Skip,
        };

        let policy = DeclarationPolicy::with_factory(&config, scanner, Box::new(factory))
            .with_blacklist_policy(blacklist_policy);
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &DeclarationPolicy {
        &self.policy
    }
}

impl std::ops::Deref for PxTransform {
    type Target = DeclarationPolicy;

    fn deref(&self) -> &Self::Target {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_font_size_falls_back_through_min_root_size() {
        let options = PxOptions::default();
        assert_eq!(options.base_font_size(), 20.0);

        let options = PxOptions {
            min_root_size: Some(16.0),
            ..Default::default()
        };
        assert_eq!(options.base_font_size(), 16.0);

        let options = PxOptions {
            min_root_size: Some(0.5),
            ..Default::default()
        };
        assert_eq!(options.base_font_size(), 20.0);

        let options = PxOptions {
            base_font_size: Some(14.0),
            min_root_size: Some(16.0),
            ..Default::default()
        };
        assert_eq!(options.base_font_size(), 14.0);
    }

    #[test]
    fn unknown_fixed_design_width_is_a_build_error() {
        let options = PxOptions {
            design_width: DesignWidth::Value(700),
            ..Default::default()
        };
        let err = PxTransform::new(options).unwrap_err();
        assert!(matches!(err, PxError::UnknownDesignWidth(700)));
    }

    #[test]
    fn viewport_targets_do_not_need_a_ratio() {
        let options = PxOptions {
            platform: Platform::H5,
            target_unit: Some(TargetUnit::Vw),
            design_width: DesignWidth::Value(700),
            ..Default::default()
        };
        assert!(PxTransform::new(options).is_ok());
    }

    #[test]
    fn options_deserialize_from_host_config() {
        let options: PxOptions = serde_json::from_str(
            r#"{
                "platform": "h5",
                "design_width": 640,
                "target_unit": "vw",
                "min_pixel_value": 2,
                "one_px_transform": false
            }"#,
        )
        .unwrap();
        assert_eq!(options.platform, Platform::H5);
        assert_eq!(options.min_pixel_value, 2.0);
        assert!(!options.one_px_transform);
        assert!(matches!(options.design_width, DesignWidth::Value(640)));
    }
}
