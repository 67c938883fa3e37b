//! Numeric transform for matched unit values: conversion, precision rounding,
//! minimum-magnitude cutoff, and unitless-zero rendering.

/// Rounds `value` to `precision` fractional digits, half away from zero.
///
/// An epsilon is added to the magnitude before rounding so that values whose
/// binary representation sits just under an exact `.5` boundary still round
/// up: `to_fixed(1.005, 2) == 1.01`. The sign is reapplied afterwards, so
/// `to_fixed(-0.1299, 2) == -0.13`. A precision above 100 disables rounding.
pub fn to_fixed(value: f64, precision: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    if precision > 100 {
        return value;
    }
    let multiplier = 10f64.powi(precision as i32);
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let rounded = ((value.abs() + f64::EPSILON) * multiplier).round() / multiplier;
    sign * rounded
}

/// Fully resolved conversion from a source magnitude to a target magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// Pixel to relative: divide by the root size.
    Divide(f64),
    /// Relative to pixel: multiply by the root size.
    Multiply(f64),
    /// Relative to viewport percentage: `n * 100 * base_font_size / root`.
    Viewport { base_font_size: f64, root: f64 },
}

impl Conversion {
    pub fn apply(self, n: f64) -> f64 {
        match self {
            Conversion::Divide(root) => n / root,
            Conversion::Multiply(root) => n * root,
            Conversion::Viewport {
                base_font_size,
                root,
            } => n * 100.0 * base_font_size / root,
        }
    }
}

/// Direction of a conversion before the per-document root value is known.
///
/// Each preset documents one direction; [`resolve`](Self::resolve) pairs it
/// with the root value cached for the current document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionRule {
    DivideByRoot,
    MultiplyByRoot,
    ViewportFromRoot { base_font_size: f64 },
}

impl ConversionRule {
    pub fn resolve(self, root: f64) -> Conversion {
        match self {
            ConversionRule::DivideByRoot => Conversion::Divide(root),
            ConversionRule::MultiplyByRoot => Conversion::Multiply(root),
            ConversionRule::ViewportFromRoot { base_font_size } => Conversion::Viewport {
                base_font_size,
                root,
            },
        }
    }
}

/// Per-occurrence replacer: maps one scanned match to its rewritten text.
///
/// Built once per document (the conversion embeds the document's resolved
/// root value) and applied to every match in every declaration.
#[derive(Debug, Clone)]
pub struct UnitReplacer {
    conversion: Conversion,
    precision: u32,
    min_value: f64,
    target_unit: String,
}

impl UnitReplacer {
    pub fn new(
        conversion: Conversion,
        precision: u32,
        min_value: f64,
        target_unit: impl Into<String>,
    ) -> Self {
        Self {
            conversion,
            precision,
            min_value,
            target_unit: target_unit.into(),
        }
    }

    /// Rewrites one occurrence.
    ///
    /// Protected spans (`number == None`) and unparsable captures pass
    /// through unchanged, as do magnitudes below the minimum cutoff. A result
    /// that rounds to zero renders as `"0"` with no unit: CSS treats unitless
    /// zero as canonical.
    pub fn replace(&self, text: &str, number: Option<&str>) -> String {
        let Some(number) = number else {
            return text.to_string();
        };
        let Ok(n) = number.parse::<f64>() else {
            return text.to_string();
        };
        if n < self.min_value {
            return text.to_string();
        }

        let fixed = to_fixed(self.conversion.apply(n), self.precision);
        if fixed == 0.0 {
            "0".to_string()
        } else {
            format!("{}{}", fixed, self.target_unit)
        }
    }
}

/// Re-renders a captured magnitude with a reserved unit instead of
/// converting it. Used by the preserve-unit blacklist policy and for
/// platform marker units.
pub fn preserve_unit(text: &str, number: Option<&str>, unit: &str) -> String {
    match number {
        Some(n) => format!("{n}{unit}"),
        None => text.to_string(),
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Rounding never moves a value by more than half a step (plus the
        /// epsilon guard).
        #[test]
        fn to_fixed_stays_within_half_a_step(value in -1.0e6f64..1.0e6, precision in 0u32..8) {
            let fixed = to_fixed(value, precision);
            let step = 10f64.powi(-(precision as i32));
            prop_assert!((fixed - value).abs() <= step / 2.0 + 1.0e-9);
        }

        /// Sign is always preserved.
        #[test]
        fn to_fixed_preserves_sign_for_large_values(value in 1.0f64..1.0e6, precision in 0u32..8) {
            prop_assert!(to_fixed(value, precision) > 0.0);
            prop_assert!(to_fixed(-value, precision) < 0.0);
        }
    }
}
