use crate::SPECIAL_PIXEL_UNITS;
use unitshift_core::{DocumentReplacer, ReplacerFactory};
use unitshift_rewrite::{Conversion, UnitReplacer};

/// Replacer factory with the pixel preset's per-occurrence special cases:
/// the one-px opt-out and, on harmony, magnitude preservation for marker
/// units and sub-minimum values.
#[derive(Debug, Clone)]
pub(crate) struct PxReplacerFactory {
    pub unit_precision: u32,
    pub min_pixel_value: f64,
    pub one_px_transform: bool,
    pub target_unit: String,
    pub preserve_unit: Option<String>,
}

impl ReplacerFactory for PxReplacerFactory {
    fn for_document(&self, root_value: f64) -> DocumentReplacer {
        let replacer = UnitReplacer::new(
            Conversion::Divide(root_value),
            self.unit_precision,
            self.min_pixel_value,
            self.target_unit.clone(),
        );
        let min_pixel_value = self.min_pixel_value;
        let one_px_transform = self.one_px_transform;
        let preserve_unit = self.preserve_unit.clone();

        Box::new(move |m| {
            let Some(number) = m.number() else {
                return m.text().to_string();
            };

            if let Some(unit) = &preserve_unit {
                if SPECIAL_PIXEL_UNITS.iter().any(|u| m.text().ends_with(u)) {
                    return format!("{number}{unit}");
                }
            }

            let Ok(pixels) = number.parse::<f64>() else {
                return m.text().to_string();
            };

            let keep = (!one_px_transform && pixels == 1.0) || pixels < min_pixel_value;
            if keep {
                return match &preserve_unit {
                    Some(unit) => format!("{number}{unit}"),
                    None => m.text().to_string(),
                };
            }

            replacer.replace(m.text(), Some(number))
        })
    }
}
