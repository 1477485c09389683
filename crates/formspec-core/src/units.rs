//! Unit handling and geometric normalization
//!
//! Every geometric quantity of a spec (document margins and element
//! `x`/`y`/`w`/`h`) is rewritten from the declared `document.unit` into a
//! single target unit. Values already in the target unit pass through
//! untouched, so normalizing twice never accumulates float error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::value;

/// Millimetres in one PostScript point
pub const MM_PER_PT: f64 = 0.3527777778;

const MARGIN_KEYS: [&str; 4] = ["left", "top", "right", "bottom"];
const GEOMETRY_KEYS: [&str; 4] = ["x", "y", "w", "h"];

/// Length unit of spec geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Unit {
    #[default]
    Mm,
    Pt,
}

impl Unit {
    /// Parse a unit name, case-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "mm" => Some(Unit::Mm),
            "pt" => Some(Unit::Pt),
            _ => None,
        }
    }

    /// Parse a unit name, falling back to millimetres
    pub fn coerce(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::Pt => "pt",
        }
    }

    /// PDF points in one unit
    pub fn points_per_unit(&self) -> f64 {
        match self {
            Unit::Mm => 1.0 / MM_PER_PT,
            Unit::Pt => 1.0,
        }
    }

    /// Convert `value` from this unit into `target`
    pub fn convert(&self, value: f64, target: Unit) -> f64 {
        match (self, target) {
            (Unit::Pt, Unit::Mm) => value * MM_PER_PT,
            (Unit::Mm, Unit::Pt) => value / MM_PER_PT,
            _ => value,
        }
    }
}

impl From<String> for Unit {
    fn from(raw: String) -> Self {
        Unit::coerce(&raw)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s).ok_or_else(|| format!("Unknown unit: {}", s))
    }
}

/// Result of [`normalize_units`]
#[derive(Debug, Clone, PartialEq)]
pub struct UnitNormalization {
    /// The spec with all geometry expressed in the target unit
    pub spec: Map<String, Value>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Rewrite every geometric quantity of `spec` into `target`.
///
/// The declared unit defaults to millimetres when absent; an unrecognised
/// unit produces a warning and is assumed to already be `target`.
/// Non-numeric geometry is left as-is for the validator to report.
/// `document.unit` is set to `target` afterwards.
pub fn normalize_units(mut spec: Map<String, Value>, target: Unit) -> UnitNormalization {
    let mut warnings = Vec::new();
    let errors = Vec::new();

    let mut document = match spec.remove("document") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let source = match value::scalar_text(document.get("unit")) {
        None => Unit::Mm,
        Some(raw) => Unit::parse(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "Unknown unit '{}', assuming '{}'.",
                raw.to_lowercase(),
                target
            ));
            target
        }),
    };

    if let Some(Value::Object(margin)) = document.get_mut("margin") {
        convert_keys(margin, &MARGIN_KEYS, source, target);
    }

    if let Some(Value::Array(pages)) = spec.get_mut("pages") {
        for page in pages.iter_mut() {
            let Some(Value::Array(elements)) =
                page.as_object_mut().and_then(|p| p.get_mut("elements"))
            else {
                continue;
            };
            for element in elements.iter_mut().filter_map(Value::as_object_mut) {
                convert_keys(element, &GEOMETRY_KEYS, source, target);
            }
        }
    }

    document.insert("unit".to_string(), Value::String(target.as_str().to_string()));
    spec.insert("document".to_string(), Value::Object(document));

    UnitNormalization {
        spec,
        warnings,
        errors,
    }
}

fn convert_keys(map: &mut Map<String, Value>, keys: &[&str], source: Unit, target: Unit) {
    if source == target {
        return;
    }
    for key in keys {
        let Some(slot) = map.get_mut(*key) else {
            continue;
        };
        let Some(raw) = slot.as_f64() else {
            continue;
        };
        if let Some(converted) = Number::from_f64(source.convert(raw, target)) {
            *slot = Value::Number(converted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_in(unit: &str) -> Map<String, Value> {
        let value = json!({
            "document": {
                "unit": unit,
                "margin": {"left": 10, "top": 10.5, "right": "wide", "bottom": 0}
            },
            "pages": [
                {"elements": [
                    {"type": "label", "x": 10, "y": 20, "text": "Name"},
                    {"type": "field", "x": 12.25, "y": 14, "w": 100, "h": 8, "id": "a"}
                ]},
                "not a page",
                {"elements": "not a list"}
            ]
        });
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pt_to_mm_conversion() {
        let out = normalize_units(spec_in("pt"), Unit::Mm);
        let x = out.spec["pages"][0]["elements"][0]["x"].as_f64().unwrap();
        assert!((x - 3.527777778).abs() < 1e-6);
        assert_eq!(out.spec["document"]["unit"], json!("mm"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_mm_to_pt_recovers_original() {
        assert!((Unit::Mm.convert(Unit::Pt.convert(10.0, Unit::Mm), Unit::Pt) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_unit_is_bit_identical() {
        let input = spec_in("mm");
        let out = normalize_units(input.clone(), Unit::Mm);
        let before = input["pages"][0]["elements"][1]["x"].as_f64().unwrap();
        let after = out.spec["pages"][0]["elements"][1]["x"].as_f64().unwrap();
        assert_eq!(before.to_bits(), after.to_bits());
    }

    #[test]
    fn test_margins_converted_and_non_numeric_untouched() {
        let out = normalize_units(spec_in("mm"), Unit::Pt);
        let left = out.spec["document"]["margin"]["left"].as_f64().unwrap();
        assert!((left - 10.0 / MM_PER_PT).abs() < 1e-9);
        assert_eq!(out.spec["document"]["margin"]["right"], json!("wide"));
    }

    #[test]
    fn test_missing_unit_defaults_to_mm() {
        let mut spec = spec_in("mm");
        spec["document"].as_object_mut().unwrap().remove("unit");
        let out = normalize_units(spec, Unit::Pt);
        let w = out.spec["pages"][0]["elements"][1]["w"].as_f64().unwrap();
        assert!((w - 100.0 / MM_PER_PT).abs() < 1e-9);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unknown_unit_warns_and_assumes_target() {
        let out = normalize_units(spec_in("Inch"), Unit::Pt);
        assert_eq!(out.warnings, vec!["Unknown unit 'inch', assuming 'pt'.".to_string()]);
        assert_eq!(out.spec["pages"][0]["elements"][0]["x"].as_f64(), Some(10.0));
        assert_eq!(out.spec["document"]["unit"], json!("pt"));
    }

    #[test]
    fn test_missing_document_is_created() {
        let spec = json!({"pages": []}).as_object().cloned().unwrap();
        let out = normalize_units(spec, Unit::Mm);
        assert_eq!(out.spec["document"], json!({"unit": "mm"}));
    }

    #[test]
    fn test_unit_coerce() {
        assert_eq!(Unit::coerce("PT"), Unit::Pt);
        assert_eq!(Unit::coerce("furlong"), Unit::Mm);
        assert_eq!("mm".parse::<Unit>(), Ok(Unit::Mm));
        assert!("cm".parse::<Unit>().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: pt -> mm -> pt returns the original value
        #[test]
        fn roundtrip_pt_mm_pt(value in -5000.0f64..5000.0) {
            let back = Unit::Mm.convert(Unit::Pt.convert(value, Unit::Mm), Unit::Pt);
            prop_assert!((back - value).abs() < 1e-6, "{} -> {}", value, back);
        }

        /// Property: normalizing into the declared unit is a no-op on geometry
        #[test]
        fn same_unit_normalization_is_identity(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            use_pt in any::<bool>(),
        ) {
            let unit = if use_pt { Unit::Pt } else { Unit::Mm };
            let spec = serde_json::json!({
                "document": {"unit": unit.as_str()},
                "pages": [{"elements": [{"type": "label", "x": x, "y": y}]}]
            });
            let out = normalize_units(spec.as_object().cloned().unwrap(), unit);
            let element = &out.spec["pages"][0]["elements"][0];
            prop_assert_eq!(element["x"].as_f64().unwrap().to_bits(), x.to_bits());
            prop_assert_eq!(element["y"].as_f64().unwrap().to_bits(), y.to_bits());
        }
    }
}
