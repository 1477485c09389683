//! Page geometry and the top-down to bottom-up flip
//!
//! Specs place elements from the top-left corner with y growing downward.
//! PDF user space grows upward from the bottom-left corner.

use formspec_core::{DocumentSettings, Unit};

/// Fraction of the font size between a text line's top and its baseline
pub const BASELINE_RATIO: f64 = 0.8;

/// Page dimensions plus the scale from spec units to points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
    pub unit: Unit,
}

impl PageGeometry {
    pub fn for_document(document: &DocumentSettings) -> Self {
        let (width, height) = document.page_points();
        Self {
            width,
            height,
            unit: document.unit,
        }
    }

    /// Points per spec unit
    pub fn scale(&self) -> f64 {
        self.unit.points_per_unit()
    }

    pub fn to_points(&self, value: f64) -> f64 {
        value * self.scale()
    }

    /// Page (width, height) in spec units
    pub fn size_in_units(&self) -> (f64, f64) {
        (self.width / self.scale(), self.height / self.scale())
    }
}

/// Native y of a label's top edge, all values in points
pub fn label_y_native(page_height: f64, y: f64) -> f64 {
    page_height - y
}

/// Native y of a field's bottom edge, so its top edge sits at the declared `y`
pub fn field_y_native(page_height: f64, y: f64, h: f64) -> f64 {
    page_height - y - h
}

/// Distance from a text line's top to its baseline
pub fn baseline_drop(size_pt: f64) -> f64 {
    BASELINE_RATIO * size_pt
}

/// An element's box in spec units, measured from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub fn is_placeable(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn has_area(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }

    /// (width, height) in points; unusable dimensions get a visible minimum
    pub fn extent_points(&self, scale: f64) -> (f64, f64) {
        let side = |value: f64, min: f64| {
            if value.is_finite() && value > 0.0 {
                value * scale
            } else {
                min
            }
        };
        (side(self.w, PLACEHOLDER_MIN.0), side(self.h, PLACEHOLDER_MIN.1))
    }
}

/// Smallest placeholder box in points
pub const PLACEHOLDER_MIN: (f64, f64) = (60.0, 14.0);
