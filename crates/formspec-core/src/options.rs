use serde::{Deserialize, Serialize};

use crate::model::PageSize;
use crate::units::Unit;

/// Caller-chosen fallbacks for [`crate::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Target unit all geometry is normalized into
    pub unit_fallback: Unit,
    /// Page size used when the document declares none
    pub page_fallback: PageSize,
}

impl ValidationOptions {
    pub fn new(unit_fallback: Unit, page_fallback: PageSize) -> Self {
        Self {
            unit_fallback,
            page_fallback,
        }
    }
}
