//! Standalone Python generators mirroring the two render engines

use formspec_core::text::{CJK_RANGES, SMART_PUNCTUATION};
use formspec_core::NormalizedSpec;
use formspec_render::BASELINE_RATIO;

use crate::literal::{python_literal, python_str};
use crate::template::fill_slots;

const PRELUDE: &str = include_str!("../templates/prelude.py");
const SIMPLE_CANVAS_TEMPLATE: &str = include_str!("../templates/simple_canvas.py");
const VECTOR_CANVAS_TEMPLATE: &str = include_str!("../templates/vector_canvas.py");

/// fpdf2 script drawing top-down like the simple canvas engine
pub fn simple_canvas_script(spec: &NormalizedSpec) -> String {
    render(SIMPLE_CANVAS_TEMPLATE, spec)
}

/// ReportLab script drawing bottom-up like the vector canvas engine
pub fn vector_canvas_script(spec: &NormalizedSpec) -> String {
    render(VECTOR_CANVAS_TEMPLATE, spec)
}

fn render(template: &str, spec: &NormalizedSpec) -> String {
    // the prelude carries slots of its own
    let with_prelude = template.replace("__PRELUDE__", PRELUDE.trim_end());
    fill_slots(
        &with_prelude,
        &[
            ("__CJK_RANGES__", cjk_ranges().as_str()),
            ("__SMART_PUNCTUATION__", smart_punctuation().as_str()),
            ("__BASELINE_RATIO__", BASELINE_RATIO.to_string().as_str()),
            ("__VERSION__", env!("CARGO_PKG_VERSION")),
            ("__SPEC__", python_literal(&spec.to_value()).as_str()),
        ],
    )
}

fn cjk_ranges() -> String {
    let ranges: Vec<String> = CJK_RANGES
        .iter()
        .map(|(lo, hi)| format!("    (0x{:04X}, 0x{:04X}),", *lo as u32, *hi as u32))
        .collect();
    format!("[\n{}\n]", ranges.join("\n"))
}

fn smart_punctuation() -> String {
    let entries: Vec<String> = SMART_PUNCTUATION
        .iter()
        .map(|(from, to)| format!("    \"\\u{:04x}\": {},", *from as u32, python_str(to)))
        .collect();
    format!("{{\n{}\n}}", entries.join("\n"))
}
