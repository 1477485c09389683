//! AcroForm constants and widget appearance streams shared by both engines

/// `/Ff` bit 13: multiline text field
pub const FLAG_MULTILINE: i64 = 1 << 12;
/// `/Ff` bit 18: combo box choice field
pub const FLAG_COMBO: i64 = 1 << 17;
/// `/F` bit 3: print the annotation
pub const ANNOT_PRINT: i64 = 4;

/// Form-level default appearance; auto-sized Helvetica
pub const FORM_DA: &str = "/Helv 0 Tf 0 g";

pub const CHECKBOX_ON: &[u8] = b"Yes";
pub const CHECKBOX_OFF: &[u8] = b"Off";

pub const PRODUCER: &str = concat!("formspec ", env!("CARGO_PKG_VERSION"));

/// Per-field default appearance string
pub fn field_da(size: f64) -> String {
    format!("/Helv {} Tf 0 g", num(size))
}

/// Shortest decimal form for content streams
pub fn num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Border drawn for both checkbox states, sized in points
fn checkbox_border(w: f64, h: f64) -> String {
    format!(
        "q 0 G 0.5 w 0.25 0.25 {} {} re S Q\n",
        num(w - 0.5),
        num(h - 0.5)
    )
}

/// `/N /Off` appearance
pub fn checkbox_off_stream(w: f64, h: f64) -> Vec<u8> {
    checkbox_border(w, h).into_bytes()
}

/// `/N /Yes` appearance: border plus a ZapfDingbats check mark
pub fn checkbox_on_stream(w: f64, h: f64) -> Vec<u8> {
    let size = (w.min(h) * 0.8).max(1.0);
    // ZapfDingbats '4' is roughly 0.75 em wide
    let tx = (w - size * 0.75) / 2.0;
    let ty = (h - size * 0.7) / 2.0;
    let mut stream = checkbox_border(w, h);
    stream.push_str(&format!(
        "BT /ZaDb {} Tf 0 g {} {} Td (4) Tj ET\n",
        num(size),
        num(tx),
        num(ty)
    ));
    stream.into_bytes()
}

/// Whether `text` can be written as a PDFDocEncoding literal without loss
pub fn is_plain_ascii(text: &str) -> bool {
    text.bytes().all(|b| (0x20..0x7F).contains(&b))
}

/// UTF-16BE with BOM, for text strings outside ASCII
pub fn utf16_text(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}
