//! Text classification and Latin-1 sanitization shared by the engines and exporters

/// Unicode blocks that select the CJK font family for a label
pub const CJK_RANGES: [(char, char); 6] = [
    ('\u{2E80}', '\u{2EFF}'), // CJK radicals supplement
    ('\u{3000}', '\u{303F}'), // CJK symbols and punctuation
    ('\u{3040}', '\u{30FF}'), // hiragana, katakana
    ('\u{3400}', '\u{4DBF}'), // CJK unified ideographs extension A
    ('\u{4E00}', '\u{9FFF}'), // CJK unified ideographs
    ('\u{F900}', '\u{FAFF}'), // CJK compatibility ideographs
];

/// Typographic punctuation and its ASCII stand-in
pub const SMART_PUNCTUATION: [(char, &str); 9] = [
    ('\u{2014}', "-"),
    ('\u{2013}', "-"),
    ('\u{2022}', "-"),
    ('\u{2026}', "..."),
    ('\u{2019}', "'"),
    ('\u{2018}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{00A0}', " "),
];

pub fn is_cjk(ch: char) -> bool {
    CJK_RANGES
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&ch))
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Make `text` safe for a built-in Latin font.
///
/// Smart punctuation becomes ASCII; anything else outside printable
/// Latin-1 is dropped.
pub fn sanitize_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if let Some((_, replacement)) = SMART_PUNCTUATION.iter().find(|(from, _)| *from == ch) {
            out.push_str(replacement);
        } else if is_latin1_printable(ch) {
            out.push(ch);
        }
    }
    out
}

/// Single-byte encoding of sanitized text (WinAnsi agrees with Latin-1 on every retained char)
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|ch| is_latin1_printable(*ch))
        .map(|ch| ch as u32 as u8)
        .collect()
}

fn is_latin1_printable(ch: char) -> bool {
    matches!(ch as u32, 0x20..=0x7E | 0xA0..=0xFF) || ch == '\t'
}
