//! Single-pass placeholder substitution for the embedded script templates

/// Replace every `slots` key in `template` with its value.
///
/// The template is scanned once, so text inserted for one slot is never
/// searched for another slot's key.
pub(crate) fn fill_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + slots.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;
    loop {
        let next = slots
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
