//! Canonical form shared by every identifier family: ASCII letters and digits
//! only, upper-cased.

use std::borrow::Cow;


/// Strips separators and upper-cases `raw`.
///
/// Input that is already made of ASCII letters and digits only is case-folded in
/// place of being rebuilt, and borrowed when nothing needs to change. Any other
/// input is rebuilt character by character, keeping only ASCII letters and digits.
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
        if raw.bytes().any(|b| b.is_ascii_lowercase()) {
            Cow::Owned(raw.to_ascii_uppercase())
        } else {
            Cow::Borrowed(raw)
        }
    } else {
        Cow::Owned(rebuild(raw))
    }
}

/// [normalize] for callers holding an optional value. Absent stays absent.
pub fn normalize_optional(raw: Option<&str>) -> Option<Cow<'_, str>> {
    raw.map(normalize)
}

fn rebuild(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Removes a leading `country` prefix from an already normalized value.
pub fn strip_country_prefix<'a>(canonical: &'a str, country: &str) -> &'a str {
    match canonical.strip_prefix(country) {
        Some(rest) if country.len() == 2 => rest,
        _ => canonical,
    }
}

/// Print form: groups of `group` characters separated by a single space.
pub fn format_grouped(canonical: &str, group: usize) -> String {
    let mut out = String::with_capacity(canonical.len() + canonical.len() / group.max(1));
    for (idx, c) in canonical.chars().enumerate() {
        if idx > 0 && idx % group == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Two upper-case ASCII letters.
pub(crate) fn is_country_code(candidate: &str) -> bool {
    candidate.len() == 2 && candidate.bytes().all(|b| b.is_ascii_uppercase())
}
