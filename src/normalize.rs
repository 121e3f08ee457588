// src/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// UTF-8 bytes of an en/em dash (or right quote) read as Latin-1 twice over.
/// The lead `Ã` is matched both composed and NFKD-decomposed, since the
/// pattern runs after decomposition.
static MOJIBAKE_DASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\x{C3}|A\x{0303})\x{A2}\x{80}[\x{93}\x{94}\x{99}]")
        .expect("mojibake dash pattern should compile")
});

/// Upper bound on cleaning passes; every effective encoding repair shrinks
/// the string, so real names settle after one or two.
const MAX_PASSES: usize = 8;

/// Comparison key for a district name. Empty means "never matches".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for a name that may be absent (null attribute, missing cell).
pub fn key_for(name: Option<&str>) -> CanonicalKey {
    name.map(normalize_district_name).unwrap_or_default()
}

/// Normalize a district name so both data sources compare equal despite
/// encoding noise, dash/quote style, case and whitespace.
///
/// Total and idempotent: the cleaning pass is repeated until it no longer
/// changes the text.
pub fn normalize_district_name(name: &str) -> CanonicalKey {
    if name.is_empty() {
        return CanonicalKey::default();
    }

    let mut current = clean_pass(name);
    for _ in 1..MAX_PASSES {
        let next = clean_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    CanonicalKey(current)
}

fn clean_pass(raw: &str) -> String {
    let repaired = repair_double_encoding(raw).unwrap_or_else(|| raw.to_string());

    let decomposed: String = repaired
        .nfkd()
        .map(|c| match c {
            '\u{2014}' | '\u{2013}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let dashed = MOJIBAKE_DASH.replace_all(&decomposed, "-");
    let lowered = dashed.to_lowercase();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reinterpret every char as a Latin-1 byte and decode the result as UTF-8.
/// `None` when a char does not fit in one byte or the bytes are not UTF-8.
pub fn repair_double_encoding(s: &str) -> Option<String> {
    let bytes = s
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}
