//! Canonicalization of free-text Hebrew answers.
//!
//! Every comparison in the engine goes through [`normalize`], so two answers
//! that differ only in pointing, separators, or final letter forms compare
//! equal.

/// Separator and quotation characters removed before comparison.
const STRIPPED: &[char] = &[
    '.', '-', '"', '\'', // ASCII
    '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', // curly quotes
    '\u{05F3}', '\u{05F4}', // geresh, gershayim
];

/// Hebrew points and cantillation marks (U+0591..=U+05C7).
fn is_pointing(c: char) -> bool {
    ('\u{0591}'..='\u{05C7}').contains(&c)
}

fn is_stripped(c: char) -> bool {
    c.is_whitespace() || STRIPPED.contains(&c)
}

/// Map the five final letter forms to their medial equivalents.
fn fold_final_form(c: char) -> char {
    match c {
        'ך' => 'כ',
        'ם' => 'מ',
        'ן' => 'נ',
        'ף' => 'פ',
        'ץ' => 'צ',
        other => other,
    }
}

/// Normalize a raw answer for comparison.
///
/// Steps, in order:
/// - remove Hebrew pointing
/// - remove periods, hyphens, whitespace, quotes, geresh and gershayim
/// - fold final letter forms (ך ם ן ף ץ) to medial forms
/// - trim and lowercase
///
/// The function is total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|&c| !is_pointing(c) && !is_stripped(c))
        .map(fold_final_form)
        .collect();

    stripped.trim().to_lowercase()
}

/// Compare two answers after normalization.
pub fn normalized_eq(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
