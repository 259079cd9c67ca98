//! Display-name helpers
//!
//! Reference data arrives as slugs (`vine-whip`); the UI shows title-cased
//! names (`Vine Whip`) and lookups go back through [`to_slug`].

/// Title-case a slug: dashes become spaces and every word starts uppercase.
///
/// A "word" starts at any ASCII alphanumeric or `_` that does not follow
/// another one, so `farfetch'd` becomes `Farfetch'D`.
#[must_use]
pub fn format_name(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut prev_is_word = false;
    for c in slug.chars() {
        let c = if c == '-' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Reverse of [`format_name`] for lookups: `"Mr. Mime "` → `"mr.-mime"`.
#[must_use]
pub fn to_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Uppercase the first character, leave the rest untouched.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
