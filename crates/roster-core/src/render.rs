//! Text normalization and sentence rendering.

/// Separator between rendered values.
pub const SENTENCE_SEPARATOR: &str = ", ";

/// Lowercase `text` the way entries are stored.
///
/// ASCII letters only; other characters pass through untouched.
pub fn normalize(text: &str) -> String {
    text.to_ascii_lowercase()
}

/// Join `values` with `", "` and uppercase the first character.
///
/// Returns the empty string when there are no values. A leading non-ASCII
/// character is left as is.
pub fn render_sentence<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(SENTENCE_SEPARATOR);
        }
        out.push_str(value);
    }
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}

/// Split a rendered sentence back into display words.
///
/// This is how the demo screen lays out one word per row. The first word
/// keeps its capital, as the rendered text has it.
pub fn split_sentence(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(SENTENCE_SEPARATOR).map(str::trim).collect()
}
