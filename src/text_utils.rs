/// Typeahead key for a row: the first character of the trimmed text,
/// lower-cased. Empty when the row has no text.
///
/// Only the first `char` counts, so a label in decomposed form is keyed by
/// its base letter and stays reachable by a single typed character.
pub(crate) fn first_char_key(text: &str) -> String {
    text.trim().chars().next().map(char_key).unwrap_or_default()
}

/// Lower-case a typed character into the same form as [`first_char_key`].
pub(crate) fn char_key(ch: char) -> String {
    ch.to_lowercase().collect()
}

/// A single non-whitespace, non-control character.
pub(crate) fn is_printable(ch: char) -> bool {
    !ch.is_control() && !ch.is_whitespace()
}
