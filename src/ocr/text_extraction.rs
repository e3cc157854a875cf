/// Text extraction utilities for end-of-match detection
///
/// The recognizer is restricted to the marker alphabet, so a region showing
/// the game-over banner reads back as the marker itself, usually followed by
/// a newline.

/// Default end-of-match marker
pub const END_MARKER: &str = "GAMEOVER";

/// Check if recognized text reports the end-of-match marker
///
/// The text must start with `marker` once surrounding whitespace is removed.
/// Noise before the marker does not count.
///
/// # Examples
/// ```
/// # use battle_watch::ocr::text_extraction::is_end_marker;
/// assert!(is_end_marker("GAMEOVER\n", "GAMEOVER"));
/// assert!(!is_end_marker("OVER", "GAMEOVER"));
/// ```
pub fn is_end_marker(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.trim().starts_with(marker)
}

/// Characters the recognizer is allowed to emit for `marker`
///
/// Deduplicated, in order of first appearance.
pub fn marker_alphabet(marker: &str) -> String {
    let mut alphabet = String::new();
    for c in marker.chars() {
        if !alphabet.contains(c) {
            alphabet.push(c);
        }
    }
    alphabet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_end_marker() {
        assert!(is_end_marker("GAMEOVER", END_MARKER));
        assert!(is_end_marker("GAMEOVER\n", END_MARKER));
        assert!(is_end_marker("  GAMEOVERR", END_MARKER));

        assert!(!is_end_marker("", END_MARKER));
        assert!(!is_end_marker("GAME", END_MARKER));
        assert!(!is_end_marker("AGAMEOVER", END_MARKER));
        assert!(!is_end_marker("gameover", END_MARKER));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        assert!(!is_end_marker("GAMEOVER", ""));
    }

    #[test]
    fn test_marker_alphabet() {
        assert_eq!(marker_alphabet("GAMEOVER"), "GAMEOVR");
        assert_eq!(marker_alphabet(""), "");
    }
}
