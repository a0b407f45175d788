//! Human-readable excerpts for document results.

/// Default excerpt width in characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// Excerpt of `body` around the earliest case-insensitive occurrence of any
/// of `tokens`.
///
/// With no occurrence, the first `width` characters followed by an
/// ellipsis. Otherwise a window of `width / 2` characters on each side of
/// the match, with an ellipsis on each side that does not reach the text
/// boundary. Widths count characters, not bytes.
pub fn extract_snippet(body: &str, tokens: &[String], width: usize) -> String {
    if body.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = body.chars().collect();
    let Some(pos) = earliest_match(body, tokens) else {
        let head: String = chars.iter().take(width).collect();
        return format!("{head}{ELLIPSIS}");
    };

    let half = width / 2;
    let start = pos.saturating_sub(half);
    let end = (pos + half).min(chars.len());

    let mut out = String::with_capacity(width + 2 * ELLIPSIS.len());
    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Character index in `body` where the earliest token occurrence starts.
fn earliest_match(body: &str, tokens: &[String]) -> Option<usize> {
    // Lowercasing may change byte lengths, so remember for every byte of the
    // lowered text which original character produced it.
    let mut lowered = String::with_capacity(body.len());
    let mut origin: Vec<usize> = Vec::with_capacity(body.len());
    for (char_idx, c) in body.chars().enumerate() {
        for lc in c.to_lowercase() {
            lowered.push(lc);
            origin.extend(std::iter::repeat(char_idx).take(lc.len_utf8()));
        }
    }

    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .filter_map(|t| lowered.find(&t.to_lowercase()))
        .min()
        .map(|byte| origin[byte])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn short_body_with_match_has_no_ellipsis() {
        let s = extract_snippet("Machine learning rocks", &toks(&["learning"]), 200);
        assert_eq!(s, "Machine learning rocks");
    }

    #[test]
    fn no_match_returns_head_with_ellipsis() {
        let body = "x".repeat(300);
        let s = extract_snippet(&body, &toks(&["absent"]), 200);
        assert_eq!(s.chars().count(), 203);
        assert!(s.ends_with("..."));

        assert_eq!(extract_snippet("tiny", &toks(&["absent"]), 200), "tiny...");
    }

    #[test]
    fn match_in_middle_is_centered() {
        let body = format!("{}needle{}", "a".repeat(500), "b".repeat(500));
        let s = extract_snippet(&body, &toks(&["NEEDLE"]), 200);
        assert!(s.starts_with("..."));
        assert!(s.ends_with("..."));
        assert!(s.contains("needle"));
        // 100 chars before the match + 100 from it, plus both ellipses.
        assert_eq!(s.chars().count(), 206);
        assert_eq!(&s[3..103], "a".repeat(100));
    }

    #[test]
    fn earliest_of_several_tokens_wins() {
        let body = format!("{} beta {} alpha", "z".repeat(150), "z".repeat(300));
        let s = extract_snippet(&body, &toks(&["alpha", "beta"]), 200);
        assert!(s.contains("beta"));
        assert!(!s.contains("alpha"));
    }

    #[test]
    fn multibyte_text_is_sliced_on_characters() {
        let body = format!("{}réseau{}", "é".repeat(150), "è".repeat(150));
        let s = extract_snippet(&body, &toks(&["réseau"]), 20);
        assert_eq!(s, format!("...{}réseau{}...", "é".repeat(10), "è".repeat(4)));
    }

    #[test]
    fn empty_body_gives_empty_snippet() {
        assert_eq!(extract_snippet("", &toks(&["x"]), 200), "");
    }
}
