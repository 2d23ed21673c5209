//! Splitting long replies for transports with a message size cap.

/// Split `text` into parts of at most `max_len` characters.
///
/// Cuts prefer, in order: just after a sentence terminator, a line break,
/// any whitespace. A run with no whitespace at all is cut hard at
/// `max_len`. Formatting inside each part is left untouched.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut parts = Vec::new();
    let mut rest = text.trim();

    while rest.chars().count() > max_len {
        let hard_cut = rest.char_indices().nth(max_len).map_or(rest.len(), |(i, _)| i);
        // Look one char past the limit so a boundary right at it still counts.
        let window_end = rest.char_indices().nth(max_len + 1).map_or(rest.len(), |(i, _)| i);
        let cut = best_cut(&rest[..window_end]).unwrap_or(hard_cut);

        let (head, tail) = rest.split_at(cut);
        let head = head.trim_end();
        if !head.is_empty() {
            parts.push(head.to_string());
        }
        rest = tail.trim_start();
    }

    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

fn best_cut(window: &str) -> Option<usize> {
    let mut sentence = None;
    let mut newline = None;
    let mut space = None;
    let mut prev = None;

    for (i, c) in window.char_indices() {
        if c.is_whitespace() && i > 0 {
            if matches!(prev, Some('.' | '!' | '?' | '؟')) {
                sentence = Some(i);
            }
            if c == '\n' {
                newline = Some(i);
            }
            space = Some(i);
        }
        prev = Some(c);
    }
    sentence.or(newline).or(space)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_untouched() {
        assert_eq!(split_message("Hello there.", 4096), vec!["Hello there."]);
        assert!(split_message("   ", 10).is_empty());
    }

    #[test]
    fn test_splits_on_sentence_boundary() {
        let text = "First sentence here. Second one is longer than that.";
        let parts = split_message(text, 30);
        assert_eq!(parts, vec!["First sentence here.", "Second one is longer than", "that."]);
    }

    #[test]
    fn test_every_part_within_limit() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(200);
        for part in split_message(&text, 4096) {
            assert!(part.chars().count() <= 4096);
        }
    }

    #[test]
    fn test_unbroken_run_is_hard_cut() {
        let text = "x".repeat(25);
        let parts = split_message(&text, 10);
        assert_eq!(parts, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_boundary_exactly_at_limit() {
        let parts = split_message("abcd. efgh", 5);
        assert_eq!(parts, vec!["abcd.", "efgh"]);
    }

    #[test]
    fn test_arabic_counts_chars() {
        let text = "مرحبا بكم. كيف حالكم؟ نحن هنا للمساعدة.";
        let parts = split_message(text, 12);
        for part in &parts {
            assert!(part.chars().count() <= 12);
        }
        assert_eq!(parts[0], "مرحبا بكم.");
    }

    #[test]
    fn test_prefers_line_break_over_space() {
        let text = "line one\nline two has more";
        let parts = split_message(text, 22);
        assert_eq!(parts, vec!["line one", "line two has more"]);
    }
}
