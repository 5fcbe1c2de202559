use crate::models::ChatTurn;

/// Trims surrounding whitespace and caps length at `max_chars` characters
/// (not bytes), appending an ellipsis marker when truncation happened.
/// Returns an empty string for whitespace-only input; callers treat that as
/// "no content".
#[must_use]
pub fn sanitize_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > max_chars {
        let mut capped: String = trimmed.chars().take(max_chars).collect();
        capped.push_str("...");
        capped
    } else {
        trimmed.to_string()
    }
}

/// Keeps the most recent `max` turns, preserving order. The front of the
/// transcript is the part that gets dropped.
#[must_use]
pub fn truncate_history(mut turns: Vec<ChatTurn>, max: usize) -> Vec<ChatTurn> {
    if turns.len() > max {
        turns.split_off(turns.len() - max)
    } else {
        turns
    }
}

/// Route-side hygiene for inbound transcripts: sanitizes every turn's
/// content, drops turns left empty, then keeps only the most recent
/// `max_turns`.
#[must_use]
pub fn clean_history(turns: Vec<ChatTurn>, max_chars: usize, max_turns: usize) -> Vec<ChatTurn> {
    let cleaned: Vec<ChatTurn> = turns
        .into_iter()
        .filter_map(|mut turn| {
            turn.content = sanitize_text(&turn.content, max_chars);
            if turn.content.is_empty() {
                None
            } else {
                Some(turn)
            }
        })
        .collect();
    truncate_history(cleaned, max_turns)
}

/// Strips one layer of wrapping quotes (double or single) that models
/// sometimes put around a drafted message, then trims.
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
}

/// Renders a transcript as prompt context, one turn per line:
/// `[timestamp] sender: content`, with the timestamp prefix omitted when
/// absent.
#[must_use]
pub fn format_history(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(|turn| match &turn.timestamp {
            Some(ts) if !ts.is_empty() => {
                format!("[{ts}] {}: {}", turn.sender, turn.content)
            }
            _ => format!("{}: {}", turn.sender, turn.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_whitespace() {
        assert_eq!(sanitize_text("  hello there \n", 100), "hello there");
        assert_eq!(sanitize_text(" \t\n ", 100), "");
    }

    #[test]
    fn test_sanitize_truncates_long_text_with_marker() {
        let long = "a".repeat(50);
        let sanitized = sanitize_text(&long, 10);
        assert_eq!(sanitized, format!("{}...", "a".repeat(10)));
    }

    #[test]
    fn test_sanitize_counts_chars_not_bytes() {
        // Four multi-byte chars; a byte-based cut would split one of them.
        let text = "ééééé";
        let sanitized = sanitize_text(text, 4);
        assert_eq!(sanitized, "éééé...");
    }

    #[test]
    fn test_strip_quotes_unwraps_one_layer() {
        assert_eq!(strip_quotes("\"Hello there\""), "Hello there");
        assert_eq!(strip_quotes("'Hello there'"), "Hello there");
        assert_eq!(strip_quotes("  \"Hello\" "), "Hello");
        // Interior quotes survive.
        assert_eq!(strip_quotes("She said \"hi\" today"), "She said \"hi\" today");
    }

    #[test]
    fn test_truncate_history_keeps_most_recent() {
        let turns: Vec<ChatTurn> = (0..10)
            .map(|i| ChatTurn::new("client", format!("message {i}")))
            .collect();
        let kept = truncate_history(turns, 3);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].content, "message 7");
        assert_eq!(kept[2].content, "message 9");
    }

    #[test]
    fn test_truncate_history_noop_when_under_limit() {
        let turns = vec![ChatTurn::new("client", "only one")];
        let kept = truncate_history(turns.clone(), 500);
        assert_eq!(kept, turns);
    }

    #[test]
    fn test_clean_history_drops_empty_and_caps_length() {
        let turns = vec![
            ChatTurn::new("client", "   "),
            ChatTurn::new("client", "first real message"),
            ChatTurn::new("case_manager", "x".repeat(30)),
            ChatTurn::new("client", "latest"),
        ];
        let cleaned = clean_history(turns, 10, 2);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].content, format!("{}...", "x".repeat(10)));
        assert_eq!(cleaned[1].content, "latest");
    }

    #[test]
    fn test_format_history_with_and_without_timestamps() {
        let mut with_ts = ChatTurn::new("client", "See you Tuesday");
        with_ts.timestamp = Some("2025-03-04T10:00:00Z".to_string());
        let without_ts = ChatTurn::new("case_manager", "Noted");

        let rendered = format_history(&[with_ts, without_ts]);
        assert_eq!(
            rendered,
            "[2025-03-04T10:00:00Z] client: See you Tuesday\ncase_manager: Noted"
        );
    }
}
