//! Plain-text rendering for the chat shell

use docent_core::framing::Reference;
use docent_core::types::{ChatRole, ChatRoom, Evaluation};
use docent_core::ChatTurn;

/// Room name derived from the first message: its first 20 characters
pub fn auto_room_name(message: &str) -> String {
    message.trim().chars().take(20).collect()
}

/// One line of the `/rooms` listing
pub fn room_line(number: usize, room: &ChatRoom, current: bool) -> String {
    let marker = if current { "*" } else { " " };
    match room.created_at {
        Some(ts) => format!(
            "{} {:>3}. {}  ({})",
            marker,
            number,
            room.name,
            ts.format("%Y-%m-%d %H:%M")
        ),
        None => format!("{} {:>3}. {}", marker, number, room.name),
    }
}

/// Numbered reference lines, one per entry
pub fn reference_lines(references: &[Reference]) -> Vec<String> {
    references
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if r.source.is_empty() {
                format!("  [{}] {}", i + 1, r.label)
            } else {
                format!("  [{}] {}  {}", i + 1, r.label, r.source)
            }
        })
        .collect()
}

/// A turn as reprinted by `/history`
pub fn turn_lines(turn: &ChatTurn) -> Vec<String> {
    let speaker = match turn.role {
        ChatRole::User => "You",
        ChatRole::Assistant => "Assistant",
    };
    let mut lines = vec![format!("{}: {}", speaker, turn.text)];
    lines.extend(reference_lines(&turn.references));
    if let Some(tokens) = turn.token_usage {
        lines.push(format!("  tokens used: {}", tokens));
    }
    match turn.evaluation {
        Evaluation::Good => lines.push("  rated: good".to_string()),
        Evaluation::Bad => lines.push("  rated: bad".to_string()),
        Evaluation::None => {}
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_room_name_counts_characters_not_bytes() {
        assert_eq!(auto_room_name("short"), "short");
        assert_eq!(
            auto_room_name("a message that runs longer than twenty characters"),
            "a message that runs "
        );
        // 25 multi-byte characters in, 20 out, no byte slicing panic
        let jp = "会議の資料について教えてください。よろしくお願いします";
        assert_eq!(auto_room_name(jp).chars().count(), 20);
        assert_eq!(auto_room_name("  padded  "), "padded");
    }

    #[test]
    fn test_reference_lines_are_numbered() {
        let refs = vec![
            Reference::new("a.pdf(p.1)", "https://blobs/a.pdf"),
            Reference::new("b.pdf(p.9)", ""),
        ];
        let lines = reference_lines(&refs);
        assert_eq!(lines[0], "  [1] a.pdf(p.1)  https://blobs/a.pdf");
        assert_eq!(lines[1], "  [2] b.pdf(p.9)");
    }

    #[test]
    fn test_turn_lines_include_metadata() {
        let mut turn = ChatTurn::assistant("see the report");
        turn.references = vec![Reference::new("r.pdf(p.2)", "r")];
        turn.token_usage = Some(33);
        turn.evaluation = Evaluation::Good;

        let lines = turn_lines(&turn);
        assert_eq!(lines[0], "Assistant: see the report");
        assert_eq!(lines[1], "  [1] r.pdf(p.2)  r");
        assert_eq!(lines[2], "  tokens used: 33");
        assert_eq!(lines[3], "  rated: good");
    }
}
