//! Incremental sentinel-marker parser for streamed chat responses
//!
//! The backend returns one `text/plain` body per exchange: answer text,
//! then an optional token-usage frame introduced by `<<USED_TOKEN_START>>`,
//! then a reference frame introduced by `<<REFERENCES_START>>` whose payload
//! runs to end of stream. Marker detection happens on the accumulated
//! buffer, so the outcome never depends on where the transport cut the
//! chunks: a marker split across two chunks is found once both halves
//! arrive.

use super::references::{decode_references, Reference};
use tracing::{debug, warn};

/// Marker that ends the answer text and starts the token-usage frame
pub const TOKEN_USAGE_MARKER: &str = "<<USED_TOKEN_START>>";

/// Marker that starts the reference frame
pub const REFERENCES_MARKER: &str = "<<REFERENCES_START>>";

/// Parser output, in emission order, consumed by the session layer
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// First answer content arrived; the UI clears its loading indicator
    /// and adds one empty assistant turn
    AnswerStarted,
    /// Raw answer text to append to the visible answer
    AnswerDelta(String),
    /// Authoritative answer text, trimmed once at the marker boundary;
    /// replaces everything appended so far
    AnswerComplete(String),
    /// Total token count reported by the backend
    TokenUsage(u64),
    /// Grounding references for the answer
    References(Vec<Reference>),
    /// The stream finished; loading must be clear after this
    Completed,
}

/// Everything a finished stream produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOutcome {
    /// Final answer text
    pub answer: String,
    /// Token count, when the stream carried a token frame
    pub token_usage: Option<u64>,
    /// References, empty when absent or malformed
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Answer,
    TokenUsage,
    References,
}

/// Splits a streamed chat response into answer, token usage, and references
///
/// One parser handles one response stream: feed every decoded chunk to
/// [`process_chunk`](Self::process_chunk), then call
/// [`finish`](Self::finish) exactly once when the transport reports end of
/// stream.
#[derive(Debug)]
pub struct StreamFrameParser {
    buffer: String,
    phase: Phase,
    started: bool,
    finished: bool,
    answer: String,
    token_usage: Option<u64>,
    references: Vec<Reference>,
}

impl Default for StreamFrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamFrameParser {
    /// Create a parser for a fresh response stream
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            phase: Phase::Answer,
            started: false,
            finished: false,
            answer: String::new(),
            token_usage: None,
            references: Vec::new(),
        }
    }

    /// Consume the next decoded chunk and return the events it produced
    pub fn process_chunk(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if chunk.is_empty() || self.finished {
            return events;
        }
        self.buffer.push_str(chunk);

        match self.phase {
            Phase::Answer => {
                if self.buffer.contains(TOKEN_USAGE_MARKER) {
                    self.split_off_answer(TOKEN_USAGE_MARKER, &mut events);
                    self.phase = Phase::TokenUsage;
                    // The same chunk may already close the token frame.
                    self.scan_token_frame(&mut events);
                } else if self.buffer.contains(REFERENCES_MARKER) {
                    // Production streams omit the token frame; the answer
                    // still ends at the first marker to arrive.
                    self.split_off_answer(REFERENCES_MARKER, &mut events);
                    self.phase = Phase::References;
                } else {
                    if !self.started {
                        self.started = true;
                        events.push(StreamEvent::AnswerStarted);
                    }
                    self.answer.push_str(chunk);
                    events.push(StreamEvent::AnswerDelta(chunk.to_string()));
                }
            }
            Phase::TokenUsage => self.scan_token_frame(&mut events),
            // The reference payload is one JSON document running to end of
            // stream; it is only parsed in finish().
            Phase::References => {}
        }
        events
    }

    /// Signal end of stream and return the closing events
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.finished = true;
        let rest = std::mem::take(&mut self.buffer);
        match self.phase {
            // No marker ever arrived: the deltas already carry the whole
            // answer, verbatim.
            Phase::Answer => {}
            Phase::TokenUsage => self.parse_token_frame(&rest, &mut events),
            Phase::References => self.parse_reference_frame(&rest, &mut events),
        }
        events.push(StreamEvent::Completed);
        events
    }

    /// What the stream produced so far
    pub fn outcome(&self) -> ChatOutcome {
        ChatOutcome {
            answer: self.answer.clone(),
            token_usage: self.token_usage,
            references: self.references.clone(),
        }
    }

    /// Finalize the answer from the buffer prefix before `marker` and drop
    /// both from the buffer
    fn split_off_answer(&mut self, marker: &str, events: &mut Vec<StreamEvent>) {
        let pos = match self.buffer.find(marker) {
            Some(pos) => pos,
            None => return,
        };
        let before = self.buffer[..pos].to_string();
        self.buffer.drain(..pos + marker.len());
        let cleaned = before.trim();
        if cleaned.is_empty() {
            return;
        }
        if !self.started {
            self.started = true;
            events.push(StreamEvent::AnswerStarted);
        }
        self.answer = cleaned.to_string();
        events.push(StreamEvent::AnswerComplete(cleaned.to_string()));
    }

    fn scan_token_frame(&mut self, events: &mut Vec<StreamEvent>) {
        if let Some(pos) = self.buffer.find(REFERENCES_MARKER) {
            let frame = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + REFERENCES_MARKER.len());
            self.parse_token_frame(&frame, events);
            self.phase = Phase::References;
        }
    }

    fn parse_token_frame(&mut self, frame: &str, events: &mut Vec<StreamEvent>) {
        let frame = frame.trim();
        match frame.parse::<u64>() {
            Ok(count) => {
                self.token_usage = Some(count);
                events.push(StreamEvent::TokenUsage(count));
            }
            Err(_) => {
                if !frame.is_empty() {
                    debug!("ignoring unparsable token frame: {:?}", frame);
                }
            }
        }
    }

    fn parse_reference_frame(&mut self, frame: &str, events: &mut Vec<StreamEvent>) {
        match decode_references(frame.trim()) {
            Ok(references) => {
                self.references = references.clone();
                events.push(StreamEvent::References(references));
            }
            // Malformed payloads degrade to an empty list; the answer
            // already reached the user.
            Err(e) => warn!("discarding malformed reference frame: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str =
        "hello<<USED_TOKEN_START>>42<<REFERENCES_START>>[[\"a.pdf(p.1)\",\"a\"]]";

    fn run(chunks: &[&str]) -> (Vec<StreamEvent>, ChatOutcome) {
        let mut parser = StreamFrameParser::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(parser.process_chunk(chunk));
        }
        events.extend(parser.finish());
        (events, parser.outcome())
    }

    fn canonical_outcome() -> ChatOutcome {
        ChatOutcome {
            answer: "hello".to_string(),
            token_usage: Some(42),
            references: vec![Reference::new("a.pdf(p.1)", "a")],
        }
    }

    #[test]
    fn test_full_stream_in_one_chunk() {
        let (events, outcome) = run(&[CANONICAL]);
        assert_eq!(outcome, canonical_outcome());
        assert_eq!(
            events,
            vec![
                StreamEvent::AnswerStarted,
                StreamEvent::AnswerComplete("hello".to_string()),
                StreamEvent::TokenUsage(42),
                StreamEvent::References(vec![Reference::new("a.pdf(p.1)", "a")]),
                StreamEvent::Completed,
            ]
        );
    }

    #[test]
    fn test_outcome_independent_of_two_way_splits() {
        for split in 0..=CANONICAL.len() {
            let (_, outcome) = run(&[&CANONICAL[..split], &CANONICAL[split..]]);
            assert_eq!(outcome, canonical_outcome(), "split at {}", split);
        }
    }

    #[test]
    fn test_outcome_independent_of_char_at_a_time_delivery() {
        let chunks: Vec<String> = CANONICAL.chars().map(|c| c.to_string()).collect();
        let refs: Vec<&str> = chunks.iter().map(|s| s.as_str()).collect();
        let (_, outcome) = run(&refs);
        assert_eq!(outcome, canonical_outcome());
    }

    #[test]
    fn test_partial_marker_across_chunks() {
        let (events, outcome) = run(&[
            "partial te",
            "xt<<USED_TOK",
            "EN_START>>15",
            "<<REFERENCES_START>>[]",
        ]);
        assert_eq!(outcome.answer, "partial text");
        assert_eq!(outcome.token_usage, Some(15));
        assert_eq!(outcome.references, vec![]);
        // The fragment was visible as a delta until the marker closed.
        assert!(events.contains(&StreamEvent::AnswerDelta("xt<<USED_TOK".to_string())));
        assert!(events.contains(&StreamEvent::AnswerComplete("partial text".to_string())));
        assert!(events.contains(&StreamEvent::References(vec![])));
    }

    #[test]
    fn test_no_marker_stream_is_verbatim() {
        let (events, outcome) = run(&["  hello ", "\nworld\n"]);
        assert_eq!(outcome.answer, "  hello \nworld\n");
        assert_eq!(outcome.token_usage, None);
        assert_eq!(outcome.references, vec![]);
        assert_eq!(
            events.iter().filter(|e| **e == StreamEvent::AnswerStarted).count(),
            1
        );
        assert_eq!(events.last(), Some(&StreamEvent::Completed));
    }

    #[test]
    fn test_reference_frame_without_token_frame() {
        // The production wire shape: the token frame is filtered out
        // upstream and references follow the answer directly.
        let (events, outcome) = run(&[
            "the answer",
            "\n<<REFERENCES_START>>\n[[\"doc.pdf(p.3)\",\"url\"]]\n",
        ]);
        assert_eq!(outcome.answer, "the answer");
        assert_eq!(outcome.token_usage, None);
        assert_eq!(outcome.references, vec![Reference::new("doc.pdf(p.3)", "url")]);
        assert!(events.contains(&StreamEvent::AnswerComplete("the answer".to_string())));
    }

    #[test]
    fn test_reference_payload_split_across_chunks() {
        let (_, outcome) = run(&[
            "a<<USED_TOKEN_START>>7<<REFERENCES_START>>[[\"x.pdf(p.1)\",",
            "\"x\"],[\"y.pdf(p.2)\",\"y\"]]",
        ]);
        assert_eq!(outcome.token_usage, Some(7));
        assert_eq!(
            outcome.references,
            vec![Reference::new("x.pdf(p.1)", "x"), Reference::new("y.pdf(p.2)", "y")]
        );
    }

    #[test]
    fn test_malformed_reference_payload_degrades_to_empty() {
        let (events, outcome) =
            run(&["fine<<USED_TOKEN_START>>3<<REFERENCES_START>>{broken"]);
        assert_eq!(outcome.answer, "fine");
        assert_eq!(outcome.token_usage, Some(3));
        assert_eq!(outcome.references, vec![]);
        // Still completes cleanly.
        assert_eq!(events.last(), Some(&StreamEvent::Completed));
    }

    #[test]
    fn test_token_frame_closed_by_end_of_stream() {
        let (_, outcome) = run(&["ans<<USED_TOKEN_START>>", "15"]);
        assert_eq!(outcome.answer, "ans");
        assert_eq!(outcome.token_usage, Some(15));
        assert_eq!(outcome.references, vec![]);
    }

    #[test]
    fn test_unparsable_token_frame_is_absent() {
        let (_, outcome) = run(&["ans<<USED_TOKEN_START>>n/a<<REFERENCES_START>>[]"]);
        assert_eq!(outcome.token_usage, None);
        assert_eq!(outcome.references, vec![]);
    }

    #[test]
    fn test_answer_finalization_replaces_deltas_once() {
        let mut parser = StreamFrameParser::new();
        let first = parser.process_chunk("he");
        assert_eq!(
            first,
            vec![
                StreamEvent::AnswerStarted,
                StreamEvent::AnswerDelta("he".to_string())
            ]
        );
        let second = parser.process_chunk("llo \n<<USED_TOKEN_START>>9");
        assert_eq!(second, vec![StreamEvent::AnswerComplete("hello".to_string())]);
        // Later chunks never touch the answer again.
        let third = parser.process_chunk(" trailing");
        assert_eq!(third, vec![]);
        parser.finish();
        assert_eq!(parser.outcome().answer, "hello");
    }

    #[test]
    fn test_markers_only_stream_has_empty_answer() {
        let (events, outcome) = run(&["<<USED_TOKEN_START>>5<<REFERENCES_START>>[]"]);
        assert_eq!(outcome.answer, "");
        assert_eq!(outcome.token_usage, Some(5));
        assert!(!events.contains(&StreamEvent::AnswerStarted));
        assert!(!events
            .iter()
            .any(|e| matches!(e, StreamEvent::AnswerComplete(_))));
    }

    #[test]
    fn test_empty_stream_completes() {
        let (events, outcome) = run(&[]);
        assert_eq!(events, vec![StreamEvent::Completed]);
        assert_eq!(outcome, ChatOutcome::default());
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut parser = StreamFrameParser::new();
        parser.process_chunk("hi");
        assert_eq!(parser.finish().last(), Some(&StreamEvent::Completed));
        assert_eq!(parser.finish(), vec![]);
    }
}
