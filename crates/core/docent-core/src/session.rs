//! Conversation state for the room on screen

use crate::framing::{Reference, StreamEvent};
use crate::types::{ChatMessage, ChatRole, Evaluation, HistoryItem};
use tracing::debug;

/// One rendered turn of the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    /// Backend message id, known only for turns loaded from storage
    pub message_id: Option<String>,
    /// Speaker
    pub role: ChatRole,
    /// Turn text
    pub text: String,
    /// Grounding references (streamed answers only; stored turns carry
    /// label-only references)
    pub references: Vec<Reference>,
    /// Token count reported for this answer
    pub token_usage: Option<u64>,
    /// User rating
    pub evaluation: Evaluation,
}

impl ChatTurn {
    /// A user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            message_id: None,
            role: ChatRole::User,
            text: text.into(),
            references: Vec::new(),
            token_usage: None,
            evaluation: Evaluation::None,
        }
    }

    /// An assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            message_id: None,
            role: ChatRole::Assistant,
            text: text.into(),
            references: Vec::new(),
            token_usage: None,
            evaluation: Evaluation::None,
        }
    }
}

/// In-memory conversation state driving a UI
///
/// The session applies [`StreamEvent`]s from the frame parser and keeps the
/// loading flag honest: it turns on when an exchange begins and is
/// guaranteed off once the exchange ends, successfully or not.
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
    loading: bool,
}

impl ChatSession {
    /// An empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the conversation from stored messages
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        let turns = messages
            .into_iter()
            .map(|m| ChatTurn {
                message_id: m.id,
                role: m.role,
                text: m.message,
                // Stored messages keep display labels only.
                references: m
                    .references
                    .into_iter()
                    .map(|label| Reference::new(label, ""))
                    .collect(),
                token_usage: None,
                evaluation: m.evaluation,
            })
            .collect();
        Self {
            turns,
            loading: false,
        }
    }

    /// Append the user's message and mark the exchange in flight
    pub fn begin_exchange(&mut self, message: impl Into<String>) {
        self.turns.push(ChatTurn::user(message));
        self.loading = true;
    }

    /// Apply one parser event
    pub fn apply(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::AnswerStarted => {
                self.loading = false;
                self.turns.push(ChatTurn::assistant(String::new()));
            }
            StreamEvent::AnswerDelta(delta) => {
                if let Some(turn) = self.last_assistant_mut() {
                    turn.text.push_str(delta);
                }
            }
            StreamEvent::AnswerComplete(text) => {
                if let Some(turn) = self.last_assistant_mut() {
                    turn.text = text.clone();
                }
            }
            StreamEvent::TokenUsage(count) => {
                if let Some(turn) = self.last_assistant_mut() {
                    turn.token_usage = Some(*count);
                }
            }
            StreamEvent::References(references) => match self.last_assistant_mut() {
                Some(turn) => turn.references = references.clone(),
                None => debug!("dropping references: no assistant turn to attach to"),
            },
            StreamEvent::Completed => {
                self.loading = false;
            }
        }
    }

    /// Record a failed exchange
    ///
    /// Fills the empty assistant placeholder when one exists, otherwise
    /// appends a new assistant turn, and clears the loading flag.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.turns.last_mut() {
            Some(turn) if turn.role == ChatRole::Assistant && turn.text.is_empty() => {
                turn.text = message;
            }
            _ => self.turns.push(ChatTurn::assistant(message)),
        }
        self.loading = false;
    }

    /// Rate the most recent assistant turn; false when there is none
    pub fn set_last_evaluation(&mut self, evaluation: Evaluation) -> bool {
        match self.last_assistant_mut() {
            Some(turn) => {
                turn.evaluation = evaluation;
                true
            }
            None => false,
        }
    }

    /// Conversation history in the shape the send request expects
    pub fn history(&self) -> Vec<HistoryItem> {
        self.turns
            .iter()
            .map(|turn| HistoryItem {
                kind: turn.role,
                content: turn.text.clone(),
            })
            .collect()
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// True while an exchange is awaiting its first answer content
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// The most recent assistant turn
    pub fn last_assistant(&self) -> Option<&ChatTurn> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == ChatRole::Assistant)
    }

    fn last_assistant_mut(&mut self) -> Option<&mut ChatTurn> {
        self.turns
            .iter_mut()
            .rev()
            .find(|turn| turn.role == ChatRole::Assistant)
    }
}
