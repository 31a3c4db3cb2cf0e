//! Channel plumbing for streamed chat exchanges

use crate::framing::{ChatOutcome, StreamEvent};
use crate::{DocentError, Result};
use tokio::sync::mpsc;

/// Stream of parser events
pub type EventStream = mpsc::Receiver<Result<StreamEvent>>;

/// Event stream sender
pub type EventStreamSender = mpsc::Sender<Result<StreamEvent>>;

/// Create a new event stream
pub fn create_event_stream(buffer_size: usize) -> (EventStreamSender, EventStream) {
    mpsc::channel(buffer_size)
}

/// Sending side of a streamed exchange
pub struct EventHandler {
    sender: EventStreamSender,
}

impl EventHandler {
    /// Create a handler around a sender
    pub fn new(sender: EventStreamSender) -> Self {
        Self { sender }
    }

    /// Forward one parser event
    pub async fn send_event(&self, event: StreamEvent) -> Result<()> {
        self.sender
            .send(Ok(event))
            .await
            .map_err(|e| DocentError::other(format!("Failed to send event: {}", e)))
    }

    /// Forward a stream failure
    pub async fn send_error(&self, error: DocentError) -> Result<()> {
        self.sender
            .send(Err(error))
            .await
            .map_err(|e| DocentError::other(format!("Failed to send error: {}", e)))
    }
}

/// Drain a stream into the outcome it described
///
/// Stops at [`StreamEvent::Completed`] or the first error.
pub async fn collect_outcome(mut stream: EventStream) -> Result<ChatOutcome> {
    let mut outcome = ChatOutcome::default();

    while let Some(event) = stream.recv().await {
        match event? {
            StreamEvent::AnswerStarted => {}
            StreamEvent::AnswerDelta(delta) => outcome.answer.push_str(&delta),
            StreamEvent::AnswerComplete(text) => outcome.answer = text,
            StreamEvent::TokenUsage(count) => outcome.token_usage = Some(count),
            StreamEvent::References(references) => outcome.references = references,
            StreamEvent::Completed => break,
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::Reference;

    #[tokio::test]
    async fn test_collect_outcome() {
        let (sender, receiver) = create_event_stream(16);
        let handler = EventHandler::new(sender);

        tokio::spawn(async move {
            handler.send_event(StreamEvent::AnswerStarted).await.unwrap();
            handler
                .send_event(StreamEvent::AnswerDelta("partial".to_string()))
                .await
                .unwrap();
            handler
                .send_event(StreamEvent::AnswerComplete("whole answer".to_string()))
                .await
                .unwrap();
            handler
                .send_event(StreamEvent::TokenUsage(8))
                .await
                .unwrap();
            handler
                .send_event(StreamEvent::References(vec![Reference::new(
                    "a.pdf(p.1)",
                    "a",
                )]))
                .await
                .unwrap();
            handler.send_event(StreamEvent::Completed).await.unwrap();
        });

        let outcome = collect_outcome(receiver).await.unwrap();
        assert_eq!(outcome.answer, "whole answer");
        assert_eq!(outcome.token_usage, Some(8));
        assert_eq!(outcome.references.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_outcome_surfaces_errors() {
        let (sender, receiver) = create_event_stream(4);
        let handler = EventHandler::new(sender);

        tokio::spawn(async move {
            handler
                .send_event(StreamEvent::AnswerDelta("part".to_string()))
                .await
                .unwrap();
            handler
                .send_error(DocentError::stream("connection reset"))
                .await
                .unwrap();
        });

        assert!(collect_outcome(receiver).await.is_err());
    }
}
