//! Chat room and message endpoints, including the streamed exchange

use docent_core::framing::{ChatOutcome, StreamEvent, StreamFrameParser, Utf8StreamDecoder};
use docent_core::streaming::{create_event_stream, EventHandler, EventStream};
use docent_core::types::{AckResponse, ChatMessage, ChatMessageRequest, ChatRoom, Evaluation};
use docent_core::{DocentError, Result};
use serde::Serialize;

use crate::ApiClient;

#[derive(Debug, Serialize)]
struct UpdateChatRoomBody<'a> {
    chat_room_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteChatRoomBody<'a> {
    chat_room_id: &'a str,
}

#[derive(Debug, Serialize)]
struct EvaluationBody<'a> {
    message_id: &'a str,
    evaluation: &'a str,
}

impl ApiClient {
    /// List all chat rooms in server order (oldest first)
    pub async fn list_chat_rooms(&self) -> Result<Vec<ChatRoom>> {
        self.send_json(self.client.get(self.url("/chat_rooms"))).await
    }

    /// Fetch a single chat room
    pub async fn get_chat_room(&self, chat_room_id: &str) -> Result<ChatRoom> {
        self.send_json(
            self.client
                .get(self.url("/chat_room"))
                .query(&[("chat_room_id", chat_room_id)]),
        )
        .await
    }

    /// Create a chat room with the server-side default name
    pub async fn create_chat_room(&self) -> Result<ChatRoom> {
        self.send_json(self.client.post(self.url("/chat_rooms"))).await
    }

    /// Update a room's name and/or custom prompt
    pub async fn update_chat_room(
        &self,
        chat_room_id: &str,
        name: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<ChatRoom> {
        let body = UpdateChatRoomBody {
            chat_room_id,
            name,
            prompt,
        };
        self.send_json(self.client.put(self.url("/chat_rooms")).json(&body))
            .await
    }

    /// Delete a chat room
    pub async fn delete_chat_room(&self, chat_room_id: &str) -> Result<AckResponse> {
        let body = DeleteChatRoomBody { chat_room_id };
        self.send_json(self.client.delete(self.url("/chat_rooms")).json(&body))
            .await
    }

    /// List the stored messages of a room, oldest first
    pub async fn list_chat_messages(&self, chat_room_id: &str) -> Result<Vec<ChatMessage>> {
        self.send_json(
            self.client
                .get(self.url("/chat_messages"))
                .query(&[("chat_room_id", chat_room_id)]),
        )
        .await
    }

    /// Rate an answer
    pub async fn update_evaluation(
        &self,
        message_id: &str,
        evaluation: Evaluation,
    ) -> Result<AckResponse> {
        let body = EvaluationBody {
            message_id,
            evaluation: evaluation.as_str(),
        };
        self.send_json(
            self.client
                .put(self.url("/chat_message/evaluation"))
                .json(&body),
        )
        .await
    }

    /// Send a chat message and stream the framed answer
    ///
    /// Parser events are handed to `on_event` in order as chunks arrive. A
    /// non-2xx status is mapped before any streaming starts; a transport
    /// failure mid-stream surfaces as [`DocentError::Stream`].
    pub async fn send_chat_message<F>(
        &self,
        request: &ChatMessageRequest,
        mut on_event: F,
    ) -> Result<ChatOutcome>
    where
        F: FnMut(&StreamEvent),
    {
        let mut resp = self
            .send(self.client.post(self.url("/chat_messages")).json(request))
            .await?;

        let mut decoder = Utf8StreamDecoder::new();
        let mut parser = StreamFrameParser::new();
        loop {
            let chunk = match resp.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => return Err(DocentError::stream(e.to_string())),
            };
            let text = decoder.decode(&chunk);
            for event in parser.process_chunk(&text) {
                on_event(&event);
            }
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            for event in parser.process_chunk(&tail) {
                on_event(&event);
            }
        }
        for event in parser.finish() {
            on_event(&event);
        }
        Ok(parser.outcome())
    }

    /// Send a chat message, delivering events over a channel
    ///
    /// The exchange runs on a spawned task; the returned receiver yields
    /// events as they are parsed. A failure arrives as the final `Err` item.
    pub fn send_chat_message_events(&self, request: ChatMessageRequest) -> EventStream {
        let (sender, receiver) = create_event_stream(64);
        let client = self.clone();
        tokio::spawn(async move {
            let handler = EventHandler::new(sender);
            if let Err(e) = client.stream_exchange(&request, &handler).await {
                let _ = handler.send_error(e).await;
            }
        });
        receiver
    }

    async fn stream_exchange(
        &self,
        request: &ChatMessageRequest,
        handler: &EventHandler,
    ) -> Result<()> {
        let mut resp = self
            .send(self.client.post(self.url("/chat_messages")).json(request))
            .await?;

        let mut decoder = Utf8StreamDecoder::new();
        let mut parser = StreamFrameParser::new();
        loop {
            let chunk = match resp.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => return Err(DocentError::stream(e.to_string())),
            };
            let text = decoder.decode(&chunk);
            for event in parser.process_chunk(&text) {
                handler.send_event(event).await?;
            }
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            for event in parser.process_chunk(&tail) {
                handler.send_event(event).await?;
            }
        }
        for event in parser.finish() {
            handler.send_event(event).await?;
        }
        Ok(())
    }
}
