// End-to-end client tests against a mock backend: request shapes, the
// error mapping of the request wrapper, and the streamed chat exchange
// driven through the real decoder and frame parser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docent_client::{ApiClient, ClientConfig};
use docent_core::framing::{Reference, StreamEvent};
use docent_core::streaming::collect_outcome;
use docent_core::types::{ChatMessageRequest, Evaluation};
use docent_core::{ChatSession, DocentError, RoomStore};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new(server.uri()).with_session_cookie("tok-1"))
}

fn send_request(room_id: &str, message: &str) -> ChatMessageRequest {
    ChatMessageRequest {
        chat_room_id: room_id.to_string(),
        message: message.to_string(),
        assistant_prompt: None,
        is_active_assistant_prompt: false,
        chat_history: vec![],
        index_type: vec!["idx-1".to_string()],
        index_type_details: vec![],
        model: "gpt-4o-mini".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Request wrapper: cookie, error detail, unauthorized hook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_carry_the_session_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat_rooms"))
        .and(header("cookie", "session_token=tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let rooms = test_client(&server).list_chat_rooms().await.unwrap();
    assert!(rooms.is_empty());
}

#[tokio::test]
async fn error_detail_reaches_the_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat_messages"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"detail": "quota exceeded"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = ChatSession::new();
    session.begin_exchange("why is the sky blue?");

    let err = client
        .send_chat_message(&send_request("room-1", "why is the sky blue?"), |_| {})
        .await
        .unwrap_err();
    session.fail(err.user_message());

    match &err {
        DocentError::Api { status, detail } => {
            assert_eq!(*status, 429);
            assert_eq!(detail, "quota exceeded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(session.last_assistant().unwrap().text, "quota exceeded");
    assert!(!session.loading());
}

#[tokio::test]
async fn plain_text_error_bodies_are_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat_rooms"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = test_client(&server).list_chat_rooms().await.unwrap_err();
    match err {
        DocentError::Api { status, detail } => {
            assert_eq!(status, 502);
            assert_eq!(detail, "upstream exploded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_invokes_the_unauthorized_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let client = test_client(&server).on_unauthorized(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let err = client.user_info().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Streamed chat exchange
// ---------------------------------------------------------------------------

#[tokio::test]
async fn streamed_answer_is_split_into_frames() {
    let server = MockServer::start().await;
    let body = "partial text<<USED_TOKEN_START>>15<<REFERENCES_START>>[]";
    Mock::given(method("POST"))
        .and(path("/chat_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut events = Vec::new();
    let outcome = client
        .send_chat_message(&send_request("room-1", "q"), |event| {
            events.push(event.clone());
        })
        .await
        .unwrap();

    assert_eq!(outcome.answer, "partial text");
    assert_eq!(outcome.token_usage, Some(15));
    assert!(outcome.references.is_empty());

    assert_eq!(events.first(), Some(&StreamEvent::AnswerStarted));
    assert_eq!(events.last(), Some(&StreamEvent::Completed));
    assert!(events.contains(&StreamEvent::AnswerComplete("partial text".to_string())));
}

#[tokio::test]
async fn reference_only_stream_parses_without_token_frame() {
    let server = MockServer::start().await;
    let body = concat!(
        "the report covers Q3  ",
        "<<REFERENCES_START>>",
        r#"[["report.pdf(p.7)","https://blobs/report.pdf"]]"#
    );
    Mock::given(method("POST"))
        .and(path("/chat_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(&server)
        .await;

    let outcome = test_client(&server)
        .send_chat_message(&send_request("room-1", "q"), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.answer, "the report covers Q3");
    assert_eq!(outcome.token_usage, None);
    assert_eq!(
        outcome.references,
        vec![Reference::new("report.pdf(p.7)", "https://blobs/report.pdf")]
    );
}

#[tokio::test]
async fn channel_variant_delivers_the_same_outcome() {
    let server = MockServer::start().await;
    let body = "hello<<USED_TOKEN_START>>42<<REFERENCES_START>>[[\"a.pdf(p.1)\",\"a\"]]";
    Mock::given(method("POST"))
        .and(path("/chat_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(&server)
        .await;

    let stream = test_client(&server).send_chat_message_events(send_request("room-1", "q"));
    let outcome = collect_outcome(stream).await.unwrap();

    assert_eq!(outcome.answer, "hello");
    assert_eq!(outcome.token_usage, Some(42));
    assert_eq!(outcome.references, vec![Reference::new("a.pdf(p.1)", "a")]);
}

#[tokio::test]
async fn channel_variant_surfaces_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat_messages"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "llm down"})),
        )
        .mount(&server)
        .await;

    let stream = test_client(&server).send_chat_message_events(send_request("room-1", "q"));
    let err = collect_outcome(stream).await.unwrap_err();
    assert_eq!(err.user_message(), "llm down");
}

// ---------------------------------------------------------------------------
// Room CRUD wire shapes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn room_lookup_uses_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat_room"))
        .and(query_param("chat_room_id", "room-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "room-9",
            "name": "Quarterly numbers"
        })))
        .mount(&server)
        .await;

    let room = test_client(&server).get_chat_room("room-9").await.unwrap();
    assert_eq!(room.name, "Quarterly numbers");
}

#[tokio::test]
async fn room_delete_sends_the_id_in_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/chat_rooms"))
        .and(body_json(serde_json::json!({"chat_room_id": "room-3"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
        )
        .mount(&server)
        .await;

    let ack = test_client(&server).delete_chat_room("room-3").await.unwrap();
    assert!(ack.ok());
}

#[tokio::test]
async fn evaluation_uses_lowercase_wire_strings() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/chat_message/evaluation"))
        .and(body_json(serde_json::json!({
            "message_id": "m-2",
            "evaluation": "good"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
        )
        .mount(&server)
        .await;

    let ack = test_client(&server)
        .update_evaluation("m-2", Evaluation::Good)
        .await
        .unwrap();
    assert!(ack.ok());
}

// ---------------------------------------------------------------------------
// Optimistic delete rollback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_delete_restores_the_room_where_it_was() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/chat_rooms"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "db locked"})),
        )
        .mount(&server)
        .await;

    let rooms: Vec<docent_core::types::ChatRoom> = serde_json::from_value(serde_json::json!([
        {"id": "room-1", "name": "first"},
        {"id": "room-2", "name": "second"},
        {"id": "room-3", "name": "third"}
    ]))
    .unwrap();
    let mut store = RoomStore::new();
    store.replace_all(rooms);

    // Remove locally first, then ask the backend.
    let snapshot = store.remove("room-2").unwrap();
    let result = test_client(&server).delete_chat_room("room-2").await;
    assert!(result.is_err());
    store.restore(snapshot);

    let names: Vec<&str> = store.rooms().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}
