//! Tests for CompletionClient

use super::CompletionClient;
use crate::config::{ClientConfig, ProviderConfig};
use crate::error::{ChatGateError, UpstreamFailure};
use crate::llm::messages::{LlmMessage, LlmResponse};
use crate::llm::providers::MockChatTransport;
use crate::llm::request::ChatRequest;
use crate::llm::tools::{ToolCall, WEB_SEARCH_TOOL};
use crate::recovery::{GateConfig, RequestGate};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn conversation() -> Vec<LlmMessage> {
    vec![
        LlmMessage::system("You are an analyst"),
        LlmMessage::user("Company X"),
    ]
}

fn search_turn() -> LlmResponse {
    LlmResponse::with_tool_calls(
        "",
        vec![ToolCall::new(
            "call_1",
            WEB_SEARCH_TOOL,
            r#"{"search_result":{"search_id":"s1"}}"#,
        )],
    )
}

fn client(transport: MockChatTransport) -> CompletionClient {
    CompletionClient::with_transport(ClientConfig::default(), Arc::new(transport)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_simple_chat_never_reports_search() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_complete()
        .times(1)
        .withf(|request| request.tools.is_empty())
        .returning(|_| Ok(LlmResponse::new("Company X is a retailer.")));

    let outcome = client(transport).simple_chat(&conversation()).await.unwrap();

    assert_eq!(outcome.content, "Company X is a retailer.");
    assert!(!outcome.used_web_search);
    assert_eq!(outcome.search_info, None);
    assert_eq!(outcome.retries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_web_search_flow() {
    let mut transport = MockChatTransport::new();
    let mut turn = 0;
    transport.expect_complete().times(2).returning(move |_| {
        turn += 1;
        Ok(if turn == 1 {
            search_turn()
        } else {
            LlmResponse::new("Latest news on Company X.")
        })
    });

    let outcome = client(transport)
        .chat_with_web_search(&conversation())
        .await
        .unwrap();

    assert!(outcome.used_web_search);
    assert!(outcome.search_info.unwrap().search_performed);
    assert_eq!(outcome.turns, 2);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_restarts_from_original_conversation() {
    let sent: Arc<Mutex<Vec<ChatRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let mut transport = MockChatTransport::new();
    let recorder = Arc::clone(&sent);
    transport.expect_complete().times(3).returning(move |request| {
        let mut sent = recorder.lock();
        sent.push(request.clone());
        match sent.len() {
            1 => Ok(search_turn()),
            2 => Err(UpstreamFailure::http(429, "Too Many Requests")),
            _ => Ok(LlmResponse::new("answer")),
        }
    });

    let start = Instant::now();
    let outcome = client(transport)
        .chat_with_web_search(&conversation())
        .await
        .unwrap();

    let sent = sent.lock();
    assert_eq!(sent[0].messages, conversation());
    assert_eq!(sent[1].messages.len(), 4);
    // no tool-call residue after the restart
    assert_eq!(sent[2].messages, conversation());
    assert_eq!(
        serde_json::to_string(&sent[2].messages).unwrap(),
        serde_json::to_string(&conversation()).unwrap()
    );

    assert_eq!(outcome.retries, 1);
    assert_eq!(outcome.turns, 1);
    assert!(!outcome.used_web_search);
    assert!(start.elapsed() >= Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_persistent_rate_limit_fails_with_max_retries() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_complete()
        .times(6)
        .returning(|_| Err(UpstreamFailure::http(429, "Too Many Requests")));

    let start = Instant::now();
    let err = client(transport)
        .chat_with_web_search(&conversation())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ChatGateError::MaxRetriesExceeded { attempts: 5, .. }
    ));
    assert!(start.elapsed() >= Duration::from_secs(5 * 30));
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_is_not_retried() {
    let mut transport = MockChatTransport::new();
    transport.expect_complete().times(1).returning(|_| {
        Err(UpstreamFailure::http(401, "Invalid Authentication")
            .with_error_type("invalid_authentication_error"))
    });

    let err = client(transport).simple_chat(&conversation()).await.unwrap_err();

    assert_eq!(
        err,
        ChatGateError::upstream_with_provider(
            "status 401: Invalid Authentication",
            Some(401),
            "moonshot"
        )
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_conversation_is_rejected() {
    let mut transport = MockChatTransport::new();
    transport.expect_complete().times(0);

    let err = client(transport).simple_chat(&[]).await.unwrap_err();
    assert_eq!(err.error_code(), "CHATGATE_INVALID_INPUT");
    assert_eq!(err.context(), Some("messages"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_invocations_are_spaced() {
    let dispatched: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let mut transport = MockChatTransport::new();
    let recorder = Arc::clone(&dispatched);
    transport.expect_complete().times(2).returning(move |_| {
        recorder.lock().push(Instant::now());
        Ok(LlmResponse::new("ok"))
    });

    let client = client(transport);
    let (first_messages, second_messages) = (conversation(), conversation());
    let (first, second) = tokio::join!(
        client.simple_chat(&first_messages),
        client.simple_chat(&second_messages)
    );
    first.unwrap();
    second.unwrap();

    let dispatched = dispatched.lock();
    assert!(dispatched[1].duration_since(dispatched[0]) >= Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expires_while_queued() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_complete()
        .times(1)
        .returning(|_| Ok(LlmResponse::new("ok")));

    let client = client(transport).with_deadline(Duration::from_secs(5));
    client.simple_chat(&conversation()).await.unwrap();

    // next slot opens 25s later, past the deadline
    let err = client.simple_chat(&conversation()).await.unwrap_err();
    assert_eq!(err, ChatGateError::timeout(Duration::from_secs(5)));
    assert_eq!(client.gate().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sub_second_deadline_keeps_precision() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_complete()
        .times(1)
        .returning(|_| Ok(LlmResponse::new("ok")));

    let client = client(transport).with_deadline(Duration::from_millis(500));
    client.simple_chat(&conversation()).await.unwrap();

    let err = client.simple_chat(&conversation()).await.unwrap_err();
    assert_eq!(err, ChatGateError::timeout(Duration::from_millis(500)));
    assert_eq!(err.to_string(), "Invocation timeout after 500ms");
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_abandons_pending_retry() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_complete()
        .times(1)
        .returning(|_| Err(UpstreamFailure::http(429, "Too Many Requests")));

    let token = CancellationToken::new();
    let client = client(transport).with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        token.cancel();
    });

    let err = client.simple_chat(&conversation()).await.unwrap_err();
    canceller.await.unwrap();

    assert_eq!(err, ChatGateError::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_clients_can_share_a_gate() {
    let dispatched: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let make_transport = |dispatched: Arc<Mutex<Vec<Instant>>>| {
        let mut transport = MockChatTransport::new();
        transport.expect_complete().times(1).returning(move |_| {
            dispatched.lock().push(Instant::now());
            Ok(LlmResponse::new("ok"))
        });
        transport
    };

    let first = client(make_transport(Arc::clone(&dispatched)));
    let second = client(make_transport(Arc::clone(&dispatched))).with_gate(first.gate().clone());
    assert_eq!(first.gate().config(), &GateConfig::default());

    let (first_messages, second_messages) = (conversation(), conversation());
    let (a, b) = tokio::join!(
        first.simple_chat(&first_messages),
        second.simple_chat(&second_messages)
    );
    a.unwrap();
    b.unwrap();

    let dispatched = dispatched.lock();
    assert!(dispatched[1].duration_since(dispatched[0]) >= Duration::from_secs(25));
}

#[test]
fn test_clients_built_per_request_share_one_gate() {
    let gate = RequestGate::new(GateConfig::default());
    let config = ClientConfig::default()
        .with_provider(ProviderConfig::default().with_api_key("sk-test"));

    let first = CompletionClient::with_shared_gate(config.clone(), gate.clone()).unwrap();
    let second = CompletionClient::with_shared_gate(config, gate.clone()).unwrap();

    gate.shutdown();
    assert!(first.gate().is_closed());
    assert!(second.gate().is_closed());
}
