//! End-to-end scenarios for CompletionClient over a scripted transport
//!
//! All timing runs on tokio's paused clock, so the 25s gate spacing and the
//! 30s..300s backoff waits complete instantly.

use async_trait::async_trait;
use chatgate_core::error::{ChatGateError, UpstreamFailure};
use chatgate_core::llm::{ChatRequest, ChatTransport, LlmMessage, LlmResponse, ToolCall, ToolDeclaration, WEB_SEARCH_TOOL};
use chatgate_core::{ClientConfig, CompletionClient, GateConfig, ToolLoopConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

type Reply = Result<LlmResponse, UpstreamFailure>;

/// Replays canned replies in order and records every request it receives
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<(Instant, ChatRequest)>>,
}

impl ScriptedTransport {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    fn dispatch_times(&self) -> Vec<Instant> {
        self.requests.lock().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse, UpstreamFailure> {
        self.requests.lock().push((Instant::now(), request.clone()));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamFailure::network("script exhausted")))
    }
}

fn conversation() -> Vec<LlmMessage> {
    vec![
        LlmMessage::system("You are an analyst"),
        LlmMessage::user("Company X"),
    ]
}

fn search_turn(id: &str) -> Reply {
    Ok(LlmResponse::with_tool_calls(
        "",
        vec![ToolCall::new(id, WEB_SEARCH_TOOL, r#"{"search_result":{"search_id":"s1"}}"#)],
    ))
}

fn rate_limited() -> Reply {
    Err(UpstreamFailure::http(429, "Too Many Requests").with_error_type("rate_limit_reached_error"))
}

fn client_over(transport: &Arc<ScriptedTransport>, config: ClientConfig) -> CompletionClient {
    CompletionClient::with_transport(config, Arc::clone(transport) as Arc<dyn ChatTransport>)
        .expect("valid config")
}

#[tokio::test(start_paused = true)]
async fn immediate_stop_yields_plain_answer() {
    let transport = ScriptedTransport::new([Ok(LlmResponse::new("Company X sells widgets."))]);
    let client = client_over(&transport, ClientConfig::default());

    let outcome = client.chat_with_web_search(&conversation()).await.unwrap();

    assert_eq!(outcome.content, "Company X sells widgets.");
    assert!(!outcome.used_web_search);
    assert!(outcome.search_info.is_none());

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["usedWebSearch"], false);
    assert!(json["searchInfo"].is_null());
}

#[tokio::test(start_paused = true)]
async fn search_then_stop_reports_search() {
    let transport = ScriptedTransport::new([
        search_turn("call_1"),
        Ok(LlmResponse::new("Company X announced results today.")),
    ]);
    let client = client_over(&transport, ClientConfig::default());

    let outcome = client.chat_with_web_search(&conversation()).await.unwrap();

    assert!(outcome.used_web_search);
    assert!(outcome.search_info.as_ref().unwrap().search_performed);
    assert_eq!(outcome.turns, 2);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools, vec![ToolDeclaration::web_search()]);
    assert_eq!(requests[1].messages.len(), 4);

    // the follow-up turn waits for its own gate slot
    let times = transport.dispatch_times();
    assert!(times[1].duration_since(times[0]) >= Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn five_rate_limits_in_a_row_exhaust_the_budget() {
    let transport = ScriptedTransport::new(std::iter::repeat_with(rate_limited).take(10));
    let client = client_over(&transport, ClientConfig::default());

    let start = Instant::now();
    let err = client.simple_chat(&conversation()).await.unwrap_err();

    match err {
        ChatGateError::MaxRetriesExceeded { attempts, last_error } => {
            assert_eq!(attempts, 5);
            assert!(last_error.contains("429"));
        }
        other => panic!("expected MaxRetriesExceeded, got {:?}", other),
    }
    assert_eq!(transport.requests().len(), 6);
    assert!(start.elapsed() >= Duration::from_secs(5 * 30));

    // waits never shrink and stay within [30s, 300s]
    let times = transport.dispatch_times();
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1].duration_since(w[0])).collect();
    for pair in gaps.windows(2) {
        assert!(pair[1] >= pair[0], "gaps shrank: {:?}", gaps);
    }
    for gap in &gaps {
        assert!(*gap >= Duration::from_secs(30));
        assert!(*gap <= Duration::from_secs(300 + 1));
    }
}

#[tokio::test(start_paused = true)]
async fn upstream_retry_after_hint_sets_the_backoff() {
    let hinted = || -> Reply {
        Err(UpstreamFailure::http(429, "Too Many Requests").with_retry_after(Duration::from_secs(40)))
    };
    let transport = ScriptedTransport::new([
        hinted(),
        hinted(),
        Ok(LlmResponse::new("Company X sells widgets.")),
    ]);
    let config = ClientConfig::default().with_gate(GateConfig::unthrottled());
    let client = client_over(&transport, config);

    let outcome = client.simple_chat(&conversation()).await.unwrap();
    assert_eq!(outcome.retries, 2);

    let times = transport.dispatch_times();
    assert_eq!(times[1].duration_since(times[0]), Duration::from_secs(40));
    assert_eq!(times[2].duration_since(times[1]), Duration::from_secs(80));
}

#[tokio::test(start_paused = true)]
async fn retry_resends_the_original_conversation() {
    let transport = ScriptedTransport::new([
        search_turn("call_1"),
        rate_limited(),
        search_turn("call_2"),
        Ok(LlmResponse::new("final answer")),
    ]);
    let client = client_over(&transport, ClientConfig::default());

    let outcome = client.chat_with_web_search(&conversation()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(
        serde_json::to_vec(&requests[2].messages).unwrap(),
        serde_json::to_vec(&conversation()).unwrap()
    );
    assert!(
        requests[3]
            .messages
            .iter()
            .all(|m| m.tool_call_id.as_deref() != Some("call_1")),
        "stale tool-call id replayed"
    );
    assert_eq!(outcome.retries, 1);
    assert_eq!(outcome.turns, 2);
    assert!(outcome.used_web_search);
}

#[tokio::test(start_paused = true)]
async fn undeclared_tool_is_a_protocol_violation() {
    let transport = ScriptedTransport::new([Ok(LlmResponse::with_tool_calls(
        "",
        vec![ToolCall::new("call_1", "stock_quote", r#"{"ticker":"X"}"#)],
    ))]);
    let client = client_over(&transport, ClientConfig::default());

    let err = client.chat_with_web_search(&conversation()).await.unwrap_err();

    assert!(matches!(err, ChatGateError::ProtocolViolation { .. }));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn endless_tool_calls_hit_the_turn_ceiling() {
    let transport = ScriptedTransport::new((0..20).map(|i| search_turn(&format!("call_{}", i))));
    let config = ClientConfig::default().with_tool_loop(ToolLoopConfig::default().with_max_turns(4));
    let client = client_over(&transport, config);

    let err = client.chat_with_web_search(&conversation()).await.unwrap_err();

    assert!(matches!(err, ChatGateError::ProtocolViolation { .. }));
    assert_eq!(transport.requests().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_dispatch_in_arrival_order() {
    let transport = ScriptedTransport::new([
        Ok(LlmResponse::new("first")),
        Ok(LlmResponse::new("second")),
    ]);
    let client = client_over(&transport, ClientConfig::default());

    let first_conversation = vec![LlmMessage::user("first")];
    let second_conversation = vec![LlmMessage::user("second")];
    let (first, second) = tokio::join!(
        client.simple_chat(&first_conversation),
        client.simple_chat(&second_conversation)
    );

    assert_eq!(first.unwrap().content, "first");
    assert_eq!(second.unwrap().content, "second");

    let requests = transport.requests();
    assert_eq!(requests[0].messages, first_conversation);
    assert_eq!(requests[1].messages, second_conversation);

    let times = transport.dispatch_times();
    assert!(times[1].duration_since(times[0]) >= Duration::from_secs(25));
}
