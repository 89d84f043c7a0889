//! Behavior tests for the streaming chat relay's commit-on-completion rule.

use std::sync::{Arc, Mutex};

use finlearn_core::chat::{CompletionError, CompletionFuture, TokenStream};
use finlearn_core::{ChatError, ChatMessage, ChatRelay, CompletionClient, Role, Transcript};
use futures::stream;

/// Streams scripted tokens, optionally failing after them, and records what
/// it was sent.
struct ScriptedCompletion {
    tokens: Vec<&'static str>,
    failure: Option<&'static str>,
    refuse: bool,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    fn replying(tokens: Vec<&'static str>) -> Self {
        Self {
            tokens,
            failure: None,
            refuse: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing_after(tokens: Vec<&'static str>, failure: &'static str) -> Self {
        Self {
            failure: Some(failure),
            ..Self::replying(tokens)
        }
    }

    fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::replying(Vec::new())
        }
    }

    fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().expect("lock").clone()
    }
}

impl CompletionClient for ScriptedCompletion {
    fn stream<'a>(&'a self, _model: &'a str, messages: &'a [ChatMessage]) -> CompletionFuture<'a> {
        self.seen.lock().expect("lock").push(messages.to_vec());

        let mut items = self
            .tokens
            .iter()
            .map(|token| Ok((*token).to_owned()))
            .collect::<Vec<_>>();
        if let Some(failure) = self.failure {
            items.push(Err(CompletionError::new(failure)));
        }
        let refuse = self.refuse;

        Box::pin(async move {
            if refuse {
                return Err(CompletionError::new("401 invalid api key"));
            }
            Ok(Box::pin(stream::iter(items)) as TokenStream)
        })
    }
}

#[tokio::test]
async fn when_stream_fails_mid_reply_no_assistant_entry_is_committed() {
    // Given: a backend that streams "Inflation is" and then drops the connection
    let backend = Arc::new(ScriptedCompletion::failing_after(
        vec!["Inflation", " is"],
        "connection reset by peer",
    ));
    let relay = ChatRelay::new(backend);
    let mut transcript = Transcript::new();
    let mut rendered = String::new();

    // When: the user asks a question
    let result = relay
        .send(&mut transcript, "What is inflation?", |token| rendered.push_str(token))
        .await;

    // Then: the partial text was shown, an error is reported, nothing is committed
    let error = result.expect_err("stream failed");
    assert!(matches!(error, ChatError::Interrupted { .. }));
    assert_eq!(error.partial(), "Inflation is");
    assert_eq!(rendered, "Inflation is");
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.last().map(|message| message.role), Some(Role::User));
}

#[tokio::test]
async fn when_stream_completes_reply_is_appended_after_the_user_message() {
    // Given: a backend that completes normally
    let backend = Arc::new(ScriptedCompletion::replying(vec![
        "Inflation is ",
        "a general rise in prices.",
    ]));
    let relay = ChatRelay::new(backend.clone());
    let mut transcript = Transcript::new();

    // When: two turns are exchanged
    relay
        .send(&mut transcript, "What is inflation?", |_| {})
        .await
        .expect("first turn");
    let reply = relay
        .send(&mut transcript, "And deflation?", |_| {})
        .await
        .expect("second turn");

    // Then: the transcript alternates user/assistant and the backend saw history
    assert_eq!(reply, "Inflation is a general rise in prices.");
    let roles = transcript
        .messages()
        .iter()
        .map(|message| message.role)
        .collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].len(), 1);
    assert_eq!(calls[1].len(), 3);
    assert_eq!(calls[1][1].content, "Inflation is a general rise in prices.");
}

#[tokio::test]
async fn when_request_is_refused_the_session_can_continue() {
    // Given: a backend that rejects the first request
    let relay = ChatRelay::new(Arc::new(ScriptedCompletion::refusing()));
    let mut transcript = Transcript::new();

    // When: the user sends a message
    let error = relay
        .send(&mut transcript, "hello", |_| {})
        .await
        .expect_err("refused");

    // Then: no partial text exists and only the user message is recorded
    assert_eq!(error.partial(), "");
    assert!(error.to_string().contains("401 invalid api key"));
    assert_eq!(transcript.len(), 1);

    // And: a later turn on a healthy backend sees the full history
    let healthy = Arc::new(ScriptedCompletion::replying(vec!["hi"]));
    ChatRelay::new(healthy.clone())
        .send(&mut transcript, "hello again", |_| {})
        .await
        .expect("second turn");
    assert_eq!(healthy.calls()[0].len(), 2);
    assert_eq!(transcript.len(), 3);
}
