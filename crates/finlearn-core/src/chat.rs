//! Streaming chat relay.
//!
//! A [`Transcript`] is owned by one session and only grows. [`ChatRelay::send`]
//! appends the user's message, streams the assistant reply token by token
//! through a callback, and appends the assistant message only once the stream
//! has finished. A reply that fails part-way is never committed.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, Feature, Secrets};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only conversation history for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
    }
}

/// Failure reported by a completion backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CompletionError {
    message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,
    /// The reply failed before completing; `partial` holds the tokens already shown.
    #[error("assistant reply interrupted: {source}")]
    Interrupted {
        partial: String,
        #[source]
        source: CompletionError,
    },
}

impl ChatError {
    pub fn partial(&self) -> &str {
        match self {
            Self::EmptyInput => "",
            Self::Interrupted { partial, .. } => partial,
        }
    }
}

/// Token stream for one assistant reply. Ends with `None` on completion.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TokenStream, CompletionError>> + Send + 'a>>;

/// Hosted chat-completion backend.
pub trait CompletionClient: Send + Sync {
    /// Start streaming a reply to `messages`.
    fn stream<'a>(&'a self, model: &'a str, messages: &'a [ChatMessage]) -> CompletionFuture<'a>;
}

/// OpenAI chat completions via `async-openai`.
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(OpenAIConfig::new().with_api_key(api_key)),
        }
    }
}

impl CompletionClient for OpenAiCompletionClient {
    fn stream<'a>(&'a self, model: &'a str, messages: &'a [ChatMessage]) -> CompletionFuture<'a> {
        Box::pin(async move {
            let messages = messages
                .iter()
                .map(request_message)
                .collect::<Result<Vec<_>, _>>()?;

            let request = CreateChatCompletionRequestArgs::default()
                .model(model)
                .messages(messages)
                .build()
                .map_err(|e| CompletionError::new(format!("invalid chat request: {e}")))?;

            let stream = self
                .client
                .chat()
                .create_stream(request)
                .await
                .map_err(|e| CompletionError::new(format!("chat request failed: {e}")))?;

            let tokens = stream.filter_map(|chunk| {
                futures::future::ready(match chunk {
                    Ok(chunk) => chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .filter(|token| !token.is_empty())
                        .map(Ok),
                    Err(e) => Some(Err(CompletionError::new(format!("chat stream failed: {e}")))),
                })
            });

            Ok(Box::pin(tokens) as TokenStream)
        })
    }
}

fn request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, CompletionError> {
    let built: Result<ChatCompletionRequestMessage, _> = match message.role {
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()
            .map(Into::into),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.as_str())
            .build()
            .map(Into::into),
    };

    built.map_err(|e| CompletionError::new(format!("invalid chat message: {e}")))
}

/// Relays a transcript to a completion backend.
#[derive(Clone)]
pub struct ChatRelay {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Production relay keyed from [`Feature::Chat`].
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ConfigError> {
        let key = secrets.require(Feature::Chat)?;
        Ok(Self::new(Arc::new(OpenAiCompletionClient::new(key))))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `user_text`, surfacing each token through `on_token` as it arrives.
    ///
    /// The user message is appended before the remote call. The assistant
    /// message is appended only after the stream completes and is returned.
    ///
    /// # Errors
    ///
    /// [`ChatError::EmptyInput`] for blank input (nothing is appended).
    /// [`ChatError::Interrupted`] when the backend fails before or during the
    /// stream; the transcript then ends with the user message.
    pub async fn send<F>(
        &self,
        transcript: &mut Transcript,
        user_text: &str,
        mut on_token: F,
    ) -> Result<String, ChatError>
    where
        F: FnMut(&str),
    {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        transcript.push(Role::User, user_text);
        debug!(model = %self.model, turns = transcript.len(), "sending chat transcript");

        let mut reply = String::new();
        let mut tokens = match self.client.stream(&self.model, transcript.messages()).await {
            Ok(tokens) => tokens,
            Err(source) => return Err(interrupted(reply, source)),
        };

        while let Some(token) = tokens.next().await {
            match token {
                Ok(token) => {
                    on_token(&token);
                    reply.push_str(&token);
                }
                Err(source) => return Err(interrupted(reply, source)),
            }
        }

        transcript.push(Role::Assistant, reply.clone());
        Ok(reply)
    }
}

fn interrupted(partial: String, source: CompletionError) -> ChatError {
    warn!(partial_len = partial.len(), error = %source, "chat reply interrupted");
    ChatError::Interrupted { partial, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    impl CompletionClient for EchoClient {
        fn stream<'a>(
            &'a self,
            _model: &'a str,
            messages: &'a [ChatMessage],
        ) -> CompletionFuture<'a> {
            let echoed = messages
                .last()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            Box::pin(async move {
                let tokens = vec![Ok("you said: ".to_owned()), Ok(echoed)];
                Ok(Box::pin(futures::stream::iter(tokens)) as TokenStream)
            })
        }
    }

    #[tokio::test]
    async fn completed_reply_is_committed_after_user_message() {
        let relay = ChatRelay::new(Arc::new(EchoClient));
        let mut transcript = Transcript::new();
        let mut seen = Vec::new();

        let reply = relay
            .send(&mut transcript, " hello ", |token| seen.push(token.to_owned()))
            .await
            .expect("reply");

        assert_eq!(reply, "you said: hello");
        assert_eq!(seen, vec!["you said: ", "hello"]);
        let roles = transcript
            .messages()
            .iter()
            .map(|message| message.role)
            .collect::<Vec<_>>();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_appending() {
        let relay = ChatRelay::new(Arc::new(EchoClient));
        let mut transcript = Transcript::new();

        let error = relay
            .send(&mut transcript, "   ", |_| {})
            .await
            .expect_err("blank");

        assert_eq!(error, ChatError::EmptyInput);
        assert!(transcript.is_empty());
    }

    #[test]
    fn default_model_and_override() {
        let relay = ChatRelay::new(Arc::new(EchoClient));
        assert_eq!(relay.model(), "gpt-3.5-turbo");
        assert_eq!(relay.with_model("gpt-4o-mini").model(), "gpt-4o-mini");
    }
}
