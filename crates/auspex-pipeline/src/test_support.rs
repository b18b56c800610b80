//! Scripted completion clients for driving the pipeline in tests without a
//! network. Used by the unit tests here and by the scenario suite in
//! `tests/`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auspex_models::market::{MainEvent, Market, ResearchContext, Sentiment};

use crate::client::{CompletionClient, ReplyContent};
use crate::error::ClientError;

/// One scripted behavior for a single completion call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this content immediately.
    Reply(ReplyContent),
    /// Fail with a transport error.
    Fail(String),
    /// Sleep this long before replying, so tests can trip per-call timeouts.
    Hang(Duration),
}

impl ScriptedReply {
    /// A plain-text reply.
    pub fn text(text: &str) -> Self {
        ScriptedReply::Reply(ReplyContent::Text(text.to_string()))
    }

    /// A reply whose text is the given JSON value.
    pub fn json(value: serde_json::Value) -> Self {
        ScriptedReply::Reply(ReplyContent::Text(value.to_string()))
    }

    async fn play(self) -> Result<ReplyContent, ClientError> {
        match self {
            ScriptedReply::Reply(content) => Ok(content),
            ScriptedReply::Fail(message) => Err(ClientError::Transport(message)),
            ScriptedReply::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(ReplyContent::Text(String::new()))
            }
        }
    }
}

/// Plays back a queue of scripted replies, one per call. When the queue runs
/// dry the fallback behavior (if any) repeats; otherwise further calls fail.
pub struct ScriptedClient {
    script: Mutex<VecDeque<ScriptedReply>>,
    fallback: Option<ScriptedReply>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A client that answers every call with the same behavior.
    pub fn repeating(reply: ScriptedReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<ReplyContent, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone());
        match next {
            Some(reply) => reply.play().await,
            None => Err(ClientError::Transport("script exhausted".to_string())),
        }
    }
}

/// Routes each call by substring match on the user prompt. Rules are checked
/// in order and the first match wins; concurrent batches can therefore get
/// deterministic, distinct behaviors from one shared client.
pub struct RuleClient {
    rules: Vec<(String, ScriptedReply)>,
    calls: AtomicUsize,
}

impl RuleClient {
    pub fn new(rules: Vec<(&str, ScriptedReply)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(needle, reply)| (needle.to_string(), reply))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for RuleClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<ReplyContent, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (needle, reply) in &self.rules {
            if user.contains(needle.as_str()) {
                return reply.clone().play().await;
            }
        }
        Err(ClientError::Transport("no rule matched prompt".to_string()))
    }
}

/// A market with a formulaic title, for tests.
pub fn sample_market(id: &str, current_price: Option<f64>) -> Market {
    Market {
        id: id.to_string(),
        title: format!("Market {id}?"),
        current_price,
    }
}

/// A small research context shared by tests.
pub fn sample_context() -> ResearchContext {
    ResearchContext {
        main_event: MainEvent {
            title: "2028 US Presidential Election".to_string(),
            description: Some("Who will win the 2028 US Presidential Election?".to_string()),
        },
        research_summary: "Early polling, wide primary fields on both sides.".to_string(),
        key_findings: vec!["No incumbent is running".to_string()],
        sentiment: Sentiment::Neutral,
    }
}
