//! Chat session state: the transcript turns and the single in-flight request.
//!
//! The session is a two-state machine. While idle, a non-empty submission
//! appends a user turn and spawns one background task that captures the
//! desktop context, calls the AI and hands its reply back through a oneshot
//! channel. While a reply is awaited every submission is ignored. The reply
//! is consumed on the event loop via [`ChatSession::recv_reply`] and applied
//! with [`ChatSession::complete`], which also persists the history.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::ai::{prompt, AiClient, HistoryStore, Turn};
use crate::config::{Config, ConfigError};
use crate::context::ContextCollector;
use crate::event::AppEvent;

pub const WAITING_STATUS: &str = "Waiting for the AI to reply...";

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input, or a request is already in flight.
    Ignored,
    /// Configuration is incomplete; nothing was sent.
    ConfigMissing(ConfigError),
    /// The user turn was recorded and a request is now in flight.
    Sent,
}

pub struct ChatSession {
    config: Config,
    client: AiClient,
    collector: Arc<ContextCollector>,
    store: HistoryStore,
    history: Vec<Turn>,
    /// Reply slot of the in-flight request, if any.
    pending: Option<oneshot::Receiver<String>>,
}

impl ChatSession {
    /// Create a session and load the persisted history.
    pub fn new(
        config: Config,
        client: AiClient,
        collector: ContextCollector,
        store: HistoryStore,
    ) -> Self {
        let history = store.load();
        Self {
            config,
            client,
            collector: Arc::new(collector),
            store,
            history,
            pending: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Status line text; empty while idle.
    pub fn status(&self) -> &'static str {
        if self.is_pending() { WAITING_STATUS } else { "" }
    }

    /// Submit user text. Must be called from within a tokio runtime.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() || self.is_pending() {
            return SubmitOutcome::Ignored;
        }
        if let Err(e) = self.config.validate() {
            return SubmitOutcome::ConfigMissing(e);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let client = self.client.clone();
        let collector = Arc::clone(&self.collector);
        let message = text.to_string();

        tokio::spawn(async move {
            let context = collector.snapshot().await;
            let reply = client.get_response(&prompt::build_prompt(&context, &message)).await;
            if reply_tx.send(reply).is_err() {
                error!("Chat session dropped before the AI reply arrived");
            }
        });

        info!("Dispatched message ({} chars)", text.len());
        // Recorded now, persisted together with the reply.
        self.history.push(Turn::user(text));
        self.pending = Some(reply_rx);
        SubmitOutcome::Sent
    }

    /// Wait for the in-flight reply. Never resolves while idle, so it can sit
    /// in a `tokio::select!` branch unconditionally. Cancel safe.
    pub async fn recv_reply(&mut self) -> String {
        match self.pending.as_mut() {
            Some(rx) => match rx.await {
                Ok(reply) => reply,
                Err(_) => "[Error]: the request ended without a reply".to_string(),
            },
            None => std::future::pending().await,
        }
    }

    /// Apply a reply: record the assistant turn, persist, and return to idle.
    pub fn complete(&mut self, reply: String) -> &Turn {
        self.pending = None;
        self.history.push(Turn::assistant(reply));
        self.store.save(&self.history);
        &self.history[self.history.len() - 1]
    }

    /// Forget every turn, on disk too.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.store.save(&self.history);
        info!("Chat history cleared");
    }

    /// Capture a context snapshot off the event loop and deliver it as
    /// [`AppEvent::ContextReady`].
    pub fn request_context(&self, event_sink: UnboundedSender<AppEvent>) {
        let collector = Arc::clone(&self.collector);
        tokio::spawn(async move {
            let context = collector.snapshot().await;
            if event_sink.send(AppEvent::ContextReady { context }).is_err() {
                error!("Failed to deliver context snapshot: event loop is gone");
            }
        });
    }
}
