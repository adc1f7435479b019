//! hyprchat - a terminal AI chat assistant aware of the Hyprland desktop
//!
//! This library provides the pieces behind the `hyprchat` binary:
//! - Environment configuration for the AI endpoint
//! - An HTTP client speaking the OpenAI, Gemini and generic request shapes
//! - Desktop context snapshots gathered from `hyprctl` and recent files
//! - A JSON-persisted conversation history capped at twenty turns
//! - The chat session and TUI that keep one request in flight at a time
//!
//! # Example
//!
//! ```no_run
//! use hyprchat::ai::AiClient;
//! use hyprchat::ai::prompt::build_prompt;
//! use hyprchat::config::Config;
//! use hyprchat::context::ContextCollector;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env();
//!     let client = AiClient::new(&config);
//!
//!     let context = ContextCollector::new().snapshot().await;
//!     let reply = client.get_response(&build_prompt(&context, "what am I working on?")).await;
//!     println!("{reply}");
//! }
//! ```

pub mod ai;
pub mod app;
pub mod chat;
pub mod config;
pub mod context;
pub mod event;
pub mod shell;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use ai::{AiClient, AiError, HistoryStore, ProviderKind, Turn};
pub use app::App;
pub use chat::{ChatSession, SubmitOutcome};
pub use config::{Config, ConfigError};
pub use context::ContextCollector;
pub use event::{init_app_eventsource, init_user_event, AppEvent, UserEvent};
