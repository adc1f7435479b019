//! Event handling system for the application.
//!
//! This module provides a dual-channel event system that separates user input
//! events from application events produced by background tasks. User events
//! (keyboard, resize) are read on a dedicated thread so input is never blocked
//! by other work; app events carry results of background work back to the
//! event loop.
//!
//! The AI reply is not an app event: it travels over the oneshot channel owned
//! by [`crate::chat::ChatSession`], which guarantees it is delivered once.
//!
//! # Submodules
//!
//! - `chat`: key handling for the chat widget

pub mod chat;

use std::thread;

use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};
use std::io::Result;

/// Type alias for user input events from the terminal.
pub type UserEvent = crossterm::event::Event;

/// Initializes the user event stream.
///
/// Spawns a dedicated thread that reads events with `crossterm::event::read()`
/// and forwards them through the returned channel. The thread terminates once
/// the receiver is dropped.
pub fn init_user_event() -> Receiver<Result<UserEvent>> {
    let (tx, rx) = mpsc::channel(64);
    thread::spawn(move || {
        loop {
            if tx.blocking_send(crossterm::event::read()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Application events emitted by background tasks.
#[non_exhaustive]
#[derive(Debug)]
pub enum AppEvent {
    /// A context snapshot requested by the user is ready to be shown.
    ContextReady {
        context: String,
    },
}

/// Initializes the application event system.
///
/// Unbounded is appropriate here because app events are rare and small.
pub fn init_app_eventsource() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}
