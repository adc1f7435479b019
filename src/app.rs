//! Application state and main loop.
//!
//! This module defines the App struct that owns the chat session, the chat
//! widget and the event sources. The loop waits on user input, background
//! app events and the in-flight AI reply, applies whichever arrives first,
//! then redraws.

use std::io;

use anyhow::{Context, Result};
use crossterm::event::KeyEventKind;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{Receiver, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::ai::{AiClient, HistoryStore, ProviderKind, Turn};
use crate::ai::persistence::default_history_path;
use crate::chat::{ChatSession, SubmitOutcome};
use crate::config::{Config, ConfigError, ENV_API_ENDPOINT, ENV_API_KEY};
use crate::context::ContextCollector;
use crate::event::chat::{self as chat_event, ChatAction};
use crate::event::{init_app_eventsource, init_user_event, AppEvent, UserEvent};
use crate::shell::Launcher;
use crate::ui::chat::{NoticeKind, TuiChat};

/// Characters of a context snapshot shown when the user asks for it.
const CONTEXT_PREVIEW_CHARS: usize = 800;

pub struct App {
    // backend
    session: ChatSession,
    launcher: Launcher,

    // frontend widget, rendered by the ui module
    pub(crate) tui_chat: TuiChat,

    exit: bool,

    // event sources
    event_sink: UnboundedSender<AppEvent>,
    user_events: Receiver<io::Result<UserEvent>>,
    app_events: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Build the app from the loaded configuration with the real HTTP client,
    /// window-manager queries and terminal input.
    pub fn new(config: Config) -> Self {
        let client = AiClient::new(&config);
        let store = HistoryStore::new(
            config.history_file.clone().unwrap_or_else(default_history_path),
        );
        let launcher = Launcher::new(config.terminal_cmd.clone(), config.browser_cmd.clone());
        let session = ChatSession::new(config, client, ContextCollector::new(), store);
        Self::with_parts(session, launcher, init_user_event())
    }

    /// Assemble an app from prepared parts.
    pub fn with_parts(
        session: ChatSession,
        launcher: Launcher,
        user_events: Receiver<io::Result<UserEvent>>,
    ) -> Self {
        let (event_sink, app_events) = init_app_eventsource();
        let provider = ProviderKind::detect(&session.config().endpoint);
        let mut tui_chat = TuiChat::new(format!("AI Assistant [{provider}]"));

        tui_chat.load_history(session.history());
        if let Err(e) = session.config().validate() {
            tui_chat.push_notice(NoticeKind::Error, config_help(&e));
        }

        Self {
            session,
            launcher,
            tui_chat,
            exit: false,
            event_sink,
            user_events,
            app_events,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.exit {
                break Ok(());
            }
            tokio::select! {
                res = self.user_events.recv() => {
                    let usr_evt = res.with_context(|| anyhow::anyhow!("User event stream is ended."))?;
                    self.handle_user_event(usr_evt?);
                }
                res = self.app_events.recv() => {
                    let app_evt = res.with_context(|| anyhow::anyhow!("App event stream is ended"))?;
                    self.handle_app_event(app_evt);
                }
                reply = self.session.recv_reply() => {
                    self.handle_reply(reply);
                }
            }
            self.draw(terminal)?;
        }
    }

    pub fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(&*self, area);
            frame.set_cursor_position(self.tui_chat.cursor_position(area));
        })?;
        Ok(())
    }

    fn handle_user_event(&mut self, event: UserEvent) {
        if let UserEvent::Key(key_evt) = event {
            if key_evt.kind == KeyEventKind::Press {
                let action = chat_event::handle_key_event(&mut self.tui_chat, key_evt);
                self.apply_action(action);
            }
        }
        // Resize and other events only need the redraw that follows.
    }

    /// Carry out an action produced by the key handler.
    pub fn apply_action(&mut self, action: ChatAction) {
        match action {
            ChatAction::None => {}
            ChatAction::Submit(text) => self.submit(text),
            ChatAction::ShowContext => {
                self.tui_chat.set_status("Loading context...");
                self.session.request_context(self.event_sink.clone());
            }
            ChatAction::Launch(target) => {
                if let Err(e) = self.launcher.launch(target) {
                    error!("{:#}", e);
                    self.tui_chat.push_notice(NoticeKind::Error, format!("{e:#}"));
                }
            }
            ChatAction::ClearHistory => {
                self.session.clear_history();
                self.tui_chat.clear_transcript();
                self.tui_chat.push_notice(NoticeKind::Info, "History cleared.");
            }
            ChatAction::Quit => {
                info!("Exit requested");
                self.exit = true;
            }
        }
    }

    fn submit(&mut self, text: String) {
        match self.session.submit(&text) {
            SubmitOutcome::Sent => {
                self.tui_chat.push_turn(Turn::user(text.trim()));
                self.tui_chat.set_send_enabled(false);
                self.tui_chat.set_status(self.session.status());
            }
            SubmitOutcome::ConfigMissing(e) => {
                self.tui_chat.push_notice(NoticeKind::Error, config_help(&e));
            }
            SubmitOutcome::Ignored => {}
        }
    }

    /// Apply the AI reply delivered by the session's worker.
    pub fn handle_reply(&mut self, reply: String) {
        let turn = self.session.complete(reply).clone();
        self.tui_chat.push_turn(turn);
        self.tui_chat.set_status(self.session.status());
        self.tui_chat.set_send_enabled(true);
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ContextReady { context } => {
                let preview = crate::context::truncate_chars(&context, CONTEXT_PREVIEW_CHARS);
                self.tui_chat
                    .push_notice(NoticeKind::Context, format!("Current context:\n{preview}"));
                self.tui_chat.set_status(self.session.status());
            }
        }
    }
}

/// Inline help shown when the API configuration is incomplete.
fn config_help(err: &ConfigError) -> String {
    format!(
        "Configuration error: {err}.\n\
         Only the process environment is read; no .env file is loaded.\n\
         Export both variables in the environment that starts this program, e.g.:\n  \
         {ENV_API_KEY}=your_key_here\n  \
         {ENV_API_ENDPOINT}=https://api.openai.com/v1/chat/completions\n\
         then restart."
    )
}
