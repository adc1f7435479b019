//! User interface module for the TUI application.
//!
//! The app is a single chat widget filling the terminal; this module renders
//! the [`App`] by delegating to it.

use ratatui::prelude::{Buffer, Rect};
use ratatui::widgets::Widget;

use crate::app::App;

pub mod chat;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.tui_chat.render(area, buf);
    }
}
