//! Key event handling for the chat widget.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::shell::LaunchTarget;
use crate::ui::chat::TuiChat;

/// What the app should do in response to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    /// Handled inside the widget (editing, scrolling) or ignored.
    None,
    Submit(String),
    ShowContext,
    Launch(LaunchTarget),
    ClearHistory,
    Quit,
}

/// Handle a key press on the chat widget.
///
/// Editing and scrolling keys are applied to `chat` directly; everything that
/// needs the session or the OS is returned as a [`ChatAction`].
pub fn handle_key_event(chat: &mut TuiChat, key_evt: KeyEvent) -> ChatAction {
    let ctrl = key_evt.modifiers.contains(KeyModifiers::CONTROL);

    match key_evt.code {
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => ChatAction::Quit,
        KeyCode::Char('k') | KeyCode::Char('K') if ctrl => ChatAction::ShowContext,
        KeyCode::Char('t') | KeyCode::Char('T') if ctrl => ChatAction::Launch(LaunchTarget::Terminal),
        KeyCode::Char('o') | KeyCode::Char('O') if ctrl => ChatAction::Launch(LaunchTarget::Browser),
        KeyCode::Char('l') | KeyCode::Char('L') if ctrl => ChatAction::ClearHistory,

        // Esc leaves scroll mode first, then closes the widget.
        KeyCode::Esc => {
            if chat.is_scrolled() {
                chat.scroll_to_bottom();
                ChatAction::None
            } else {
                ChatAction::Quit
            }
        }

        KeyCode::Enter => {
            // The text stays in the box while a reply is pending.
            if !chat.is_send_enabled() || chat.input().trim().is_empty() {
                return ChatAction::None;
            }
            ChatAction::Submit(chat.take_input())
        }

        KeyCode::Char(c) if !ctrl => {
            chat.insert_char(c);
            ChatAction::None
        }

        KeyCode::Backspace => {
            chat.delete_char();
            ChatAction::None
        }
        KeyCode::Delete => {
            chat.delete_char_forward();
            ChatAction::None
        }
        KeyCode::Left => {
            chat.move_cursor(-1);
            ChatAction::None
        }
        KeyCode::Right => {
            chat.move_cursor(1);
            ChatAction::None
        }
        KeyCode::Home => {
            chat.move_cursor_to_start();
            ChatAction::None
        }
        KeyCode::End => {
            chat.move_cursor_to_end();
            ChatAction::None
        }

        KeyCode::Up => {
            chat.scroll(-1);
            ChatAction::None
        }
        KeyCode::Down => {
            chat.scroll(1);
            ChatAction::None
        }
        KeyCode::PageUp => {
            chat.scroll(-10);
            ChatAction::None
        }
        KeyCode::PageDown => {
            chat.scroll(10);
            ChatAction::None
        }

        _ => ChatAction::None,
    }
}
