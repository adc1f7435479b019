//! Chat widget: transcript, status line, input box and action bar.
//!
//! The widget only holds what is on screen. Conversation state lives in
//! [`crate::chat::ChatSession`]; the app pushes turns and notices here as they
//! happen.

use std::borrow::Cow;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Buffer;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::ai::{Role, Turn};

/// Hints rendered in the action bar.
const ACTIONS_HINT: &str =
    " Enter send | ^K context | ^T terminal | ^O browser | ^L clear | Esc quit ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
    Context,
}

/// One block of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Turn(Turn),
    Notice { kind: NoticeKind, text: String },
}

/// Screen areas of the widget for a given outer area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub transcript: Rect,
    pub status: Rect,
    pub input: Rect,
    pub actions: Rect,
}

impl ChatLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // transcript
                Constraint::Length(1), // status
                Constraint::Length(3), // input (bordered)
                Constraint::Length(1), // actions
            ])
            .split(area);
        Self {
            transcript: chunks[0],
            status: chunks[1],
            input: chunks[2],
            actions: chunks[3],
        }
    }

    /// Input text area inside its border.
    pub fn input_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.input)
    }
}

pub struct TuiChat {
    title: String,
    entries: Vec<Entry>,
    input: String,
    /// Cursor position in chars within `input`.
    cursor: usize,
    /// Lines scrolled up from the bottom of the transcript.
    scroll_offset: usize,
    status: String,
    send_enabled: bool,
}

impl Default for TuiChat {
    fn default() -> Self {
        Self::new("AI Assistant")
    }
}

impl TuiChat {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            input: String::new(),
            cursor: 0,
            scroll_offset: 0,
            status: String::new(),
            send_enabled: true,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn load_history(&mut self, turns: &[Turn]) {
        self.entries.extend(turns.iter().cloned().map(Entry::Turn));
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.entries.push(Entry::Turn(turn));
        self.scroll_to_bottom();
    }

    pub fn push_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.entries.push(Entry::Notice { kind, text: text.into() });
        self.scroll_to_bottom();
    }

    pub fn clear_transcript(&mut self) {
        self.entries.clear();
        self.scroll_offset = 0;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn is_send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    // ------------------------------------------------------------------
    // Input editing
    // ------------------------------------------------------------------

    pub fn input(&self) -> &str {
        &self.input
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.input.insert(idx, c);
        self.cursor += 1;
    }

    /// Backspace.
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index(self.cursor);
        self.input.remove(idx);
    }

    /// Delete.
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_len() {
            let idx = self.byte_index(self.cursor);
            self.input.remove(idx);
        }
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let len = self.char_len() as i64;
        self.cursor = (self.cursor as i64 + delta as i64).clamp(0, len) as usize;
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Take the input text, leaving the box empty.
    pub fn take_input(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    /// Visible slice of the input and the cursor column for a box of
    /// `width` cells. Scrolls horizontally so the cursor stays visible.
    pub fn input_view(&self, width: u16) -> (String, u16) {
        let width = width.max(1) as usize;
        let chars: Vec<char> = self.input.chars().collect();
        let mut start = 0;
        let cursor_width = |from: usize| -> usize {
            chars[from..self.cursor].iter().collect::<String>().width()
        };
        while start < self.cursor && cursor_width(start) >= width {
            start += 1;
        }

        let mut visible = String::new();
        for c in &chars[start..] {
            visible.push(*c);
            if visible.width() > width {
                visible.pop();
                break;
            }
        }
        (visible, cursor_width(start) as u16)
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    pub fn scroll(&mut self, delta: i32) {
        // Positive scrolls down (towards newest).
        self.scroll_offset = if delta < 0 {
            self.scroll_offset.saturating_add(delta.unsigned_abs() as usize)
        } else {
            self.scroll_offset.saturating_sub(delta as usize)
        };
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn is_scrolled(&self) -> bool {
        self.scroll_offset > 0
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Transcript wrapped to `width` columns, one blank line between entries.
    pub fn transcript_lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = width.max(1) as usize;
        let mut lines = Vec::new();
        for entry in &self.entries {
            lines.extend(entry_lines(entry, width));
            lines.push(Line::default());
        }
        lines
    }

    /// Absolute cursor position for the input box when the widget is drawn
    /// over `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let inner = ChatLayout::new(outer_block(&self.title).inner(area)).input_inner();
        let (_, col) = self.input_view(inner.width);
        (inner.x + col.min(inner.width.saturating_sub(1)), inner.y)
    }
}

fn outer_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Line::from(format!(" {title} ").bold()))
}

fn entry_lines(entry: &Entry, width: usize) -> Vec<Line<'static>> {
    let (prefix, prefix_style, body_style, text) = match entry {
        Entry::Turn(turn) => {
            let color = match turn.role {
                Role::User => Color::LightBlue,
                Role::Assistant => Color::LightGreen,
            };
            (
                format!("{}: ", turn.role.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
                Style::default(),
                turn.message.as_str(),
            )
        }
        Entry::Notice { kind, text } => {
            let style = match kind {
                NoticeKind::Info => Style::default().fg(Color::Green),
                NoticeKind::Error => Style::default().fg(Color::LightRed),
                NoticeKind::Context => Style::default().fg(Color::Yellow),
            };
            (String::new(), style, style, text.as_str())
        }
    };

    let full = format!("{prefix}{text}");
    let mut out = Vec::new();
    for (i, raw) in full.lines().enumerate() {
        let pieces: Vec<Cow<'_, str>> = if raw.is_empty() {
            vec![Cow::Borrowed("")]
        } else {
            textwrap::wrap(raw, width)
        };
        for (j, piece) in pieces.into_iter().enumerate() {
            let first = i == 0 && j == 0;
            match piece.strip_prefix(prefix.as_str()) {
                Some(rest) if first && !prefix.is_empty() => out.push(Line::from(vec![
                    Span::styled(prefix.clone(), prefix_style),
                    Span::styled(rest.to_string(), body_style),
                ])),
                _ => out.push(Line::from(Span::styled(piece.into_owned(), body_style))),
            }
        }
    }
    out
}

impl Widget for &TuiChat {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let outer = outer_block(&self.title);
        let inner = outer.inner(area);
        outer.render(area, buf);

        let layout = ChatLayout::new(inner);

        // Transcript, anchored to the bottom.
        let lines = self.transcript_lines(layout.transcript.width);
        let height = layout.transcript.height as usize;
        let max_offset = lines.len().saturating_sub(height);
        let offset = self.scroll_offset.min(max_offset);
        let start = lines.len().saturating_sub(height + offset);
        let visible: Vec<Line> = lines.into_iter().skip(start).take(height).collect();
        Paragraph::new(visible).render(layout.transcript, buf);

        let status = if offset > 0 {
            format!("{} [scrolled up {offset}]", self.status)
        } else {
            self.status.clone()
        };
        Paragraph::new(Line::from(status.dark_gray())).render(layout.status, buf);

        let input_border = if self.send_enabled { Color::Gray } else { Color::DarkGray };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(input_border))
            .title(if self.send_enabled { " Message " } else { " Message (waiting) " });
        let input_inner = input_block.inner(layout.input);
        input_block.render(layout.input, buf);
        let (visible_input, _) = self.input_view(input_inner.width);
        let input_line = if self.input.is_empty() {
            Line::from("Type your message...".dark_gray())
        } else {
            Line::from(visible_input)
        };
        Paragraph::new(input_line).render(input_inner, buf);

        Paragraph::new(Line::from(ACTIONS_HINT.dark_gray())).render(layout.actions, buf);
    }
}
