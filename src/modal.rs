//! Overlay state machine.
//!
//! At most one overlay is open at a time. While it is, it receives every
//! key and normal navigation is suspended.

use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{error::AppError, text_buffer::TextBuffer, theme::THEME, util::MAX_NAME_LEN};

#[derive(Default)]
pub enum Modal {
    #[default]
    None,
    Confirm(ConfirmDialog),
    TextEdit(TextEditDialog),
    Message(MessageBox),
}

impl Modal {
    pub fn is_active(&self) -> bool {
        !matches!(self, Modal::None)
    }

    pub fn on_resize(&mut self, screen: Rect) {
        if let Modal::TextEdit(dialog) = self {
            dialog.on_resize(screen);
        }
    }
}

// ============================================================================
// Confirm Dialog
// ============================================================================

pub enum DialogResult {
    Accept,
    Reject,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    fn toggle(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

pub struct ConfirmDialog {
    pub prompt: String,
    pub target: PathBuf,
    pub focused: Choice,
}

impl ConfirmDialog {
    pub fn new(prompt: String, target: PathBuf) -> Self {
        Self {
            prompt,
            target,
            focused: Choice::No,
        }
    }

    /// Y/N answer directly, Enter takes the focused button, Esc cancels.
    pub fn handle_key(&mut self, key: KeyCode) -> DialogResult {
        match key {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.focused = self.focused.toggle();
                DialogResult::Pending
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => DialogResult::Accept,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => DialogResult::Reject,
            KeyCode::Enter => match self.focused {
                Choice::Yes => DialogResult::Accept,
                Choice::No => DialogResult::Reject,
            },
            _ => DialogResult::Pending,
        }
    }
}

// ============================================================================
// Text Edit Dialog
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditPurpose {
    Create { dir: PathBuf },
    Rename { dir: PathBuf, original: String },
}

#[derive(Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Pending,
    Confirmed(String),
    Cancelled,
}

pub struct TextEditDialog {
    pub purpose: EditPurpose,
    buffer: TextBuffer,
    /// Text area inside the popup border
    interior: Rect,
    /// Wrapped cursor `(row, col)` inside `interior`
    cursor: (u16, u16),
}

impl TextEditDialog {
    pub fn new(purpose: EditPurpose, screen: Rect) -> Result<Self, AppError> {
        let initial = match &purpose {
            EditPurpose::Create { .. } => "",
            EditPurpose::Rename { original, .. } => original.as_str(),
        };
        let buffer = TextBuffer::with_text(initial, MAX_NAME_LEN)?;
        let mut dialog = Self {
            purpose,
            buffer,
            interior: Rect::default(),
            cursor: (0, 0),
        };
        dialog.on_resize(screen);
        Ok(dialog)
    }

    pub fn title(&self) -> &'static str {
        match self.purpose {
            EditPurpose::Create { .. } => "Create (end with / for a directory)",
            EditPurpose::Rename { .. } => "Rename",
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn interior(&self) -> Rect {
        self.interior
    }

    pub fn cursor_position(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Result<EditOutcome, AppError> {
        match key {
            KeyCode::Enter => return Ok(EditOutcome::Confirmed(self.buffer.text())),
            KeyCode::Esc => return Ok(EditOutcome::Cancelled),
            KeyCode::Backspace => {
                self.buffer.backspace();
            }
            KeyCode::Left => {
                self.buffer.move_left();
            }
            KeyCode::Right => {
                self.buffer.move_right();
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.buffer.insert(c)?;
            }
            _ => return Ok(EditOutcome::Pending),
        }
        self.rewrap();
        Ok(EditOutcome::Pending)
    }

    /// Recompute the popup for a new terminal size. The cursor keeps its
    /// place in the text; its screen cell is derived again from the new wrap.
    pub fn on_resize(&mut self, screen: Rect) {
        self.interior = text_edit_area(screen).inner(ratatui::layout::Margin::new(1, 1));
        self.rewrap();
    }

    fn rewrap(&mut self) {
        self.cursor = self
            .buffer
            .cursor_position(self.interior.width, self.interior.height);
    }
}

// ============================================================================
// Message Box
// ============================================================================

pub struct MessageBox {
    pub title: String,
    pub text: String,
}

impl MessageBox {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            title: "Error".to_owned(),
            text: text.into(),
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Creates a centered rectangle within an area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Rectangle of `width` x `height` centred in `area`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let [column] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(column);
    cell
}

/// Popup for the text editor: half the screen wide, six rows tall.
pub fn text_edit_area(screen: Rect) -> Rect {
    let width = (screen.width / 2).max(24);
    centered_fixed(width, 6, screen)
}

pub fn confirm_area(screen: Rect) -> Rect {
    let width = (screen.width / 2).max(30);
    centered_fixed(width, 7, screen)
}

pub fn message_area(screen: Rect) -> Rect {
    centered_rect(60, 30, screen)
}

// ============================================================================
// Frame Rendering
// ============================================================================

/// Renders the common dialog frame: shadow, clear, bordered block with title.
/// Returns the inner area (inside the block) for content rendering.
pub fn render_dialog_frame(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    hint: &str,
    border_color: ratatui::style::Color,
) -> Rect {
    let shadow_area = Rect {
        x: area.x.saturating_add(2),
        y: area.y.saturating_add(1),
        width: area.width,
        height: area.height,
    }
    .intersection(frame.area());
    frame.render_widget(
        Block::default().style(Style::default().bg(THEME.dialog_shadow)),
        shadow_area,
    );

    frame.render_widget(Clear, area);

    let mut block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(THEME.dialog_bg));
    if !hint.is_empty() {
        block = block.title_bottom(
            Span::styled(format!(" {} ", hint), Style::default().fg(THEME.dialog_hint)),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    inner
}

/// Renders a centered Yes/No button row, marking the focused one.
pub fn render_yes_no_buttons(frame: &mut Frame, area: Rect, focused: Choice) {
    let button_layout = Layout::horizontal([
        Constraint::Percentage(25),
        Constraint::Percentage(20),
        Constraint::Percentage(10),
        Constraint::Percentage(20),
        Constraint::Percentage(25),
    ])
    .split(area);

    let style_for = |choice: Choice| {
        let base = Style::default()
            .fg(THEME.dialog_button_fg)
            .bg(THEME.dialog_button_bg);
        if choice == focused {
            base.fg(THEME.dialog_bg)
                .bg(THEME.dialog_button_focus_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            base
        }
    };

    let yes_button = Paragraph::new(Span::raw(" [Y]es "))
        .style(style_for(Choice::Yes))
        .alignment(Alignment::Center);
    frame.render_widget(yes_button, button_layout[1]);

    let no_button = Paragraph::new(Span::raw(" [N]o "))
        .style(style_for(Choice::No))
        .alignment(Alignment::Center);
    frame.render_widget(no_button, button_layout[3]);
}
