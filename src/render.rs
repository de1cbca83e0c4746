//! Drawing for the file browser
//!
//! Panes, overlays and the diagnostic view, plus the terminal surface that
//! can be handed to a child process and taken back.

use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    DefaultTerminal, Frame, Terminal,
    layout::{Alignment, Constraint, Layout},
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};

use crate::{
    app::App,
    error::AppError,
    modal::{
        ConfirmDialog, MessageBox, Modal, TextEditDialog, confirm_area, message_area, render_dialog_frame,
        render_yes_no_buttons, text_edit_area,
    },
    theme::THEME,
    util::{digit_count, trim_name, trim_path},
    viewport::Viewport,
};

/// Box for the pane without focus
pub const INACTIVE_BORDER: border::Set = border::Set {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    vertical_left: "|",
    vertical_right: "|",
    horizontal_top: "-",
    horizontal_bottom: "-",
};

/// The drawing target. It can be released to a child process (normal
/// line-discipline mode, main screen) and reclaimed afterwards.
pub trait Surface {
    /// Terminal size as `(cols, rows)`
    fn size(&self) -> Result<(u16, u16), AppError>;

    fn draw(&mut self, app: &App) -> Result<(), AppError>;

    fn release(&mut self) -> Result<(), AppError>;

    fn reclaim(&mut self) -> Result<(), AppError>;
}

impl Surface for DefaultTerminal {
    fn size(&self) -> Result<(u16, u16), AppError> {
        Ok(crossterm::terminal::size()?)
    }

    fn draw(&mut self, app: &App) -> Result<(), AppError> {
        Terminal::draw(self, |frame| app.render(frame))?;
        Ok(())
    }

    fn release(&mut self) -> Result<(), AppError> {
        self.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        std::io::stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }

    fn reclaim(&mut self) -> Result<(), AppError> {
        std::io::stdout().execute(EnterAlternateScreen)?;
        crossterm::terminal::enable_raw_mode()?;
        // Force a full redraw
        self.clear()?;
        Ok(())
    }
}

impl App {
    pub fn render(&self, frame: &mut Frame) {
        if self.config.debug {
            self.render_debug(frame);
        } else {
            let active = self.panes.active_index();
            for (index, pane) in self.panes.panes().iter().enumerate() {
                render_pane(frame, pane, index == active);
            }
        }

        match &self.modal {
            Modal::None => {}
            Modal::Confirm(dialog) => render_confirm(frame, dialog),
            Modal::TextEdit(dialog) => render_text_edit(frame, dialog),
            Modal::Message(message) => render_message(frame, message),
        }
    }

    fn render_debug(&self, frame: &mut Frame) {
        let screen = frame.area();
        let mut lines = vec![Line::from(format!(
            "Terminal size: {} x {}",
            screen.width, screen.height
        ))];
        for (index, pane) in self.panes.panes().iter().enumerate() {
            let area = pane.area();
            let marker = if index == self.panes.active_index() { "*" } else { " " };
            lines.push(Line::from(format!(
                "{}pane {}: x {} y {} w {} h {} rows {} highlight {} scroll {} entries {}",
                marker,
                index,
                area.x,
                area.y,
                area.width,
                area.height,
                pane.visible_rows(),
                pane.highlight(),
                pane.scroll(),
                pane.files().len(),
            )));
            lines.push(Line::from(format!("  {}", pane.path().display())));
        }

        let block = Block::bordered().title(" debug ");
        let paragraph = Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(THEME.debug_fg));
        frame.render_widget(paragraph, screen);
    }
}

fn render_pane(frame: &mut Frame, pane: &Viewport, is_active: bool) {
    let area = pane.area().intersection(frame.area());
    if area.is_empty() {
        return;
    }

    let (border_set, border_color, separator) = if is_active {
        (border::PLAIN, THEME.pane_active_border, "─")
    } else {
        (INACTIVE_BORDER, THEME.pane_inactive_border, "-")
    };
    let block = Block::bordered()
        .border_set(border_set)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Entries, separator, path
    let [list_area, separator_area, path_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let width = inner.width as usize;
    let digits = digit_count(pane.files().len());
    let highlight = pane.highlight();
    let highlight_style = if is_active {
        Style::default()
            .fg(THEME.cursor_active_fg)
            .bg(THEME.cursor_active_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(THEME.cursor_inactive_fg)
            .bg(THEME.cursor_inactive_bg)
    };

    let lines: Vec<Line> = pane
        .visible_range()
        .filter_map(|index| pane.files().get(index).map(|entry| (index, entry)))
        .map(|(index, entry)| {
            let number = if pane.relative_numbering && index != highlight {
                index.abs_diff(highlight)
            } else {
                index
            };
            let label = format!(" {:>digits$} ", number);

            let mut name = entry.name.clone();
            if entry.is_dir() {
                name.push('/');
            }
            let name = trim_name(&name, width.saturating_sub(label.len()));

            if index == highlight {
                Line::from(vec![Span::raw(label), Span::raw(name)]).style(highlight_style)
            } else {
                let name_style = if entry.is_dir() {
                    Style::default()
                        .fg(THEME.directory_fg)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(THEME.file_fg)
                };
                Line::from(vec![
                    Span::styled(label, Style::default().fg(THEME.index_fg)),
                    Span::styled(name, name_style),
                ])
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), list_area);

    frame.render_widget(
        Paragraph::new(separator.repeat(width)).style(Style::default().fg(border_color)),
        separator_area,
    );

    let path = pane.path().to_string_lossy();
    frame.render_widget(
        Paragraph::new(trim_path(&path, width)).style(Style::default().fg(THEME.pane_path)),
        path_area,
    );
}

fn render_confirm(frame: &mut Frame, dialog: &ConfirmDialog) {
    let area = confirm_area(frame.area());
    let inner = render_dialog_frame(
        frame,
        area,
        "Confirm Delete",
        "y/n · Enter select · Esc cancel",
        THEME.dialog_delete_border,
    );

    let [_, prompt_area, buttons_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let message = Paragraph::new(dialog.prompt.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, prompt_area);
    render_yes_no_buttons(frame, buttons_area, dialog.focused);
}

fn render_text_edit(frame: &mut Frame, dialog: &TextEditDialog) {
    let area = text_edit_area(frame.area());
    render_dialog_frame(
        frame,
        area,
        dialog.title(),
        "Enter confirm · Esc cancel",
        THEME.dialog_border,
    );

    let interior = dialog.interior().intersection(frame.area());
    if interior.is_empty() {
        return;
    }

    // Scroll whole rows so the cursor row stays inside the box
    let buffer = dialog.buffer();
    let width = interior.width.max(1) as usize;
    let cursor_row = buffer.cursor() / width;
    let offset = cursor_row.saturating_sub(interior.height.saturating_sub(1) as usize);

    let lines: Vec<Line> = buffer
        .wrapped_lines(interior.width)
        .into_iter()
        .skip(offset)
        .map(Line::from)
        .collect();
    let input = Paragraph::new(lines).style(
        Style::default()
            .fg(THEME.dialog_input_fg)
            .bg(THEME.dialog_input_bg),
    );
    frame.render_widget(input, interior);

    let (row, col) = dialog.cursor_position();
    frame.set_cursor_position((interior.x + col, interior.y + row));
}

fn render_message(frame: &mut Frame, message: &MessageBox) {
    let area = message_area(frame.area());
    let inner = render_dialog_frame(
        frame,
        area,
        &message.title,
        "any key to close",
        THEME.dialog_error_border,
    );
    let text = Paragraph::new(message.text.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(text, inner.inner(ratatui::layout::Margin::new(1, 1)));
}
