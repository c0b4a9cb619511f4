//! Terminal UI for the demo binary.
//!
//! The layout is three stacked areas: the document text (with search and
//! bookmark highlights painted over it), the main status line, and a
//! secondary line for pending keys, help, and messages.

pub mod status_line;

use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use crate::editor::controller::Controller;
use crate::editor::session::MessageLevel;
use crate::surface::{DecorationKind, EditorSurface, MemorySurface, Selection, TextRange};
use crate::theme::DecorationStyles;

/// Renders the demo editor.
pub struct UI {
    styles: DecorationStyles,
}

impl UI {
    pub fn new(styles: DecorationStyles) -> Self {
        Self { styles }
    }

    /// Draws the document, status line, and message area.
    pub fn render<B: Backend>(
        &self,
        terminal: &mut Terminal<B>,
        controller: &mut Controller<MemorySurface>,
    ) -> Result<()> {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(1),    // Document
                    Constraint::Length(1), // Main status
                    Constraint::Length(1), // Secondary status / messages
                ])
                .split(f.area());

            self.render_document(f, chunks[0], controller);
            self.render_status(f, chunks[1], chunks[2], controller);
        })?;
        Ok(())
    }

    fn render_document(
        &self,
        f: &mut Frame,
        area: Rect,
        controller: &Controller<MemorySurface>,
    ) {
        let surface = controller.surface();
        let lines = styled_lines(surface, &self.styles);
        f.render_widget(Paragraph::new(lines), area);
    }

    fn render_status(
        &self,
        f: &mut Frame,
        main_area: Rect,
        secondary_area: Rect,
        controller: &mut Controller<MemorySurface>,
    ) {
        let status = status_line::status_text(controller);
        let main = Paragraph::new(status.main)
            .style(Style::default().bg(Color::DarkGray).fg(Color::White));
        f.render_widget(main, main_area);

        // A pending message wins over the secondary status text.
        let secondary = match controller.session().message() {
            Some(message) => {
                let fg = match message.level {
                    MessageLevel::Info => Color::White,
                    MessageLevel::Warning => Color::Yellow,
                    MessageLevel::Error => Color::Red,
                };
                Paragraph::new(message.text.clone()).style(Style::default().fg(fg))
            }
            None => Paragraph::new(status.secondary),
        };
        f.render_widget(secondary, secondary_area);
    }
}

/// Builds styled text lines, layering selection, match, and bookmark
/// highlights over the raw document.
fn styled_lines<'a>(surface: &'a MemorySurface, styles: &DecorationStyles) -> Vec<Line<'a>> {
    let text = surface.text();
    let selections = surface.selections();
    let primary = surface.decorations(DecorationKind::PrimaryMatch);
    let secondary = surface.decorations(DecorationKind::SecondaryMatch);
    let bookmarks = surface.decorations(DecorationKind::Bookmark);

    let mut lines = Vec::new();
    let mut offset = 0;
    for raw_line in text.split('\n') {
        let line_range = TextRange::new(offset, offset + raw_line.len());
        let bookmarked = bookmarks
            .iter()
            .any(|b| b.start >= line_range.start && b.start <= line_range.end);

        let mut spans = Vec::new();
        for (i, ch) in raw_line.char_indices() {
            let at = offset + i;
            let style = char_style(at, selections, primary, secondary, bookmarked, styles);
            spans.push(Span::styled(ch.to_string(), style));
        }
        if spans.is_empty() {
            // Keep empty lines visible, and give cursors on them a cell.
            let style = char_style(offset, selections, primary, secondary, bookmarked, styles);
            spans.push(Span::styled(" ", style));
        }
        lines.push(Line::from(spans));
        offset += raw_line.len() + 1;
    }
    lines
}

fn char_style(
    at: usize,
    selections: &[Selection],
    primary: &[TextRange],
    secondary: &[TextRange],
    bookmarked: bool,
    styles: &DecorationStyles,
) -> Style {
    let cursor = selections.iter().any(|s| s.active == at);
    let selected = selections.iter().any(|s| s.range().contains(at));
    let mut style = Style::default();
    if bookmarked {
        style = style.bg(styles.bookmark.bg);
    }
    if secondary.iter().any(|r| r.contains(at)) {
        style = style.bg(styles.other_matches.bg);
    }
    if primary.iter().any(|r| r.contains(at)) {
        style = style.bg(styles.primary_match.bg).fg(Color::Black);
    }
    if selected || cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}
