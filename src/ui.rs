//! UI rendering functions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::modal_ui::{draw_help_modal, draw_input_modal, draw_picker_modal, draw_quit_confirm};

/// Display column of char index `col` within `line`.
///
/// Tabs advance to the next `tab_width` stop; wide characters count for
/// their full cell width.
pub fn display_col(line: &str, col: usize, tab_width: u8) -> usize {
    let tab = tab_width.max(1) as usize;
    let mut width = 0;
    for c in line.chars().take(col) {
        width += match c {
            '\t' => tab - (width % tab),
            _ => UnicodeWidthChar::width(c).unwrap_or(0),
        };
    }
    width
}

/// Expand tabs to spaces at `tab_width` column stops.
pub fn expand_tabs(line: &str, tab_width: u8) -> String {
    let tab = tab_width.max(1) as usize;
    let mut out = String::with_capacity(line.len());
    let mut width = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let spaces = tab - (width % tab);
                out.push_str(&" ".repeat(spaces));
                width += spaces;
            }
            _ => {
                out.push(c);
                width += UnicodeWidthChar::width(c).unwrap_or(0);
            }
        }
    }
    out
}

/// Slice `line` to the display-column window `[start, start + width)`.
///
/// A wide character that straddles a window edge is replaced by spaces
/// for its visible cells, keeping later columns aligned.
pub fn clip_columns(line: &str, start: usize, width: usize) -> String {
    let end_col = start + width;
    let mut out = String::new();
    let mut col = 0;
    for c in line.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        let end = col + w;
        if end <= start {
            col = end;
            continue;
        }
        if col >= end_col {
            break;
        }
        if col < start || end > end_col {
            out.push_str(&" ".repeat(end.min(end_col) - col.max(start)));
        } else {
            out.push(c);
        }
        col = end;
    }
    out
}

/// Split a windowed line into spans with a reversed cell at `cursor_col`
/// (a display column relative to the window start).
fn cursor_spans(windowed: &str, cursor_col: usize) -> Vec<Span<'static>> {
    let mut before = String::new();
    let mut cursor_char = None;
    let mut after = String::new();
    let mut col = 0;
    for c in windowed.chars() {
        if col < cursor_col {
            before.push(c);
        } else if cursor_char.is_none() && col == cursor_col {
            cursor_char = Some(c);
        } else {
            after.push(c);
        }
        col += UnicodeWidthChar::width(c).unwrap_or(0);
    }
    // At the end of a line the cursor sits on an empty cell.
    let cursor_text = cursor_char
        .map(String::from)
        .unwrap_or_else(|| " ".to_string());
    vec![
        Span::raw(before),
        Span::styled(cursor_text, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ]
}

/// Digits needed for the highest line number.
fn number_width(line_count: usize) -> usize {
    line_count.max(1).to_string().len()
}

/// Contract a path by replacing the home directory with `~` for display.
fn contract_path(path: &std::path::Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(suffix) = path.strip_prefix(&home)
    {
        return format!("~/{}", suffix.display());
    }
    path.display().to_string()
}

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Draw the main UI.
pub fn draw_ui(f: &mut Frame, app: &mut App) {
    // Two-panel layout: buffer (flexible) + status bar (fixed height 3)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Buffer pane (flexible)
            Constraint::Length(3), // Status bar (border + 1 content row + border)
        ])
        .split(f.area());

    if app.document.is_some() {
        draw_buffer_pane(f, app, chunks[0]);
    } else {
        draw_welcome_pane(f, chunks[0]);
    }

    draw_status_bar(f, app, chunks[1]);

    // Modals, topmost last
    if app.picker_state.is_some() {
        draw_picker_modal(f, app);
    }
    if app.prompt_state.is_some() {
        draw_input_modal(f, app);
    }
    if app.show_help_modal {
        draw_help_modal(f);
    }
    if app.show_quit_confirm {
        draw_quit_confirm(f);
    }
}

/// Draw the document buffer with gutter, cursor, and scrollbar.
fn draw_buffer_pane(f: &mut Frame, app: &mut App, area: Rect) {
    let tab_width = app.config.editor.tab_width;
    let show_numbers = app.config.editor.show_line_numbers;

    let Some(document) = &app.document else {
        return;
    };

    let line_count = document.line_count();
    let num_width = number_width(line_count);
    let gutter = if show_numbers { num_width as u16 + 1 } else { 0 };
    let pane_height = area.height.saturating_sub(2);
    let pane_width = area.width.saturating_sub(2 + gutter);

    let (cursor_row, cursor_col) = document.cursor_line_col();
    let cursor_line_text = document.lines().nth(cursor_row).unwrap_or("");
    let cursor_display = display_col(cursor_line_text, cursor_col, tab_width);

    let mut content: Vec<Line> = Vec::new();
    for (i, raw) in document
        .lines()
        .enumerate()
        .skip(app.scroll_line)
        .take(pane_height as usize)
    {
        let expanded = expand_tabs(raw, tab_width);
        let windowed = clip_columns(&expanded, app.scroll_col, pane_width as usize);
        let mut spans: Vec<Span> = Vec::new();
        if show_numbers {
            spans.push(Span::styled(
                format!("{:>width$} ", i + 1, width = num_width),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if i == cursor_row {
            spans.extend(cursor_spans(
                &windowed,
                cursor_display.saturating_sub(app.scroll_col),
            ));
        } else {
            spans.push(Span::raw(windowed));
        }
        content.push(Line::from(spans));
    }

    let mut flags = String::new();
    if document.new_file {
        flags.push_str("[new file]");
    }
    if document.modified {
        if !flags.is_empty() {
            flags.push(' ');
        }
        flags.push_str("[modified]");
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(format!(" {} ", document.display_name())).left_aligned())
        .title_bottom(
            Line::from(format!(" Ln {}, Col {} ", cursor_row + 1, cursor_col + 1)).left_aligned(),
        )
        .title_bottom(Line::from(format!(" {} lines ", line_count)).right_aligned());

    if !flags.is_empty() {
        block = block.title(
            Line::from(Span::styled(
                format!(" {} ", flags),
                Style::default().fg(Color::Yellow),
            ))
            .right_aligned(),
        );
    }

    app.pane_height = pane_height;
    app.pane_width = pane_width;

    let panel = Paragraph::new(content).block(block);
    f.render_widget(panel, area);

    // Scrollbar - only visible when content exceeds viewport
    if line_count > pane_height as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        let mut scrollbar_state = ScrollbarState::default()
            .content_length(line_count)
            .position(app.scroll_line)
            .viewport_content_length(pane_height as usize);

        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

/// Draw the pane shown when no file was given on the command line.
fn draw_welcome_pane(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            "pysnip",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("No file is open."),
        Line::raw(""),
        Line::raw("Start with a file:  pysnip FILE"),
        Line::raw(""),
        Line::raw("Press s to browse snippets, q to quit."),
    ];

    let panel = Paragraph::new(lines).centered().block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Line::from(" pysnip ").left_aligned()),
    );
    f.render_widget(panel, area);
}

/// Draw the status bar: key legend left, notification right.
///
/// While no notification is up, the right side shows the session ID and
/// log location instead.
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[s] Snippet  [w] Write  [?] Help  [q] Quit";

    let (right_text, right_color) = match &app.notification {
        Some(n) => (n.text.clone(), n.level.color()),
        None => {
            let logs = app
                .log_directory
                .as_ref()
                .map(|dir| contract_path(dir))
                .unwrap_or_else(|| "---".to_string());
            (
                format!("Session {}    Logs: {}", app.session_id, logs),
                Color::DarkGray,
            )
        }
    };

    // Right-align against the key legend.
    let inner_width = area.width.saturating_sub(2) as usize;
    let spacing =
        inner_width.saturating_sub(shortcuts.chars().count() + right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(shortcuts, Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(right_text, Style::default().fg(right_color)),
    ]);

    let panel = Paragraph::new(status_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    // display_col tests

    #[test]
    fn test_display_col_plain_ascii() {
        assert_eq!(display_col("hello", 0, 4), 0);
        assert_eq!(display_col("hello", 3, 4), 3);
        assert_eq!(display_col("hello", 5, 4), 5);
    }

    #[test]
    fn test_display_col_tab_advances_to_stop() {
        assert_eq!(display_col("\tx", 1, 4), 4);
        assert_eq!(display_col("ab\tc", 3, 4), 4);
        assert_eq!(display_col("ab\tc", 4, 4), 5);
    }

    #[test]
    fn test_display_col_tab_width_eight() {
        assert_eq!(display_col("\tx", 1, 8), 8);
        assert_eq!(display_col("abcdefg\tx", 8, 8), 8);
    }

    #[test]
    fn test_display_col_wide_chars() {
        assert_eq!(display_col("日本", 1, 4), 2);
        assert_eq!(display_col("日本", 2, 4), 4);
    }

    #[test]
    fn test_display_col_zero_tab_width_treated_as_one() {
        assert_eq!(display_col("\ta", 1, 0), 1);
    }

    // expand_tabs tests

    #[test]
    fn test_expand_tabs_leading() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
    }

    #[test]
    fn test_expand_tabs_mid_line_stops() {
        assert_eq!(expand_tabs("ab\tc", 4), "ab  c");
        assert_eq!(expand_tabs("abcd\te", 4), "abcd    e");
    }

    #[test]
    fn test_expand_tabs_no_tabs_unchanged() {
        assert_eq!(expand_tabs("plain text", 4), "plain text");
    }

    // clip_columns tests

    #[test]
    fn test_clip_columns_window() {
        assert_eq!(clip_columns("hello", 1, 3), "ell");
        assert_eq!(clip_columns("hello", 0, 10), "hello");
    }

    #[test]
    fn test_clip_columns_past_end_is_empty() {
        assert_eq!(clip_columns("ab", 2, 3), "");
        assert_eq!(clip_columns("", 0, 5), "");
    }

    #[test]
    fn test_clip_columns_pads_straddled_wide_chars() {
        // Both CJK cells straddle a window edge, so both become spaces.
        assert_eq!(clip_columns("日本", 1, 2), "  ");
        assert_eq!(clip_columns("日本", 0, 2), "日");
    }

    // cursor_spans tests

    #[test]
    fn test_cursor_spans_mid_line() {
        let spans = cursor_spans("abc", 1);
        assert_eq!(spans[0].content, "a");
        assert_eq!(spans[1].content, "b");
        assert_eq!(spans[2].content, "c");
    }

    #[test]
    fn test_cursor_spans_at_end_uses_space() {
        let spans = cursor_spans("ab", 2);
        assert_eq!(spans[0].content, "ab");
        assert_eq!(spans[1].content, " ");
        assert_eq!(spans[2].content, "");
    }

    #[test]
    fn test_cursor_spans_after_wide_char() {
        let spans = cursor_spans("日x", 2);
        assert_eq!(spans[0].content, "日");
        assert_eq!(spans[1].content, "x");
    }

    // number_width tests

    #[test]
    fn test_number_width() {
        assert_eq!(number_width(0), 1);
        assert_eq!(number_width(9), 1);
        assert_eq!(number_width(10), 2);
        assert_eq!(number_width(1000), 4);
    }

    // contract_path tests

    #[test]
    fn test_contract_path_replaces_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(contract_path(&home.join("logs")), "~/logs");
        }
    }

    // centered_rect tests

    #[test]
    fn test_centered_rect_centers() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 10, area);
        assert_eq!(rect, Rect::new(20, 15, 60, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 10, 5);
        let rect = centered_rect(60, 10, area);
        assert_eq!(rect.width, 10);
        assert_eq!(rect.height, 5);
    }
}
