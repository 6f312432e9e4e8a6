//! Modal UI rendering functions.

use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::snippets::SnippetKind;
use crate::ui::centered_rect;

/// Draw the snippet picker modal.
pub fn draw_picker_modal(f: &mut Frame, app: &mut App) {
    let modal_width: u16 = 56;
    let modal_height: u16 = 14;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let Some(state) = &mut app.picker_state else {
        return;
    };

    let inner_height = modal_area.height.saturating_sub(2) as usize;
    let inner_width = modal_area.width.saturating_sub(2) as usize;

    // Reserve the bottom rows for a blank spacer and the key hint.
    let list_height = inner_height.saturating_sub(2).max(1);
    state.ensure_visible(list_height);

    let label_width = 14;
    let mut content: Vec<Line> = Vec::new();

    let visible_start = state.scroll_offset;
    let visible_end = (state.scroll_offset + list_height).min(SnippetKind::ALL.len());

    for idx in visible_start..visible_end {
        let kind = SnippetKind::ALL[idx];
        let is_selected = idx == state.selected;

        let padded_label = format!("{:width$}", kind.label(), width = label_width);

        let (label_style, desc_style, fill_style) = if is_selected {
            let inverted = Style::default().fg(Color::Black).bg(Color::White);
            (inverted, inverted, inverted)
        } else {
            (
                Style::default().fg(Color::White),
                Style::default().fg(Color::DarkGray),
                Style::default(),
            )
        };

        // Pad to the inner width so the selection highlight spans the row.
        let used = 2 + label_width + kind.description().chars().count();
        let padding = inner_width.saturating_sub(used);

        content.push(Line::from(vec![
            Span::styled("  ", fill_style),
            Span::styled(padded_label, label_style),
            Span::styled(kind.description(), desc_style),
            Span::styled(" ".repeat(padding), fill_style),
        ]));
    }

    // Fill remaining list space if the window is taller than the catalog.
    let rendered = visible_end - visible_start;
    for _ in rendered..list_height {
        content.push(Line::from(""));
    }

    content.push(Line::from(""));

    let hint = "j/k move  Enter insert  Esc cancel";
    let hint_padding = inner_width.saturating_sub(hint.chars().count() + 2);
    content.push(Line::from(vec![
        Span::raw(" ".repeat(hint_padding)),
        Span::styled(hint, Style::default().fg(Color::DarkGray)),
    ]));

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Insert Snippet ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}

/// Draw the parameter input modal.
pub fn draw_input_modal(f: &mut Frame, app: &App) {
    let modal_width: u16 = 60;
    let modal_height: u16 = 8;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let Some(state) = &app.prompt_state else {
        return;
    };

    let request = state.current_request();
    let inner_width = modal_area.width.saturating_sub(2) as usize;
    let field_width = inner_width.saturating_sub(4);

    let mut field_line = vec![Span::raw("  ")];
    if state.input.is_empty() {
        // Placeholder with the cursor parked on its first cell.
        field_line.push(Span::styled(
            " ",
            Style::default().fg(Color::Black).bg(Color::White),
        ));
        field_line.push(Span::styled(
            request.placeholder,
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        field_line.extend(field_spans(&state.input, state.cursor_pos, field_width));
    }

    let hint = "Enter accept  Esc use default";
    let hint_padding = inner_width.saturating_sub(hint.chars().count() + 2);

    let content: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", request.prompt),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(field_line),
        Line::from(""),
        Line::from(vec![
            Span::raw(" ".repeat(hint_padding)),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let title = format!(
        " {} ({}/{}) ",
        state.kind.label(),
        state.current + 1,
        state.total()
    );

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}

/// Split a field value into spans with a block cursor, windowing the
/// value around the cursor when it exceeds the field width.
fn field_spans(value: &str, cursor_pos: usize, field_width: usize) -> Vec<Span<'static>> {
    let chars: Vec<char> = value.chars().collect();

    let start = if chars.len() > field_width {
        let start = cursor_pos.saturating_sub(field_width / 2);
        let end = (start + field_width).min(chars.len());
        end.saturating_sub(field_width)
    } else {
        0
    };
    let end = (start + field_width.max(1)).min(chars.len());
    let visible = &chars[start..end];
    let visible_cursor = cursor_pos.saturating_sub(start);

    let before: String = visible[..visible_cursor.min(visible.len())].iter().collect();
    let (cursor_char, rest) = if visible_cursor < visible.len() {
        (
            visible[visible_cursor].to_string(),
            visible[visible_cursor + 1..].iter().collect::<String>(),
        )
    } else {
        (" ".to_string(), String::new())
    };

    vec![
        Span::styled(before, Style::default().fg(Color::White)),
        Span::styled(
            cursor_char,
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::styled(rest, Style::default().fg(Color::White)),
    ]
}

/// Draw the help modal.
pub fn draw_help_modal(f: &mut Frame) {
    let modal_width: u16 = 46;
    let modal_height: u16 = 18;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let key_style = Style::default().fg(Color::Cyan);
    let desc_style = Style::default().fg(Color::DarkGray);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let inner_width = modal_width.saturating_sub(4) as usize;

    // Footer - right aligned "? or Esc to close"
    let footer_text = "? or Esc to close";
    let footer_padding = inner_width.saturating_sub(footer_text.len());

    let content: Vec<Line> = vec![
        // Snippets section
        Line::from(Span::styled("  Snippets", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("s", key_style),
            Span::styled("  Browse snippets", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Enter", key_style),
            Span::styled("  Insert selection / accept input", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Esc", key_style),
            Span::styled("  Close picker / use default", desc_style),
        ]),
        Line::from(""),
        // Movement section
        Line::from(Span::styled("  Movement", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("↑/↓/←/→", key_style),
            Span::styled("  Move cursor", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("h/j/k/l", key_style),
            Span::styled("  Move cursor", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("PgUp/PgDn", key_style),
            Span::styled("  Page up/down", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Home/End", key_style),
            Span::styled("  Line start/end", desc_style),
        ]),
        Line::from(""),
        // File section
        Line::from(Span::styled("  File", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("w", key_style),
            Span::styled("  Write file", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("q", key_style),
            Span::styled("  Quit", desc_style),
        ]),
        // Footer
        Line::from(""),
        Line::from(vec![
            Span::raw(" ".repeat(footer_padding)),
            Span::styled(footer_text, desc_style),
        ]),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}

/// Draw the unsaved-changes confirmation shown on quit.
pub fn draw_quit_confirm(f: &mut Frame) {
    let modal_width: u16 = 40;
    let modal_height: u16 = 8;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let key_style = Style::default().fg(Color::Cyan);
    let desc_style = Style::default().fg(Color::DarkGray);

    let content: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  You have unsaved changes.",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("w", key_style),
            Span::styled("    Save and quit", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("q", key_style),
            Span::styled("    Quit without saving", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Esc", key_style),
            Span::styled("  Keep editing", desc_style),
        ]),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Unsaved Changes ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}
