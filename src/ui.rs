//! UI rendering with ratatui.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Tabs,
    },
};

use crate::api::ResourceKind;
use crate::app::{App, ModalState, Row, View};
use crate::paging::NotificationKind;
use crate::text::{first_line, fit_width, truncate_str};

/// Width of the name column in lists.
const NAME_WIDTH: usize = 32;

/// Render the entire UI based on current view.
pub fn render(frame: &mut Frame, app: &mut App) {
    match app.view {
        View::List => render_list_view(frame, app),
        View::Detail => render_detail_view(frame, app),
    }

    // Render input overlay if in input mode
    if app.is_input_mode() {
        render_input_overlay(frame, app);
    }

    // Render help modal on top if visible
    if app.show_help {
        render_help(frame);
    }

    // Render modal dialog if open
    if app.is_modal_open() {
        render_modal_overlay(frame, app);
    }
}

/// Render the list view.
fn render_list_view(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Tabs
        Constraint::Min(3),    // List
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    render_title_bar(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    render_list(frame, chunks[2], app);
    render_list_status_bar(frame, chunks[3], app);
}

/// Render the title bar.
fn render_title_bar(frame: &mut Frame, area: Rect, app: &App) {
    let location = app.landing_url.as_deref().unwrap_or(&app.api_base);
    let title = format!(
        " menuboard - {} ",
        truncate_str(location, (area.width as usize).saturating_sub(14))
    );
    let title_bar = Paragraph::new(title).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(title_bar, area);
}

/// Render the resource tabs.
fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = ResourceKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| Line::from(format!("{} {}", i + 1, kind.title())))
        .collect();
    let selected = ResourceKind::ALL
        .iter()
        .position(|k| *k == app.tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

/// Render the visible window of the active list.
fn render_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let has_error = app.active_pane().load_error().is_some();
    let (list_area, error_area) = if has_error {
        let [list, error] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        (list, Some(error))
    } else {
        (area, None)
    };

    // The scroll position also drives the next-page trigger
    let height = list_area.height as usize;
    app.ensure_selected_visible(height);

    let pane = app.active_pane();
    if pane.is_empty() {
        let placeholder = if pane.is_refreshing() {
            "Loading..."
        } else if pane.load_error().is_none() {
            "Nothing here yet. Press n to create one."
        } else {
            ""
        };
        let paragraph = Paragraph::new(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray).italic(),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, list_area);
    } else {
        let offset = pane.scroll_offset();
        let selected = pane.selected();
        let items: Vec<ListItem> = pane
            .rows(offset, height)
            .into_iter()
            .enumerate()
            .map(|(i, row)| create_list_item(row, offset + i == selected))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(
                Style::default()
                    .bg(Color::Indexed(236))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(selected.saturating_sub(offset)));
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    if let (Some(area), Some(message)) = (error_area, app.active_pane().load_error()) {
        let line = Line::from(vec![
            Span::styled(format!(" ✗ {message}"), Style::default().fg(Color::Red)),
            Span::styled("  (r: retry)", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Create a list item from a row.
///
/// When `is_selected` is true, dim colors are brightened for visibility
/// against the highlight background.
fn create_list_item(row: Row, is_selected: bool) -> ListItem<'static> {
    let dim_color = if is_selected {
        Color::Indexed(245)
    } else {
        Color::DarkGray
    };

    let spans = vec![
        Span::styled(format!("#{:<5} ", row.id), Style::default().fg(Color::Magenta)),
        Span::raw(fit_width(&row.name, NAME_WIDTH)),
        Span::raw(" "),
        Span::styled(row.summary, Style::default().fg(dim_color)),
    ];
    ListItem::new(Line::from(spans))
}

/// Render the status bar for list view.
fn render_list_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let width = (area.width as usize).saturating_sub(4);
    let pane = app.active_pane();

    let (text, style) = if let Some(note) = app.refresh.notification() {
        let (prefix, color) = match note.kind {
            NotificationKind::Success => ("✓", Color::Green),
            NotificationKind::Error => ("✗", Color::Red),
        };
        (
            format!(" {prefix} {} ", first_line(note.message(), width)),
            Style::default().bg(Color::DarkGray).fg(color),
        )
    } else if pane.is_loading_more() {
        (
            " Loading... ".to_string(),
            Style::default().bg(Color::DarkGray).fg(Color::Yellow),
        )
    } else {
        let noun = app.tab.title().to_lowercase();
        let count_info = match (pane.has_next_page(), pane.total_elements()) {
            (true, Some(total)) => format!("[{} of {total} {noun}] ", pane.len()),
            (true, None) => format!("[{}+ {noun}] ", pane.len()),
            (false, _) => format!("[{} {noun}] ", pane.len()),
        };
        let help = format!(
            " {count_info}n: new  e: rename  x: delete  r: refresh  1-4: tabs  q: quit  ?: help "
        );
        (help, Style::default().bg(Color::DarkGray).fg(Color::White))
    };

    let status_bar = Paragraph::new(text).style(style);
    frame.render_widget(status_bar, area);
}

/// Render the detail view.
fn render_detail_view(frame: &mut Frame, app: &mut App) {
    let Some(state) = &app.detail_state else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Min(3),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    let title = format!(" {} ", state.kind.singular());
    let title_bar =
        Paragraph::new(title).style(Style::default().bg(Color::Magenta).fg(Color::White));
    frame.render_widget(title_bar, chunks[0]);

    render_detail_content(frame, chunks[1], app);
    render_detail_status_bar(frame, chunks[2]);
}

/// Render the detail content with scrolling.
fn render_detail_content(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(state) = &app.detail_state else {
        return;
    };

    let lines = build_detail_lines(&state.fields);
    let content_height = lines.len();
    app.set_detail_content_height(content_height);

    // Re-borrow after mutation
    let scroll = app.detail_state.as_ref().map(|s| s.scroll).unwrap_or(0);

    let visible_height = area.height as usize;
    let max_scroll = content_height.saturating_sub(visible_height);
    let clamped_scroll = scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .scroll((clamped_scroll as u16, 0))
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT));
    frame.render_widget(paragraph, area);

    if content_height > visible_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut scrollbar_state =
            ScrollbarState::new(content_height.saturating_sub(visible_height))
                .position(clamped_scroll);
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

/// Build lines for detail view content. Multi-line values wrap under their label.
fn build_detail_lines(fields: &[(&'static str, String)]) -> Vec<Line<'static>> {
    let label_width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 2;
    let mut lines = Vec::new();

    for (label, value) in fields {
        let mut value_lines = value.lines();
        let first = value_lines.next().unwrap_or("");
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<label_width$}", format!("{label}:")),
                Style::default().bold(),
            ),
            Span::raw(first.to_string()),
        ]));
        for rest in value_lines {
            lines.push(Line::raw(format!("{}{rest}", " ".repeat(label_width))));
        }
    }

    lines
}

/// Render the status bar for detail view.
fn render_detail_status_bar(frame: &mut Frame, area: Rect) {
    let help_text = " j/k: scroll  Ctrl+d/u: page  q/Esc: back  ?: help ";
    let status_bar =
        Paragraph::new(help_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

fn help_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {keys:<11}"), Style::default().fg(Color::Yellow)),
        Span::raw(action),
    ])
}

/// Render the help modal.
fn render_help(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 50, 80);

    // Clear the area first to avoid background bleed-through
    frame.render_widget(Clear, area);

    let help_lines = vec![
        Line::styled(
            "─── Keyboard Shortcuts ───",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Line::raw(""),
        Line::styled("  Navigation", Style::default().bold()),
        help_line("j / ↓", "Move down (loads more at the end)"),
        help_line("k / ↑", "Move up"),
        help_line("g / Home", "Go to top"),
        help_line("G / End", "Go to last loaded"),
        help_line("Ctrl+d", "Page down"),
        help_line("Ctrl+u", "Page up"),
        help_line("1-4 / Tab", "Switch resource"),
        Line::raw(""),
        Line::styled("  Editing", Style::default().bold()),
        help_line("n", "Create"),
        help_line("e", "Rename selected"),
        help_line("x", "Delete selected"),
        help_line("r", "Refresh from first page"),
        Line::raw(""),
        Line::styled("  General", Style::default().bold()),
        help_line("Enter", "Open detail view"),
        help_line("q", "Quit / Close view"),
        help_line("Esc", "Close detail / help"),
        help_line("?", "Toggle this help"),
    ];

    let help_widget = Paragraph::new(help_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help "),
    );

    frame.render_widget(help_widget, area);
}

/// Calculate a centered rectangle with given percentage of width and height.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Render the modal overlay for confirmation dialogs.
fn render_modal_overlay(frame: &mut Frame, app: &App) {
    let ModalState::Confirm(action) = &app.modal else {
        return;
    };

    let message = action.confirm_message();

    // Calculate centered area for modal box
    let area = frame.area();
    let width = (message.len() as u16 + 6)
        .max(30)
        .min(area.width.saturating_sub(4));
    let height = 5;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let modal_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Confirm ")
        .title_style(Style::default().fg(Color::Yellow).bold());

    let inner_area = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Message
        Constraint::Length(1), // Spacing
        Constraint::Length(1), // Buttons
    ])
    .split(inner_area);

    let message_paragraph = Paragraph::new(message).alignment(Alignment::Center);
    frame.render_widget(message_paragraph, chunks[0]);

    let buttons = Line::from(vec![
        Span::styled(" [Y]es ", Style::default().fg(Color::Green).bold()),
        Span::raw("  "),
        Span::styled(" [N]o ", Style::default().fg(Color::Red).bold()),
    ]);
    let buttons_paragraph = Paragraph::new(buttons).alignment(Alignment::Center);
    frame.render_widget(buttons_paragraph, chunks[2]);
}

/// Render the input overlay for text entry, with the form error below it.
fn render_input_overlay(frame: &mut Frame, app: &App) {
    let Some(mode) = &app.input_mode else {
        return;
    };
    let form_error = app.refresh.form_error();

    let area = frame.area();
    let width = (area.width * 60 / 100).max(40).min(area.width.saturating_sub(4));
    let height = if form_error.is_some() { 4 } else { 3 };
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let input_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, input_area);

    let title = match app.form() {
        Some(form) if form.target.is_none() => {
            format!(" New {} -{}", form.kind.singular().to_lowercase(), mode.title())
        }
        _ => mode.title().to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).bold());

    let inner_area = block.inner(input_area);
    frame.render_widget(block, input_area);

    let [text_area, error_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner_area);

    let input_value = app.input.value();
    let display_text = if input_value.is_empty() {
        Span::styled(mode.placeholder(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input_value)
    };

    // Calculate scroll for long input
    let scroll = app.input.visual_scroll(text_area.width as usize);
    let input_paragraph = Paragraph::new(Line::from(display_text)).scroll((0, scroll as u16));
    frame.render_widget(input_paragraph, text_area);

    if let Some(error) = form_error {
        let line = Span::styled(
            first_line(error, error_area.width as usize),
            Style::default().fg(Color::Red),
        );
        frame.render_widget(Paragraph::new(line), error_area);
    }

    let cursor_x = app.input.visual_cursor().saturating_sub(scroll);
    frame.set_cursor_position(Position::new(text_area.x + cursor_x as u16, text_area.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_lines_align_labels() {
        let fields = vec![
            ("Name", "Espresso".to_string()),
            ("Price", "2.50".to_string()),
        ];
        let lines = build_detail_lines(&fields);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content, "Name:  ");
        assert_eq!(lines[1].spans[0].content, "Price: ");
    }

    #[test]
    fn test_detail_lines_wrap_multiline_values() {
        let fields = vec![("Description", "Strong\nand short".to_string())];
        let lines = build_detail_lines(&fields);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[0].content, format!("{}and short", " ".repeat(13)));
    }

    #[test]
    fn test_list_item_fixed_name_column() {
        let row = Row {
            id: 7,
            name: "Tea".to_string(),
            summary: "2.00".to_string(),
        };
        let item = create_list_item(row, false);
        assert_eq!(item.height(), 1);
    }
}
