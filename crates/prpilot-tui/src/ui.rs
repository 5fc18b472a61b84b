use prpilot_core::{ChatRole, Reachability, TargetSystemKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::form::FieldValue;

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [chat_area, work_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(body_area);

    render_chat(app, frame, chat_area);

    if app.orchestrator.state().last_result.is_some() {
        let [form_area, result_area] =
            Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(work_area);
        render_form(app, frame, form_area);
        render_result(app, frame, result_area);
    } else {
        render_form(app, frame, work_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status_color = match app.orchestrator.state().backend_reachable {
        Reachability::Unknown => Color::Yellow,
        Reachability::Reachable => Color::Green,
        Reachability::Unreachable => Color::Red,
    };

    let title = Line::from(vec![
        Span::styled(" PR Pilot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  generation service: "),
        Span::styled(app.connectivity_label(), Style::default().fg(status_color).bold()),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Inner size minus borders, for scroll calculations
    app.chat_height = history_area.height.saturating_sub(2);
    app.chat_width = history_area.width.saturating_sub(2);

    let focused = app.focus == Focus::Chat;
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.orchestrator.state().messages() {
        let (label, color) = match msg.role {
            ChatRole::User => ("You:", Color::Cyan),
            ChatRole::Assistant => ("Assistant:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.is_generating() {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Generating{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let history = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused)))
                .title(" Assistant "),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(history, history_area);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray }))
                .title(" Message (Enter to send) "),
        );
    frame.render_widget(input, input_area);

    if focused {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_form(app: &App, frame: &mut Frame, area: Rect) {
    let [tabs_area, fields_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let kinds = TargetSystemKind::all();
    let titles: Vec<String> = kinds
        .iter()
        .enumerate()
        .map(|(i, k)| format!("F{} {}", i + 1, k.tab_label()))
        .collect();
    let selected = kinds.iter().position(|k| *k == app.active_kind()).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold());
    frame.render_widget(tabs, tabs_area);

    let focused = app.focus == Focus::Form;
    let form = app.form();
    let label_width = form.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);

    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = focused && i == form.selected;
            let marker = if is_selected { "> " } else { "  " };
            let label_style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };

            let mut spans = vec![
                Span::raw(marker),
                Span::styled(format!("{:width$}  ", field.label, width = label_width), label_style),
            ];
            match &field.value {
                FieldValue::Methods { enabled, cursor } => {
                    for (j, (method, on)) in enabled.iter().enumerate() {
                        let mut style = if *on {
                            Style::default().fg(Color::Green)
                        } else {
                            Style::default().fg(Color::DarkGray)
                        };
                        if is_selected && j == *cursor {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        let check = if *on { "x" } else { " " };
                        spans.push(Span::styled(format!("[{}] {}", check, method.as_str()), style));
                        spans.push(Span::raw(" "));
                    }
                }
                _ => spans.push(Span::raw(field.display())),
            }
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(format!(" {} ", app.active_kind().display_name()));
    let body = Paragraph::new(lines).block(block);
    frame.render_widget(body, fields_area);
}

fn render_result(app: &App, frame: &mut Frame, area: Rect) {
    let Some(result) = app.orchestrator.state().last_result.as_ref() else {
        return;
    };
    let focused = app.focus == Focus::Result;

    let mut lines = vec![
        Line::from(Span::styled(result.title.clone(), Style::default().bold())),
        Line::from(Span::styled(
            result.description.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
    ];
    lines.extend(
        result
            .content
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green)))),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Magenta } else { Color::DarkGray }))
        .title(" Generated PR (c copy, d download, x close) ");
    let body = Paragraph::new(lines)
        .block(block)
        .scroll((app.result_scroll, 0));
    frame.render_widget(body, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode, mode_style) = match app.focus {
        Focus::Chat => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        Focus::Form => (" FORM ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        Focus::Result => (" RESULT ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let hint = match (&app.notice, app.focus) {
        (Some(notice), _) => notice.clone(),
        (None, Focus::Chat) => "Enter send | Tab focus | F1-F3 form | Ctrl+C quit".to_string(),
        (None, Focus::Form) => app.form().key_hint().to_string(),
        (None, Focus::Result) => "c copy | d download | x close | Up/Down scroll".to_string(),
    };

    let footer = Line::from(vec![
        Span::styled(mode, mode_style.bold()),
        Span::raw(" "),
        Span::styled(hint, Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
