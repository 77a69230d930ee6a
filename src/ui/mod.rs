use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::document::{Document, ElementId, ElementKind};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),  // Info line
            Constraint::Min(4),     // Accounts box
            Constraint::Length(3),  // Total button box
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_accounts_box(f, app, chunks[1]);
    draw_total_box(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Alert => draw_alert_popup(f, app),
        Popup::Help => draw_help_popup(f, app),
    }
}

fn text_of(doc: &Document, id: ElementId) -> &str {
    doc.text(id).unwrap_or_default()
}

/// Elements of `kind` directly under `parent`, in document order
fn children_of_kind(doc: &Document, parent: ElementId, kind: ElementKind) -> Vec<ElementId> {
    doc.children(parent)
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|&id| doc.kind(id) == Ok(kind))
        .collect()
}

fn button_label(text: &str) -> String {
    format!("[ {} ]", text)
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = if let Some(ref status) = app.status_message {
        let color = if status.starts_with("Error") { theme.danger } else { theme.warning };
        Line::from(Span::styled(status, Style::default().fg(color)))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(theme.text_dim)))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_accounts_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let doc = &app.board.doc;
    let focused = app.focused_button();

    let block = Block::default()
        .title(Span::styled(
            " Accounts ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    let header = Row::new(vec![
        Span::styled("Name", Style::default().fg(theme.header)),
        Span::styled("Balance", Style::default().fg(theme.header)),
        Span::styled("", Style::default().fg(theme.header)),
    ]);

    let row_ids = children_of_kind(doc, doc.root(), ElementKind::Row);
    let rows: Vec<Row> = if row_ids.is_empty() {
        vec![Row::new(vec![Span::styled(
            "  No accounts configured",
            Style::default().fg(theme.text_dim),
        )])]
    } else {
        // Each row is drawn from its own elements: name text, balance label, pay button
        row_ids
            .iter()
            .map(|&row| {
                let mut cells = Vec::new();
                let mut has_focus = false;
                for &child in doc.children(row).unwrap_or_default() {
                    let text = text_of(doc, child);
                    let cell = match doc.kind(child) {
                        Ok(ElementKind::Label) => Span::styled(text, Style::default().fg(theme.success)),
                        Ok(ElementKind::Button) => {
                            has_focus |= child == focused;
                            let color = if child == focused { theme.accent } else { theme.text_dim };
                            Span::styled(button_label(text), Style::default().fg(color))
                        }
                        _ => Span::styled(text, Style::default().fg(theme.text)),
                    };
                    cells.push(cell);
                }

                let row_style = if has_focus {
                    Style::default().bg(theme.bg_selected).fg(theme.text)
                } else {
                    Style::default()
                };
                Row::new(cells).style(row_style)
            })
            .collect()
    };

    let widths = [
        Constraint::Percentage(50),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ];

    let table = Table::new(rows, widths)
        .header(header.style(Style::default()))
        .block(block);

    f.render_widget(table, area);
}

fn draw_total_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let doc = &app.board.doc;
    let focused = app.focused_button();

    let buttons: Vec<Span> = children_of_kind(doc, doc.root(), ElementKind::Button)
        .into_iter()
        .map(|id| {
            let style = if id == focused {
                Style::default()
                    .fg(theme.accent)
                    .bg(theme.bg_selected)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_dim)
            };
            Span::styled(button_label(text_of(doc, id)), style)
        })
        .collect();

    let border_color = if focused == app.board.total_button { theme.accent } else { theme.inactive };
    let content = Paragraph::new(Line::from(buttons))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );

    f.render_widget(content, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut hints: Vec<(&str, &str)> = vec![("↑↓", "Nav"), ("Enter", "Press")];
    if app.focused_account().is_some() {
        hints.push(("p", "Pay"));
    }
    hints.extend([("t", "Total"), ("h", "Help"), ("q", "Quit")]);

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_alert_popup(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered_rect(40, 25, f.area());

    f.render_widget(Clear, popup_area);

    let message = app.board.doc.pending_alert().unwrap_or_default();

    let alert = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            message,
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::styled(" OK", Style::default().fg(theme.text_dim)),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Alert ", Style::default().fg(theme.warning)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: false });

    f.render_widget(alert, popup_area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        ))
    };
    let key = |keys: &'static str, what: String| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(theme.accent)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Navigation ═══"),
        key("  ↑/↓ k/j   ", "Move between buttons".to_string()),
        key("  Home/End  ", "First account / total button".to_string()),
        Line::from(""),
        section("═══ Actions ═══"),
        key("  Enter     ", "Press the focused button".to_string()),
        key(
            "  p         ",
            format!("Pay {} to the focused account", app.board.ledger.pay_amount()),
        ),
        key("  t         ", "Print the total of all balances".to_string()),
        key("  q         ", "Quit".to_string()),
        Line::from(""),
        section("═══ Headless ═══"),
        key("  tally --pay Bob --total   ", "Pay, then print the sum".to_string()),
        key("  tally --total --json      ", "Balances as JSON".to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(theme.text_dim)),
            Span::styled("h", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("?", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::styled(" to close", Style::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" tally Help ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
