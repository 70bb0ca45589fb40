// src/ui/widgets/analysis_view.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::errors::AuditError;
use crate::core::knowledge_base::{get_finding_detail, FindingDetail};
use crate::core::models::{AnalysisFinding, Severity};

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
    }
}

fn finding_item(finding: &AnalysisFinding) -> ListItem<'static> {
    let style = Style::default().fg(severity_color(finding.severity));
    let line = match get_finding_detail(&finding.code) {
        Some(detail) => Line::from(vec![
            Span::styled(detail.category.tag(), Style::default().fg(Color::DarkGray)),
            Span::styled(detail.title, style),
        ]),
        None => Line::styled(finding.code.clone(), style),
    };
    ListItem::new(line)
}

fn detail_text(detail: &FindingDetail) -> Vec<Line<'static>> {
    vec![
        Line::styled(detail.category.to_string(), Style::default().fg(Color::DarkGray)),
        Line::default(),
        Line::from("Why it matters".yellow().bold()),
        Line::from(detail.description),
        Line::default(),
        Line::from("Fix".yellow().bold()),
        Line::from(detail.remediation),
    ]
}

/// Left-hand pane: a spinner while auditing, then the findings list with the
/// selected finding explained underneath.
pub fn render_analysis_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Findings (↑/↓ to select)");

    match (&app.state, &app.outcome) {
        (AppState::Scanning, _) => {
            let spinner = Line::from(vec![
                Span::styled(format!("{} ", SPINNER_CHARS[app.spinner_frame]), Style::default().fg(Color::Cyan)),
                Span::raw("Auditing..."),
            ]);
            frame.render_widget(Paragraph::new(spinner).centered().block(block), area);
        }
        (AppState::Finished, Some(Err(error))) => render_error(frame, error, block, area),
        (AppState::Finished, Some(Ok(_))) => render_findings(frame, app, block, area),
        _ => {
            let hint = Paragraph::new("Type a URL such as https://example.com and press Enter.").centered();
            frame.render_widget(hint.block(block), area);
        }
    }
}

fn render_error(frame: &mut Frame, error: &AuditError, block: Block, area: Rect) {
    let text = vec![
        Line::default(),
        Line::from("The audit did not run.".red().bold()),
        Line::default(),
        Line::from(error.to_string()),
    ];
    frame.render_widget(Paragraph::new(text).centered().block(block), area);
}

fn render_findings(frame: &mut Frame, app: &mut App, block: Block, area: Rect) {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [list_area, detail_area] =
        Layout::vertical([Constraint::Percentage(40), Constraint::Min(0)]).areas(inner);

    let list = List::new(app.findings.iter().map(finding_item))
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(list, list_area, &mut app.analysis_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    let selected = app
        .analysis_list_state
        .selected()
        .and_then(|i| app.findings.get(i))
        .and_then(|finding| get_finding_detail(&finding.code));

    let details = match selected {
        Some(detail) => Paragraph::new(detail_text(detail)).wrap(Wrap { trim: true }),
        None if app.findings.is_empty() => Paragraph::new(vec![
            Line::default(),
            Line::from("Nothing to report".green().bold()),
            Line::from("HTTPS in use, both headers set, no risky port answered."),
        ])
        .centered(),
        None => Paragraph::new("Select a finding to see details.").centered(),
    };
    frame.render_widget(details.block(detail_block), detail_area);
}
