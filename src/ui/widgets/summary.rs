// src/ui/widgets/summary.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::app::App;
use crate::config::MISSING_HEADER;
use crate::core::analysis::ScanSummary;
use crate::core::models::{AuditReport, HeaderFindings};

fn rating(score: u8) -> (&'static str, Color) {
    match score {
        90.. => ("Excellent", Color::Green),
        75..=89 => ("Good", Color::Cyan),
        50..=74 => ("Fair", Color::Yellow),
        _ => ("Poor", Color::Red),
    }
}

fn check_line(label: &str, passed: bool) -> Line<'_> {
    let mark = if passed {
        Span::styled("✓ ", Style::default().fg(Color::Green))
    } else {
        Span::styled("✗ ", Style::default().fg(Color::Red))
    };
    Line::from(vec![mark, Span::raw(label)])
}

fn section(title: &str) -> Block<'_> {
    Block::default().title(title.bold())
}

/// Right-hand column. Stays an empty frame until a report exists.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default().borders(Borders::ALL).title("Summary");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if let Some(report) = app.report() {
        render_report_summary(frame, report, &app.summary, inner);
    }
}

fn render_report_summary(frame: &mut Frame, report: &AuditReport, summary: &ScanSummary, area: Rect) {
    let [score_area, gauge_area, _, checks_area, _, issues_area, _, ports_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let (label, color) = rating(summary.score);
    let score = Paragraph::new(vec![
        Line::from("Score".bold()),
        Line::styled(format!("{}/100 · {label}", summary.score), Style::default().fg(color)),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(score, score_area);
    frame.render_widget(
        Gauge::default()
            .percent(u16::from(summary.score))
            .label("")
            .gauge_style(Style::default().fg(color)),
        gauge_area,
    );

    let header_set = |name: &str| report.headers.get(name).is_some_and(|value| value != MISSING_HEADER);
    let checks = vec![
        check_line("HTTPS", report.https),
        check_line("Content-Security-Policy", header_set("Content-Security-Policy")),
        check_line("X-Frame-Options", header_set("X-Frame-Options")),
        check_line("FTP and SSH closed", !report.open_ports.iter().any(|p| matches!(p, 21 | 22))),
        check_line("No bucket endpoint", !report.cloud_storage_exposure),
    ];
    frame.render_widget(Paragraph::new(checks).block(section("CHECKS")), checks_area);

    let issues = vec![
        Line::from(vec!["Critical: ".into(), Span::styled(summary.critical_issues.to_string(), Style::default().fg(Color::Red))]),
        Line::from(vec!["Warnings: ".into(), Span::styled(summary.warning_issues.to_string(), Style::default().fg(Color::Yellow))]),
    ];
    frame.render_widget(Paragraph::new(issues).block(section("ISSUES")), issues_area);

    let mut ports: Vec<Line> = if report.open_ports.is_empty() {
        vec![Line::from("none answered".dark_gray())]
    } else {
        report
            .open_ports
            .iter()
            .map(|port| Line::styled(format!("{port}/tcp"), Style::default().fg(Color::Cyan)))
            .collect()
    };
    if let HeaderFindings::Failed { error } = &report.headers {
        ports.push(Line::default());
        ports.push(Line::styled(format!("Headers: {error}"), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(ports).block(section("OPEN PORTS")), ports_area);
}
