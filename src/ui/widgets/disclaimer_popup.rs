// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::config::DEFAULT_PORTS;
use crate::ui::layout::centered;

/// Modal shown until the user confirms they may audit the targets they enter.
pub fn render_disclaimer_popup(frame: &mut Frame, area: Rect) {
    let ports = DEFAULT_PORTS.map(|p| p.to_string()).join(", ");

    let body = Text::from(vec![
        Line::from("AUTHORIZED USE ONLY".bold().yellow()),
        Line::default(),
        Line::from(format!(
            "Each audit sends one HTTP request to the URL you enter and opens TCP connections to ports {ports} on its host."
        )),
        Line::default(),
        Line::from("Only audit sites you own or have written permission to assess. Unauthorized probing may be unlawful where you are, and the authors accept no liability for misuse."),
        Line::default(),
        Line::from(vec![
            "Enter".bold().yellow(),
            " to continue, ".into(),
            "Esc".bold().yellow(),
            " to quit".into(),
        ]),
    ]);

    let popup_area = centered(area, 70, 60);
    let popup = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" Before you start ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red)),
        );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}
