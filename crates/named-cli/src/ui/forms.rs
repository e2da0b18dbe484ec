//! Sign-in and registration forms.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use super::centered;
use crate::app::{App, Screen};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let title = match app.screen {
    Screen::Register => " Create your account ",
    _ => " Welcome back ",
  };

  let mut lines = vec![
    Line::from(Span::styled(
      "NamedTogether",
      Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center),
    Line::from(""),
  ];

  for (i, field) in app.form.fields.iter().enumerate() {
    let focused = i == app.form.focus;
    let value = if field.secret {
      "•".repeat(field.value.chars().count())
    } else {
      field.value.clone()
    };
    let cursor = if focused { "▏" } else { "" };
    let label_style = if focused {
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::DarkGray)
    };

    lines.push(Line::from(Span::styled(format!(" {}", field.label), label_style)));
    lines.push(Line::from(vec![
      Span::raw(" > "),
      Span::raw(value),
      Span::styled(cursor, Style::default().fg(Color::Magenta)),
    ]));
  }

  let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
  let form_area = centered(area, 48, height);
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(Paragraph::new(lines).block(block), form_area);
}
