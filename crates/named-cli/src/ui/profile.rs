//! Profile screen: account details and partner pairing.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let Some(user) = &app.user else {
    f.render_widget(Paragraph::new("Not signed in.").block(block), area);
    return;
  };

  let dim = Style::default().fg(Color::DarkGray);
  let bold = Style::default().add_modifier(Modifier::BOLD);

  let mut lines = vec![
    Line::from(vec![Span::styled("Name   ", dim), Span::styled(user.display_name.clone(), bold)]),
    Line::from(vec![Span::styled("Email  ", dim), Span::raw(user.email.clone())]),
    Line::from(vec![
      Span::styled("Since  ", dim),
      Span::raw(user.created_at.format("%Y-%m-%d").to_string()),
    ]),
    Line::from(""),
  ];

  if user.is_paired() {
    let with = app
      .partner
      .as_ref()
      .map_or_else(|| "your partner".to_owned(), |p| format!("{} ({})", p.display_name, p.email));
    lines.push(Line::from(Span::styled(
      format!("♥ You're paired with {with}."),
      Style::default().fg(Color::Magenta),
    )));
  } else {
    if let Some(invite) = &app.incoming_invite {
      lines.push(Line::from(Span::styled(
        "You have an invite from your partner. Press Ctrl-A to accept.",
        Style::default().fg(Color::Green),
      )));
      lines.push(Line::from(Span::styled(
        format!("  sent {}", invite.created_at.format("%Y-%m-%d %H:%M")),
        dim,
      )));
      lines.push(Line::from(""));
    }

    if user.invite_pending {
      lines.push(Line::from(Span::styled(
        "Invite sent. Waiting for your partner to accept.",
        Style::default().fg(Color::Yellow),
      )));
    } else {
      lines.push(Line::from("Invite your partner by email:"));
      lines.push(Line::from(vec![
        Span::raw(" > "),
        Span::raw(app.invite_email.clone()),
        Span::styled("▏", Style::default().fg(Color::Magenta)),
      ]));
    }
  }

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    area,
  );
}
