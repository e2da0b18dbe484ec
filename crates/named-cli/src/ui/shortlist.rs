//! Shortlist screen: shared matches on the left, my likes on the right.

use named_core::name::BabyName;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);

  let paired = app.user.as_ref().is_some_and(|u| u.is_paired());
  let shared_empty = if paired {
    "No shared matches yet. Keep swiping!"
  } else {
    "Pair with your partner on the Profile screen to see shared matches."
  };

  let view = &app.shortlist;
  let shared_empty = view.shared_error.as_deref().unwrap_or(shared_empty);
  let mine_empty = view.mine_error.as_deref().unwrap_or("Names you like show up here.");

  draw_names(f, cols[0], " Shared matches ", &view.shared, shared_empty, Color::Magenta);
  draw_names(f, cols[1], " Your likes ", &view.mine, mine_empty, Color::Green);
}

fn draw_names(
  f: &mut Frame,
  area: Rect,
  title: &str,
  names: &[BabyName],
  empty: &str,
  accent: Color,
) {
  let block = Block::default()
    .title(format!("{title}({}) ", names.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if names.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(empty)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(ratatui::widgets::Wrap { trim: true }),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = names
    .iter()
    .map(|n| {
      let origin = n.origin.as_deref().unwrap_or("");
      ListItem::new(Line::from(vec![
        Span::styled(format!("♥ {}", n.name), Style::default().fg(accent)),
        Span::styled(format!("  {} {origin}", n.gender), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  f.render_widget(List::new(items).block(block), area);
}
