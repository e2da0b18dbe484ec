//! The swipe screen: the top card, the one underneath, and the decision
//! labels.

use named_client::deck::{CardTransform, Phase, SwipeDeck};
use named_core::name::{BabyName, Gender};
use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::centered;
use crate::app::App;

const CARD_WIDTH: u16 = 34;
const CARD_HEIGHT: u16 = 11;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(deck) = &app.deck else {
    draw_message(f, area, "Couldn't load names. Press Tab to retry from another screen.");
    return;
  };
  if deck.is_exhausted() {
    draw_message(f, area, "You've seen every name. Check your shortlist!");
    return;
  }

  let t = deck.transform();
  let base = centered(area, CARD_WIDTH, CARD_HEIGHT);

  if let Some(next) = deck.next() {
    let w = scale(base.width, t.next_card_scale);
    let h = scale(base.height, t.next_card_scale);
    let rect = centered(base, w, h);
    draw_card(f, rect, next, Style::default().fg(Color::DarkGray), None);
  }

  if let Some(current) = deck.current() {
    let rect = shifted(area, base, &t, deck);
    let style = if t.opacity < 0.5 {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default().fg(Color::White)
    };
    f.render_widget(Clear, rect);
    draw_card(f, rect, current, style, Some(&t));
  }

  let counter = Line::from(Span::styled(
    counter_text(deck),
    Style::default().fg(Color::Gray),
  ))
  .alignment(Alignment::Center);
  let counter_area = Rect { y: area.y, height: 1, ..area };
  f.render_widget(Paragraph::new(counter), counter_area);
}

fn counter_text(deck: &SwipeDeck) -> String {
  let left = format!("{} of {} names left", deck.remaining(), deck.candidates().len());
  match deck.phase() {
    Phase::Dragging { .. } => format!("{left}  ·  Space to let go"),
    _ => left,
  }
}

fn draw_message(f: &mut Frame, area: Rect, message: &str) {
  let rect = centered(area, area.width, 1);
  f.render_widget(
    Paragraph::new(message)
      .alignment(Alignment::Center)
      .style(Style::default().fg(Color::Gray)),
    rect,
  );
}

fn draw_card(
  f: &mut Frame,
  area: Rect,
  name: &BabyName,
  style: Style,
  transform: Option<&CardTransform>,
) {
  let mut lines = Vec::new();

  if let Some(t) = transform {
    lines.push(label_line(t));
  } else {
    lines.push(Line::from(""));
  }
  lines.push(Line::from(""));
  lines.push(
    Line::from(Span::styled(name.name.clone(), style.add_modifier(Modifier::BOLD)))
      .alignment(Alignment::Center),
  );
  lines.push(Line::from(""));
  lines.push(
    Line::from(Span::styled(gender_label(name.gender), style)).alignment(Alignment::Center),
  );
  if let Some(origin) = &name.origin {
    lines.push(
      Line::from(Span::styled(format!("Origin: {origin}"), style)).alignment(Alignment::Center),
    );
  }

  let border = match transform {
    Some(t) if t.accept_label_opacity >= 1.0 => Style::default().fg(Color::Green),
    Some(t) if t.reject_label_opacity >= 1.0 => Style::default().fg(Color::Red),
    _ => style,
  };
  let mut block = Block::default()
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .border_style(border);
  if let Some(t) = transform
    && t.rotation_deg.abs() >= 1.0
  {
    block = block.title_bottom(
      Line::from(format!(" {:+.0}° ", t.rotation_deg)).alignment(Alignment::Right),
    );
  }

  f.render_widget(Paragraph::new(lines).block(block), area);
}

/// `LIKE` on the left fading in as the card moves right, `PASS` on the right
/// as it moves left.
fn label_line(t: &CardTransform) -> Line<'static> {
  let like = fade(Color::Green, t.accept_label_opacity);
  let pass = fade(Color::Red, t.reject_label_opacity);
  Line::from(vec![
    Span::styled(" LIKE", like),
    Span::raw("                      "),
    Span::styled("PASS ", pass),
  ])
}

fn fade(color: Color, opacity: f32) -> Style {
  if opacity <= 0.0 {
    Style::default().fg(Color::Reset).add_modifier(Modifier::HIDDEN)
  } else if opacity < 0.5 {
    Style::default().fg(color).add_modifier(Modifier::DIM)
  } else {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
  }
}

fn gender_label(gender: Gender) -> &'static str {
  match gender {
    Gender::Male => "♂ boy",
    Gender::Female => "♀ girl",
    Gender::Neutral => "⚥ neutral",
  }
}

fn scale(len: u16, factor: f32) -> u16 { (f32::from(len) * factor).round() as u16 }

/// The top card's rectangle after translation, kept inside `area`.
///
/// Canvas points map onto terminal columns so that a full canvas width of
/// travel spans the whole screen.
fn shifted(area: Rect, base: Rect, t: &CardTransform, deck: &SwipeDeck) -> Rect {
  let canvas = deck.geometry().canvas_width.max(1.0);
  let dx = (t.translate_x / canvas * f32::from(area.width)).round() as i32;
  let dy = (t.translate_y / canvas * f32::from(area.height)).round() as i32;

  let max_x = i32::from(area.right().saturating_sub(base.width));
  let max_y = i32::from(area.bottom().saturating_sub(base.height));
  let x = (i32::from(base.x) + dx).clamp(i32::from(area.x), max_x.max(i32::from(area.x)));
  let y = (i32::from(base.y) + dy).clamp(i32::from(area.y), max_y.max(i32::from(area.y)));

  Rect {
    x: u16::try_from(x).unwrap_or(area.x),
    y: u16::try_from(y).unwrap_or(area.y),
    ..base
  }
}
