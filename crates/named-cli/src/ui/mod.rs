//! TUI rendering: header, the active screen, status bar.

pub mod deck;
pub mod forms;
pub mod profile;
pub mod shortlist;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::SignIn | Screen::Register => forms::draw(f, rows[1], app),
    Screen::Swipe => deck::draw(f, rows[1], app),
    Screen::Shortlist => shortlist::draw(f, rows[1], app),
    Screen::Profile => profile::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let tabs = match app.screen {
    Screen::SignIn | Screen::Register => String::new(),
    current => [Screen::Swipe, Screen::Shortlist, Screen::Profile]
      .into_iter()
      .map(|s| {
        let label = screen_label(s);
        if s == current { format!("[{label}]") } else { format!(" {label} ") }
      })
      .collect::<Vec<_>>()
      .join(" "),
  };

  let left = Span::styled(
    format!(" named  {tabs}"),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  let who = app
    .user
    .as_ref()
    .map(|u| format!("{} · ", u.display_name))
    .unwrap_or_default();
  let date = Local::now().format("%Y-%m-%d");
  let right = Span::styled(format!("{who}{date} "), Style::default().fg(Color::Gray));

  // Simple left-right header: pad the middle.
  let used = left.width() + right.width();
  let pad = usize::from(area.width).saturating_sub(used);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn screen_label(screen: Screen) -> &'static str {
  match screen {
    Screen::SignIn => "Sign in",
    Screen::Register => "Register",
    Screen::Swipe => "Swipe",
    Screen::Shortlist => "Shortlist",
    Screen::Profile => "Profile",
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let hints = match app.screen {
    Screen::SignIn => "Tab next field  Enter sign in  ^R register  Esc quit",
    Screen::Register => "Tab next field  Enter create account  Esc back",
    Screen::Swipe => "←/h pass  →/l like  < > drag  Space release  Tab switch  q quit",
    Screen::Shortlist => "r reload  Tab switch  q quit",
    Screen::Profile => "type email  Enter invite  ^A accept invite  ^O sign out  Tab switch",
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {} ", screen_label(app.screen).to_uppercase()),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Magenta)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// A `width` × `height` rectangle centred in `area`, clipped to it.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}
