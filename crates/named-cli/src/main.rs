//! `named`: pick a baby name together, one swipe at a time.
//!
//! # Usage
//!
//! ```
//! named --store ~/.local/share/named/named.db
//! named --config ~/.config/named/named.toml
//! named --seed-only
//! ```

mod app;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use named_client::{
  catalog::seed_if_empty,
  deck::Geometry,
  session::SessionManager,
  voting::{VotingEngine, spawn_vote_writer},
};
use named_store_sqlite::SqliteStore;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::ClientConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "named", version, about = "Pick a baby name together")]
pub struct Args {
  /// Path to a TOML config file (store_path, log_file, canvas_width).
  #[arg(short, long, value_name = "FILE", default_value = "named.toml")]
  config: PathBuf,

  /// SQLite database file.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Log file.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Seed the names catalog if it is empty, then exit.
  #[arg(long)]
  seed_only: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let cfg = ClientConfig::load(&args)?;
  init_tracing(&cfg.log_file)?;

  ensure_parent(&cfg.store_path)?;
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let identity = Arc::new(store.identity());
  let store = Arc::new(store);

  if args.seed_only {
    let written = seed_if_empty(&*store).await.context("seeding names")?;
    println!("seeded {written} names");
    return Ok(());
  }

  let session = SessionManager::new(Arc::clone(&store), identity);
  let listener = session.init().await;
  let (votes, writer) = spawn_vote_writer(VotingEngine::new(store));
  let mut app = App::new(session, votes, Geometry { canvas_width: cfg.canvas_width });

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  // Dropping the app drops the last vote dispatcher; the writer drains and ends.
  drop(app);
  listener.abort();
  if tokio::time::timeout(Duration::from_secs(2), writer).await.is_err() {
    tracing::warn!("vote writer did not finish; unsaved votes dropped");
  }

  run_result
}

fn init_tracing(log_file: &Path) -> Result<()> {
  ensure_parent(log_file)?;
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(log_file)
    .with_context(|| format!("failed to open log file {log_file:?}"))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create directory {parent:?}"))?;
  }
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  let mut last_frame = Instant::now();

  loop {
    let now = Instant::now();
    app.tick(now - last_frame);
    last_frame = now;
    app.sync_session().await;

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting. The short
    // timeout keeps card animations moving.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}
