//! Application state machine and event dispatcher.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use named_client::{
  deck::{Geometry, Offset, ReleaseOutcome, SwipeDeck},
  matches::{MatchDeriver, ShortlistView},
  pairing::PairingEngine,
  session::SessionManager,
  voting::{VoteDispatcher, VotingEngine},
};
use named_core::{name::Decision, pairing::Invite, user::User};
use named_store_sqlite::{LocalIdentity, SqliteStore};
use tokio::sync::watch;

type Session = SessionManager<SqliteStore, LocalIdentity>;

/// Horizontal distance one `<` or `>` press drags the card.
const NUDGE: f32 = 40.0;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  SignIn,
  Register,
  Swipe,
  Shortlist,
  Profile,
}

impl Screen {
  /// The screen `Tab` moves to once signed in.
  fn next_main(self) -> Self {
    match self {
      Self::Swipe => Self::Shortlist,
      Self::Shortlist => Self::Profile,
      _ => Self::Swipe,
    }
  }
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Field {
  pub label:  &'static str,
  pub value:  String,
  pub secret: bool,
}

impl Field {
  fn text(label: &'static str) -> Self { Self { label, value: String::new(), secret: false } }

  fn secret(label: &'static str) -> Self { Self { label, value: String::new(), secret: true } }
}

/// A column of text inputs with one focused field.
#[derive(Debug, Clone)]
pub struct Form {
  pub fields: Vec<Field>,
  pub focus:  usize,
}

impl Form {
  pub fn sign_in() -> Self {
    Self { fields: vec![Field::text("Email"), Field::secret("Password")], focus: 0 }
  }

  pub fn register() -> Self {
    Self {
      fields: vec![Field::text("Name"), Field::text("Email"), Field::secret("Password")],
      focus:  0,
    }
  }

  fn value(&self, index: usize) -> &str {
    self.fields.get(index).map(|f| f.value.as_str()).unwrap_or_default()
  }

  /// Apply an editing key. Returns `false` for keys the form does not use.
  fn edit(&mut self, key: KeyEvent) -> bool {
    let len = self.fields.len();
    match key.code {
      KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % len,
      KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + len - 1) % len,
      KeyCode::Backspace => {
        self.fields[self.focus].value.pop();
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.fields[self.focus].value.push(c);
      }
      _ => return false,
    }
    true
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,

  /// The signed-in user as last published by the session.
  pub user: Option<User>,

  /// Sign-in or registration input, depending on `screen`.
  pub form: Form,

  /// Mounted on sign-in; `None` while signed out or if loading failed.
  pub deck: Option<SwipeDeck>,

  pub shortlist: ShortlistView,

  /// Partner email typed on the profile screen.
  pub invite_email: String,

  /// A pending invite addressed to the signed-in user.
  pub incoming_invite: Option<Invite>,

  /// The other member of the signed-in user's couple.
  pub partner: Option<User>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  session:  Session,
  sessions: watch::Receiver<Option<User>>,
  pairing:  PairingEngine<SqliteStore>,
  voting:   VotingEngine<SqliteStore>,
  matches:  MatchDeriver<SqliteStore>,
  votes:    VoteDispatcher,
  geometry: Geometry,
}

impl App {
  pub fn new(session: Session, votes: VoteDispatcher, geometry: Geometry) -> Self {
    let store = session.store().clone();
    let mut sessions = session.subscribe();
    // Start signed out; the first published user moves us to the deck.
    sessions.mark_changed();
    Self {
      screen: Screen::SignIn,
      user: None,
      form: Form::sign_in(),
      deck: None,
      shortlist: ShortlistView::default(),
      invite_email: String::new(),
      incoming_invite: None,
      partner: None,
      status_msg: String::new(),
      pairing: PairingEngine::new(store.clone()),
      voting: VotingEngine::new(store.clone()),
      matches: MatchDeriver::new(store),
      sessions,
      session,
      votes,
      geometry,
    }
  }

  fn report(&mut self, e: &named_client::Error) {
    tracing::debug!(error = %e, "operation failed");
    self.status_msg = format!("{}: {e}", e.title());
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Follow sign-in and sign-out published by the session context.
  pub async fn sync_session(&mut self) {
    if !self.sessions.has_changed().unwrap_or(false) {
      return;
    }
    let user = self.sessions.borrow_and_update().clone();
    let previous = self.user.as_ref().map(|u| u.id);
    self.user = user;

    match (&self.user, previous) {
      (Some(user), previous) if previous != Some(user.id) => {
        self.status_msg = format!("Welcome, {}!", user.display_name);
        self.form = Form::sign_in();
        self.screen = Screen::Swipe;
        self.mount_deck().await;
      }
      (Some(_), _) => {}
      (None, _) => {
        self.deck = None;
        self.shortlist = ShortlistView::default();
        self.incoming_invite = None;
        self.partner = None;
        self.invite_email.clear();
        if !matches!(self.screen, Screen::SignIn | Screen::Register) {
          self.form = Form::sign_in();
          self.screen = Screen::SignIn;
        }
      }
    }
  }

  async fn mount_deck(&mut self) {
    let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
      return;
    };
    match SwipeDeck::mount(&self.voting, user_id, self.votes.clone(), self.geometry).await {
      Ok(deck) => self.deck = Some(deck),
      Err(e) => {
        self.deck = None;
        self.report(&e);
      }
    }
  }

  async fn refresh_user(&mut self) {
    match self.session.refresh().await {
      Ok(user) => self.user = user,
      Err(e) => self.report(&e),
    }
  }

  // ── Animation ─────────────────────────────────────────────────────────────

  pub fn tick(&mut self, dt: Duration) {
    if let Some(deck) = &mut self.deck
      && deck.tick(dt)
      && deck.is_exhausted()
    {
      self.status_msg = "That's every name for now. Check your shortlist!".into();
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
      return true;
    }
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match self.screen {
      Screen::SignIn | Screen::Register => self.handle_form_key(key).await,
      Screen::Swipe | Screen::Shortlist | Screen::Profile if key.code == KeyCode::Tab => {
        let next = self.screen.next_main();
        self.open(next).await;
        true
      }
      Screen::Swipe => self.handle_swipe_key(key),
      Screen::Shortlist => self.handle_shortlist_key(key).await,
      Screen::Profile => {
        self.handle_profile_key(key).await;
        true
      }
    }
  }

  async fn handle_form_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Enter => self.submit_form().await,
      KeyCode::Char('r') if ctrl && self.screen == Screen::SignIn => {
        self.screen = Screen::Register;
        self.form = Form::register();
        self.status_msg.clear();
      }
      KeyCode::Esc if self.screen == Screen::Register => {
        self.screen = Screen::SignIn;
        self.form = Form::sign_in();
        self.status_msg.clear();
      }
      KeyCode::Esc => return false,
      _ => {
        self.form.edit(key);
      }
    }
    true
  }

  async fn submit_form(&mut self) {
    self.status_msg = "Signing in…".into();
    let result = match self.screen {
      Screen::Register => {
        self
          .session
          .sign_up(self.form.value(1), self.form.value(2), self.form.value(0))
          .await
      }
      _ => self.session.sign_in(self.form.value(0), self.form.value(1)).await,
    };
    // On success the session publishes the user and `sync_session` moves on.
    if let Err(e) = result {
      self.report(&e);
    }
  }

  fn handle_swipe_key(&mut self, key: KeyEvent) -> bool {
    let Some(deck) = &mut self.deck else {
      return key.code != KeyCode::Char('q');
    };
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Left | KeyCode::Char('h') => {
        deck.decide(Decision::No);
      }
      KeyCode::Right | KeyCode::Char('l') => {
        deck.decide(Decision::Yes);
      }
      KeyCode::Char('<') => {
        deck.drag_by(Offset::new(-NUDGE, 0.0));
      }
      KeyCode::Char('>') => {
        deck.drag_by(Offset::new(NUDGE, 0.0));
      }
      KeyCode::Char(' ') => {
        if let ReleaseOutcome::Commit(decision) = deck.release() {
          tracing::debug!(%decision, "released past threshold");
        }
      }
      _ => {}
    }
    true
  }

  async fn handle_shortlist_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('r') => self.open(Screen::Shortlist).await,
      _ => {}
    }
    true
  }

  async fn handle_profile_key(&mut self, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Enter => self.send_invite().await,
      KeyCode::Char('a') if ctrl => self.accept_invite().await,
      KeyCode::Char('o') if ctrl => {
        if let Err(e) = self.session.sign_out().await {
          self.report(&e);
        }
      }
      KeyCode::Backspace => {
        self.invite_email.pop();
      }
      KeyCode::Char(c) if !ctrl => self.invite_email.push(c),
      _ => {}
    }
  }

  // ── Screens ───────────────────────────────────────────────────────────────

  /// Switch to `screen`, loading whatever it shows.
  async fn open(&mut self, screen: Screen) {
    self.screen = screen;
    self.status_msg.clear();
    match screen {
      Screen::Swipe => {
        let user_id = self.user.as_ref().map(|u| u.id);
        if self.deck.as_ref().map(SwipeDeck::user_id) != user_id {
          self.mount_deck().await;
        }
      }
      Screen::Shortlist => {
        let Some(user) = self.user.clone() else { return };
        self.status_msg = "Loading shortlist…".into();
        self.shortlist = self.matches.load_shortlist(&user).await;
        self.status_msg = if self.shortlist.has_errors() {
          "Part of your shortlist couldn't be loaded. Press r to retry.".into()
        } else {
          String::new()
        };
      }
      Screen::Profile => {
        self.refresh_user().await;
        self.load_partner().await;
        self.load_incoming_invite().await;
      }
      Screen::SignIn | Screen::Register => {}
    }
  }

  async fn load_partner(&mut self) {
    let Some(user) = self.user.clone() else { return };
    match self.pairing.partner(&user).await {
      Ok(partner) => self.partner = partner,
      Err(e) => self.report(&e),
    }
  }

  async fn load_incoming_invite(&mut self) {
    let Some(user) = self.user.clone() else { return };
    if user.is_paired() {
      self.incoming_invite = None;
      return;
    }
    match self.pairing.lookup_pending_invite(&user.email).await {
      Ok(invite) => self.incoming_invite = invite,
      Err(e) => self.report(&e),
    }
  }

  async fn send_invite(&mut self) {
    let Some(user_id) = self.user.as_ref().map(|u| u.id) else { return };
    match self.pairing.send_invite(user_id, &self.invite_email).await {
      Ok(invite) => {
        self.invite_email.clear();
        self.refresh_user().await;
        self.status_msg = format!("Invite sent to {}", invite.invitee_email);
      }
      Err(e) => self.report(&e),
    }
  }

  async fn accept_invite(&mut self) {
    let (Some(user_id), Some(invite_id)) = (
      self.user.as_ref().map(|u| u.id),
      self.incoming_invite.as_ref().map(|i| i.id),
    ) else {
      self.status_msg = "No invite to accept".into();
      return;
    };
    match self.pairing.accept_invite(invite_id, user_id).await {
      Ok(_) => {
        self.incoming_invite = None;
        self.refresh_user().await;
        self.load_partner().await;
        self.status_msg = "You're paired! Shared matches will show on your shortlist.".into();
      }
      Err(e) => self.report(&e),
    }
  }
}
