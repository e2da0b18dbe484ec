//! The signed-in user context.
//!
//! [`SessionManager`] is the one place that knows who is signed in. It turns
//! identity-provider transitions into [`User`] documents and publishes them on
//! a [`watch`] channel that every screen subscribes to.

use std::sync::Arc;

use chrono::Utc;
use named_core::{
  identity::{IdentityProvider, SessionHandle},
  store::NamesStore,
  user::User,
};
use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use crate::{Error, Result, catalog::seed_if_empty};

pub const MIN_PASSWORD_LEN: usize = 6;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";

pub struct SessionManager<S, I> {
  store:    Arc<S>,
  identity: Arc<I>,
  user:     Arc<watch::Sender<Option<User>>>,
}

impl<S, I> Clone for SessionManager<S, I> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      identity: Arc::clone(&self.identity),
      user:     Arc::clone(&self.user),
    }
  }
}

impl<S, I> SessionManager<S, I>
where
  S: NamesStore + 'static,
  I: IdentityProvider + 'static,
{
  pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
    let (user, _) = watch::channel(None);
    Self { store, identity, user: Arc::new(user) }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn identity(&self) -> &Arc<I> { &self.identity }

  /// Seed the catalog and start following the identity provider.
  ///
  /// A failed seed is logged and otherwise ignored. The returned task runs
  /// until the provider goes away.
  pub async fn init(&self) -> JoinHandle<()> {
    if let Err(e) = seed_if_empty(&*self.store).await {
      tracing::warn!(error = %e, "failed to seed names catalog");
    }

    let this = self.clone();
    let mut sessions = self.identity.subscribe();
    tokio::spawn(async move {
      loop {
        let handle = sessions.borrow_and_update().clone();
        let document = match &handle {
          Some(handle) => this.fetch(handle.user_id).await,
          None => None,
        };

        // A newer transition arrived while we were reading; let it win.
        if !sessions.has_changed().unwrap_or(false) {
          match (handle, document) {
            (None, _) => this.publish(None),
            (Some(_), Some(user)) => this.publish(Some(user)),
            (Some(handle), None) => this.publish_fallback(&handle),
          }
        }

        if sessions.changed().await.is_err() {
          tracing::debug!("identity provider closed; session listener stopping");
          break;
        }
      }
    })
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<User>> { self.user.subscribe() }

  pub fn current_user(&self) -> Option<User> { self.user.borrow().clone() }

  pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
    if email.trim().is_empty() || password.is_empty() {
      return Err(Error::validation(FILL_ALL_FIELDS));
    }

    let handle = self
      .identity
      .sign_in(email.trim().to_owned(), password.to_owned())
      .await
      .map_err(Error::auth)?;

    let user = match self.fetch(handle.user_id).await {
      Some(user) => user,
      None => fallback_user(&handle),
    };
    self.publish(Some(user.clone()));
    Ok(user)
  }

  /// Create an account and its user document.
  pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<User> {
    if email.trim().is_empty() || password.is_empty() || display_name.trim().is_empty() {
      return Err(Error::validation(FILL_ALL_FIELDS));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::validation(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters long"
      )));
    }

    let handle = self
      .identity
      .sign_up(email.trim().to_owned(), password.to_owned(), display_name.trim().to_owned())
      .await
      .map_err(Error::auth)?;

    let user = User {
      id:             handle.user_id,
      email:          handle.email,
      display_name:   display_name.trim().to_owned(),
      created_at:     Utc::now(),
      couple_id:      None,
      invite_pending: false,
    };
    self
      .store
      .put_user(user.clone())
      .await
      .map_err(Error::store)?;

    tracing::info!(user_id = %user.id, "registered");
    self.publish(Some(user.clone()));
    Ok(user)
  }

  pub async fn sign_out(&self) -> Result<()> {
    self.identity.sign_out().await.map_err(Error::auth)?;
    self.publish(None);
    Ok(())
  }

  /// Re-read the signed-in user's document, e.g. after pairing changed it.
  pub async fn refresh(&self) -> Result<Option<User>> {
    let Some(id) = self.user.borrow().as_ref().map(|u| u.id) else {
      return Ok(None);
    };
    let Some(user) = self.store.get_user(id).await.map_err(Error::store)? else {
      return Ok(self.current_user());
    };
    self.publish(Some(user.clone()));
    Ok(Some(user))
  }

  /// The user document for `id`. Read failures are logged and treated as a
  /// missing document.
  async fn fetch(&self, id: Uuid) -> Option<User> {
    match self.store.get_user(id).await {
      Ok(user) => user,
      Err(e) => {
        tracing::warn!(user_id = %id, error = %e, "failed to load user document");
        None
      }
    }
  }

  fn publish(&self, user: Option<User>) {
    self.user.send_if_modified(|current| {
      if *current == user {
        return false;
      }
      *current = user;
      true
    });
  }

  /// Publish a stand-in user, unless the real document for the same id is
  /// already published.
  fn publish_fallback(&self, handle: &SessionHandle) {
    self.user.send_if_modified(|current| {
      if current.as_ref().is_some_and(|u| u.id == handle.user_id) {
        return false;
      }
      *current = Some(fallback_user(handle));
      true
    });
  }
}

/// A user synthesised from the session when no document exists yet.
fn fallback_user(handle: &SessionHandle) -> User {
  User {
    id:             handle.user_id,
    email:          handle.email.clone(),
    display_name:   handle
      .display_name
      .clone()
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| "User".to_owned()),
    created_at:     Utc::now(),
    couple_id:      None,
    invite_pending: false,
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use named_core::user::UserUpdate;
  use named_store_sqlite::{LocalIdentity, SqliteStore};

  use super::*;
  use crate::test_support::{FlakyStore, store};

  async fn manager() -> SessionManager<SqliteStore, LocalIdentity> {
    let s = store().await;
    let identity = Arc::new(s.identity());
    SessionManager::new(s, identity)
  }

  async fn wait_until(
    rx: &mut watch::Receiver<Option<User>>,
    f: impl FnMut(&Option<User>) -> bool,
  ) -> Option<User> {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(f))
      .await
      .expect("timed out waiting for session")
      .expect("session channel closed")
      .clone()
  }

  #[tokio::test]
  async fn sign_up_creates_user_document() {
    let session = manager().await;

    let user = session
      .sign_up("Sam@Example.com", "hunter22", "Sam")
      .await
      .unwrap();
    assert_eq!(user.email, "sam@example.com");
    assert!(!user.invite_pending);
    assert_eq!(session.current_user(), Some(user.clone()));

    let stored = session.store().get_user(user.id).await.unwrap();
    assert_eq!(stored, Some(user));
  }

  #[tokio::test]
  async fn sign_up_validates_input() {
    let session = manager().await;

    let err = session.sign_up("sam@example.com", "12345", "Sam").await.unwrap_err();
    assert_eq!(err.to_string(), "Password must be at least 6 characters long");

    let err = session.sign_up("sam@example.com", "hunter22", " ").await.unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all fields");

    assert!(session.identity().current().is_none());
    assert!(session.current_user().is_none());
  }

  #[tokio::test]
  async fn sign_in_round_trip() {
    let session = manager().await;
    let registered = session.sign_up("sam@example.com", "hunter22", "Sam").await.unwrap();
    session.sign_out().await.unwrap();
    assert!(session.current_user().is_none());

    let user = session.sign_in("SAM@example.com", "hunter22").await.unwrap();
    assert_eq!(user, registered);
  }

  #[tokio::test]
  async fn sign_in_failures() {
    let session = manager().await;
    session.sign_up("sam@example.com", "hunter22", "Sam").await.unwrap();
    session.sign_out().await.unwrap();

    assert!(matches!(session.sign_in("", "x").await, Err(Error::Validation(_))));
    let err = session.sign_in("sam@example.com", "wrong-one").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(err.title(), "Sign-in failed");
    assert!(session.current_user().is_none());
  }

  #[tokio::test]
  async fn init_seeds_and_follows_provider() {
    let session = manager().await;
    let _listener = session.init().await;
    assert!(!session.store().list_names().await.unwrap().is_empty());

    let mut rx = session.subscribe();

    // A session without a user document resolves to a stand-in.
    let handle = session
      .identity()
      .sign_up("kim@example.com".into(), "hunter22".into(), "Kim".into())
      .await
      .unwrap();
    let user = wait_until(&mut rx, |u| u.is_some()).await.unwrap();
    assert_eq!(user.id, handle.user_id);
    assert_eq!(user.display_name, "Kim");

    session.identity().sign_out().await.unwrap();
    assert!(wait_until(&mut rx, |u| u.is_none()).await.is_none());
  }

  #[tokio::test]
  async fn init_survives_seed_failure() {
    let mut flaky = FlakyStore::new().await;
    flaky.catalog_down = true;
    let identity = Arc::new(flaky.inner.identity());
    let session = SessionManager::new(Arc::new(flaky), identity);

    let listener = session.init().await;
    assert!(!listener.is_finished());
  }

  #[tokio::test]
  async fn refresh_picks_up_pairing_changes() {
    let session = manager().await;
    assert_eq!(session.refresh().await.unwrap(), None);

    let user = session.sign_up("sam@example.com", "hunter22", "Sam").await.unwrap();
    let couple_id = Uuid::new_v4();
    session
      .store()
      .update_user(user.id, UserUpdate::couple(couple_id))
      .await
      .unwrap();

    let refreshed = session.refresh().await.unwrap().unwrap();
    assert_eq!(refreshed.couple_id, Some(couple_id));
    assert!(session.current_user().unwrap().is_paired());
  }

  #[test]
  fn fallback_user_defaults_display_name() {
    let handle = SessionHandle {
      user_id:      Uuid::new_v4(),
      email:        "kim@example.com".into(),
      display_name: None,
    };
    let user = fallback_user(&handle);
    assert_eq!(user.display_name, "User");
    assert_eq!(user.id, handle.user_id);
    assert!(!user.is_paired());
  }
}
