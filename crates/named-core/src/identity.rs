//! The `IdentityProvider` trait: the external authentication collaborator.
//!
//! The provider owns credentials and issues stable user ids. It knows nothing
//! about user documents; resolving a session to a [`crate::user::User`] is the
//! client's job.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// The identity of the signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
  pub user_id:      Uuid,
  pub email:        String,
  pub display_name: Option<String>,
}

pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Authenticate an existing account and make it the current session.
  fn sign_in(
    &self,
    email: String,
    password: String,
  ) -> impl Future<Output = Result<SessionHandle, Self::Error>> + Send + '_;

  /// Create an account and make it the current session.
  fn sign_up(
    &self,
    email: String,
    password: String,
    display_name: String,
  ) -> impl Future<Output = Result<SessionHandle, Self::Error>> + Send + '_;

  /// End the current session. Signing out with no session is not an error.
  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Subscribe to session transitions. The receiver starts out holding the
  /// current session (or `None`).
  fn subscribe(&self) -> watch::Receiver<Option<SessionHandle>>;
}
