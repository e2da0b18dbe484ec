//! User documents.
//!
//! A user document is created at registration and keyed by the id the
//! identity provider issued. It is never deleted; only the pairing fields
//! change over its lifetime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pairing::normalize_email;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:             Uuid,
  pub email:          String,
  pub display_name:   String,
  pub created_at:     DateTime<Utc>,
  /// Set exactly once, when an invite involving this user is accepted.
  pub couple_id:      Option<Uuid>,
  /// `true` while this user has an outstanding invite they sent.
  pub invite_pending: bool,
}

impl User {
  pub fn is_paired(&self) -> bool { self.couple_id.is_some() }

  /// Compares both addresses in the form invites are stored in.
  pub fn has_email(&self, email: &str) -> bool {
    normalize_email(&self.email) == normalize_email(email)
  }
}

/// A partial update to a [`User`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
  pub couple_id:      Option<Uuid>,
  pub invite_pending: Option<bool>,
}

impl UserUpdate {
  pub fn couple(couple_id: Uuid) -> Self {
    Self { couple_id: Some(couple_id), ..Self::default() }
  }

  pub fn invite_pending(pending: bool) -> Self {
    Self { invite_pending: Some(pending), ..Self::default() }
  }

  pub fn apply(&self, user: &mut User) {
    if let Some(couple_id) = self.couple_id {
      user.couple_id = Some(couple_id);
    }
    if let Some(pending) = self.invite_pending {
      user.invite_pending = pending;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(email: &str) -> User {
    User {
      id:             Uuid::new_v4(),
      email:          email.into(),
      display_name:   "Émile".into(),
      created_at:     Utc::now(),
      couple_id:      None,
      invite_pending: false,
    }
  }

  #[test]
  fn email_match_ignores_case_and_padding() {
    let u = user("sam@example.com");
    assert!(u.has_email("  SAM@Example.COM "));
    assert!(!u.has_email("sam@example.org"));
  }

  #[test]
  fn email_match_folds_non_ascii_case() {
    let u = user("émile@exemple.fr");
    assert!(u.has_email("ÉMILE@EXEMPLE.FR"));
  }

  #[test]
  fn update_leaves_unset_fields_alone() {
    let mut u = user("sam@example.com");
    let couple_id = Uuid::new_v4();
    UserUpdate::couple(couple_id).apply(&mut u);
    assert_eq!(u.couple_id, Some(couple_id));
    assert!(!u.invite_pending);

    UserUpdate::invite_pending(true).apply(&mut u);
    assert_eq!(u.couple_id, Some(couple_id));
    assert!(u.invite_pending);
  }
}
