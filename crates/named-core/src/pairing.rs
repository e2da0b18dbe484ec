//! Couples and the invites that form them.
//!
//! An invite is addressed to an email rather than to a user, because the
//! invitee may not have registered yet. Accepting it creates a [`Couple`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A confirmed pairing of exactly two distinct users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Couple {
  pub id:         Uuid,
  /// Order is arbitrary; the inviter is stored first.
  pub user_ids:   [Uuid; 2],
  pub created_at: DateTime<Utc>,
}

impl Couple {
  pub fn contains(&self, user_id: Uuid) -> bool { self.user_ids.contains(&user_id) }

  /// The member of this couple that is not `user_id`.
  pub fn partner_of(&self, user_id: Uuid) -> Option<Uuid> {
    match self.user_ids {
      [a, b] if a == user_id => Some(b),
      [a, b] if b == user_id => Some(a),
      _ => None,
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InviteStatus {
  Pending,
  Accepted,
  /// The inviter paired through a different invite first.
  Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
  pub id:            Uuid,
  pub inviter_id:    Uuid,
  /// Always stored lower-cased.
  pub invitee_email: String,
  pub status:        InviteStatus,
  pub created_at:    DateTime<Utc>,
  pub accepted_at:   Option<DateTime<Utc>>,
  pub couple_id:     Option<Uuid>,
}

impl Invite {
  pub fn is_pending(&self) -> bool { self.status == InviteStatus::Pending }
}

/// Input to [`crate::store::NamesStore::create_invite`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewInvite {
  pub inviter_id:    Uuid,
  pub invitee_email: String,
}

impl NewInvite {
  /// Builds the input with the email normalised for equality queries.
  pub fn new(inviter_id: Uuid, invitee_email: &str) -> Self {
    Self {
      inviter_id,
      invitee_email: normalize_email(invitee_email),
    }
  }
}

/// Marks an invite accepted; written by the pairing flow only.
#[derive(Debug, Clone)]
pub struct InviteAcceptance {
  pub accepted_at: DateTime<Utc>,
  pub couple_id:   Uuid,
}

/// The canonical form used to store and query invite emails.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
