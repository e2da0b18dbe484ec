//! Names, votes and the shared shortlist.
//!
//! Names are seeded once and never change. Votes are keyed by the
//! `(user, name)` pair, so re-voting overwrites instead of appending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Names ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Neutral,
}

/// A candidate name from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BabyName {
  /// Stable document id, e.g. `name_007`.
  pub id:     String,
  pub name:   String,
  pub gender: Gender,
  pub origin: Option<String>,
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// A yes/no swipe decision.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
  Yes,
  No,
}

impl Decision {
  pub fn is_yes(self) -> bool { self == Self::Yes }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  /// Always `vote_id(user_id, &name_id)`.
  pub id:        String,
  pub user_id:   Uuid,
  pub name_id:   String,
  pub decision:  Decision,
  /// Store-assigned; refreshed on every overwrite.
  pub timestamp: DateTime<Utc>,
}

/// Input to [`crate::store::NamesStore::put_vote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
  pub user_id:  Uuid,
  pub name_id:  String,
  pub decision: Decision,
}

impl NewVote {
  pub fn id(&self) -> String { vote_id(self.user_id, &self.name_id) }
}

/// The deterministic composite key of a vote document.
pub fn vote_id(user_id: Uuid, name_id: &str) -> String {
  format!("{}_{name_id}", user_id.hyphenated())
}

// ─── Shortlist ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedName {
  pub name_id:  String,
  pub added_at: DateTime<Utc>,
}

/// The materialised set of names both members of a couple liked.
/// Keyed by the couple id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortlist {
  pub couple_id:     Uuid,
  pub matched_names: Vec<MatchedName>,
}
