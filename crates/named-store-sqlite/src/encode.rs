//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored as their
//! lowercase string form. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use named_core::{
  name::{BabyName, Decision, Gender, MatchedName, Vote},
  pairing::{Couple, Invite, InviteStatus},
  parse_variant,
  user::User,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Shortlist entries ───────────────────────────────────────────────────────

pub fn encode_matched(names: &[MatchedName]) -> Result<String> {
  Ok(serde_json::to_string(names)?)
}

pub fn decode_matched(s: &str) -> Result<Vec<MatchedName>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:        String,
  pub email:          String,
  pub display_name:   String,
  pub created_at:     String,
  pub couple_id:      Option<String>,
  pub invite_pending: bool,
}

pub const USER_COLUMNS: &str =
  "user_id, email, display_name, created_at, couple_id, invite_pending";

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:        row.get(0)?,
      email:          row.get(1)?,
      display_name:   row.get(2)?,
      created_at:     row.get(3)?,
      couple_id:      row.get(4)?,
      invite_pending: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:             decode_uuid(&self.user_id)?,
      email:          self.email,
      display_name:   self.display_name,
      created_at:     decode_dt(&self.created_at)?,
      couple_id:      self.couple_id.as_deref().map(decode_uuid).transpose()?,
      invite_pending: self.invite_pending,
    })
  }
}

/// Raw strings read directly from a `couples` row.
pub struct RawCouple {
  pub couple_id:  String,
  pub first_id:   String,
  pub second_id:  String,
  pub created_at: String,
}

impl RawCouple {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      couple_id:  row.get(0)?,
      first_id:   row.get(1)?,
      second_id:  row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_couple(self) -> Result<Couple> {
    Ok(Couple {
      id:         decode_uuid(&self.couple_id)?,
      user_ids:   [decode_uuid(&self.first_id)?, decode_uuid(&self.second_id)?],
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `invites` row.
pub struct RawInvite {
  pub invite_id:     String,
  pub inviter_id:    String,
  pub invitee_email: String,
  pub status:        String,
  pub created_at:    String,
  pub accepted_at:   Option<String>,
  pub couple_id:     Option<String>,
}

pub const INVITE_COLUMNS: &str =
  "invite_id, inviter_id, invitee_email, status, created_at, accepted_at, couple_id";

impl RawInvite {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      invite_id:     row.get(0)?,
      inviter_id:    row.get(1)?,
      invitee_email: row.get(2)?,
      status:        row.get(3)?,
      created_at:    row.get(4)?,
      accepted_at:   row.get(5)?,
      couple_id:     row.get(6)?,
    })
  }

  pub fn into_invite(self) -> Result<Invite> {
    Ok(Invite {
      id:            decode_uuid(&self.invite_id)?,
      inviter_id:    decode_uuid(&self.inviter_id)?,
      invitee_email: self.invitee_email,
      status:        parse_variant::<InviteStatus>("invite status", &self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      accepted_at:   self.accepted_at.as_deref().map(decode_dt).transpose()?,
      couple_id:     self.couple_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

/// Raw strings read directly from a `names` row.
pub struct RawName {
  pub name_id: String,
  pub name:    String,
  pub gender:  String,
  pub origin:  Option<String>,
}

impl RawName {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      name_id: row.get(0)?,
      name:    row.get(1)?,
      gender:  row.get(2)?,
      origin:  row.get(3)?,
    })
  }

  pub fn into_name(self) -> Result<BabyName> {
    Ok(BabyName {
      id:     self.name_id,
      name:   self.name,
      gender: parse_variant::<Gender>("gender", &self.gender)?,
      origin: self.origin,
    })
  }
}

/// Raw strings read directly from a `votes` row.
pub struct RawVote {
  pub vote_id:     String,
  pub user_id:     String,
  pub name_id:     String,
  pub decision:    String,
  pub recorded_at: String,
}

impl RawVote {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vote_id:     row.get(0)?,
      user_id:     row.get(1)?,
      name_id:     row.get(2)?,
      decision:    row.get(3)?,
      recorded_at: row.get(4)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      id:        self.vote_id,
      user_id:   decode_uuid(&self.user_id)?,
      name_id:   self.name_id,
      decision:  parse_variant::<Decision>("decision", &self.decision)?,
      timestamp: decode_dt(&self.recorded_at)?,
    })
  }
}
