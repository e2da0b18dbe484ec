//! [`SqliteStore`]: the SQLite implementation of [`NamesStore`].

use std::path::Path;

use chrono::Utc;
use named_core::{
  name::{BabyName, NewVote, Shortlist, Vote},
  pairing::{Couple, Invite, InviteAcceptance, InviteStatus, NewInvite},
  store::NamesStore,
  user::{User, UserUpdate},
};
use rusqlite::{OptionalExtension as _, Row};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    INVITE_COLUMNS, RawCouple, RawInvite, RawName, RawUser, RawVote, USER_COLUMNS,
    decode_matched, decode_uuid, encode_dt, encode_matched, encode_uuid,
  },
  identity::LocalIdentity,
  schema::SCHEMA,
};

type RowMapper<R> = fn(&Row<'_>) -> rusqlite::Result<R>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// An identity provider sharing this store's connection.
  ///
  /// Every call returns a provider with its own (signed-out) session.
  pub fn identity(&self) -> LocalIdentity { LocalIdentity::new(self.conn.clone()) }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single write statement; returns the number of affected rows.
  async fn execute(&self, sql: &'static str, params: Vec<Option<String>>) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;
    Ok(changed)
  }

  /// Run a query and collect every row through `map`.
  async fn query_rows<R>(
    &self,
    sql: String,
    params: Vec<String>,
    map: RowMapper<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Run a query expected to match at most one row.
  async fn query_opt<R>(
    &self,
    sql: String,
    params: Vec<String>,
    map: RowMapper<R>,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
  {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(params.iter()), map)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }
}

// ─── NamesStore impl ─────────────────────────────────────────────────────────

impl NamesStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let raw = self
      .query_opt(
        format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        vec![encode_uuid(id)],
        RawUser::from_row,
      )
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn put_user(&self, user: User) -> Result<()> {
    let id_str      = encode_uuid(user.id);
    let at_str      = encode_dt(user.created_at);
    let couple_str  = user.couple_id.map(encode_uuid);
    let pending     = user.invite_pending;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO users
             (user_id, email, display_name, created_at, couple_id, invite_pending)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            user.email,
            user.display_name,
            at_str,
            couple_str,
            pending
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>> {
    let id_str     = encode_uuid(id);
    let couple_str = update.couple_id.map(encode_uuid);
    let pending    = update.invite_pending;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users
              SET couple_id      = COALESCE(?2, couple_id),
                  invite_pending = COALESCE(?3, invite_pending)
            WHERE user_id = ?1",
          rusqlite::params![id_str, couple_str, pending],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_user(id).await
  }

  // ── Couples ───────────────────────────────────────────────────────────────

  async fn create_couple(&self, user_ids: [Uuid; 2]) -> Result<Couple> {
    let [first, second] = user_ids;
    if first == second {
      return Err(Error::SelfCouple(first));
    }

    let couple = Couple {
      id: Uuid::new_v4(),
      user_ids,
      created_at: Utc::now(),
    };

    self
      .execute(
        "INSERT INTO couples (couple_id, first_id, second_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          Some(encode_uuid(couple.id)),
          Some(encode_uuid(first)),
          Some(encode_uuid(second)),
          Some(encode_dt(couple.created_at)),
        ],
      )
      .await?;

    Ok(couple)
  }

  async fn get_couple(&self, id: Uuid) -> Result<Option<Couple>> {
    let raw = self
      .query_opt(
        "SELECT couple_id, first_id, second_id, created_at FROM couples WHERE couple_id = ?1"
          .to_owned(),
        vec![encode_uuid(id)],
        RawCouple::from_row,
      )
      .await?;
    raw.map(RawCouple::into_couple).transpose()
  }

  // ── Invites ───────────────────────────────────────────────────────────────

  async fn create_invite(&self, input: NewInvite) -> Result<Invite> {
    let invite = Invite {
      id:            Uuid::new_v4(),
      inviter_id:    input.inviter_id,
      invitee_email: input.invitee_email,
      status:        InviteStatus::Pending,
      created_at:    Utc::now(),
      accepted_at:   None,
      couple_id:     None,
    };

    self
      .execute(
        "INSERT INTO invites (invite_id, inviter_id, invitee_email, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          Some(encode_uuid(invite.id)),
          Some(encode_uuid(invite.inviter_id)),
          Some(invite.invitee_email.clone()),
          Some(invite.status.as_ref().to_owned()),
          Some(encode_dt(invite.created_at)),
        ],
      )
      .await?;

    Ok(invite)
  }

  async fn get_invite(&self, id: Uuid) -> Result<Option<Invite>> {
    let raw = self
      .query_opt(
        format!("SELECT {INVITE_COLUMNS} FROM invites WHERE invite_id = ?1"),
        vec![encode_uuid(id)],
        RawInvite::from_row,
      )
      .await?;
    raw.map(RawInvite::into_invite).transpose()
  }

  async fn find_invites(&self, email: String, status: InviteStatus) -> Result<Vec<Invite>> {
    let raws = self
      .query_rows(
        format!(
          "SELECT {INVITE_COLUMNS} FROM invites WHERE invitee_email = ?1 AND status = ?2"
        ),
        vec![email, status.as_ref().to_owned()],
        RawInvite::from_row,
      )
      .await?;
    raws.into_iter().map(RawInvite::into_invite).collect()
  }

  async fn invites_from(&self, inviter_id: Uuid, status: InviteStatus) -> Result<Vec<Invite>> {
    let raws = self
      .query_rows(
        format!("SELECT {INVITE_COLUMNS} FROM invites WHERE inviter_id = ?1 AND status = ?2"),
        vec![encode_uuid(inviter_id), status.as_ref().to_owned()],
        RawInvite::from_row,
      )
      .await?;
    raws.into_iter().map(RawInvite::into_invite).collect()
  }

  async fn expire_invite(&self, id: Uuid) -> Result<Option<Invite>> {
    let changed = self
      .execute(
        "UPDATE invites SET status = ?2 WHERE invite_id = ?1 AND status = ?3",
        vec![
          Some(encode_uuid(id)),
          Some(InviteStatus::Expired.as_ref().to_owned()),
          Some(InviteStatus::Pending.as_ref().to_owned()),
        ],
      )
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_invite(id).await
  }

  async fn accept_invite(
    &self,
    id: Uuid,
    acceptance: InviteAcceptance,
  ) -> Result<Option<Invite>> {
    let changed = self
      .execute(
        "UPDATE invites SET status = ?2, accepted_at = ?3, couple_id = ?4 WHERE invite_id = ?1",
        vec![
          Some(encode_uuid(id)),
          Some(InviteStatus::Accepted.as_ref().to_owned()),
          Some(encode_dt(acceptance.accepted_at)),
          Some(encode_uuid(acceptance.couple_id)),
        ],
      )
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_invite(id).await
  }

  // ── Names ─────────────────────────────────────────────────────────────────

  async fn list_names(&self) -> Result<Vec<BabyName>> {
    let raws = self
      .query_rows(
        "SELECT name_id, name, gender, origin FROM names".to_owned(),
        vec![],
        RawName::from_row,
      )
      .await?;
    raws.into_iter().map(RawName::into_name).collect()
  }

  async fn put_name(&self, name: BabyName) -> Result<()> {
    self
      .execute(
        "INSERT OR REPLACE INTO names (name_id, name, gender, origin) VALUES (?1, ?2, ?3, ?4)",
        vec![
          Some(name.id),
          Some(name.name),
          Some(name.gender.as_ref().to_owned()),
          name.origin,
        ],
      )
      .await?;
    Ok(())
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn put_vote(&self, input: NewVote) -> Result<Vote> {
    let vote = Vote {
      id:        input.id(),
      user_id:   input.user_id,
      name_id:   input.name_id,
      decision:  input.decision,
      timestamp: Utc::now(),
    };

    self
      .execute(
        "INSERT INTO votes (vote_id, user_id, name_id, decision, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (vote_id) DO UPDATE
           SET decision    = excluded.decision,
               recorded_at = excluded.recorded_at",
        vec![
          Some(vote.id.clone()),
          Some(encode_uuid(vote.user_id)),
          Some(vote.name_id.clone()),
          Some(vote.decision.as_ref().to_owned()),
          Some(encode_dt(vote.timestamp)),
        ],
      )
      .await?;

    Ok(vote)
  }

  async fn votes_by_user(&self, user_id: Uuid) -> Result<Vec<Vote>> {
    let raws = self
      .query_rows(
        "SELECT vote_id, user_id, name_id, decision, recorded_at FROM votes WHERE user_id = ?1"
          .to_owned(),
        vec![encode_uuid(user_id)],
        RawVote::from_row,
      )
      .await?;
    raws.into_iter().map(RawVote::into_vote).collect()
  }

  // ── Shortlists ────────────────────────────────────────────────────────────

  async fn get_shortlist(&self, couple_id: Uuid) -> Result<Option<Shortlist>> {
    let raw: Option<(String, String)> = self
      .query_opt(
        "SELECT couple_id, matched_names FROM shortlists WHERE couple_id = ?1".to_owned(),
        vec![encode_uuid(couple_id)],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .await?;

    raw
      .map(|(id, matched)| {
        Ok(Shortlist {
          couple_id:     decode_uuid(&id)?,
          matched_names: decode_matched(&matched)?,
        })
      })
      .transpose()
  }

  async fn put_shortlist(&self, shortlist: Shortlist) -> Result<()> {
    let matched = encode_matched(&shortlist.matched_names)?;
    self
      .execute(
        "INSERT OR REPLACE INTO shortlists (couple_id, matched_names) VALUES (?1, ?2)",
        vec![Some(encode_uuid(shortlist.couple_id)), Some(matched)],
      )
      .await?;
    Ok(())
  }
}
