//! Shared fixtures for the client tests.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use named_core::{
  name::{BabyName, Gender, NewVote, Shortlist, Vote},
  pairing::{Couple, Invite, InviteAcceptance, InviteStatus, NewInvite},
  store::NamesStore,
  user::{User, UserUpdate},
};
use named_store_sqlite::SqliteStore;
use uuid::Uuid;

pub async fn store() -> Arc<SqliteStore> {
  Arc::new(
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store"),
  )
}

/// Write a user document as registration would.
pub async fn register<S: NamesStore>(store: &S, email: &str) -> User {
  let user = User {
    id:             Uuid::new_v4(),
    email:          email.into(),
    display_name:   email.split('@').next().unwrap_or("user").into(),
    created_at:     Utc::now(),
    couple_id:      None,
    invite_pending: false,
  };
  store.put_user(user.clone()).await.expect("put user");
  user
}

pub fn baby_name(id: &str, name: &str) -> BabyName {
  BabyName {
    id:     id.into(),
    name:   name.into(),
    gender: Gender::Neutral,
    origin: None,
  }
}

pub async fn put_names<S: NamesStore>(store: &S, names: &[(&str, &str)]) {
  for (id, name) in names {
    store.put_name(baby_name(id, name)).await.expect("put name");
  }
}

// ─── FlakyStore ──────────────────────────────────────────────────────────────

/// Refused by [`FlakyStore`] for the listed operations.
#[derive(Debug, thiserror::Error)]
#[error("simulated outage")]
pub struct Outage;

#[derive(Debug, thiserror::Error)]
pub enum FlakyError {
  #[error(transparent)]
  Outage(#[from] Outage),
  #[error(transparent)]
  Inner(#[from] named_store_sqlite::Error),
}

/// Delegates to a [`SqliteStore`] but fails vote writes for selected names,
/// every read of the catalog when `catalog_down` is set, and every shortlist
/// read when `shortlist_down` is set.
pub struct FlakyStore {
  pub inner:          SqliteStore,
  pub failing_votes:  HashSet<String>,
  pub catalog_down:   bool,
  pub shortlist_down: bool,
}

impl FlakyStore {
  pub async fn new() -> Self {
    Self {
      inner:          SqliteStore::open_in_memory().await.expect("in-memory store"),
      failing_votes:  HashSet::new(),
      catalog_down:   false,
      shortlist_down: false,
    }
  }
}

impl NamesStore for FlakyStore {
  type Error = FlakyError;

  async fn get_user(&self, id: Uuid) -> Result<Option<User>, FlakyError> {
    Ok(self.inner.get_user(id).await?)
  }
  async fn put_user(&self, user: User) -> Result<(), FlakyError> {
    Ok(self.inner.put_user(user).await?)
  }
  async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, FlakyError> {
    Ok(self.inner.update_user(id, update).await?)
  }
  async fn create_couple(&self, user_ids: [Uuid; 2]) -> Result<Couple, FlakyError> {
    Ok(self.inner.create_couple(user_ids).await?)
  }
  async fn get_couple(&self, id: Uuid) -> Result<Option<Couple>, FlakyError> {
    Ok(self.inner.get_couple(id).await?)
  }
  async fn create_invite(&self, input: NewInvite) -> Result<Invite, FlakyError> {
    Ok(self.inner.create_invite(input).await?)
  }
  async fn get_invite(&self, id: Uuid) -> Result<Option<Invite>, FlakyError> {
    Ok(self.inner.get_invite(id).await?)
  }
  async fn find_invites(&self, email: String, status: InviteStatus) -> Result<Vec<Invite>, FlakyError> {
    Ok(self.inner.find_invites(email, status).await?)
  }
  async fn invites_from(
    &self,
    inviter_id: Uuid,
    status: InviteStatus,
  ) -> Result<Vec<Invite>, FlakyError> {
    Ok(self.inner.invites_from(inviter_id, status).await?)
  }
  async fn expire_invite(&self, id: Uuid) -> Result<Option<Invite>, FlakyError> {
    Ok(self.inner.expire_invite(id).await?)
  }
  async fn accept_invite(
    &self,
    id: Uuid,
    acceptance: InviteAcceptance,
  ) -> Result<Option<Invite>, FlakyError> {
    Ok(self.inner.accept_invite(id, acceptance).await?)
  }
  async fn list_names(&self) -> Result<Vec<BabyName>, FlakyError> {
    if self.catalog_down {
      return Err(Outage.into());
    }
    Ok(self.inner.list_names().await?)
  }
  async fn put_name(&self, name: BabyName) -> Result<(), FlakyError> {
    Ok(self.inner.put_name(name).await?)
  }
  async fn put_vote(&self, input: NewVote) -> Result<Vote, FlakyError> {
    if self.failing_votes.contains(&input.name_id) {
      return Err(Outage.into());
    }
    Ok(self.inner.put_vote(input).await?)
  }
  async fn votes_by_user(&self, user_id: Uuid) -> Result<Vec<Vote>, FlakyError> {
    Ok(self.inner.votes_by_user(user_id).await?)
  }
  async fn get_shortlist(&self, couple_id: Uuid) -> Result<Option<Shortlist>, FlakyError> {
    if self.shortlist_down {
      return Err(Outage.into());
    }
    Ok(self.inner.get_shortlist(couple_id).await?)
  }
  async fn put_shortlist(&self, shortlist: Shortlist) -> Result<(), FlakyError> {
    Ok(self.inner.put_shortlist(shortlist).await?)
  }
}
