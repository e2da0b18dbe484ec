//! The `NamesStore` trait: the document store the client talks to.
//!
//! Each collection exposes only the operations the client needs: get by id,
//! create or overwrite by id, scan, and equality-filtered queries. There are
//! no transactions and no store-side ordering; callers sort results
//! themselves.

use std::future::Future;

use uuid::Uuid;

use crate::{
  name::{BabyName, NewVote, Shortlist, Vote},
  pairing::{Couple, Invite, InviteAcceptance, InviteStatus, NewInvite},
  user::{User, UserUpdate},
};

/// Abstraction over a document store backend.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks (the background vote writer relies on this).
pub trait NamesStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Create or overwrite the user document keyed by `user.id`.
  fn put_user(&self, user: User) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a partial update. Returns the updated document, or `None` if no
  /// user with `id` exists.
  fn update_user(
    &self,
    id: Uuid,
    update: UserUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Couples ───────────────────────────────────────────────────────────

  /// Persist a new couple. `id` and `created_at` are set by the store.
  fn create_couple(
    &self,
    user_ids: [Uuid; 2],
  ) -> impl Future<Output = Result<Couple, Self::Error>> + Send + '_;

  fn get_couple(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Couple>, Self::Error>> + Send + '_;

  // ── Invites ───────────────────────────────────────────────────────────

  /// Persist a new pending invite. `id` and `created_at` are set by the store.
  fn create_invite(
    &self,
    input: NewInvite,
  ) -> impl Future<Output = Result<Invite, Self::Error>> + Send + '_;

  fn get_invite(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Invite>, Self::Error>> + Send + '_;

  /// Equality query on `(invitee_email, status)`. `email` must already be
  /// normalised. Result order is unspecified.
  fn find_invites(
    &self,
    email: String,
    status: InviteStatus,
  ) -> impl Future<Output = Result<Vec<Invite>, Self::Error>> + Send + '_;

  /// Equality query on `(inviter_id, status)`. Result order is unspecified.
  fn invites_from(
    &self,
    inviter_id: Uuid,
    status: InviteStatus,
  ) -> impl Future<Output = Result<Vec<Invite>, Self::Error>> + Send + '_;

  /// Transition a pending invite to expired. Returns `None` if no pending
  /// invite with `id` exists.
  fn expire_invite(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Invite>, Self::Error>> + Send + '_;

  /// Transition an invite to accepted. Returns `None` if it does not exist.
  fn accept_invite(
    &self,
    id: Uuid,
    acceptance: InviteAcceptance,
  ) -> impl Future<Output = Result<Option<Invite>, Self::Error>> + Send + '_;

  // ── Names ─────────────────────────────────────────────────────────────

  /// Scan the whole catalog. Result order is unspecified.
  fn list_names(&self) -> impl Future<Output = Result<Vec<BabyName>, Self::Error>> + Send + '_;

  /// Create or overwrite the name document keyed by `name.id`.
  fn put_name(&self, name: BabyName) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Create or overwrite the vote keyed by `(user_id, name_id)`. The
  /// timestamp is set by the store.
  fn put_vote(&self, input: NewVote) -> impl Future<Output = Result<Vote, Self::Error>> + Send + '_;

  /// Equality query on `user_id`. Result order is unspecified.
  fn votes_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + '_;

  // ── Shortlists ────────────────────────────────────────────────────────

  fn get_shortlist(
    &self,
    couple_id: Uuid,
  ) -> impl Future<Output = Result<Option<Shortlist>, Self::Error>> + Send + '_;

  /// Create or overwrite the shortlist keyed by `shortlist.couple_id`.
  ///
  /// The client never calls this; it exists for whatever process
  /// materialises matches, and for fixtures.
  fn put_shortlist(
    &self,
    shortlist: Shortlist,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
