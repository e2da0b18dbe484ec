//! The per-user decision log.
//!
//! Votes are keyed by `(user, name)`, so casting twice keeps only the latest
//! decision. The swipe deck never waits for a write: it hands votes to a
//! [`VoteDispatcher`] and a background task persists them in order. Failed
//! writes are logged and dropped; the deck's local state stays authoritative
//! until it is mounted again.

use std::sync::Arc;

use named_core::{
  name::{Decision, NewVote, Vote},
  store::NamesStore,
};
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

use crate::{Error, Result};

pub struct VotingEngine<S> {
  store: Arc<S>,
}

impl<S> Clone for VotingEngine<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: NamesStore> VotingEngine<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Record `decision`, replacing any earlier decision on the same name.
  pub async fn cast_vote(&self, user_id: Uuid, name_id: &str, decision: Decision) -> Result<Vote> {
    self
      .store
      .put_vote(NewVote { user_id, name_id: name_id.to_owned(), decision })
      .await
      .map_err(Error::store)
  }

  /// Every decision `user_id` has made, most recent first.
  pub async fn list_votes(&self, user_id: Uuid) -> Result<Vec<Vote>> {
    let mut votes = self
      .store
      .votes_by_user(user_id)
      .await
      .map_err(Error::store)?;
    votes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(votes)
  }
}

// ─── Background writer ───────────────────────────────────────────────────────

/// Sending half of the background vote writer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct VoteDispatcher {
  tx: mpsc::UnboundedSender<NewVote>,
}

impl VoteDispatcher {
  /// A dispatcher whose votes arrive on the returned receiver instead of a
  /// store.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<NewVote>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }

  /// Queue `vote` without waiting for it to be written.
  pub fn dispatch(&self, vote: NewVote) {
    if let Err(mpsc::error::SendError(vote)) = self.tx.send(vote) {
      tracing::warn!(name_id = %vote.name_id, "vote writer has stopped; vote dropped");
    }
  }
}

/// Spawn the task that drains dispatched votes into the store, in order.
///
/// The task ends once every [`VoteDispatcher`] clone is dropped and the queue
/// is empty, so awaiting the handle flushes outstanding writes.
pub fn spawn_vote_writer<S>(engine: VotingEngine<S>) -> (VoteDispatcher, JoinHandle<()>)
where
  S: NamesStore + 'static,
{
  let (dispatcher, mut rx) = VoteDispatcher::channel();
  let handle = tokio::spawn(async move {
    while let Some(vote) = rx.recv().await {
      match engine.cast_vote(vote.user_id, &vote.name_id, vote.decision).await {
        Ok(_) => tracing::debug!(name_id = %vote.name_id, decision = %vote.decision, "vote saved"),
        Err(e) => tracing::warn!(name_id = %vote.name_id, error = %e, "failed to save vote"),
      }
    }
  });
  (dispatcher, handle)
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::test_support::{FlakyStore, store};

  #[tokio::test]
  async fn revote_keeps_only_latest_decision() {
    let voting = VotingEngine::new(store().await);
    let user = Uuid::new_v4();

    voting.cast_vote(user, "name_000", Decision::Yes).await.unwrap();
    voting.cast_vote(user, "name_000", Decision::No).await.unwrap();

    let votes = voting.list_votes(user).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].decision, Decision::No);
  }

  #[tokio::test]
  async fn list_votes_is_newest_first() {
    let voting = VotingEngine::new(store().await);
    let user = Uuid::new_v4();

    for id in ["name_000", "name_001", "name_002"] {
      voting.cast_vote(user, id, Decision::Yes).await.unwrap();
      tokio::time::sleep(Duration::from_millis(2)).await;
    }
    // Re-voting moves a name to the front.
    voting.cast_vote(user, "name_000", Decision::No).await.unwrap();

    let order: Vec<_> = voting
      .list_votes(user)
      .await
      .unwrap()
      .into_iter()
      .map(|v| v.name_id)
      .collect();
    assert_eq!(order, ["name_000", "name_002", "name_001"]);
  }

  #[tokio::test]
  async fn writer_persists_in_dispatch_order() {
    let voting = VotingEngine::new(store().await);
    let (dispatcher, handle) = spawn_vote_writer(voting.clone());
    let user = Uuid::new_v4();

    for id in ["name_000", "name_001"] {
      dispatcher.dispatch(NewVote { user_id: user, name_id: id.into(), decision: Decision::Yes });
    }
    drop(dispatcher);
    handle.await.unwrap();

    assert_eq!(voting.list_votes(user).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn writer_failure_is_swallowed() {
    let mut flaky = FlakyStore::new().await;
    flaky.failing_votes.insert("name_001".into());
    let voting = VotingEngine::new(Arc::new(flaky));
    let (dispatcher, handle) = spawn_vote_writer(voting.clone());
    let user = Uuid::new_v4();

    for id in ["name_000", "name_001", "name_002"] {
      dispatcher.dispatch(NewVote { user_id: user, name_id: id.into(), decision: Decision::No });
    }
    drop(dispatcher);
    handle.await.unwrap();

    let mut saved: Vec<_> = voting
      .list_votes(user)
      .await
      .unwrap()
      .into_iter()
      .map(|v| v.name_id)
      .collect();
    saved.sort();
    assert_eq!(saved, ["name_000", "name_002"]);
  }

  #[tokio::test]
  async fn dispatch_after_writer_stops_is_dropped() {
    let (dispatcher, rx) = VoteDispatcher::channel();
    drop(rx);
    // Must not panic.
    dispatcher.dispatch(NewVote {
      user_id:  Uuid::new_v4(),
      name_id:  "name_000".into(),
      decision: Decision::Yes,
    });
  }
}
