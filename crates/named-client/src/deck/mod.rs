//! The swipe deck controller.
//!
//! The deck is loaded once and then runs entirely in memory: a decision is
//! dispatched to the background vote writer and the deck moves on without
//! waiting for the write. While the outgoing card animates away the deck is
//! locked and every input is a no-op.

pub mod gesture;

use std::{collections::HashSet, time::Duration};

use named_core::{
  name::{BabyName, Decision, NewVote},
  store::NamesStore,
};
use uuid::Uuid;

pub use self::gesture::{CardTransform, Geometry, Offset, Phase, ReleaseOutcome};
use self::gesture::{COMMIT_DURATION, SETTLE_DURATION, release_decision};
use crate::{
  Result,
  catalog::load_catalog,
  voting::{VoteDispatcher, VotingEngine},
};

#[derive(Debug)]
pub struct SwipeDeck {
  user_id:    Uuid,
  candidates: Vec<BabyName>,
  position:   usize,
  phase:      Phase,
  geometry:   Geometry,
  votes:      VoteDispatcher,
}

impl SwipeDeck {
  pub fn new(
    user_id: Uuid,
    candidates: Vec<BabyName>,
    votes: VoteDispatcher,
    geometry: Geometry,
  ) -> Self {
    Self { user_id, candidates, position: 0, phase: Phase::Resting, geometry, votes }
  }

  /// Build the deck for `user_id`: the catalog in name order, minus every
  /// name the user has already decided on.
  pub async fn mount<S: NamesStore>(
    voting: &VotingEngine<S>,
    user_id: Uuid,
    votes: VoteDispatcher,
    geometry: Geometry,
  ) -> Result<Self> {
    let (catalog, decided) =
      tokio::try_join!(load_catalog(voting.store()), voting.list_votes(user_id))?;

    let decided: HashSet<&str> = decided.iter().map(|v| v.name_id.as_str()).collect();
    let candidates: Vec<_> = catalog
      .into_iter()
      .filter(|name| !decided.contains(name.id.as_str()))
      .collect();

    tracing::debug!(%user_id, candidates = candidates.len(), decided = decided.len(), "deck mounted");
    Ok(Self::new(user_id, candidates, votes, geometry))
  }

  // ─── Accessors ───────────────────────────────────────────────────────────

  pub fn user_id(&self) -> Uuid { self.user_id }

  pub fn candidates(&self) -> &[BabyName] { &self.candidates }

  pub fn position(&self) -> usize { self.position }

  pub fn phase(&self) -> &Phase { &self.phase }

  pub fn geometry(&self) -> &Geometry { &self.geometry }

  /// The card on top of the deck.
  pub fn current(&self) -> Option<&BabyName> { self.candidates.get(self.position) }

  /// The card underneath the top card.
  pub fn next(&self) -> Option<&BabyName> { self.candidates.get(self.position + 1) }

  pub fn is_locked(&self) -> bool { self.phase.is_committing() }

  pub fn is_exhausted(&self) -> bool { self.position >= self.candidates.len() }

  /// Cards still to decide. A card on its way out already counts as decided.
  pub fn remaining(&self) -> usize {
    let undecided = self.candidates.len().saturating_sub(self.position);
    undecided.saturating_sub(usize::from(self.is_locked()))
  }

  pub fn offset(&self) -> Offset { self.phase.offset(&self.geometry) }

  pub fn transform(&self) -> CardTransform { gesture::transform(&self.phase, &self.geometry) }

  // ─── Decisions ───────────────────────────────────────────────────────────

  /// Decide on the top card. Returns `false` and does nothing while locked
  /// or once the deck is exhausted.
  pub fn decide(&mut self, decision: Decision) -> bool {
    if self.is_locked() {
      return false;
    }
    let Some(name) = self.current() else {
      return false;
    };
    let name_id = name.id.clone();

    let from = self.offset();
    self.votes.dispatch(NewVote { user_id: self.user_id, name_id: name_id.clone(), decision });
    self.phase = Phase::Committing { decision, from, elapsed: Duration::ZERO };
    tracing::debug!(%name_id, %decision, "card decided");
    true
  }

  // ─── Gesture ─────────────────────────────────────────────────────────────

  /// Pick up the top card. A card that is still settling is caught where it
  /// is.
  pub fn begin_drag(&mut self) -> bool {
    if self.is_locked() || self.is_exhausted() {
      return false;
    }
    self.phase = Phase::Dragging { offset: self.offset() };
    true
  }

  /// Move a picked-up card to `offset`. Ignored unless dragging.
  pub fn drag_to(&mut self, offset: Offset) -> bool {
    match &mut self.phase {
      Phase::Dragging { offset: current } => {
        *current = offset;
        true
      }
      _ => false,
    }
  }

  /// Move a picked-up card by `delta`, picking it up first if needed.
  pub fn drag_by(&mut self, delta: Offset) -> bool {
    if !matches!(self.phase, Phase::Dragging { .. }) && !self.begin_drag() {
      return false;
    }
    let offset = self.offset() + delta;
    self.drag_to(offset)
  }

  /// Let go of the card: commit past the threshold, otherwise settle back.
  pub fn release(&mut self) -> ReleaseOutcome {
    let Phase::Dragging { offset } = self.phase else {
      return ReleaseOutcome::Ignored;
    };
    match release_decision(offset) {
      Some(decision) if self.decide(decision) => ReleaseOutcome::Commit(decision),
      _ => {
        self.phase = Phase::Settling { from: offset, elapsed: Duration::ZERO };
        ReleaseOutcome::Settle
      }
    }
  }

  /// Advance running animations by `dt`. Returns `true` when a committed
  /// card has finished leaving and the deck moved on.
  pub fn tick(&mut self, dt: Duration) -> bool {
    match &mut self.phase {
      Phase::Committing { elapsed, .. } => {
        *elapsed += dt;
        if *elapsed >= COMMIT_DURATION {
          self.position += 1;
          self.phase = Phase::Resting;
          return true;
        }
      }
      Phase::Settling { elapsed, .. } => {
        *elapsed += dt;
        if *elapsed >= SETTLE_DURATION {
          self.phase = Phase::Resting;
        }
      }
      Phase::Resting | Phase::Dragging { .. } => {}
    }
    false
  }
}
