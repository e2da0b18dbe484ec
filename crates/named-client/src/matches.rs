//! Shortlist resolution.
//!
//! The shared shortlist is materialised elsewhere; this client only reads it
//! and resolves its name ids against the catalog. Ids that no longer resolve
//! are skipped.

use std::{collections::HashMap, sync::Arc};

use named_core::{name::BabyName, store::NamesStore, user::User};
use uuid::Uuid;

use crate::{Error, Result, catalog::load_catalog, voting::VotingEngine};

/// Everything the shortlist screen shows.
///
/// The two sections load independently: a failure in one leaves it empty,
/// with the reason in its `*_error` field, and the other still shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortlistView {
  /// Names both partners liked, in shortlist order.
  pub shared:       Vec<BabyName>,
  pub shared_error: Option<String>,
  /// Names this user liked, most recent vote first.
  pub mine:         Vec<BabyName>,
  pub mine_error:   Option<String>,
}

impl ShortlistView {
  pub fn has_errors(&self) -> bool { self.shared_error.is_some() || self.mine_error.is_some() }
}

pub struct MatchDeriver<S> {
  store:  Arc<S>,
  voting: VotingEngine<S>,
}

impl<S> Clone for MatchDeriver<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), voting: self.voting.clone() }
  }
}

impl<S: NamesStore> MatchDeriver<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { voting: VotingEngine::new(Arc::clone(&store)), store }
  }

  /// The names on `couple_id`'s shortlist; empty if it has none yet.
  pub async fn compute_shared_matches(&self, couple_id: Uuid) -> Result<Vec<BabyName>> {
    let Some(shortlist) = self
      .store
      .get_shortlist(couple_id)
      .await
      .map_err(Error::store)?
    else {
      return Ok(Vec::new());
    };
    if shortlist.matched_names.is_empty() {
      return Ok(Vec::new());
    }

    let catalog = self.catalog_by_id().await?;
    Ok(resolve(&catalog, shortlist.matched_names.iter().map(|m| m.name_id.as_str())))
  }

  /// The names `user_id` voted yes on, most recent vote first.
  pub async fn list_my_liked_names(&self, user_id: Uuid) -> Result<Vec<BabyName>> {
    let votes = self.voting.list_votes(user_id).await?;
    let liked: Vec<_> = votes.iter().filter(|v| v.decision.is_yes()).collect();
    if liked.is_empty() {
      return Ok(Vec::new());
    }

    let catalog = self.catalog_by_id().await?;
    Ok(resolve(&catalog, liked.iter().map(|v| v.name_id.as_str())))
  }

  /// Load both lists concurrently. Shared matches are only fetched when
  /// `user` belongs to a couple.
  pub async fn load_shortlist(&self, user: &User) -> ShortlistView {
    let shared = async {
      match user.couple_id {
        Some(couple_id) => self.compute_shared_matches(couple_id).await,
        None => Ok(Vec::new()),
      }
    };
    let (shared, mine) = tokio::join!(shared, self.list_my_liked_names(user.id));

    let (shared, shared_error) = section(shared, "shared matches");
    let (mine, mine_error) = section(mine, "liked names");
    tracing::debug!(shared = shared.len(), mine = mine.len(), "shortlist loaded");
    ShortlistView { shared, shared_error, mine, mine_error }
  }

  async fn catalog_by_id(&self) -> Result<HashMap<String, BabyName>> {
    Ok(
      load_catalog(&*self.store)
        .await?
        .into_iter()
        .map(|n| (n.id.clone(), n))
        .collect(),
    )
  }
}

fn section(result: Result<Vec<BabyName>>, what: &str) -> (Vec<BabyName>, Option<String>) {
  match result {
    Ok(names) => (names, None),
    Err(e) => {
      tracing::warn!(error = %e, "failed to load {what}");
      (Vec::new(), Some(format!("Couldn't load {what}: {e}")))
    }
  }
}

fn resolve<'a>(
  catalog: &HashMap<String, BabyName>,
  ids: impl Iterator<Item = &'a str>,
) -> Vec<BabyName> {
  ids.filter_map(|id| catalog.get(id).cloned()).collect()
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use chrono::Utc;
  use named_core::name::{Decision, MatchedName, Shortlist};

  use super::*;
  use crate::test_support::{FlakyStore, put_names, register, store};

  fn matched(id: &str) -> MatchedName {
    MatchedName { name_id: id.into(), added_at: Utc::now() }
  }

  #[tokio::test]
  async fn missing_shortlist_is_empty() {
    let s = store().await;
    let matches = MatchDeriver::new(s);
    assert!(matches.compute_shared_matches(Uuid::new_v4()).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn shared_matches_skip_unknown_ids() {
    let s = store().await;
    put_names(&*s, &[("n1", "Ava"), ("n2", "Leo"), ("n3", "Mia")]).await;
    let couple_id = Uuid::new_v4();
    s.put_shortlist(Shortlist {
      couple_id,
      matched_names: vec![matched("n3"), matched("gone"), matched("n1")],
    })
    .await
    .unwrap();

    let names: Vec<_> = MatchDeriver::new(s)
      .compute_shared_matches(couple_id)
      .await
      .unwrap()
      .into_iter()
      .map(|n| n.name)
      .collect();
    assert_eq!(names, ["Mia", "Ava"]);
  }

  #[tokio::test]
  async fn liked_names_follow_latest_vote() {
    let s = store().await;
    put_names(&*s, &[("n1", "Ava"), ("n2", "Leo"), ("n3", "Mia")]).await;
    let voting = VotingEngine::new(s.clone());
    let user = Uuid::new_v4();

    for (id, decision) in [
      ("n1", Decision::Yes),
      ("n2", Decision::No),
      ("n3", Decision::Yes),
      ("n2", Decision::Yes),
      ("n1", Decision::No),
      ("missing", Decision::Yes),
    ] {
      voting.cast_vote(user, id, decision).await.unwrap();
      tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let names: Vec<_> = MatchDeriver::new(s)
      .list_my_liked_names(user)
      .await
      .unwrap()
      .into_iter()
      .map(|n| n.name)
      .collect();
    assert_eq!(names, ["Leo", "Mia"]);
  }

  #[tokio::test]
  async fn load_shortlist_without_couple_skips_shared() {
    let s = store().await;
    put_names(&*s, &[("n1", "Ava")]).await;
    let user = register(&*s, "sam@example.com").await;
    VotingEngine::new(s.clone()).cast_vote(user.id, "n1", Decision::Yes).await.unwrap();

    let view = MatchDeriver::new(s).load_shortlist(&user).await;
    assert!(!view.has_errors());
    assert!(view.shared.is_empty());
    assert_eq!(view.mine.len(), 1);
  }

  #[tokio::test]
  async fn load_shortlist_with_couple() {
    let s = store().await;
    put_names(&*s, &[("n1", "Ava"), ("n2", "Leo")]).await;
    let mut user = register(&*s, "sam@example.com").await;
    let couple_id = Uuid::new_v4();
    user.couple_id = Some(couple_id);
    s.put_shortlist(Shortlist { couple_id, matched_names: vec![matched("n2")] })
      .await
      .unwrap();

    let view = MatchDeriver::new(s).load_shortlist(&user).await;
    assert_eq!(view.shared.len(), 1);
    assert_eq!(view.shared[0].name, "Leo");
    assert!(view.mine.is_empty());
  }

  #[tokio::test]
  async fn shortlist_outage_keeps_my_likes() {
    let mut flaky = FlakyStore::new().await;
    flaky.shortlist_down = true;
    let s = Arc::new(flaky);
    put_names(&s.inner, &[("n1", "Ava"), ("n2", "Leo")]).await;
    let mut user = register(&s.inner, "sam@example.com").await;
    user.couple_id = Some(Uuid::new_v4());
    VotingEngine::new(s.clone()).cast_vote(user.id, "n2", Decision::Yes).await.unwrap();

    let view = MatchDeriver::new(s).load_shortlist(&user).await;
    assert!(view.shared.is_empty());
    assert!(view.shared_error.is_some());
    assert_eq!(view.mine_error, None);
    let mine: Vec<_> = view.mine.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(mine, ["Leo"]);
  }

  #[tokio::test]
  async fn catalog_outage_leaves_both_sections_empty() {
    let mut flaky = FlakyStore::new().await;
    flaky.catalog_down = true;
    let s = Arc::new(flaky);
    let user = register(&s.inner, "sam@example.com").await;
    VotingEngine::new(s.clone()).cast_vote(user.id, "n1", Decision::Yes).await.unwrap();

    let view = MatchDeriver::new(s).load_shortlist(&user).await;
    assert!(view.mine.is_empty());
    assert!(view.mine_error.is_some());
    // Unpaired, so there was nothing shared to load.
    assert_eq!(view.shared_error, None);
  }

  #[tokio::test]
  async fn catalog_outage_surfaces_as_store_error() {
    let mut flaky = FlakyStore::new().await;
    flaky.catalog_down = true;
    let s = Arc::new(flaky);
    let user = Uuid::new_v4();
    VotingEngine::new(s.clone()).cast_vote(user, "n1", Decision::Yes).await.unwrap();

    assert!(matches!(
      MatchDeriver::new(s).list_my_liked_names(user).await,
      Err(Error::Store(_))
    ));
  }
}
