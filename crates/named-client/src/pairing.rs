//! Invite issuance, lookup and acceptance.
//!
//! The store has no transactions, so accepting an invite is a sequence of
//! single-document writes: couple, both users, invite, inviter flag. The
//! accepter's view is only consistent once [`PairingEngine::accept_invite`]
//! has returned.

use std::sync::Arc;

use chrono::Utc;
use named_core::{
  pairing::{Couple, Invite, InviteAcceptance, InviteStatus, NewInvite, normalize_email},
  store::NamesStore,
  user::{User, UserUpdate},
};
use uuid::Uuid;

use crate::{Error, Result};

pub struct PairingEngine<S> {
  store: Arc<S>,
}

impl<S> Clone for PairingEngine<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: NamesStore> PairingEngine<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Invite `invitee_email` to form a couple with `inviter_id`.
  ///
  /// Nothing is written unless every check passes.
  pub async fn send_invite(&self, inviter_id: Uuid, invitee_email: &str) -> Result<Invite> {
    if invitee_email.trim().is_empty() {
      return Err(Error::validation("Please enter your partner's email"));
    }

    let inviter = self.require_user(inviter_id).await?;
    if inviter.has_email(invitee_email) {
      return Err(Error::validation("You cannot invite yourself"));
    }
    if inviter.is_paired() {
      return Err(Error::validation("You are already connected with a partner"));
    }
    // One outstanding invite per inviter; the store does not enforce this.
    if inviter.invite_pending {
      return Err(Error::validation("You already have an invitation waiting"));
    }

    let invite = self
      .store
      .create_invite(NewInvite::new(inviter_id, invitee_email))
      .await
      .map_err(Error::store)?;

    self
      .store
      .update_user(inviter_id, UserUpdate::invite_pending(true))
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("user {inviter_id}")))?;

    tracing::info!(invite_id = %invite.id, %inviter_id, "invite sent");
    Ok(invite)
  }

  /// The pending invite addressed to `email`, if any.
  ///
  /// Nothing prevents several pending invites for one address; in that case
  /// whichever the store returns first wins.
  pub async fn lookup_pending_invite(&self, email: &str) -> Result<Option<Invite>> {
    let mut invites = self
      .store
      .find_invites(normalize_email(email), InviteStatus::Pending)
      .await
      .map_err(Error::store)?;

    if invites.len() > 1 {
      tracing::warn!(count = invites.len(), "several pending invites for one email");
    }
    Ok((!invites.is_empty()).then(|| invites.swap_remove(0)))
  }

  /// Accept `invite_id` on behalf of `accepter_id` and link the couple.
  pub async fn accept_invite(&self, invite_id: Uuid, accepter_id: Uuid) -> Result<Couple> {
    let invite = self
      .store
      .get_invite(invite_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("invite {invite_id}")))?;

    if !invite.is_pending() {
      return Err(Error::validation("This invitation is no longer pending"));
    }
    if invite.inviter_id == accepter_id {
      return Err(Error::validation("You cannot accept your own invitation"));
    }

    // couple_id is set exactly once.
    let inviter = self.require_user(invite.inviter_id).await?;
    let accepter = self.require_user(accepter_id).await?;
    if accepter.is_paired() {
      return Err(Error::validation("You are already connected with a partner"));
    }
    if inviter.is_paired() {
      return Err(Error::validation("This person is already connected with a partner"));
    }

    let couple = self.create_couple([invite.inviter_id, accepter_id]).await?;

    self
      .store
      .accept_invite(invite_id, InviteAcceptance {
        accepted_at: Utc::now(),
        couple_id:   couple.id,
      })
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("invite {invite_id}")))?;

    self
      .store
      .update_user(invite.inviter_id, UserUpdate::invite_pending(false))
      .await
      .map_err(Error::store)?;
    self.retire_outgoing_invites(&accepter).await?;

    tracing::info!(couple_id = %couple.id, %invite_id, "invite accepted");
    Ok(couple)
  }

  /// The other member of `user`'s couple, or `None` while unpaired.
  pub async fn partner(&self, user: &User) -> Result<Option<User>> {
    let Some(couple_id) = user.couple_id else {
      return Ok(None);
    };
    let couple = self
      .store
      .get_couple(couple_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("couple {couple_id}")))?;

    let Some(partner_id) = couple.partner_of(user.id) else {
      tracing::warn!(user_id = %user.id, %couple_id, "user is not a member of their couple");
      return Ok(None);
    };
    self.store.get_user(partner_id).await.map_err(Error::store)
  }

  /// Expire the invites `user` sent that can no longer be accepted now that
  /// they are paired.
  async fn retire_outgoing_invites(&self, user: &User) -> Result<()> {
    let outgoing = self
      .store
      .invites_from(user.id, InviteStatus::Pending)
      .await
      .map_err(Error::store)?;
    for invite in &outgoing {
      self
        .store
        .expire_invite(invite.id)
        .await
        .map_err(Error::store)?;
      tracing::debug!(invite_id = %invite.id, "outgoing invite expired");
    }

    if user.invite_pending || !outgoing.is_empty() {
      self
        .store
        .update_user(user.id, UserUpdate::invite_pending(false))
        .await
        .map_err(Error::store)?;
    }
    Ok(())
  }

  /// Persist the couple and point both user documents at it.
  async fn create_couple(&self, user_ids: [Uuid; 2]) -> Result<Couple> {
    let couple = self
      .store
      .create_couple(user_ids)
      .await
      .map_err(Error::store)?;

    for user_id in user_ids {
      self
        .store
        .update_user(user_id, UserUpdate::couple(couple.id))
        .await
        .map_err(Error::store)?
        .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
    }
    Ok(couple)
  }

  async fn require_user(&self, id: Uuid) -> Result<User> {
    self
      .store
      .get_user(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("user {id}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::{register, store};

  #[tokio::test]
  async fn send_then_lookup() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let pairing = PairingEngine::new(s.clone());

    let sent = pairing.send_invite(inviter.id, "Partner@Example.com").await.unwrap();
    assert_eq!(sent.invitee_email, "partner@example.com");

    let found = pairing
      .lookup_pending_invite("PARTNER@example.com")
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found.inviter_id, inviter.id);
    assert_eq!(found.id, sent.id);

    let inviter = s.get_user(inviter.id).await.unwrap().unwrap();
    assert!(inviter.invite_pending);
  }

  #[tokio::test]
  async fn self_invite_is_rejected_and_writes_nothing() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let pairing = PairingEngine::new(s.clone());

    let err = pairing.send_invite(inviter.id, " INES@example.com ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(pairing.lookup_pending_invite("ines@example.com").await.unwrap().is_none());
    assert!(!s.get_user(inviter.id).await.unwrap().unwrap().invite_pending);
  }

  #[tokio::test]
  async fn empty_email_is_rejected() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let pairing = PairingEngine::new(s);

    assert!(matches!(
      pairing.send_invite(inviter.id, "   ").await,
      Err(Error::Validation(_))
    ));
  }

  #[tokio::test]
  async fn second_pending_invite_is_rejected() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let pairing = PairingEngine::new(s);

    pairing.send_invite(inviter.id, "a@example.com").await.unwrap();
    assert!(matches!(
      pairing.send_invite(inviter.id, "b@example.com").await,
      Err(Error::Validation(_))
    ));
    assert!(pairing.lookup_pending_invite("b@example.com").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn unknown_inviter_is_not_found() {
    let s = store().await;
    let pairing = PairingEngine::new(s);
    assert!(matches!(
      pairing.send_invite(Uuid::new_v4(), "a@example.com").await,
      Err(Error::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn accept_links_both_users() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let accepter = register(&*s, "omar@example.com").await;
    let pairing = PairingEngine::new(s.clone());

    let invite = pairing.send_invite(inviter.id, "omar@example.com").await.unwrap();
    let couple = pairing.accept_invite(invite.id, accepter.id).await.unwrap();

    assert!(couple.contains(inviter.id));
    assert!(couple.contains(accepter.id));
    assert_eq!(s.get_couple(couple.id).await.unwrap().unwrap(), couple);

    let invite = s.get_invite(invite.id).await.unwrap().unwrap();
    assert_eq!(invite.status, InviteStatus::Accepted);
    assert_eq!(invite.couple_id, Some(couple.id));
    assert!(invite.accepted_at.is_some());

    let inviter = s.get_user(inviter.id).await.unwrap().unwrap();
    let accepter = s.get_user(accepter.id).await.unwrap().unwrap();
    assert!(!inviter.invite_pending);
    assert_eq!(inviter.couple_id, Some(couple.id));
    assert_eq!(accepter.couple_id, Some(couple.id));

    assert!(pairing.lookup_pending_invite("omar@example.com").await.unwrap().is_none());

    assert_eq!(pairing.partner(&inviter).await.unwrap().map(|u| u.id), Some(accepter.id));
    assert_eq!(pairing.partner(&accepter).await.unwrap().map(|u| u.id), Some(inviter.id));
  }

  #[tokio::test]
  async fn unpaired_user_has_no_partner() {
    let s = store().await;
    let user = register(&*s, "ines@example.com").await;
    assert!(PairingEngine::new(s).partner(&user).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn pairing_elsewhere_retires_outgoing_invite() {
    let s = store().await;
    let ana = register(&*s, "ana@example.com").await;
    let ben = register(&*s, "ben@example.com").await;
    let cat = register(&*s, "cat@example.com").await;
    let pairing = PairingEngine::new(s.clone());

    let to_cat = pairing.send_invite(ana.id, "cat@example.com").await.unwrap();
    let to_ana = pairing.send_invite(ben.id, "ana@example.com").await.unwrap();
    let first = pairing.accept_invite(to_ana.id, ana.id).await.unwrap();

    let ana_now = s.get_user(ana.id).await.unwrap().unwrap();
    assert!(!ana_now.invite_pending);
    let retired = s.get_invite(to_cat.id).await.unwrap().unwrap();
    assert_eq!(retired.status, InviteStatus::Expired);
    assert!(pairing.lookup_pending_invite("cat@example.com").await.unwrap().is_none());

    assert!(matches!(
      pairing.accept_invite(to_cat.id, cat.id).await,
      Err(Error::Validation(_))
    ));
    let ana_now = s.get_user(ana.id).await.unwrap().unwrap();
    let ben_now = s.get_user(ben.id).await.unwrap().unwrap();
    let cat_now = s.get_user(cat.id).await.unwrap().unwrap();
    assert_eq!(ana_now.couple_id, Some(first.id));
    assert_eq!(ben_now.couple_id, Some(first.id));
    assert_eq!(cat_now.couple_id, None);
  }

  #[tokio::test]
  async fn paired_inviter_cannot_be_claimed_again() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let accepter = register(&*s, "omar@example.com").await;
    let pairing = PairingEngine::new(s.clone());

    let invite = pairing.send_invite(inviter.id, "omar@example.com").await.unwrap();
    // The inviter got paired by some other route while the invite was open.
    let elsewhere = Uuid::new_v4();
    s.update_user(inviter.id, UserUpdate::couple(elsewhere)).await.unwrap();

    assert!(matches!(
      pairing.accept_invite(invite.id, accepter.id).await,
      Err(Error::Validation(_))
    ));
    assert_eq!(s.get_user(inviter.id).await.unwrap().unwrap().couple_id, Some(elsewhere));
    assert_eq!(s.get_user(accepter.id).await.unwrap().unwrap().couple_id, None);
    assert!(s.get_invite(invite.id).await.unwrap().unwrap().is_pending());
  }

  #[tokio::test]
  async fn paired_accepter_is_rejected() {
    let s = store().await;
    let ines = register(&*s, "ines@example.com").await;
    let omar = register(&*s, "omar@example.com").await;
    let pia = register(&*s, "pia@example.com").await;
    let pairing = PairingEngine::new(s.clone());

    let first = pairing.send_invite(ines.id, "omar@example.com").await.unwrap();
    let second = pairing.send_invite(pia.id, "omar@example.com").await.unwrap();
    let couple = pairing.accept_invite(first.id, omar.id).await.unwrap();

    assert!(matches!(
      pairing.accept_invite(second.id, omar.id).await,
      Err(Error::Validation(_))
    ));
    assert_eq!(s.get_user(omar.id).await.unwrap().unwrap().couple_id, Some(couple.id));
    assert_eq!(s.get_user(pia.id).await.unwrap().unwrap().couple_id, None);
  }

  #[tokio::test]
  async fn non_ascii_self_invite_is_rejected() {
    let s = store().await;
    let inviter = register(&*s, "émile@exemple.fr").await;
    let pairing = PairingEngine::new(s);

    assert!(matches!(
      pairing.send_invite(inviter.id, "ÉMILE@exemple.fr").await,
      Err(Error::Validation(_))
    ));
    assert!(pairing.lookup_pending_invite("émile@exemple.fr").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn accept_unknown_invite_is_not_found() {
    let s = store().await;
    let accepter = register(&*s, "omar@example.com").await;
    let pairing = PairingEngine::new(s);

    assert!(matches!(
      pairing.accept_invite(Uuid::new_v4(), accepter.id).await,
      Err(Error::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn accept_twice_is_rejected() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let accepter = register(&*s, "omar@example.com").await;
    let pairing = PairingEngine::new(s);

    let invite = pairing.send_invite(inviter.id, "omar@example.com").await.unwrap();
    pairing.accept_invite(invite.id, accepter.id).await.unwrap();
    assert!(matches!(
      pairing.accept_invite(invite.id, accepter.id).await,
      Err(Error::Validation(_))
    ));
  }

  #[tokio::test]
  async fn inviter_cannot_accept_own_invite() {
    let s = store().await;
    let inviter = register(&*s, "ines@example.com").await;
    let pairing = PairingEngine::new(s);

    let invite = pairing.send_invite(inviter.id, "omar@example.com").await.unwrap();
    assert!(matches!(
      pairing.accept_invite(invite.id, inviter.id).await,
      Err(Error::Validation(_))
    ));
  }
}
