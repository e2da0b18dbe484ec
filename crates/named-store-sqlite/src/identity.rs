//! [`LocalIdentity`]: an argon2-backed identity provider over the same
//! SQLite file as the document store.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::Utc;
use named_core::{
  identity::{IdentityProvider, SessionHandle},
  pairing::normalize_email,
};
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{decode_uuid, encode_dt, encode_uuid},
};

/// Credentials row: `(user_id, email, password_hash, display_name)`.
type AccountRow = (String, String, String, String);

/// Email/password accounts stored in the `accounts` table.
///
/// Holds the current session in a [`watch`] channel; every clone shares it.
#[derive(Clone)]
pub struct LocalIdentity {
  conn:    tokio_rusqlite::Connection,
  session: Arc<watch::Sender<Option<SessionHandle>>>,
}

impl LocalIdentity {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    let (session, _) = watch::channel(None);
    Self { conn, session: Arc::new(session) }
  }

  /// The session currently signed in, if any.
  pub fn current(&self) -> Option<SessionHandle> { self.session.borrow().clone() }

  async fn find_account(&self, email: String) -> Result<Option<AccountRow>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash, display_name FROM accounts WHERE email = ?1",
              rusqlite::params![email],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  fn publish(&self, handle: Option<SessionHandle>) {
    self.session.send_replace(handle);
  }
}

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::PasswordHash(e.to_string()))?
      .to_string(),
  )
}

fn verify_password(password: &str, phc: &str) -> Result<()> {
  let parsed = PasswordHash::new(phc).map_err(|_| Error::InvalidCredentials)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| Error::InvalidCredentials)
}

impl IdentityProvider for LocalIdentity {
  type Error = Error;

  async fn sign_in(&self, email: String, password: String) -> Result<SessionHandle> {
    let (user_id, email, hash, display_name) = self
      .find_account(normalize_email(&email))
      .await?
      .ok_or(Error::InvalidCredentials)?;

    verify_password(&password, &hash)?;

    let handle = SessionHandle {
      user_id: decode_uuid(&user_id)?,
      email,
      display_name: Some(display_name),
    };
    tracing::debug!(user_id = %handle.user_id, "signed in");
    self.publish(Some(handle.clone()));
    Ok(handle)
  }

  async fn sign_up(
    &self,
    email: String,
    password: String,
    display_name: String,
  ) -> Result<SessionHandle> {
    let email = normalize_email(&email);
    if self.find_account(email.clone()).await?.is_some() {
      return Err(Error::EmailTaken(email));
    }

    let handle = SessionHandle {
      user_id:      Uuid::new_v4(),
      email:        email.clone(),
      display_name: Some(display_name.clone()),
    };

    let id_str = encode_uuid(handle.user_id);
    let hash   = hash_password(&password)?;
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (user_id, email, password_hash, display_name, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, hash, display_name, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(user_id = %handle.user_id, "account created");
    self.publish(Some(handle.clone()));
    Ok(handle)
  }

  async fn sign_out(&self) -> Result<()> {
    self.publish(None);
    Ok(())
  }

  fn subscribe(&self) -> watch::Receiver<Option<SessionHandle>> { self.session.subscribe() }
}
