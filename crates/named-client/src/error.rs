//! Error taxonomy for client operations.
//!
//! Every failure is caught at the operation boundary; the presentation layer
//! turns these into status messages. None of them is fatal.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad user input, e.g. a self-invite or a short password.
  #[error("{0}")]
  Validation(String),

  /// The identity provider rejected the credentials.
  #[error("authentication failed: {0}")]
  Auth(#[source] BoxError),

  /// A referenced document does not exist.
  #[error("{0} not found")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn auth(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Auth(Box::new(e))
  }

  /// Short heading for an alert showing this error.
  pub fn title(&self) -> &'static str {
    match self {
      Self::Validation(_) | Self::NotFound(_) => "Error",
      Self::Auth(_) => "Sign-in failed",
      Self::Store(_) => "Connection problem",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
