//! Client-side flows for NamedTogether.
//!
//! Everything here is generic over [`named_core::store::NamesStore`] and
//! [`named_core::identity::IdentityProvider`]; the presentation layer picks
//! the concrete backends.
//!
//! | Module | Concern |
//! |--------|---------|
//! | [`pairing`] | invites and couple linking |
//! | [`voting`] | the decision log and the background vote writer |
//! | [`matches`] | shortlist resolution |
//! | [`deck`] | the swipe deck controller and its gesture state machine |
//! | [`catalog`] | the built-in name catalog and seeding |
//! | [`session`] | the signed-in user context |

pub mod catalog;
pub mod deck;
pub mod error;
pub mod matches;
pub mod pairing;
pub mod session;
pub mod voting;

pub use error::{Error, Result};

#[cfg(test)]
mod test_support;
