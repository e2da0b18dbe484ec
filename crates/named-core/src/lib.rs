//! Core types and trait definitions for the NamedTogether client.
//!
//! This crate is deliberately free of database and UI dependencies. The
//! document store and the identity provider are external collaborators; they
//! are described here as traits and implemented elsewhere (e.g.
//! `named-store-sqlite`).

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod identity;
pub mod name;
pub mod pairing;
pub mod store;
pub mod user;

pub use error::{Error, Result, parse_variant};
