//! Core types and trait definitions for the Tally habit tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; the streak engine in [`streak`] is pure and
//! takes the reference date from its caller.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod error;
pub mod habit;
pub mod store;
pub mod streak;
pub mod subscription;
pub mod user;

pub use error::{Classify, Error, ErrorKind, Result};
