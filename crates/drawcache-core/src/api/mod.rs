//! Remote draw source.
//!
//! This module provides the `DrawSource` trait and the `DrawClient` that
//! implements it against the public results feed, normalizing the feed's
//! payload variations into validated `DrawRecord`s.

pub mod client;
pub mod error;
pub mod payload;
pub mod source;

pub use client::DrawClient;
pub use error::FetchError;
pub use payload::DrawPayload;
pub use source::DrawSource;
