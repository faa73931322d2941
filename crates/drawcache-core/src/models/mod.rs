//! Data models for cached lottery history.
//!
//! - `LotteryVariant`: static per-game rules and feed endpoint
//! - `DrawRecord`: one validated draw outcome
//! - `LotteryCollection`: the persisted, ordered history of one game

pub mod collection;
pub mod draw;
pub mod variant;

pub use collection::{CollectionMetadata, LotteryCollection, FORMAT_VERSION};
pub use draw::{DrawRecord, ValidationError};
pub use variant::{LotteryVariant, DEFAULT_BASE_URL};
