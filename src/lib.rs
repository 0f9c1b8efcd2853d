//! Queryable Yatzy state-value tables behind a C ABI.
//!
//! A value table holds the optimal expected final score for every turn-start
//! state of Scandinavian Yatzy (five dice, 15 categories, 50-point upper bonus
//! at 63). The library loads such tables from disk, answers expected-value
//! lookups, and derives the optimal scoring choice and keep decisions for a
//! state and roll by evaluating a single turn against the stored values.
//!
//! Modules:
//! - [`constants`]: game constants and the state-key layout
//! - [`codec`]: state and dice-histogram keys
//! - [`game_mechanics`], [`dice_mechanics`]: scoring rules and dice helpers
//! - [`tables`]: static game tables (dice sets, scores, keep transitions)
//! - [`widget`]: single-turn expectation and argmax
//! - [`storage`]: artifact format, loading and verification
//! - [`table`]: [`ValueTable`] and its queries
//! - [`registry`]: handle arena for the C interface
//! - [`ffi`]: the exported `yahtzeevalue_*` functions
//! - [`runtime`], [`config`], [`error`]: init, environment, error codes

pub mod codec;
pub mod config;
pub mod constants;
pub mod dice_mechanics;
pub mod error;
pub mod ffi;
pub mod game_mechanics;
pub mod registry;
pub mod runtime;
pub mod storage;
pub mod table;
pub mod tables;
pub mod widget;

pub use codec::{DiceHistogram, GameState};
pub use config::LoadOptions;
pub use error::{Error, ErrorCode, Result};
pub use runtime::init;
pub use table::{TableInfo, TurnDecision, ValueTable};
