//! Foundational low-level utilities shared across chatops crates.
//!
//! Provides Unix clock helpers used by request signature checks and
//! process-unique identifier minting used for commands and repositories.

pub mod identifiers;
pub mod time_utils;

pub use identifiers::next_identifier;
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms, unix_skew_seconds};
