//! Configuration types
//!
//! Board-agnostic configuration structures, loaded from TOML by the
//! application.

pub mod types;

pub use types::*;
