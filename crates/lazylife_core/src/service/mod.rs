//! Derived read models computed from live store state.
//!
//! # Responsibility
//! - Keep presentation-facing derivations pure and separately testable.

pub mod summary;
