//! Shared context types for the sqlfront crates.
//!
//! [`Cx`] carries the cooperative interrupt flag a parse polls between
//! tokens; [`ParseLimits`] carries the numeric caps a parse enforces.

pub mod cx;
pub mod limits;

pub use cx::{CancelReason, Cx};
pub use limits::ParseLimits;
