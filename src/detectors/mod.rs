//! Session breakout gap detection
//!
//! - [`session_gap`]: reference range, breakout and fair value gap phases
//! - [`helpers`]: time-of-day, breakout and gap predicates

pub mod helpers;
pub mod session_gap;

pub use helpers::*;
pub use session_gap::*;
