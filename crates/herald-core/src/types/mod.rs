//! Core types for Herald.

mod delivery;
mod notification;

pub use delivery::*;
pub use notification::*;
