//! Helpers for building and inspecting messages and parts.

pub mod constants;
pub mod message;
pub mod parts;

pub use constants::*;
pub use message::*;
pub use parts::*;
