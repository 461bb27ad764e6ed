//! Core types for parlance.

pub mod completion;
pub mod message;

pub use completion::*;
pub use message::*;
