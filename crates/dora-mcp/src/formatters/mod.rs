//! Output formatting for tool results.

mod text;

pub use text::*;
