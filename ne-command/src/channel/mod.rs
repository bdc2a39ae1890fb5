//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive shell session: ANSI stripping,
//! tail-only prompt detection and read timeouts.

mod ansi;
mod buffer;
mod pty;

pub use ansi::AnsiStripper;
pub use buffer::PatternBuffer;
pub use pty::{PtyChannel, PtyConfig};
