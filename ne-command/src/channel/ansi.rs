//! ANSI escape stripping on top of a `vte` state machine.
//!
//! VRP emits cursor movement around `---- More ----` and colour codes on some
//! releases. The parser keeps its state between chunks, so an escape sequence
//! split across two SSH packets is still removed.

use vte::{Parser, Perform};

/// Streaming ANSI stripper.
pub struct AnsiStripper {
    parser: Parser,
    printable: Printable,
}

impl AnsiStripper {
    /// Create a stripper in the ground state.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            printable: Printable::default(),
        }
    }

    /// Feed raw bytes and return the printable text they contain.
    pub fn strip(&mut self, data: &[u8]) -> Vec<u8> {
        self.parser.advance(&mut self.printable, data);
        std::mem::take(&mut self.printable.0)
    }
}

impl Default for AnsiStripper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnsiStripper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsiStripper").finish_non_exhaustive()
    }
}

/// Collects printable characters and line control; drops everything else.
#[derive(Default)]
struct Printable(Vec<u8>);

impl Perform for Printable {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.0.push(byte);
        }
    }
}
