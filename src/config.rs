// src/config.rs

use crate::pretty::Mode;
use crate::vm::DEFAULT_STACK_CAPACITY;

/// Settings for the one-shot `decode_with` / `encode_with` entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Stack capacity of the decoding machine. Non-positive means the default.
    pub stack_capacity: isize,
    /// Rewrite family applied by the prettifier when encoding.
    pub mode: Mode,
    /// Tokens per output line; 0 writes everything on one line.
    pub line_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stack_capacity: DEFAULT_STACK_CAPACITY as isize,
            mode: Mode::default(),
            line_width: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack_capacity(mut self, capacity: isize) -> Self {
        self.stack_capacity = capacity;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }
}
