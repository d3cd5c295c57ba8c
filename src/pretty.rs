// src/pretty.rs

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::Result;
use crate::vm::opcode::OpCode;
use crate::writer::OpWriter;

/// Which family of rewrite rules the prettifier applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Pass every opcode through untouched.
    Plain,
    /// Break up shift-then-add runs with a pair of inert negations.
    #[default]
    Pretty,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Mode::Plain),
            "pretty" => Ok(Mode::Pretty),
            other => Err(format!("unknown mode '{}', expected 'plain' or 'pretty'", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Plain => f.write_str("plain"),
            Mode::Pretty => f.write_str("pretty"),
        }
    }
}

const NEG_NEG_ADD: &[OpCode] = &[OpCode::Ineg, OpCode::Ineg, OpCode::Iadd];

/// An `OpWriter` decorator that rewrites some opcodes into longer sequences
/// with the same net stack effect. Decoding its output always gives the same
/// value as decoding its input.
pub struct Prettifier<W> {
    inner: W,
    mode: Mode,
    // Last opcode *requested*, never one injected by a rewrite.
    last: Option<OpCode>,
}

impl<W: OpWriter> Prettifier<W> {
    pub fn new(inner: W, mode: Mode) -> Self {
        Prettifier {
            inner,
            mode,
            last: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn rewrite(&self, op: OpCode) -> Option<&'static [OpCode]> {
        match (self.mode, self.last, op) {
            // Negating the addend twice leaves it unchanged.
            (Mode::Pretty, Some(OpCode::Ishl | OpCode::Isht), OpCode::Iadd) => Some(NEG_NEG_ADD),
            _ => None,
        }
    }
}

impl<W: OpWriter> OpWriter for Prettifier<W> {
    fn write_op(&mut self, op: OpCode) -> Result<()> {
        match self.rewrite(op) {
            Some(seq) => {
                trace!(last = ?self.last, %op, "rewriting opcode");
                for &rewritten in seq {
                    self.inner.write_op(rewritten)?;
                }
            }
            None => self.inner.write_op(op)?,
        }
        self.last = Some(op);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

/// Runs `ops` through a prettifier in `mode` and collects the result.
pub fn prettify(ops: &[OpCode], mode: Mode) -> Result<Vec<OpCode>> {
    let mut pretty = Prettifier::new(Vec::with_capacity(ops.len()), mode);
    for &op in ops {
        pretty.write_op(op)?;
    }
    Ok(pretty.into_inner())
}
