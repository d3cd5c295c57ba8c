// src/writer.rs

use std::io::Write;

use crate::error::Result;
use crate::lexer::{AsciiTable, TokenTable};
use crate::vm::opcode::OpCode;

/// A sink for opcodes. The dumper writes into one; the prettifier both is one
/// and wraps one.
pub trait OpWriter {
    fn write_op(&mut self, op: OpCode) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl OpWriter for Vec<OpCode> {
    fn write_op(&mut self, op: OpCode) -> Result<()> {
        self.push(op);
        Ok(())
    }
}

impl<W: OpWriter + ?Sized> OpWriter for &mut W {
    fn write_op(&mut self, op: OpCode) -> Result<()> {
        (**self).write_op(op)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Renders opcodes as text through a token table.
///
/// With a non-zero `line_width` a newline follows every `line_width` tokens.
/// The lexer treats newlines as filler, so wrapping never changes the result.
pub struct TokenWriter<W, T = AsciiTable> {
    inner: W,
    table: T,
    line_width: usize,
    column: usize,
    written: usize,
}

impl<W: Write> TokenWriter<W> {
    pub fn new(inner: W) -> Self {
        TokenWriter::with_table(inner, AsciiTable)
    }
}

impl<W: Write, T: TokenTable> TokenWriter<W, T> {
    pub fn with_table(inner: W, table: T) -> Self {
        TokenWriter {
            inner,
            table,
            line_width: 0,
            column: 0,
            written: 0,
        }
    }

    pub fn line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    /// Tokens written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write, T: TokenTable> OpWriter for TokenWriter<W, T> {
    fn write_op(&mut self, op: OpCode) -> Result<()> {
        if self.line_width > 0 && self.column == self.line_width {
            self.inner.write_all(b"\n")?;
            self.column = 0;
        }
        self.inner.write_all(&[self.table.token_for(op)])?;
        self.column += 1;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_ascii_tokens() {
        let mut w = TokenWriter::new(Vec::new());
        for op in [OpCode::Inew, OpCode::Iinc, OpCode::Ishl, OpCode::Itou] {
            w.write_op(op).unwrap();
        }
        assert_eq!(w.written(), 4);
        assert_eq!(w.into_inner(), b"Bub'".to_vec());
    }

    #[test]
    fn test_line_wrapping() {
        let mut w = TokenWriter::new(Vec::new()).line_width(2);
        for op in [OpCode::Nnew, OpCode::Nnew, OpCode::Nnew, OpCode::Nnew, OpCode::Nnew] {
            w.write_op(op).unwrap();
        }
        assert_eq!(w.into_inner(), b"..\n..\n.".to_vec());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_is_not_counted() {
        let mut w = TokenWriter::new(BrokenPipe);
        assert!(matches!(w.write_op(OpCode::Nnew), Err(crate::error::Error::Io(_))));
        assert!(w.write_op(OpCode::Nnew).is_err());
        assert_eq!(w.written(), 0);
    }

    fn write_true<W: OpWriter>(mut sink: W) -> Result<()> {
        sink.write_op(OpCode::Bnew)?;
        sink.write_op(OpCode::Bneg)
    }

    #[test]
    fn test_vec_sink_collects_ops() {
        let mut ops: Vec<OpCode> = Vec::new();
        write_true(&mut ops).unwrap();
        assert_eq!(ops, vec![OpCode::Bnew, OpCode::Bneg]);
    }
}
