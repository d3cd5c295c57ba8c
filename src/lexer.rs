// src/lexer.rs

use std::io::{self, Read};

use tracing::trace;

use crate::error::Result;
use crate::vm::opcode::OpCode;

/// A bijective mapping between single-byte tokens and opcodes.
///
/// The lexer and the token writer are generic over this, so an alternate
/// textual encoding can be plugged in without touching either.
pub trait TokenTable {
    /// The opcode for `byte`, or `None` if the byte is filler.
    fn op_for(&self, byte: u8) -> Option<OpCode>;

    /// The token written for `op`. Must be the inverse of `op_for`.
    fn token_for(&self, op: OpCode) -> u8;
}

/// Canonical single-letter token assignment.
pub static ASCII_TOKENS: phf::Map<u8, OpCode> = phf::phf_map! {
    b'B' => OpCode::Inew,
    b'u' => OpCode::Iinc,
    b'b' => OpCode::Ishl,
    b'a' => OpCode::Iadd,
    b'A' => OpCode::Ineg,
    b'e' => OpCode::Isht,
    b'i' => OpCode::Itof,
    b'\'' => OpCode::Itou,
    b'q' => OpCode::Finf,
    b't' => OpCode::Fnan,
    b'p' => OpCode::Fneg,
    b'?' => OpCode::Snew,
    b'!' => OpCode::Sadd,
    b'~' => OpCode::Onew,
    b'M' => OpCode::Oadd,
    b'@' => OpCode::Anew,
    b's' => OpCode::Aadd,
    b'z' => OpCode::Bnew,
    b'o' => OpCode::Bneg,
    b'.' => OpCode::Nnew,
    b'*' => OpCode::Gdup,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsciiTable;

impl TokenTable for AsciiTable {
    fn op_for(&self, byte: u8) -> Option<OpCode> {
        ASCII_TOKENS.get(&byte).copied()
    }

    fn token_for(&self, op: OpCode) -> u8 {
        // Inverse of ASCII_TOKENS; the bijection test keeps the two in step.
        match op {
            OpCode::Inew => b'B',
            OpCode::Iinc => b'u',
            OpCode::Ishl => b'b',
            OpCode::Iadd => b'a',
            OpCode::Ineg => b'A',
            OpCode::Isht => b'e',
            OpCode::Itof => b'i',
            OpCode::Itou => b'\'',
            OpCode::Finf => b'q',
            OpCode::Fnan => b't',
            OpCode::Fneg => b'p',
            OpCode::Snew => b'?',
            OpCode::Sadd => b'!',
            OpCode::Onew => b'~',
            OpCode::Oadd => b'M',
            OpCode::Anew => b'@',
            OpCode::Aadd => b's',
            OpCode::Bnew => b'z',
            OpCode::Bneg => b'o',
            OpCode::Nnew => b'.',
            OpCode::Gdup => b'*',
        }
    }
}

/// Scans a byte stream for opcode tokens, skipping everything else.
pub struct Lexer<R, T = AsciiTable> {
    reader: R,
    table: T,
    offset: u64,
    skipped: u64,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Lexer::with_table(reader, AsciiTable)
    }
}

impl<R: Read, T: TokenTable> Lexer<R, T> {
    pub fn with_table(reader: R, table: T) -> Self {
        Lexer {
            reader,
            table,
            offset: 0,
            skipped: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes consumed that were not tokens.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// The next opcode, or `Ok(None)` at a clean end of input.
    /// Read failures other than interruption are returned unchanged.
    pub fn next_op(&mut self) -> Result<Option<OpCode>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    if let Some(op) = self.table.op_for(buf[0]) {
                        return Ok(Some(op));
                    }
                    self.skipped += 1;
                    trace!(byte = buf[0], offset = self.offset - 1, "skipping non-token byte");
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read, T: TokenTable> Iterator for Lexer<R, T> {
    type Item = Result<OpCode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_op().transpose()
    }
}
