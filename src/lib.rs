// src/lib.rs

//! Watson: values written as programs for a tiny stack machine.
//!
//! Decoding lexes text into opcodes and runs them; the top of the stack is the
//! result. Encoding computes an opcode program for a value, passes it through
//! the prettifier and renders each opcode as a one-byte token.

// --- Module Declarations ---
pub mod config;
pub mod convert;
pub mod dumper;
pub mod error;
pub mod lexer;
pub mod pretty;
pub mod value;
pub mod vm;
pub mod writer;

// --- Public API Re-exports ---
pub use config::Config;
pub use convert::{FromValue, ToValue};
pub use dumper::{ops_for, Dumper};
pub use error::{Error, Result};
pub use lexer::{AsciiTable, Lexer, TokenTable};
pub use pretty::{prettify, Mode, Prettifier};
pub use value::{Kind, Object, Value};
pub use vm::{interpret as run, Machine, OpCode, DEFAULT_STACK_CAPACITY};
pub use writer::{OpWriter, TokenWriter};

use std::io::{BufReader, Read, Write};

use tracing::debug;

/// Decodes exactly one value from `reader` with the default configuration.
pub fn decode<R: Read>(reader: R) -> Result<Value> {
    decode_with(reader, &Config::default())
}

/// Decodes exactly one value: lex, feed every opcode, return the top of stack.
/// The first failure aborts the whole decode.
pub fn decode_with<R: Read>(reader: R, config: &Config) -> Result<Value> {
    let mut lexer = Lexer::new(BufReader::new(reader));
    let mut machine = Machine::with_capacity(config.stack_capacity);
    while let Some(op) = lexer.next_op()? {
        if let Err(e) = machine.feed(op) {
            debug!(offset = lexer.offset(), error = %e, "decode aborted");
            return Err(e);
        }
    }
    debug!(
        bytes = lexer.offset(),
        skipped = lexer.skipped(),
        executed = machine.executed(),
        "decoded value"
    );
    machine.into_top()
}

/// Encodes `value` to `writer` with the default configuration.
pub fn encode<W: Write>(writer: W, value: &Value) -> Result<()> {
    encode_with(writer, value, &Config::default())
}

/// Encodes `value`: dumper, then prettifier in `config.mode`, then text.
pub fn encode_with<W: Write>(writer: W, value: &Value, config: &Config) -> Result<()> {
    let tokens = TokenWriter::new(writer).line_width(config.line_width);
    let mut dumper = Dumper::new(Prettifier::new(tokens, config.mode));
    dumper.dump(value)?;
    let emitted = dumper.emitted();
    let mut pretty = dumper.into_inner();
    pretty.flush()?;
    debug!(emitted, mode = %pretty.mode(), "encoded value");
    Ok(())
}

/// Decodes one value from an in-memory buffer.
pub fn from_slice(bytes: &[u8]) -> Result<Value> {
    decode(bytes)
}

/// Decodes one value from text. Only token bytes matter; the rest is skipped.
pub fn from_str(text: &str) -> Result<Value> {
    decode(text.as_bytes())
}

/// Encodes `value` into a fresh buffer with the default configuration.
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode(&mut out, value)?;
    Ok(out)
}

/// Watson text for `value`. Tokens are ASCII, so this never loses data.
pub fn to_string(value: &Value) -> Result<String> {
    let bytes = to_vec(value)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
