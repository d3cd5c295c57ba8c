// src/error.rs

use thiserror::Error;

use crate::value::Kind;
use crate::vm::opcode::OpCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a decode or an encode.
///
/// Unknown bytes in the input are not represented here: the lexer skips them.
/// Likewise a clean end of input is `Ok(None)` from the lexer, not an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("stack overflow while executing {op} (capacity {capacity})")]
    StackOverflow { op: OpCode, capacity: usize },

    #[error("stack underflow while executing {op}")]
    StackUnderflow { op: OpCode },

    #[error("type mismatch while executing {op}: expected {expected}, got {actual}")]
    TypeMismatch { op: OpCode, expected: Kind, actual: Kind },

    /// `top()` was called before anything was decoded.
    #[error("stack is empty")]
    EmptyStack,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unsupported native type: {0}")]
    UnsupportedNativeType(String),

    #[error("cannot convert {actual} into {expected}")]
    Conversion { expected: Kind, actual: Kind },

    #[error("value out of range for {target}")]
    OutOfRange { target: &'static str },
}
