// src/vm/mod.rs

pub mod opcode;
pub mod stack;
pub mod vm;

pub use opcode::OpCode;
pub use vm::{interpret, Machine, DEFAULT_STACK_CAPACITY};
