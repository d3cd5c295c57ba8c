// src/vm/vm.rs

use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{Kind, Value};
use crate::vm::opcode::OpCode;
use crate::vm::stack::Stack;

pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// Runs a whole opcode sequence on a fresh machine and returns the top of stack.
pub fn interpret<I>(ops: I) -> Result<Value>
where
    I: IntoIterator<Item = OpCode>,
{
    let mut vm = Machine::new();
    for op in ops {
        vm.feed(op)?;
    }
    debug!(executed = vm.executed(), depth = vm.depth(), "interpreted opcode stream");
    vm.into_top()
}

// Pops the top of stack and unwraps it as `Value::$variant`, or bails out
// with a type mismatch naming the opcode.
macro_rules! pop_as {
    ($vm:ident, $op:expr, $variant:ident) => {
        match $vm.pop($op)? {
            Value::$variant(inner) => inner,
            other => {
                return Err(Error::TypeMismatch {
                    op: $op,
                    expected: Kind::$variant,
                    actual: other.kind(),
                })
            }
        }
    };
}

/// The Watson stack machine. Owns its stack exclusively; one instance per decode.
#[derive(Debug)]
pub struct Machine {
    stack: Stack,
    executed: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Machine::with_stack(DEFAULT_STACK_CAPACITY)
    }

    /// A machine whose stack holds at most `capacity` values.
    /// A non-positive capacity falls back to `DEFAULT_STACK_CAPACITY`.
    pub fn with_capacity(capacity: isize) -> Self {
        let capacity = if capacity <= 0 {
            DEFAULT_STACK_CAPACITY
        } else {
            capacity as usize
        };
        Machine::with_stack(capacity)
    }

    fn with_stack(capacity: usize) -> Self {
        Machine {
            stack: Stack::new(capacity),
            executed: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Number of live values on the stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of opcodes successfully executed so far.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Executes one opcode against the stack.
    pub fn feed(&mut self, op: OpCode) -> Result<()> {
        match op {
            OpCode::Inew => self.push(op, Value::Int(0))?,
            OpCode::Iinc => {
                let v = pop_as!(self, op, Int);
                self.push(op, Value::Int(v.wrapping_add(1)))?;
            }
            OpCode::Ishl => {
                let v = pop_as!(self, op, Int);
                self.push(op, Value::Int(v.wrapping_shl(1)))?;
            }
            OpCode::Iadd => {
                // Right-hand operand was pushed last, so it comes off first.
                let b = pop_as!(self, op, Int);
                let a = pop_as!(self, op, Int);
                self.push(op, Value::Int(a.wrapping_add(b)))?;
            }
            OpCode::Ineg => {
                let v = pop_as!(self, op, Int);
                self.push(op, Value::Int(v.wrapping_neg()))?;
            }
            OpCode::Isht => {
                let v = pop_as!(self, op, Int);
                self.push(op, Value::Int(v >> 1))?;
            }
            OpCode::Itof => {
                let v = pop_as!(self, op, Int);
                self.push(op, Value::Float(f64::from_bits(v as u64)))?;
            }
            OpCode::Itou => {
                let v = pop_as!(self, op, Int);
                self.push(op, Value::Uint(v as u64))?;
            }
            OpCode::Finf => self.push(op, Value::Float(f64::INFINITY))?,
            OpCode::Fnan => self.push(op, Value::Float(f64::NAN))?,
            OpCode::Fneg => {
                let v = pop_as!(self, op, Float);
                self.push(op, Value::Float(-v))?;
            }
            OpCode::Snew => self.push(op, Value::Str(Vec::new()))?,
            OpCode::Sadd => {
                let n = pop_as!(self, op, Int);
                let mut s = pop_as!(self, op, Str);
                s.push((n & 0xff) as u8);
                self.push(op, Value::Str(s))?;
            }
            OpCode::Onew => self.push(op, Value::Object(Default::default()))?,
            OpCode::Oadd => {
                let v = self.pop(op)?;
                let k = pop_as!(self, op, Str);
                let mut o = pop_as!(self, op, Object);
                o.insert(k, v);
                self.push(op, Value::Object(o))?;
            }
            OpCode::Anew => self.push(op, Value::Array(Vec::new()))?,
            OpCode::Aadd => {
                let v = self.pop(op)?;
                let mut a = pop_as!(self, op, Array);
                a.push(v);
                self.push(op, Value::Array(a))?;
            }
            OpCode::Bnew => self.push(op, Value::Bool(false))?,
            OpCode::Bneg => {
                let b = pop_as!(self, op, Bool);
                self.push(op, Value::Bool(!b))?;
            }
            OpCode::Nnew => self.push(op, Value::Nil)?,
            OpCode::Gdup => {
                let top = self
                    .stack
                    .peek()
                    .cloned()
                    .ok_or(Error::StackUnderflow { op })?;
                self.push(op, top)?;
            }
        }
        self.executed += 1;
        Ok(())
    }

    /// Peeks at the current result without popping it.
    pub fn top(&self) -> Result<&Value> {
        self.stack.peek().ok_or(Error::EmptyStack)
    }

    /// Consumes the machine, returning the top of stack.
    pub fn into_top(mut self) -> Result<Value> {
        self.stack.pop().ok_or(Error::EmptyStack)
    }

    fn push(&mut self, op: OpCode, value: Value) -> Result<()> {
        let capacity = self.stack.capacity();
        self.stack
            .push(value)
            .map_err(|_| Error::StackOverflow { op, capacity })
    }

    fn pop(&mut self, op: OpCode) -> Result<Value> {
        self.stack.pop().ok_or(Error::StackUnderflow { op })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OpCode::*;

    fn run(ops: &[OpCode]) -> Result<Value> {
        interpret(ops.iter().copied())
    }

    #[test]
    fn test_int_construction() {
        assert_eq!(run(&[Inew, Iinc, Iinc, Iinc]).unwrap(), Value::Int(3));
        assert_eq!(run(&[Inew, Iinc, Ishl]).unwrap(), Value::Int(2));
        assert_eq!(run(&[Inew, Iinc, Ishl, Iinc, Ineg]).unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(run(&[Inew, Iinc, Iinc, Gdup, Iadd]).unwrap(), Value::Int(4));
        assert_eq!(run(&[Inew, Iinc, Ishl, Ishl, Iinc, Isht]).unwrap(), Value::Int(2));
        // Arithmetic shift keeps the sign.
        assert_eq!(run(&[Inew, Iinc, Iinc, Iinc, Ineg, Isht]).unwrap(), Value::Int(-2));
    }

    #[test]
    fn test_int_arithmetic_wraps() {
        let mut ops = vec![Inew, Iinc];
        ops.extend(std::iter::repeat(Ishl).take(63));
        assert_eq!(run(&ops).unwrap(), Value::Int(i64::MIN));
        ops.push(Ineg);
        assert_eq!(run(&ops).unwrap(), Value::Int(i64::MIN));
    }

    #[test]
    fn test_int_conversions() {
        assert_eq!(run(&[Inew, Iinc, Ineg, Itou]).unwrap(), Value::Uint(u64::MAX));
        assert_eq!(run(&[Inew, Itof]).unwrap(), Value::Float(0.0));
        // 0x3ff0_0000_0000_0000 is the bit pattern of 1.0.
        let mut ops = vec![Inew];
        for _ in 0..10 {
            ops.extend([Ishl, Iinc]);
        }
        ops.extend(std::iter::repeat(Ishl).take(52));
        ops.push(Itof);
        assert_eq!(run(&ops).unwrap(), Value::Float(1.0));
    }

    #[test]
    fn test_floats() {
        assert_eq!(run(&[Finf]).unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(run(&[Finf, Fneg]).unwrap(), Value::Float(f64::NEG_INFINITY));
        assert!(run(&[Fnan]).unwrap().as_float().map_or(false, f64::is_nan));
    }

    #[test]
    fn test_strings() {
        // "A" is 65 = 0b1000001.
        let ops = [
            Snew, Inew, Iinc, Ishl, Ishl, Ishl, Ishl, Ishl, Ishl, Iinc, Sadd,
        ];
        assert_eq!(run(&ops).unwrap(), Value::from("A"));
    }

    #[test]
    fn test_sadd_truncates_to_low_byte() {
        // 256 + 1 keeps only the low byte.
        let mut ops = vec![Snew, Inew, Iinc];
        ops.extend(std::iter::repeat(Ishl).take(8));
        ops.extend([Iinc, Sadd]);
        assert_eq!(run(&ops).unwrap(), Value::Str(vec![1]));
    }

    #[test]
    fn test_objects_and_arrays() {
        let ops = [Onew, Snew, Inew, Sadd, Bnew, Bneg, Oadd];
        assert_eq!(
            run(&ops).unwrap(),
            Value::object([(vec![0u8], Value::Bool(true))])
        );

        let ops = [Anew, Nnew, Aadd, Inew, Aadd];
        assert_eq!(
            run(&ops).unwrap(),
            Value::Array(vec![Value::Nil, Value::Int(0)])
        );
    }

    #[test]
    fn test_oadd_overwrites_existing_key() {
        let ops = [Onew, Snew, Inew, Oadd, Snew, Nnew, Oadd];
        assert_eq!(
            run(&ops).unwrap(),
            Value::object([(Vec::<u8>::new(), Value::Nil)])
        );
    }

    #[test]
    fn test_gdup_copies_deeply() {
        let mut vm = Machine::new();
        for op in [Anew, Gdup, Nnew, Aadd] {
            vm.feed(op).unwrap();
        }
        assert_eq!(vm.depth(), 2);
        assert_eq!(vm.top().unwrap(), &Value::Array(vec![Value::Nil]));
    }

    #[test]
    fn test_underflow() {
        assert!(matches!(
            run(&[Iadd]),
            Err(Error::StackUnderflow { op: Iadd })
        ));
        assert!(matches!(
            run(&[Gdup]),
            Err(Error::StackUnderflow { op: Gdup })
        ));
        assert!(matches!(
            run(&[Inew, Iadd]),
            Err(Error::StackUnderflow { op: Iadd })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        match run(&[Bnew, Iinc]) {
            Err(Error::TypeMismatch { op, expected, actual }) => {
                assert_eq!(op, Iinc);
                assert_eq!(expected, Kind::Int);
                assert_eq!(actual, Kind::Bool);
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
        assert!(matches!(
            run(&[Inew, Nnew, Sadd]),
            Err(Error::TypeMismatch { expected: Kind::Int, actual: Kind::Nil, .. })
        ));
        assert!(matches!(
            run(&[Anew, Snew, Nnew, Oadd]),
            Err(Error::TypeMismatch { expected: Kind::Object, actual: Kind::Array, .. })
        ));
    }

    #[test]
    fn test_top_on_empty_machine() {
        let vm = Machine::new();
        assert!(matches!(vm.top(), Err(Error::EmptyStack)));
        assert!(matches!(run(&[]), Err(Error::EmptyStack)));
    }

    #[test]
    fn test_capacity_fallback() {
        assert_eq!(Machine::with_capacity(0).capacity(), DEFAULT_STACK_CAPACITY);
        assert_eq!(Machine::with_capacity(-5).capacity(), DEFAULT_STACK_CAPACITY);
        assert_eq!(Machine::with_capacity(3).capacity(), 3);
    }

    #[test]
    fn test_overflow() {
        let mut vm = Machine::with_capacity(2);
        vm.feed(Nnew).unwrap();
        vm.feed(Gdup).unwrap();
        assert!(matches!(
            vm.feed(Inew),
            Err(Error::StackOverflow { op: Inew, capacity: 2 })
        ));
        assert_eq!(vm.depth(), 2);
        assert_eq!(vm.executed(), 2);
    }
}
