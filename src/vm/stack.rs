// src/vm/stack.rs

use crate::value::Value;

/// A value stack with a fixed capacity. Carries no execution semantics; the
/// machine turns its failures into errors that name the offending opcode.
#[derive(Debug)]
pub struct Stack {
    values: Vec<Value>,
    capacity: usize,
}

impl Stack {
    pub fn new(capacity: usize) -> Self {
        Stack {
            values: Vec::new(),
            capacity,
        }
    }

    /// Pushes `value`, handing it back if the stack is full.
    pub fn push(&mut self, value: Value) -> Result<(), Value> {
        if self.values.len() >= self.capacity {
            return Err(value);
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_respects_capacity() {
        let mut stack = Stack::new(2);
        assert!(stack.push(Value::Nil).is_ok());
        assert!(stack.push(Value::Int(1)).is_ok());
        assert_eq!(stack.push(Value::Int(2)), Err(Value::Int(2)));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_pop_and_peek() {
        let mut stack = Stack::new(4);
        assert!(stack.pop().is_none());
        assert!(stack.peek().is_none());
        stack.push(Value::Bool(true)).unwrap();
        assert_eq!(stack.peek(), Some(&Value::Bool(true)));
        assert_eq!(stack.pop(), Some(Value::Bool(true)));
        assert!(stack.is_empty());
    }
}
