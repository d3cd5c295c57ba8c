// src/dumper.rs

use crate::error::Result;
use crate::value::Value;
use crate::vm::opcode::OpCode;
use crate::writer::OpWriter;

/// Computes an opcode program for a value and writes it to a sink.
/// Running the program on a fresh machine reproduces the value.
pub struct Dumper<W> {
    writer: W,
    emitted: usize,
}

impl<W: OpWriter> Dumper<W> {
    pub fn new(writer: W) -> Self {
        Dumper { writer, emitted: 0 }
    }

    /// Opcodes written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn dump(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Int(n) => self.dump_int(*n),
            Value::Uint(n) => {
                self.dump_bits(*n)?;
                self.emit(OpCode::Itou)
            }
            Value::Float(x) => self.dump_float(*x),
            Value::Str(s) => self.dump_bytes(s),
            Value::Bool(b) => {
                self.emit(OpCode::Bnew)?;
                if *b {
                    self.emit(OpCode::Bneg)?;
                }
                Ok(())
            }
            Value::Nil => self.emit(OpCode::Nnew),
            Value::Object(o) => {
                self.emit(OpCode::Onew)?;
                for (k, v) in o {
                    self.dump_bytes(k)?;
                    self.dump(v)?;
                    self.emit(OpCode::Oadd)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                self.emit(OpCode::Anew)?;
                for item in items {
                    self.dump(item)?;
                    self.emit(OpCode::Aadd)?;
                }
                Ok(())
            }
        }
    }

    fn emit(&mut self, op: OpCode) -> Result<()> {
        self.writer.write_op(op)?;
        self.emitted += 1;
        Ok(())
    }

    /// Pushes Int with the given bit pattern: seed with `Inew`, then walk the
    /// bits from the most significant set one down, doubling for every bit
    /// after the first and incrementing for every set bit.
    fn dump_bits(&mut self, bits: u64) -> Result<()> {
        self.emit(OpCode::Inew)?;
        let width = u64::BITS - bits.leading_zeros();
        for i in (0..width).rev() {
            if i + 1 != width {
                self.emit(OpCode::Ishl)?;
            }
            if (bits >> i) & 1 == 1 {
                self.emit(OpCode::Iinc)?;
            }
        }
        Ok(())
    }

    fn dump_int(&mut self, n: i64) -> Result<()> {
        // i64::MIN's magnitude wraps back to itself, and so does its negation.
        self.dump_bits(n.unsigned_abs())?;
        if n < 0 {
            self.emit(OpCode::Ineg)?;
        }
        Ok(())
    }

    fn dump_float(&mut self, x: f64) -> Result<()> {
        // Only the canonical NaN gets the short form; other payloads go through bits.
        if x.to_bits() == f64::NAN.to_bits() {
            return self.emit(OpCode::Fnan);
        }
        if x.is_infinite() {
            self.emit(OpCode::Finf)?;
            if x < 0.0 {
                self.emit(OpCode::Fneg)?;
            }
            return Ok(());
        }
        self.dump_bits(x.to_bits())?;
        self.emit(OpCode::Itof)
    }

    fn dump_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.emit(OpCode::Snew)?;
        for &b in bytes {
            self.dump_bits(u64::from(b))?;
            self.emit(OpCode::Sadd)?;
        }
        Ok(())
    }
}

/// The program the dumper produces for `value`.
pub fn ops_for(value: &Value) -> Result<Vec<OpCode>> {
    let mut dumper = Dumper::new(Vec::new());
    dumper.dump(value)?;
    Ok(dumper.into_inner())
}
