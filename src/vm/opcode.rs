// src/vm/opcode.rs

use std::fmt;

/// The closed Watson instruction set. Every opcode pops a fixed number of
/// operands (0 to 3) and pushes exactly one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // --- Integers ---
    /// Pushes Int(0).
    Inew,
    /// Int(v) -> Int(v + 1).
    Iinc,
    /// Int(v) -> Int(v << 1).
    Ishl,
    /// Int(b), Int(a) -> Int(a + b).
    Iadd,
    /// Int(v) -> Int(-v).
    Ineg,
    /// Int(v) -> Int(v >> 1), sign-preserving.
    Isht,
    /// Int(v) -> Float whose IEEE-754 bits are v.
    Itof,
    /// Int(v) -> Uint with the same bits.
    Itou,

    // --- Floats ---
    /// Pushes Float(+inf).
    Finf,
    /// Pushes Float(NaN).
    Fnan,
    /// Float(v) -> Float(-v).
    Fneg,

    // --- Strings ---
    /// Pushes an empty Str.
    Snew,
    /// Int(n), Str(s) -> Str(s ++ [n & 0xff]).
    Sadd,

    // --- Objects ---
    /// Pushes an empty Object.
    Onew,
    /// Value(v), Str(k), Object(o) -> Object(o with k = v).
    Oadd,

    // --- Arrays ---
    /// Pushes an empty Array.
    Anew,
    /// Value(v), Array(a) -> Array(a ++ [v]).
    Aadd,

    // --- Bools ---
    /// Pushes Bool(false).
    Bnew,
    /// Bool(b) -> Bool(!b).
    Bneg,

    // --- Nil ---
    /// Pushes Nil.
    Nnew,

    // --- Stack utility ---
    /// Pushes a copy of the top of the stack.
    Gdup,
}

impl OpCode {
    pub const ALL: [OpCode; 21] = [
        OpCode::Inew,
        OpCode::Iinc,
        OpCode::Ishl,
        OpCode::Iadd,
        OpCode::Ineg,
        OpCode::Isht,
        OpCode::Itof,
        OpCode::Itou,
        OpCode::Finf,
        OpCode::Fnan,
        OpCode::Fneg,
        OpCode::Snew,
        OpCode::Sadd,
        OpCode::Onew,
        OpCode::Oadd,
        OpCode::Anew,
        OpCode::Aadd,
        OpCode::Bnew,
        OpCode::Bneg,
        OpCode::Nnew,
        OpCode::Gdup,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Inew => "Inew",
            OpCode::Iinc => "Iinc",
            OpCode::Ishl => "Ishl",
            OpCode::Iadd => "Iadd",
            OpCode::Ineg => "Ineg",
            OpCode::Isht => "Isht",
            OpCode::Itof => "Itof",
            OpCode::Itou => "Itou",
            OpCode::Finf => "Finf",
            OpCode::Fnan => "Fnan",
            OpCode::Fneg => "Fneg",
            OpCode::Snew => "Snew",
            OpCode::Sadd => "Sadd",
            OpCode::Onew => "Onew",
            OpCode::Oadd => "Oadd",
            OpCode::Anew => "Anew",
            OpCode::Aadd => "Aadd",
            OpCode::Bnew => "Bnew",
            OpCode::Bneg => "Bneg",
            OpCode::Nnew => "Nnew",
            OpCode::Gdup => "Gdup",
        }
    }

    /// Number of values popped before the single push.
    pub fn arity(self) -> usize {
        match self {
            OpCode::Inew
            | OpCode::Finf
            | OpCode::Fnan
            | OpCode::Snew
            | OpCode::Onew
            | OpCode::Anew
            | OpCode::Bnew
            | OpCode::Nnew
            | OpCode::Gdup => 0,
            OpCode::Iinc
            | OpCode::Ishl
            | OpCode::Ineg
            | OpCode::Isht
            | OpCode::Itof
            | OpCode::Itou
            | OpCode::Fneg
            | OpCode::Bneg => 1,
            OpCode::Iadd | OpCode::Sadd | OpCode::Aadd => 2,
            OpCode::Oadd => 3,
        }
    }

    pub fn from_mnemonic(name: &str) -> Option<OpCode> {
        OpCode::ALL.iter().copied().find(|op| op.mnemonic() == name)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_is_complete_and_unique() {
        let unique: HashSet<_> = OpCode::ALL.iter().collect();
        assert_eq!(unique.len(), OpCode::ALL.len());
        let names: HashSet<_> = OpCode::ALL.iter().map(|op| op.mnemonic()).collect();
        assert_eq!(names.len(), OpCode::ALL.len());
    }

    #[test]
    fn test_mnemonic_lookup() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_mnemonic(op.mnemonic()), Some(op));
        }
        assert_eq!(OpCode::from_mnemonic("Ipop"), None);
    }

    #[test]
    fn test_arity() {
        assert_eq!(OpCode::Inew.arity(), 0);
        assert_eq!(OpCode::Gdup.arity(), 0);
        assert_eq!(OpCode::Bneg.arity(), 1);
        assert_eq!(OpCode::Sadd.arity(), 2);
        assert_eq!(OpCode::Oadd.arity(), 3);
    }
}
