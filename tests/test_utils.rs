// tests/test_utils.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use watson::{Object, OpCode, Value};

// Deterministic generator so failures are reproducible.
#[allow(dead_code)]
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[allow(dead_code)]
pub fn random_bytes(rng: &mut StdRng, max_len: usize) -> Vec<u8> {
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| rng.gen::<u8>()).collect()
}

// Any bit pattern, with the special values mixed in more often than chance.
#[allow(dead_code)]
pub fn random_float(rng: &mut StdRng) -> f64 {
    match rng.gen_range(0..8) {
        0 => f64::INFINITY,
        1 => f64::NEG_INFINITY,
        2 => f64::NAN,
        3 => f64::from_bits(f64::NAN.to_bits() | rng.gen_range(1..1u64 << 51)),
        4 => rng.gen_range(-1e6..1e6),
        _ => f64::from_bits(rng.gen::<u64>()),
    }
}

#[allow(dead_code)]
pub fn random_scalar(rng: &mut StdRng) -> Value {
    match rng.gen_range(0..7) {
        0 => Value::Int(rng.gen()),
        1 => Value::Int(rng.gen_range(-300..300)),
        2 => Value::Uint(rng.gen()),
        3 => Value::Float(random_float(rng)),
        4 => Value::Str(random_bytes(rng, 12)),
        5 => Value::Bool(rng.gen_bool(0.5)),
        _ => Value::Nil,
    }
}

/// A random value tree at most `depth` levels of containers deep.
#[allow(dead_code)]
pub fn random_value(rng: &mut StdRng, depth: usize) -> Value {
    if depth == 0 || rng.gen_bool(0.4) {
        return random_scalar(rng);
    }
    let len = rng.gen_range(0..5);
    if rng.gen_bool(0.5) {
        Value::Array((0..len).map(|_| random_value(rng, depth - 1)).collect())
    } else {
        let mut object = Object::new();
        for _ in 0..len {
            object.insert(random_bytes(rng, 6), random_value(rng, depth - 1));
        }
        Value::Object(object)
    }
}

/// A random integer-only opcode stream that decodes cleanly: every op that
/// pops has enough Ints below it.
#[allow(dead_code)]
pub fn random_int_program(rng: &mut StdRng, len: usize) -> Vec<OpCode> {
    let mut ops = vec![OpCode::Inew];
    let mut depth = 1usize;
    for _ in 0..len {
        let op = match rng.gen_range(0..8) {
            0 => OpCode::Inew,
            1 => OpCode::Iinc,
            2 => OpCode::Ishl,
            3 => OpCode::Isht,
            4 => OpCode::Ineg,
            5 => OpCode::Gdup,
            _ if depth >= 2 => OpCode::Iadd,
            _ => OpCode::Iinc,
        };
        match op {
            OpCode::Inew | OpCode::Gdup => depth += 1,
            OpCode::Iadd => depth -= 1,
            _ => {}
        }
        ops.push(op);
    }
    ops
}
