// src/convert.rs

//! Conversions between native Rust types and `Value`.
//!
//! Types opt in by implementing `ToValue` / `FromValue`; nothing here walks
//! struct fields at runtime.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::value::{Kind, Value};

/// A native value that can be offered to the dumper.
pub trait ToValue {
    fn to_value(&self) -> Result<Value>;
}

/// A native value that can be rebuilt from a decoded `Value`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch(expected: Kind, value: &Value) -> Error {
    Error::Conversion {
        expected,
        actual: value.kind(),
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Result<Value> {
                    Ok(Value::Int(i64::from(*self)))
                }
            }

            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self> {
                    let n = value.as_int().ok_or_else(|| mismatch(Kind::Int, value))?;
                    <$t>::try_from(n).map_err(|_| Error::OutOfRange { target: stringify!($t) })
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Result<Value> {
                    Ok(Value::Uint(u64::from(*self)))
                }
            }

            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self> {
                    let n = value.as_uint().ok_or_else(|| mismatch(Kind::Uint, value))?;
                    <$t>::try_from(n).map_err(|_| Error::OutOfRange { target: stringify!($t) })
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl ToValue for i128 {
    fn to_value(&self) -> Result<Value> {
        i64::try_from(*self)
            .map(Value::Int)
            .map_err(|_| Error::UnsupportedNativeType(format!("i128 {} does not fit in 64 bits", self)))
    }
}

impl ToValue for u128 {
    fn to_value(&self) -> Result<Value> {
        u64::try_from(*self)
            .map(Value::Uint)
            .map_err(|_| Error::UnsupportedNativeType(format!("u128 {} does not fit in 64 bits", self)))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Float(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_float().ok_or_else(|| mismatch(Kind::Float, value))
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Float(f64::from(*self)))
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_float()
            .map(|x| x as f32)
            .ok_or_else(|| mismatch(Kind::Float, value))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch(Kind::Bool, value))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::from(self))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::from(self.as_str()))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        let bytes = value.as_bytes().ok_or_else(|| mismatch(Kind::Str, value))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::OutOfRange { target: "String (invalid UTF-8)" })
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Nil),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value> {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_array()
            .ok_or_else(|| mismatch(Kind::Array, value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}

fn map_to_value<'a, T, I>(entries: I) -> Result<Value>
where
    T: ToValue + 'a,
    I: IntoIterator<Item = (&'a String, &'a T)>,
{
    let mut object = crate::value::Object::new();
    for (k, v) in entries {
        object.insert(k.clone().into_bytes(), v.to_value()?);
    }
    Ok(Value::Object(object))
}

fn map_from_value<T, M>(value: &Value) -> Result<M>
where
    T: FromValue,
    M: FromIterator<(String, T)>,
{
    value
        .as_object()
        .ok_or_else(|| mismatch(Kind::Object, value))?
        .iter()
        .map(|(k, v)| {
            let key = String::from_utf8(k.clone())
                .map_err(|_| Error::OutOfRange { target: "String (invalid UTF-8)" })?;
            Ok((key, T::from_value(v)?))
        })
        .collect()
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self)
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self> {
        map_from_value(value)
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self)
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: &Value) -> Result<Self> {
        map_from_value(value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value> {
        (**self).to_value()
    }
}
