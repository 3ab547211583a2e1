//! Fixed-element-type binary buffers.

use crate::value::Value;

/// Concrete element type of a [`TypedArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl TypedArrayKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
            Self::BigInt64 => "BigInt64Array",
            Self::BigUint64 => "BigUint64Array",
        }
    }
}

/// A typed buffer. Element values surface as `Value::Number`, or as
/// `Value::BigInt` for the 64-bit integer kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedArray {
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Uint8Clamped(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    BigInt64(Vec<i64>),
    BigUint64(Vec<u64>),
}

macro_rules! each_variant {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            TypedArray::Int8($v) => $body,
            TypedArray::Uint8($v) => $body,
            TypedArray::Uint8Clamped($v) => $body,
            TypedArray::Int16($v) => $body,
            TypedArray::Uint16($v) => $body,
            TypedArray::Int32($v) => $body,
            TypedArray::Uint32($v) => $body,
            TypedArray::Float32($v) => $body,
            TypedArray::Float64($v) => $body,
            TypedArray::BigInt64($v) => $body,
            TypedArray::BigUint64($v) => $body,
        }
    };
}

impl TypedArray {
    pub fn kind(&self) -> TypedArrayKind {
        match self {
            Self::Int8(_) => TypedArrayKind::Int8,
            Self::Uint8(_) => TypedArrayKind::Uint8,
            Self::Uint8Clamped(_) => TypedArrayKind::Uint8Clamped,
            Self::Int16(_) => TypedArrayKind::Int16,
            Self::Uint16(_) => TypedArrayKind::Uint16,
            Self::Int32(_) => TypedArrayKind::Int32,
            Self::Uint32(_) => TypedArrayKind::Uint32,
            Self::Float32(_) => TypedArrayKind::Float32,
            Self::Float64(_) => TypedArrayKind::Float64,
            Self::BigInt64(_) => TypedArrayKind::BigInt64,
            Self::BigUint64(_) => TypedArrayKind::BigUint64,
        }
    }

    pub fn len(&self) -> usize {
        each_variant!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte length of the buffer.
    pub fn byte_len(&self) -> usize {
        each_variant!(self, v => std::mem::size_of_val(v.as_slice()))
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Uint8(v) => Some(v),
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Self::Int8(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Uint8(v) | Self::Uint8Clamped(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Int16(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Uint16(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Int32(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Uint32(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Float32(v) => v.get(index).map(|n| Value::Number(*n as f64)),
            Self::Float64(v) => v.get(index).map(|n| Value::Number(*n)),
            Self::BigInt64(v) => v.get(index).map(|n| Value::BigInt(*n as i128)),
            Self::BigUint64(v) => v.get(index).map(|n| Value::BigInt(*n as i128)),
        }
    }

    /// Writes one element. Returns `false` when the index is out of range or
    /// the value has no numeric interpretation for this element type.
    pub fn set(&mut self, index: usize, value: &Value) -> bool {
        if index >= self.len() {
            return false;
        }
        let (num, big) = match value {
            Value::Number(n) => (*n, *n as i128),
            Value::BigInt(b) => (*b as f64, *b),
            _ => return false,
        };
        match self {
            Self::Int8(v) => v[index] = num as i8,
            Self::Uint8(v) => v[index] = num as u8,
            Self::Uint8Clamped(v) => v[index] = num.round().clamp(0.0, 255.0) as u8,
            Self::Int16(v) => v[index] = num as i16,
            Self::Uint16(v) => v[index] = num as u16,
            Self::Int32(v) => v[index] = num as i32,
            Self::Uint32(v) => v[index] = num as u32,
            Self::Float32(v) => v[index] = num as f32,
            Self::Float64(v) => v[index] = num,
            Self::BigInt64(v) => v[index] = big as i64,
            Self::BigUint64(v) => v[index] = big as u64,
        }
        true
    }

    /// Element values in order.
    pub fn elements(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }
}
