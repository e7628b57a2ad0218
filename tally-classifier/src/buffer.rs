//! Model input description and the typed feature buffer built for it.

use serde::{Deserialize, Serialize};

/// IEEE-754 half-precision bit pattern for 1.0
pub const F16_ONE: u16 = 0x3C00;

/// Element type of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Int32,
    Uint8,
    Int8,
    Int16,
    #[default]
    Float32,
    Float16,
    Float64,
}

impl ElementKind {
    /// Parse a dtype name such as "int32" or "float16". Unknown names fall back to float32.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int32" => ElementKind::Int32,
            "uint8" => ElementKind::Uint8,
            "int8" => ElementKind::Int8,
            "int16" => ElementKind::Int16,
            "float16" => ElementKind::Float16,
            "float64" => ElementKind::Float64,
            _ => ElementKind::Float32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Int32 => "int32",
            ElementKind::Uint8 => "uint8",
            ElementKind::Int8 => "int8",
            ElementKind::Int16 => "int16",
            ElementKind::Float32 => "float32",
            ElementKind::Float16 => "float16",
            ElementKind::Float64 => "float64",
        }
    }
}

/// Declared shape and element type of the model input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSpec {
    /// Dimensions as declared by the model; non-positive entries are dynamic.
    pub shape: Vec<i64>,
    pub kind: ElementKind,
}

impl InputSpec {
    pub fn new(shape: Vec<i64>, kind: ElementKind) -> Self {
        Self { shape, kind }
    }

    /// Product of the dimensions, counting dynamic ones as 1. Zero when no shape is known.
    pub fn element_count(&self) -> usize {
        if self.shape.is_empty() {
            return 0;
        }
        self.shape
            .iter()
            .map(|&d| if d > 0 { d as usize } else { 1 })
            .product()
    }

    /// Buffer length to allocate, falling back to `fallback` when the shape is unknown.
    pub fn buffer_len(&self, fallback: usize) -> usize {
        match self.element_count() {
            0 => fallback,
            n => n,
        }
    }
}

/// Zero-initialized multi-hot feature buffer, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum InputBuffer {
    Int32(Vec<i32>),
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Float32(Vec<f32>),
    /// Half-precision values stored as raw bit patterns
    Float16(Vec<u16>),
    Float64(Vec<f64>),
}

impl InputBuffer {
    pub fn zeros(kind: ElementKind, len: usize) -> Self {
        match kind {
            ElementKind::Int32 => InputBuffer::Int32(vec![0; len]),
            ElementKind::Uint8 => InputBuffer::Uint8(vec![0; len]),
            ElementKind::Int8 => InputBuffer::Int8(vec![0; len]),
            ElementKind::Int16 => InputBuffer::Int16(vec![0; len]),
            ElementKind::Float32 => InputBuffer::Float32(vec![0.0; len]),
            ElementKind::Float16 => InputBuffer::Float16(vec![0; len]),
            ElementKind::Float64 => InputBuffer::Float64(vec![0.0; len]),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            InputBuffer::Int32(_) => ElementKind::Int32,
            InputBuffer::Uint8(_) => ElementKind::Uint8,
            InputBuffer::Int8(_) => ElementKind::Int8,
            InputBuffer::Int16(_) => ElementKind::Int16,
            InputBuffer::Float32(_) => ElementKind::Float32,
            InputBuffer::Float16(_) => ElementKind::Float16,
            InputBuffer::Float64(_) => ElementKind::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            InputBuffer::Int32(v) => v.len(),
            InputBuffer::Uint8(v) => v.len(),
            InputBuffer::Int8(v) => v.len(),
            InputBuffer::Int16(v) => v.len(),
            InputBuffer::Float32(v) => v.len(),
            InputBuffer::Float16(v) => v.len(),
            InputBuffer::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark position `idx` present. Returns false (and changes nothing) when out of range.
    pub fn set_one(&mut self, idx: usize) -> bool {
        if idx >= self.len() {
            return false;
        }
        match self {
            InputBuffer::Int32(v) => v[idx] = 1,
            InputBuffer::Uint8(v) => v[idx] = 1,
            InputBuffer::Int8(v) => v[idx] = 1,
            InputBuffer::Int16(v) => v[idx] = 1,
            InputBuffer::Float32(v) => v[idx] = 1.0,
            InputBuffer::Float16(v) => v[idx] = F16_ONE,
            InputBuffer::Float64(v) => v[idx] = 1.0,
        }
        true
    }

    /// Value at `idx` widened to f32; out of range reads as 0.
    pub fn value(&self, idx: usize) -> f32 {
        if idx >= self.len() {
            return 0.0;
        }
        match self {
            InputBuffer::Int32(v) => v[idx] as f32,
            InputBuffer::Uint8(v) => v[idx] as f32,
            InputBuffer::Int8(v) => v[idx] as f32,
            InputBuffer::Int16(v) => v[idx] as f32,
            InputBuffer::Float32(v) => v[idx],
            InputBuffer::Float16(v) => f16_bits_to_f32(v[idx]),
            InputBuffer::Float64(v) => v[idx] as f32,
        }
    }

    pub fn count_nonzero(&self) -> usize {
        (0..self.len()).filter(|&i| self.value(i) != 0.0).count()
    }

    /// Whole buffer widened to f32.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.value(i)).collect()
    }
}

/// Decode an IEEE-754 half-precision bit pattern.
pub fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exp = ((bits >> 10) & 0x1f) as i32;
    let frac = (bits & 0x03ff) as f32;
    match exp {
        0 => sign * frac * 2f32.powi(-24),
        0x1f if frac == 0.0 => sign * f32::INFINITY,
        0x1f => f32::NAN,
        _ => sign * (1.0 + frac / 1024.0) * 2f32.powi(exp - 15),
    }
}
