//! Element kinds, view kinds, and borrowed source sequences.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScratchError};

/// The fixed set of element types the marshaller accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    U8,
    U16,
    U32,
    F32,
}

impl ElementKind {
    #[inline]
    pub const fn size_bytes(self) -> usize {
        match self {
            ElementKind::U8 => 1,
            ElementKind::U16 => 2,
            ElementKind::U32 | ElementKind::F32 => 4,
        }
    }

    /// Byte length of `count` elements, or `None` if it overflows `usize`.
    #[inline]
    pub fn byte_len(self, count: usize) -> Option<usize> {
        count.checked_mul(self.size_bytes())
    }

    /// Parse a host-side type name, either the short Rust spelling (`"f32"`)
    /// or the typed array constructor name (`"Float32Array"`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim() {
            "u8" | "uint8" | "Uint8Array" | "Uint8ClampedArray" => Ok(ElementKind::U8),
            "u16" | "uint16" | "Uint16Array" => Ok(ElementKind::U16),
            "u32" | "uint32" | "Uint32Array" => Ok(ElementKind::U32),
            "f32" | "float32" | "Float32Array" => Ok(ElementKind::F32),
            other => Err(ScratchError::UnsupportedElementKind(other.to_string())),
        }
    }
}

/// The typed windows cached over the scratch buffer.
///
/// 16-bit words have no window of their own: they travel as byte pairs
/// through the byte view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Bytes,
    Float32,
}

impl ViewKind {
    #[inline]
    pub const fn element_width(self) -> usize {
        match self {
            ViewKind::Bytes => 1,
            ViewKind::Float32 => 4,
        }
    }

    /// Whether `count` elements of `kind` map onto a whole number of view
    /// elements.
    #[inline]
    pub fn presents(self, kind: ElementKind) -> bool {
        kind.size_bytes() % self.element_width() == 0
    }
}

/// A borrowed source sequence, one variant per supported element type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Source<'a> {
    U8(&'a [u8]),
    U16(&'a [u16]),
    U32(&'a [u32]),
    F32(&'a [f32]),
}

impl<'a> Source<'a> {
    pub fn kind(&self) -> ElementKind {
        match self {
            Source::U8(_) => ElementKind::U8,
            Source::U16(_) => ElementKind::U16,
            Source::U32(_) => ElementKind::U32,
            Source::F32(_) => ElementKind::F32,
        }
    }

    /// Length in elements.
    pub fn len(&self) -> usize {
        match self {
            Source::U8(s) => s.len(),
            Source::U16(s) => s.len(),
            Source::U32(s) => s.len(),
            Source::F32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The elements in native byte order.
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Source::U8(s) => s,
            Source::U16(s) => bytemuck::cast_slice(s),
            Source::U32(s) => bytemuck::cast_slice(s),
            Source::F32(s) => bytemuck::cast_slice(s),
        }
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(s: &'a [u8]) -> Self {
        Source::U8(s)
    }
}

impl<'a> From<&'a [u16]> for Source<'a> {
    fn from(s: &'a [u16]) -> Self {
        Source::U16(s)
    }
}

impl<'a> From<&'a [u32]> for Source<'a> {
    fn from(s: &'a [u32]) -> Self {
        Source::U32(s)
    }
}

impl<'a> From<&'a [f32]> for Source<'a> {
    fn from(s: &'a [f32]) -> Self {
        Source::F32(s)
    }
}
