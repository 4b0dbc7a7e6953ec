//! The host boundary and an in-process host.
//!
//! A [`ScratchHost`] owns the primitives the marshaller needs from whatever
//! sits on the other side of the boundary: allocating a raw buffer, laying
//! typed windows over it, bulk-copying bytes in, and narrowing a window.
//! Handles are cheap to clone and never own the storage exclusively, so a
//! superseded buffer lives only as long as someone still holds a view of it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Result, ScratchError};

pub trait ScratchHost {
    /// Opaque handle to a raw host buffer.
    type Buffer: Clone;
    /// Opaque handle to a typed window over a host buffer.
    type View: Clone;

    fn allocate(&self, byte_len: usize) -> Result<Self::Buffer>;

    fn buffer_byte_length(&self, buffer: &Self::Buffer) -> usize;

    /// A byte window covering the whole buffer.
    fn byte_view(&self, buffer: &Self::Buffer) -> Self::View;

    /// A window of `element_width`-byte elements covering the whole buffer.
    fn typed_view(&self, buffer: &Self::Buffer, element_width: usize) -> Result<Self::View>;

    fn view_byte_length(&self, view: &Self::View) -> usize;

    /// Copy `src` into `view` starting at its first byte.
    fn copy_bytes_into(&self, view: &Self::View, src: &[u8]) -> Result<()>;

    /// Narrow `view` to `len` elements starting at element `start`.
    fn slice(&self, view: &Self::View, start: usize, len: usize) -> Result<Self::View>;
}

/// Host backed by module memory. Storage is kept as 32-bit words so every
/// window up to four bytes wide is aligned.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryHost;

#[derive(Clone, Debug)]
pub struct MemoryBuffer {
    words: Rc<RefCell<Vec<u32>>>,
    byte_len: usize,
}

impl MemoryBuffer {
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn ptr_eq(&self, other: &MemoryBuffer) -> bool {
        Rc::ptr_eq(&self.words, &other.words)
    }
}

/// A typed window over a [`MemoryBuffer`].
#[derive(Clone, Debug)]
pub struct MemoryView {
    buffer: MemoryBuffer,
    width: usize,
    offset: usize,
    len: usize,
}

impl MemoryView {
    /// Length in elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element_width(&self) -> usize {
        self.width
    }

    pub fn byte_len(&self) -> usize {
        self.len * self.width
    }

    /// True when both views alias the same backing storage.
    pub fn shares_storage_with(&self, other: &MemoryView) -> bool {
        self.buffer.ptr_eq(&other.buffer)
    }

    pub fn buffer(&self) -> &MemoryBuffer {
        &self.buffer
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.with_bytes(<[u8]>::to_vec)
    }

    /// Read the window back as `T` elements. Fails when the window's length
    /// or offset does not fit `T`.
    pub fn read_as<T: bytemuck::Pod>(&self) -> Result<Vec<T>> {
        self.with_bytes(|bytes| {
            bytemuck::try_cast_slice::<u8, T>(bytes)
                .map(<[T]>::to_vec)
                .map_err(|e| {
                    ScratchError::View(format!(
                        "read back as {}: {e:?}",
                        std::any::type_name::<T>()
                    ))
                })
        })
    }

    pub fn to_f32(&self) -> Result<Vec<f32>> {
        self.read_as::<f32>()
    }

    fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let words = self.buffer.words.borrow();
        let bytes: &[u8] = bytemuck::cast_slice(&words[..]);
        // Bounds were checked when the view was cut and buffers never shrink.
        f(&bytes[self.offset..self.offset + self.byte_len()])
    }
}

fn check_window(bytes: &[u8], width: usize) -> Result<()> {
    let checked = match width {
        1 => Ok(()),
        2 => bytemuck::try_cast_slice::<u8, u16>(bytes).map(|_| ()),
        4 => bytemuck::try_cast_slice::<u8, u32>(bytes).map(|_| ()),
        other => {
            return Err(ScratchError::UnsupportedElementKind(format!(
                "{other}-byte elements"
            )))
        }
    };
    checked.map_err(|e| {
        ScratchError::View(format!(
            "{width}-byte window over {} bytes: {e:?}",
            bytes.len()
        ))
    })
}

impl ScratchHost for MemoryHost {
    type Buffer = MemoryBuffer;
    type View = MemoryView;

    fn allocate(&self, byte_len: usize) -> Result<MemoryBuffer> {
        let words = byte_len.div_ceil(4);
        Ok(MemoryBuffer {
            words: Rc::new(RefCell::new(vec![0u32; words])),
            byte_len,
        })
    }

    fn buffer_byte_length(&self, buffer: &MemoryBuffer) -> usize {
        buffer.byte_len
    }

    fn byte_view(&self, buffer: &MemoryBuffer) -> MemoryView {
        MemoryView {
            buffer: buffer.clone(),
            width: 1,
            offset: 0,
            len: buffer.byte_len,
        }
    }

    fn typed_view(&self, buffer: &MemoryBuffer, element_width: usize) -> Result<MemoryView> {
        {
            let words = buffer.words.borrow();
            let bytes: &[u8] = bytemuck::cast_slice(&words[..]);
            check_window(&bytes[..buffer.byte_len], element_width)?;
        }
        Ok(MemoryView {
            buffer: buffer.clone(),
            width: element_width,
            offset: 0,
            len: buffer.byte_len / element_width,
        })
    }

    fn view_byte_length(&self, view: &MemoryView) -> usize {
        view.byte_len()
    }

    fn copy_bytes_into(&self, view: &MemoryView, src: &[u8]) -> Result<()> {
        if src.len() > view.byte_len() {
            return Err(ScratchError::View(format!(
                "copy of {} bytes into a {}-byte view",
                src.len(),
                view.byte_len()
            )));
        }
        let mut words = view.buffer.words.borrow_mut();
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut words[..]);
        bytes[view.offset..view.offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn slice(&self, view: &MemoryView, start: usize, len: usize) -> Result<MemoryView> {
        match start.checked_add(len) {
            Some(end) if end <= view.len => Ok(MemoryView {
                buffer: view.buffer.clone(),
                width: view.width,
                offset: view.offset + start * view.width,
                len,
            }),
            _ => Err(ScratchError::View(format!(
                "slice {start}+{len} out of bounds for a view of {} elements",
                view.len
            ))),
        }
    }
}
