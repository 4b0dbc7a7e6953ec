//! `ScratchHost` over JavaScript `ArrayBuffer`s and typed arrays.

use js_sys::{Array, ArrayBuffer, Float32Array, Function, Reflect, Uint8Array};
use log::warn;
use wasm_bindgen::{JsCast, JsValue};

use vizij_scratch_core::{Result, ScratchError, ScratchHost};

/// Largest byte length an `ArrayBuffer` can be asked for from wasm. Hosts may
/// refuse smaller allocations; those refusals also surface as
/// `CapacityOverflow`.
pub const MAX_ARRAY_BUFFER_BYTES: usize = u32::MAX as usize;

#[derive(Clone, Copy, Debug, Default)]
pub struct JsHost;

/// A typed array window over a scratch `ArrayBuffer`.
#[derive(Clone, Debug)]
pub enum JsView {
    Bytes(Uint8Array),
    Float32(Float32Array),
}

impl JsView {
    /// Length in elements.
    pub fn length(&self) -> u32 {
        match self {
            JsView::Bytes(a) => a.length(),
            JsView::Float32(a) => a.length(),
        }
    }

    pub fn byte_length(&self) -> u32 {
        match self {
            JsView::Bytes(a) => a.byte_length(),
            JsView::Float32(a) => a.byte_length(),
        }
    }

    pub fn buffer(&self) -> ArrayBuffer {
        match self {
            JsView::Bytes(a) => a.buffer(),
            JsView::Float32(a) => a.buffer(),
        }
    }

    pub fn into_bytes(self) -> Result<Uint8Array> {
        match self {
            JsView::Bytes(a) => Ok(a),
            JsView::Float32(_) => Err(ScratchError::View(
                "expected a byte view, got a float32 view".into(),
            )),
        }
    }

    pub fn into_floats(self) -> Result<Float32Array> {
        match self {
            JsView::Float32(a) => Ok(a),
            JsView::Bytes(_) => Err(ScratchError::View(
                "expected a float32 view, got a byte view".into(),
            )),
        }
    }
}

impl From<JsView> for JsValue {
    fn from(view: JsView) -> JsValue {
        match view {
            JsView::Bytes(a) => a.into(),
            JsView::Float32(a) => a.into(),
        }
    }
}

fn array_buffer_ctor() -> Result<Function> {
    Reflect::get(&js_sys::global(), &JsValue::from_str("ArrayBuffer"))
        .ok()
        .and_then(|c| c.dyn_into::<Function>().ok())
        .ok_or_else(|| ScratchError::View("ArrayBuffer constructor unavailable".into()))
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| ScratchError::View(format!("{what} {value} exceeds u32")))
}

impl ScratchHost for JsHost {
    type Buffer = ArrayBuffer;
    type View = JsView;

    fn allocate(&self, byte_len: usize) -> Result<ArrayBuffer> {
        let overflow = || ScratchError::CapacityOverflow {
            requested: byte_len,
            max: MAX_ARRAY_BUFFER_BYTES,
        };
        let len = u32::try_from(byte_len).map_err(|_| overflow())?;
        // `ArrayBuffer::new` would throw straight through on a RangeError.
        let args = Array::of1(&JsValue::from(len));
        let buffer = Reflect::construct(&array_buffer_ctor()?, &args).map_err(|err| {
            warn!("ArrayBuffer({len}) rejected by host: {err:?}");
            overflow()
        })?;
        Ok(buffer.unchecked_into())
    }

    fn buffer_byte_length(&self, buffer: &ArrayBuffer) -> usize {
        buffer.byte_length() as usize
    }

    fn byte_view(&self, buffer: &ArrayBuffer) -> JsView {
        JsView::Bytes(Uint8Array::new(buffer))
    }

    fn typed_view(&self, buffer: &ArrayBuffer, element_width: usize) -> Result<JsView> {
        match element_width {
            1 => Ok(self.byte_view(buffer)),
            4 => {
                let byte_len = buffer.byte_length();
                if byte_len % 4 != 0 {
                    return Err(ScratchError::View(format!(
                        "4-byte window over {byte_len} bytes"
                    )));
                }
                Ok(JsView::Float32(Float32Array::new(buffer)))
            }
            other => Err(ScratchError::UnsupportedElementKind(format!(
                "{other}-byte elements"
            ))),
        }
    }

    fn view_byte_length(&self, view: &JsView) -> usize {
        view.byte_length() as usize
    }

    fn copy_bytes_into(&self, view: &JsView, src: &[u8]) -> Result<()> {
        let JsView::Bytes(target) = view else {
            return Err(ScratchError::View("byte copy needs a byte view".into()));
        };
        let len = to_u32(src.len(), "copy length")?;
        if len > target.length() {
            return Err(ScratchError::View(format!(
                "copy of {len} bytes into a {}-byte view",
                target.length()
            )));
        }
        // copy_from requires equal lengths.
        target.subarray(0, len).copy_from(src);
        Ok(())
    }

    fn slice(&self, view: &JsView, start: usize, len: usize) -> Result<JsView> {
        let begin = to_u32(start, "slice start")?;
        let end = start
            .checked_add(len)
            .ok_or_else(|| ScratchError::View("slice end overflows".into()))?;
        let end = to_u32(end, "slice end")?;
        if end > view.length() {
            return Err(ScratchError::View(format!(
                "slice {start}+{len} out of bounds for a view of {} elements",
                view.length()
            )));
        }
        Ok(match view {
            JsView::Bytes(a) => JsView::Bytes(a.subarray(begin, end)),
            JsView::Float32(a) => JsView::Float32(a.subarray(begin, end)),
        })
    }
}
