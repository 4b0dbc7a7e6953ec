//! wasm-bindgen interface for the Vizij scratch marshaller.
//!
//! Rust code running in the same module (WebGL wrappers and the like) can use
//! `Marshaller<JsHost>` directly with borrowed slices. JavaScript callers get
//! [`VizijScratch`], which owns one scratch `ArrayBuffer` and returns
//! `Uint8Array` / `Float32Array` windows over it.
//!
//! Every returned typed array is only valid until the next call on the same
//! instance: that call may overwrite it or detach it from the live buffer.

pub mod host;

use js_sys::{
    Float32Array, Function, Reflect, Uint16Array, Uint32Array, Uint8Array, Uint8ClampedArray,
};
use log::debug;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

pub use host::{JsHost, JsView};
use vizij_scratch_core::{ElementKind, Marshaller, ScratchConfig, ScratchError, Source};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn scratch_err(op: &str, e: ScratchError) -> JsError {
    JsError::new(&format!("{op}: {e}"))
}

/// Constructor name of a JS value (`"Float32Array"`), or its `typeof` for
/// primitives.
fn constructor_name(value: &JsValue) -> String {
    Reflect::get(value, &JsValue::from_str("constructor"))
        .ok()
        .and_then(|c| c.dyn_into::<Function>().ok())
        .map(|f| String::from(f.name()))
        .or_else(|| value.js_typeof().as_string())
        .unwrap_or_default()
}

/// Stage a JS typed array into the scratch buffer. Only the fixed element
/// set is accepted; anything else is `UnsupportedElementKind`.
fn stage_typed_array(
    core: &mut Marshaller<JsHost>,
    source: &JsValue,
) -> Result<JsView, ScratchError> {
    let name = constructor_name(source);
    let unsupported = || ScratchError::UnsupportedElementKind(name.clone());
    match ElementKind::from_name(&name)? {
        ElementKind::U8 => {
            let data = if let Some(a) = source.dyn_ref::<Uint8Array>() {
                a.to_vec()
            } else if let Some(a) = source.dyn_ref::<Uint8ClampedArray>() {
                a.to_vec()
            } else {
                return Err(unsupported());
            };
            core.view_of(Source::U8(&data))
        }
        ElementKind::U16 => {
            let data = source.dyn_ref::<Uint16Array>().ok_or_else(unsupported)?.to_vec();
            core.view_of(Source::U16(&data))
        }
        ElementKind::U32 => {
            let data = source.dyn_ref::<Uint32Array>().ok_or_else(unsupported)?.to_vec();
            core.view_of(Source::U32(&data))
        }
        ElementKind::F32 => {
            let data = source.dyn_ref::<Float32Array>().ok_or_else(unsupported)?.to_vec();
            core.view_of(Source::F32(&data))
        }
    }
}

/// A scratch `ArrayBuffer` plus its cached `Uint8Array` / `Float32Array` views.
#[wasm_bindgen]
pub struct VizijScratch {
    core: Marshaller<JsHost>,
}

#[wasm_bindgen]
impl VizijScratch {
    /// Create a new scratch instance. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new VizijScratch({ initial_capacity: 1024 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijScratch, JsError> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let cfg: ScratchConfig = if jsvalue_is_undefined_or_null(&config) {
            ScratchConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core =
            Marshaller::with_config(JsHost, &cfg).map_err(|e| scratch_err("config error", e))?;
        debug!(
            "scratch instance created: {} bytes, max {}",
            cfg.initial_capacity, cfg.max_capacity
        );
        Ok(VizijScratch { core })
    }

    /// `Uint8Array` of `count` bytes, initialized from `data` when given.
    #[wasm_bindgen(js_name = from_bytes)]
    pub fn from_bytes(
        &mut self,
        count: usize,
        data: Option<Vec<u8>>,
    ) -> Result<Uint8Array, JsError> {
        self.core
            .from_bytes(count, data.as_deref())
            .and_then(JsView::into_bytes)
            .map_err(|e| scratch_err("from_bytes", e))
    }

    /// `Uint8Array` of `count * 2` bytes holding 16-bit words (index buffers).
    #[wasm_bindgen(js_name = from_words16)]
    pub fn from_words16(
        &mut self,
        count: usize,
        data: Option<Vec<u16>>,
    ) -> Result<Uint8Array, JsError> {
        self.core
            .from_words16(count, data.as_deref())
            .and_then(JsView::into_bytes)
            .map_err(|e| scratch_err("from_words16", e))
    }

    /// `Uint8Array` of `count * 4` bytes holding 32-bit words.
    #[wasm_bindgen(js_name = from_words32)]
    pub fn from_words32(
        &mut self,
        count: usize,
        data: Option<Vec<u32>>,
    ) -> Result<Uint8Array, JsError> {
        self.core
            .from_words32(count, data.as_deref())
            .and_then(JsView::into_bytes)
            .map_err(|e| scratch_err("from_words32", e))
    }

    /// `Uint8Array` of `count * 4` bytes holding float32 bit patterns.
    #[wasm_bindgen(js_name = floats_as_bytes)]
    pub fn floats_as_bytes(
        &mut self,
        count: usize,
        data: Option<Vec<f32>>,
    ) -> Result<Uint8Array, JsError> {
        self.core
            .floats_as_bytes(count, data.as_deref())
            .and_then(JsView::into_bytes)
            .map_err(|e| scratch_err("floats_as_bytes", e))
    }

    /// `Float32Array` of `count` elements (uniforms, vertex attributes).
    #[wasm_bindgen(js_name = float_view)]
    pub fn float_view(
        &mut self,
        count: usize,
        data: Option<Vec<f32>>,
    ) -> Result<Float32Array, JsError> {
        self.core
            .float_view(count, data.as_deref())
            .and_then(JsView::into_floats)
            .map_err(|e| scratch_err("float_view", e))
    }

    /// Stage any supported typed array. `Float32Array` input comes back as a
    /// `Float32Array`; `Uint8Array`, `Uint8ClampedArray`, `Uint16Array` and
    /// `Uint32Array` input comes back as a `Uint8Array` over the same bytes.
    #[wasm_bindgen(js_name = typed_array_of)]
    pub fn typed_array_of(&mut self, source: JsValue) -> Result<JsValue, JsError> {
        stage_typed_array(&mut self.core, &source)
            .map(JsValue::from)
            .map_err(|e| scratch_err("typed_array_of", e))
    }

    /// Current capacity of the scratch buffer in bytes.
    #[wasm_bindgen(getter)]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Number of times the scratch buffer has been reallocated.
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.core.generation() as f64
    }

    /// Lifetime counters: `{ capacity, generation, reallocations, copies, view_rebuilds }`.
    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.stats()).map_err(|e| JsError::new(&format!("stats: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
