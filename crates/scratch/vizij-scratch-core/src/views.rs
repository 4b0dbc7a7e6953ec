//! Cached typed windows over the current scratch buffer.

use log::trace;

use crate::error::Result;
use crate::host::ScratchHost;
use crate::kind::ViewKind;
use crate::store::BufferStore;

struct CachedView<V> {
    view: V,
    generation: u64,
}

/// One cached window per [`ViewKind`], rebuilt lazily whenever the store has
/// moved to a newer buffer generation.
pub struct ViewRegistry<H: ScratchHost> {
    bytes: Option<CachedView<H::View>>,
    floats: Option<CachedView<H::View>>,
    rebuilds: u64,
}

impl<H: ScratchHost> Default for ViewRegistry<H> {
    fn default() -> Self {
        Self {
            bytes: None,
            floats: None,
            rebuilds: 0,
        }
    }
}

impl<H: ScratchHost> ViewRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A window of `kind` over the store's current buffer, spanning its whole
    /// capacity.
    pub fn view_for(&mut self, store: &BufferStore<H>, kind: ViewKind) -> Result<H::View> {
        let generation = store.generation();
        let slot = match kind {
            ViewKind::Bytes => &mut self.bytes,
            ViewKind::Float32 => &mut self.floats,
        };
        if let Some(cached) = slot.as_ref().filter(|c| c.generation == generation) {
            return Ok(cached.view.clone());
        }

        let host = store.host();
        let view = match kind {
            ViewKind::Bytes => host.byte_view(store.buffer()),
            ViewKind::Float32 => host.typed_view(store.buffer(), kind.element_width())?,
        };
        debug_assert!(host.view_byte_length(&view) >= store.capacity());
        trace!("rebuilt {kind:?} view for generation {generation}");
        *slot = Some(CachedView {
            view: view.clone(),
            generation,
        });
        self.rebuilds += 1;
        Ok(view)
    }

    /// Generation the cached window of `kind` was built against, if any.
    pub fn generation_of(&self, kind: ViewKind) -> Option<u64> {
        let slot = match kind {
            ViewKind::Bytes => &self.bytes,
            ViewKind::Float32 => &self.floats,
        };
        slot.as_ref().map(|c| c.generation)
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
