//! Staging module-local sequences into the scratch buffer.
//!
//! Every entry point runs the same steps: size the request in bytes, grow the
//! store if needed, byte-copy the source (if any) to offset 0, then hand back
//! a window of the requested kind narrowed to exactly the requested length.
//!
//! A returned view must be consumed before the next call on the same
//! marshaller. The next call may overwrite its contents in place or replace
//! the buffer underneath it.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::ScratchConfig;
use crate::error::{Result, ScratchError};
use crate::host::{MemoryHost, ScratchHost};
use crate::kind::{ElementKind, Source, ViewKind};
use crate::store::BufferStore;
use crate::views::ViewRegistry;

/// A single marshalling request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarshalRequest<'a> {
    pub kind: ElementKind,
    /// Window the result is presented through.
    pub view: ViewKind,
    /// Elements of `kind` the caller wants visible.
    pub count: usize,
    /// `None` leaves the buffer contents as they are.
    pub source: Option<Source<'a>>,
}

impl<'a> MarshalRequest<'a> {
    pub fn new(kind: ElementKind, view: ViewKind, count: usize) -> Self {
        Self {
            kind,
            view,
            count,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<Source<'a>>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Counters describing the lifetime of one marshaller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchStats {
    pub capacity: usize,
    pub generation: u64,
    pub reallocations: u64,
    /// Host byte copies performed.
    pub copies: u64,
    pub view_rebuilds: u64,
}

/// Scratch-buffer context: one backing buffer plus its cached views.
///
/// Instances are independent; give each thread or rendering context its own.
pub struct Marshaller<H: ScratchHost> {
    store: BufferStore<H>,
    views: ViewRegistry<H>,
    copies: u64,
}

impl Marshaller<MemoryHost> {
    /// A marshaller over module memory with the default config.
    pub fn in_memory() -> Result<Self> {
        Self::new(MemoryHost)
    }
}

impl<H: ScratchHost> Marshaller<H> {
    pub fn new(host: H) -> Result<Self> {
        Self::with_config(host, &ScratchConfig::default())
    }

    pub fn with_config(host: H, config: &ScratchConfig) -> Result<Self> {
        Ok(Self {
            store: BufferStore::new(host, config)?,
            views: ViewRegistry::new(),
            copies: 0,
        })
    }

    /// Byte view of `count` bytes.
    pub fn from_bytes(&mut self, count: usize, data: Option<&[u8]>) -> Result<H::View> {
        self.marshal(request(ElementKind::U8, ViewKind::Bytes, count, data))
    }

    /// Byte view of `count * 2` bytes holding 16-bit words as byte pairs.
    pub fn from_words16(&mut self, count: usize, data: Option<&[u16]>) -> Result<H::View> {
        self.marshal(request(ElementKind::U16, ViewKind::Bytes, count, data))
    }

    /// Byte view of `count * 4` bytes holding 32-bit words.
    pub fn from_words32(&mut self, count: usize, data: Option<&[u32]>) -> Result<H::View> {
        self.marshal(request(ElementKind::U32, ViewKind::Bytes, count, data))
    }

    /// Byte view of `count * 4` bytes holding raw float32 bit patterns.
    pub fn floats_as_bytes(&mut self, count: usize, data: Option<&[f32]>) -> Result<H::View> {
        self.marshal(request(ElementKind::F32, ViewKind::Bytes, count, data))
    }

    /// Float32 view of `count` elements.
    pub fn float_view(&mut self, count: usize, data: Option<&[f32]>) -> Result<H::View> {
        self.marshal(request(ElementKind::F32, ViewKind::Float32, count, data))
    }

    /// Stage a whole source sequence, picking the window from its kind:
    /// floats come back as a float32 view, integer words as bytes.
    pub fn view_of(&mut self, source: Source<'_>) -> Result<H::View> {
        let view = match source {
            Source::F32(_) => ViewKind::Float32,
            Source::U8(_) | Source::U16(_) | Source::U32(_) => ViewKind::Bytes,
        };
        self.marshal(MarshalRequest::new(source.kind(), view, source.len()).with_source(source))
    }

    pub fn marshal(&mut self, req: MarshalRequest<'_>) -> Result<H::View> {
        if let Some(source) = req.source {
            if source.kind() != req.kind {
                return Err(ScratchError::KindMismatch {
                    expected: req.kind,
                    actual: source.kind(),
                });
            }
        }
        if !req.view.presents(req.kind) {
            return Err(ScratchError::IncompatibleView {
                view: req.view,
                kind: req.kind,
            });
        }

        let byte_len = req
            .kind
            .byte_len(req.count)
            .ok_or(ScratchError::ElementCountOverflow {
                count: req.count,
                kind: req.kind,
            })?;
        self.store.ensure_capacity(byte_len)?;

        match req.source {
            Some(source) if !source.is_empty() && req.count > 0 => {
                let copied = source.len().min(req.count) * req.kind.size_bytes();
                let target = self.views.view_for(&self.store, ViewKind::Bytes)?;
                self.store
                    .host()
                    .copy_bytes_into(&target, &source.as_bytes()[..copied])?;
                self.copies += 1;
            }
            _ => trace!("no source for {:?} x{}, copy skipped", req.kind, req.count),
        }

        let full = self.views.view_for(&self.store, req.view)?;
        self.store
            .host()
            .slice(&full, 0, byte_len / req.view.element_width())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    /// Generation the cached window of `kind` was last built against.
    pub fn view_generation(&self, kind: ViewKind) -> Option<u64> {
        self.views.generation_of(kind)
    }

    pub fn stats(&self) -> ScratchStats {
        ScratchStats {
            capacity: self.store.capacity(),
            generation: self.store.generation(),
            reallocations: self.store.reallocations(),
            copies: self.copies,
            view_rebuilds: self.views.rebuilds(),
        }
    }
}

fn request<'a, T>(
    kind: ElementKind,
    view: ViewKind,
    count: usize,
    data: Option<&'a [T]>,
) -> MarshalRequest<'a>
where
    &'a [T]: Into<Source<'a>>,
{
    MarshalRequest {
        kind,
        view,
        count,
        source: data.map(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_to_requested_length_without_growth() {
        let mut m = Marshaller::in_memory().unwrap();
        let data: Vec<u8> = (0..10).collect();
        let v = m.from_bytes(10, Some(&data)).unwrap();
        assert_eq!(v.len(), 10);
        assert_eq!(v.to_bytes(), data);
        assert_eq!(m.capacity(), 16);
        assert_eq!(m.generation(), 0);
    }

    #[test]
    fn longer_source_is_truncated_to_count() {
        let mut m = Marshaller::in_memory().unwrap();
        let v = m.from_bytes(2, Some(&[7, 8, 9, 10])).unwrap();
        assert_eq!(v.to_bytes(), vec![7, 8]);
    }

    #[test]
    fn shorter_source_fills_the_head() {
        let mut m = Marshaller::in_memory().unwrap();
        let v = m.from_words16(4, Some(&[0xAAAA, 0xBBBB])).unwrap();
        assert_eq!(v.len(), 8);
        assert_eq!(&v.read_as::<u16>().unwrap()[..2], &[0xAAAA, 0xBBBB]);
    }

    #[test]
    fn mismatched_source_kind_is_rejected() {
        let mut m = Marshaller::in_memory().unwrap();
        let floats = [1.0f32, 2.0];
        let req =
            MarshalRequest::new(ElementKind::U32, ViewKind::Bytes, 2).with_source(&floats[..]);
        assert_eq!(
            m.marshal(req).unwrap_err(),
            ScratchError::KindMismatch {
                expected: ElementKind::U32,
                actual: ElementKind::F32
            }
        );
        assert_eq!(m.stats().copies, 0);
    }

    #[test]
    fn float_window_over_words16_is_rejected() {
        let mut m = Marshaller::in_memory().unwrap();
        let req = MarshalRequest::new(ElementKind::U16, ViewKind::Float32, 3);
        assert!(matches!(
            m.marshal(req),
            Err(ScratchError::IncompatibleView { .. })
        ));
    }

    #[test]
    fn element_count_overflow_reports_count_and_kind() {
        let mut m = Marshaller::in_memory().unwrap();
        assert_eq!(
            m.float_view(usize::MAX, None).unwrap_err(),
            ScratchError::ElementCountOverflow {
                count: usize::MAX,
                kind: ElementKind::F32
            }
        );

        let count = usize::MAX / 2 + 1;
        assert_eq!(
            m.from_words16(count, None).unwrap_err(),
            ScratchError::ElementCountOverflow {
                count,
                kind: ElementKind::U16
            }
        );
        assert_eq!(m.capacity(), 16);
        assert_eq!(m.generation(), 0);
    }

    #[test]
    fn view_of_picks_window_from_source_kind() {
        let mut m = Marshaller::in_memory().unwrap();
        let floats = m.view_of(Source::F32(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(floats.element_width(), 4);
        assert_eq!(floats.len(), 3);

        let words = m.view_of(Source::U32(&[1, 2, 3])).unwrap();
        assert_eq!(words.element_width(), 1);
        assert_eq!(words.len(), 12);
    }
}
