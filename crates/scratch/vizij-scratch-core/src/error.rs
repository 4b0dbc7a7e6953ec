//! Error taxonomy for the scratch marshaller.

use thiserror::Error;

use crate::kind::{ElementKind, ViewKind};

/// Errors produced while growing the scratch buffer or marshalling into it.
///
/// None of these are transient. Each one aborts the current call; the only
/// state that may have changed by then is a grown backing buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScratchError {
    /// The caller handed over elements of a type outside the supported set.
    #[error("unsupported element kind: {0}")]
    UnsupportedElementKind(String),
    /// A request's byte length does not fit the host allocation primitive.
    #[error("capacity overflow: {requested} bytes requested, maximum is {max}")]
    CapacityOverflow { requested: usize, max: usize },
    /// `count` elements of `kind` span more bytes than `usize` can address.
    #[error("capacity overflow: {count} {kind:?} elements exceed the addressable byte range")]
    ElementCountOverflow { count: usize, kind: ElementKind },
    /// The source element kind does not match the request it was attached to.
    #[error("element kind mismatch: request expects {expected:?}, source holds {actual:?}")]
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },
    /// The requested view kind cannot present elements of this width.
    #[error("{view:?} view cannot present {kind:?} elements")]
    IncompatibleView { view: ViewKind, kind: ElementKind },
    #[error("invalid scratch config: {0}")]
    InvalidConfig(String),
    /// A typed window failed its alignment/length check or ran out of bounds.
    #[error("view error: {0}")]
    View(String),
}

pub type Result<T> = std::result::Result<T, ScratchError>;
