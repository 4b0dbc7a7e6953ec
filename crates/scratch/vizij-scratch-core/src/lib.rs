//! vizij-scratch-core: reusable scratch buffer for staging data across a host
//! boundary (engine-agnostic).
//!
//! A [`Marshaller`] owns one growable buffer allocated through a
//! [`ScratchHost`] and hands out typed, length-bounded views over it. The
//! buffer only grows, by doubling; views are rebuilt lazily after growth.

pub mod capacity;
pub mod config;
pub mod error;
pub mod host;
pub mod kind;
pub mod marshal;
pub mod store;
pub mod views;

pub use capacity::CapacityPolicy;
pub use config::ScratchConfig;
pub use error::{Result, ScratchError};
pub use host::{MemoryBuffer, MemoryHost, MemoryView, ScratchHost};
pub use kind::{ElementKind, Source, ViewKind};
pub use marshal::{MarshalRequest, Marshaller, ScratchStats};
pub use store::BufferStore;
pub use views::ViewRegistry;
