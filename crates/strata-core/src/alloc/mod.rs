//! Allocation and collection types.
//!
//! - Re-exports of AHash based hash collections
//! - [`Arena`], a slot arena addressed by generational [`Handle`]s

pub mod arena;

pub use arena::{Arena, Handle};

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
