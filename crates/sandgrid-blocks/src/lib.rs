//! Block types, per-instance block states, and the immutable block catalog.

pub mod block;
pub mod catalog;

pub use block::{BlockState, BlockType, LIQUID_THRESHOLD, SOLID_THRESHOLD};
pub use catalog::{BlockCatalog, BlockProperties, CatalogError};
