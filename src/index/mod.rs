//! Attribute indexing module
//!
//! Derived lookups from attribute value to node ids. Indices hold ids only,
//! never copies of node records.

pub mod attribute_index;
pub mod manager;

pub use attribute_index::AttributeIndex;
pub use manager::{IndexManager, IndexedAttributes};
