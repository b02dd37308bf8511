//! Re-export public algorithms.

pub mod boundary;
pub mod relations;

pub use boundary::{classify_boundary, classify_region_boundary};
pub use relations::NeighborQuery;
