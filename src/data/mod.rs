//! Data module: CSR adjacency lists and coordinate buffers

pub mod adjacency;
pub mod coordinates;

pub use adjacency::{AdjacencyBuffer, SparseAdjacency};
pub use coordinates::{HolePoints, VertexBuffer};
