//! # mesh-hierarchy
//!
//! mesh-hierarchy is a topological mesh engine for finite-element and
//! finite-volume meshing. It stores the vertices, edges, facets and cells of a
//! discretized domain in one append-only element store and answers structural
//! queries over them: boundary decomposition, coboundaries, neighbors, region
//! membership and mesh-boundary detection.
//!
//! ## Features
//! - Canonical element creation with deduplication and automatic boundary
//!   closure (lines, triangles, quadrilaterals, polygons, PLCs, tetrahedra,
//!   hexahedra)
//! - A tree of mesh views (sub-meshes, refinement levels) sharing one store
//! - Lazily computed coboundary, neighbor and boundary-flag relations, cached
//!   per view and validated against a global change counter
//! - Named regions with region-scoped boundary detection
//! - Refinement with topological stitching of refinement ancestors
//! - Flat serialization with bincode and JSON encodings
//!
//! ## Usage
//! ```
//! use mesh_hierarchy::prelude::*;
//!
//! let mut mesh = MeshHierarchy::new(3);
//! let v: Vec<ElementId> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
//!     .iter()
//!     .map(|c| mesh.create_vertex(c))
//!     .collect::<Result<_, _>>()?;
//! let tet = mesh.get_or_create_element(ElementTag::Tetrahedron, &v)?;
//! assert_eq!(mesh.element_count(1), 6);
//! assert_eq!(mesh.element_count(2), 4);
//! let root = mesh.root();
//! assert!(mesh.is_boundary(root, 2, ElementId::new(0))?);
//! assert_eq!(mesh.coboundary(root, 0, v[0], 3)?, &[tet]);
//! # Ok::<(), MeshError>(())
//! ```
//!
//! ## Caching
//! Every structural mutation bumps one store-wide change counter; a cached
//! relation is served only while its stamp equals the current counter. The
//! invalidation is coarse: answers are never stale, but a
//! mutation anywhere recomputes relations everywhere.
//!
//! ## Sharing
//! [`SharedHierarchy`](topology::hierarchy::SharedHierarchy) wraps a hierarchy
//! in `Arc<RwLock<_>>` for several owners. Writers are serialized by the lock.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod io;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::boundary::{
        BoundaryClassification, classify_boundary, classify_region_boundary,
    };
    pub use crate::data::adjacency::{AdjacencyBuffer, SparseAdjacency};
    pub use crate::data::coordinates::VertexBuffer;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::io::codec::{BinaryRecordCodec, JsonRecordCodec};
    pub use crate::io::record::MeshRecord;
    pub use crate::io::{MeshReader, MeshWriter};
    pub use crate::mesh_error::MeshError;
    pub use crate::topology::cache::InvalidateCache;
    pub use crate::topology::element_tag::ElementTag;
    pub use crate::topology::hierarchy::{HierarchyOptions, MeshHierarchy, SharedHierarchy};
    pub use crate::topology::ids::{ElementId, RegionId, ViewId};
    pub use crate::topology::refine::{
        IntersectionRecord, RefineOptions, create_refined_element, create_refined_element_with,
    };
    pub use crate::topology::region::{Region, RegionMut, RegionRef};
    pub use crate::topology::validation::{
        ValidationHandling, ValidationOptions, validate_hierarchy,
    };
    pub use crate::topology::view::{BoundaryFlags, MeshView};
}
