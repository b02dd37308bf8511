//! MeshError: Unified error type for mesh-hierarchy public APIs
//!
//! Every fallible operation of the element store, the view tree, regions and
//! serialization reports one of these variants. Structural mutations validate
//! their input before touching the store, so an `Err` never leaves a
//! half-created element behind.

use thiserror::Error;

use crate::topology::element_tag::ElementTag;
use crate::topology::ids::{ElementId, RegionId, ViewId};

/// Unified error type for mesh-hierarchy operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The tag cannot be created this way, or the vertex count does not match its arity.
    #[error("invalid element tag {tag}: cannot build it from {found} ids")]
    InvalidElementTag { tag: ElementTag, found: usize },
    /// A tag name could not be parsed.
    #[error("unknown element tag `{0}`")]
    UnknownElementTag(String),
    /// An id does not name a live element of the given dimension.
    #[error("element {id} of dimension {dim} is out of range")]
    OutOfRange { dim: usize, id: ElementId },
    /// A topological dimension outside the supported range, or not valid for the query.
    #[error("invalid topological dimension {0}")]
    InvalidDimension(usize),
    /// A coordinate tuple does not have the geometric dimension of the hierarchy.
    #[error("coordinate tuple has {found} components, expected {expected}")]
    GeometricDimensionMismatch { expected: usize, found: usize },
    /// No view with this id exists.
    #[error("unknown mesh view {0}")]
    UnknownView(ViewId),
    /// No region with this id exists.
    #[error("unknown region {0}")]
    UnknownRegion(RegionId),
    /// A cell was added to a non-root view although neither it nor its
    /// refinement ancestor is visible in the parent view.
    #[error("view {view}: cell {id} (dimension {dim}) is not linked to the parent view")]
    InconsistentView {
        view: ViewId,
        dim: usize,
        id: ElementId,
    },
    /// A serialized record violates ordering or arity constraints.
    #[error("malformed serialization record: {0}")]
    MalformedSerialization(String),
    /// Byte or text encoding failed.
    #[error("codec error: {0}")]
    Codec(String),
    /// A structural invariant of the hierarchy does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<bincode::Error> for MeshError {
    fn from(e: bincode::Error) -> Self {
        MeshError::Codec(e.to_string())
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(e: serde_json::Error) -> Self {
        MeshError::Codec(e.to_string())
    }
}

impl From<std::io::Error> for MeshError {
    fn from(e: std::io::Error) -> Self {
        MeshError::Codec(e.to_string())
    }
}
