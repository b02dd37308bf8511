//! Element tags and their reference-cell boundary tables.
//!
//! Each tag fixes a topological dimension and, for every boundary dimension,
//! how the element decomposes into sub-elements. The fixed-arity tags use the
//! tensor-product vertex numbering below; polygons are decomposed cyclically
//! and PLCs are built from explicit line ids.
//!
//! ```text
//! quadrilateral      hexahedron (bottom 0..3, top 4..7)
//!   2 --- 3            6 --- 7
//!   |     |            |     |
//!   0 --- 1            4 --- 5  (above 0 --- 1 / 2 --- 3)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::mesh_error::MeshError;

/// Number of supported topological dimensions (vertices through volumes).
pub const DIMENSION_COUNT: usize = 4;

/// Edges of a triangle as local vertex pairs.
pub const TRIANGLE_EDGES: &[&[usize]] = &[&[0, 1], &[0, 2], &[1, 2]];

/// Edges of a quadrilateral as local vertex pairs.
pub const QUADRILATERAL_EDGES: &[&[usize]] = &[&[0, 1], &[0, 2], &[1, 3], &[2, 3]];

/// Edges of a tetrahedron as local vertex pairs.
pub const TETRAHEDRON_EDGES: &[&[usize]] =
    &[&[0, 1], &[0, 2], &[0, 3], &[1, 2], &[1, 3], &[2, 3]];

/// Triangular facets of a tetrahedron as local vertex triples.
pub const TETRAHEDRON_FACES: &[&[usize]] = &[&[0, 1, 2], &[0, 1, 3], &[0, 2, 3], &[1, 2, 3]];

/// Edges of a hexahedron as local vertex pairs.
pub const HEXAHEDRON_EDGES: &[&[usize]] = &[
    &[0, 1],
    &[0, 2],
    &[0, 4],
    &[1, 3],
    &[1, 5],
    &[2, 3],
    &[2, 6],
    &[3, 7],
    &[4, 5],
    &[4, 6],
    &[5, 7],
    &[6, 7],
];

/// Quadrilateral facets of a hexahedron, each in quadrilateral vertex order.
pub const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 1, 2, 3],
    &[0, 1, 4, 5],
    &[0, 2, 4, 6],
    &[1, 3, 5, 7],
    &[2, 3, 6, 7],
    &[4, 5, 6, 7],
];

const_assert_eq!(TETRAHEDRON_EDGES.len(), 6);
const_assert_eq!(TETRAHEDRON_FACES.len(), 4);
const_assert_eq!(HEXAHEDRON_EDGES.len(), 12);
const_assert_eq!(HEXAHEDRON_FACES.len(), 6);

/// Closed set of element kinds the store can hold.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementTag {
    /// 0D vertex; created only through `create_vertex`.
    Vertex,
    /// 1D segment.
    Line,
    /// 2D simplex.
    Triangle,
    /// 2D tensor-product cell.
    Quadrilateral,
    /// 2D polygon with three or more vertices.
    Polygon,
    /// Planar straight-line complex built from one or more lines.
    Plc,
    /// 3D simplex.
    Tetrahedron,
    /// 3D tensor-product cell.
    Hexahedron,
}

/// How many ids an element creation call expects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` ids satisfy this arity.
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

/// How the boundary of a tag at one boundary dimension is derived.
#[derive(Clone, Copy, Debug)]
pub(crate) enum BoundaryRule {
    /// Vertices are the creation ids themselves (or, for PLCs, the union of line vertices).
    Vertices,
    /// Fixed local index tuples building sub-elements of the given tag.
    Table(ElementTag, &'static [&'static [usize]]),
    /// Cyclic edges `i -> i+1`, closing with `n-1 -> 0`.
    CyclicEdges,
    /// Lines given explicitly at creation time.
    GivenLines,
}

impl ElementTag {
    /// Every tag, in declaration order.
    pub const ALL: [ElementTag; 8] = [
        ElementTag::Vertex,
        ElementTag::Line,
        ElementTag::Triangle,
        ElementTag::Quadrilateral,
        ElementTag::Polygon,
        ElementTag::Plc,
        ElementTag::Tetrahedron,
        ElementTag::Hexahedron,
    ];

    /// Topological dimension of the tag.
    pub fn dimension(self) -> usize {
        match self {
            ElementTag::Vertex => 0,
            ElementTag::Line => 1,
            ElementTag::Triangle
            | ElementTag::Quadrilateral
            | ElementTag::Polygon
            | ElementTag::Plc => 2,
            ElementTag::Tetrahedron | ElementTag::Hexahedron => 3,
        }
    }

    /// Number of ids taken by element creation. For PLCs these are line ids.
    pub fn arity(self) -> Arity {
        match self {
            ElementTag::Vertex => Arity::Exactly(1),
            ElementTag::Line => Arity::Exactly(2),
            ElementTag::Triangle => Arity::Exactly(3),
            ElementTag::Quadrilateral | ElementTag::Tetrahedron => Arity::Exactly(4),
            ElementTag::Hexahedron => Arity::Exactly(8),
            ElementTag::Polygon => Arity::AtLeast(3),
            ElementTag::Plc => Arity::AtLeast(1),
        }
    }

    /// Whether elements of this tag carry a boundary list at `boundary_dim`.
    #[inline]
    pub fn is_boundary_dim(self, boundary_dim: usize) -> bool {
        boundary_dim < self.dimension()
    }

    /// Fixed number of boundary elements at `boundary_dim`, or `None` when it
    /// depends on the instance (polygons, PLCs) or is not a boundary dimension.
    pub fn boundary_count(self, boundary_dim: usize) -> Option<usize> {
        match self.boundary_rule(boundary_dim)? {
            BoundaryRule::Vertices => match self.arity() {
                Arity::Exactly(n) => Some(n),
                Arity::AtLeast(_) => None,
            },
            BoundaryRule::Table(_, table) => Some(table.len()),
            BoundaryRule::CyclicEdges | BoundaryRule::GivenLines => None,
        }
    }

    /// Tag of the facets (sub-elements one dimension down).
    pub fn facet_tag(self) -> Option<ElementTag> {
        match self {
            ElementTag::Vertex => None,
            ElementTag::Line => Some(ElementTag::Vertex),
            ElementTag::Triangle
            | ElementTag::Quadrilateral
            | ElementTag::Polygon
            | ElementTag::Plc => Some(ElementTag::Line),
            ElementTag::Tetrahedron => Some(ElementTag::Triangle),
            ElementTag::Hexahedron => Some(ElementTag::Quadrilateral),
        }
    }

    pub(crate) fn boundary_rule(self, boundary_dim: usize) -> Option<BoundaryRule> {
        if !self.is_boundary_dim(boundary_dim) {
            return None;
        }
        let rule = match (self, boundary_dim) {
            (_, 0) => BoundaryRule::Vertices,
            (ElementTag::Triangle, 1) => BoundaryRule::Table(ElementTag::Line, TRIANGLE_EDGES),
            (ElementTag::Quadrilateral, 1) => {
                BoundaryRule::Table(ElementTag::Line, QUADRILATERAL_EDGES)
            }
            (ElementTag::Polygon, 1) => BoundaryRule::CyclicEdges,
            (ElementTag::Plc, 1) => BoundaryRule::GivenLines,
            (ElementTag::Tetrahedron, 1) => BoundaryRule::Table(ElementTag::Line, TETRAHEDRON_EDGES),
            (ElementTag::Tetrahedron, 2) => {
                BoundaryRule::Table(ElementTag::Triangle, TETRAHEDRON_FACES)
            }
            (ElementTag::Hexahedron, 1) => BoundaryRule::Table(ElementTag::Line, HEXAHEDRON_EDGES),
            (ElementTag::Hexahedron, 2) => {
                BoundaryRule::Table(ElementTag::Quadrilateral, HEXAHEDRON_FACES)
            }
            _ => return None,
        };
        Some(rule)
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            ElementTag::Vertex => "vertex",
            ElementTag::Line => "line",
            ElementTag::Triangle => "triangle",
            ElementTag::Quadrilateral => "quadrilateral",
            ElementTag::Polygon => "polygon",
            ElementTag::Plc => "plc",
            ElementTag::Tetrahedron => "tetrahedron",
            ElementTag::Hexahedron => "hexahedron",
        }
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementTag {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ElementTag::ALL
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MeshError::UnknownElementTag(s.to_string()))
    }
}
