//! Mesh views: nodes of the sub-mesh tree sharing one element store.
//!
//! A view owns, per dimension, an insertion-ordered set of the element ids it
//! sees, an optional private copy of the vertex coordinates, and the caches of
//! relations derived over its elements. Mutation goes through
//! [`MeshHierarchy`](crate::topology::hierarchy::MeshHierarchy), which keeps
//! the tree and the store consistent.

use hashbrown::{HashMap as FastMap, HashSet as FastSet};

use crate::data::adjacency::SparseAdjacency;
use crate::data::coordinates::VertexBuffer;
use crate::topology::cache::{InvalidateCache, Stamped};
use crate::topology::element_tag::DIMENSION_COUNT;
use crate::topology::ids::{ElementId, RegionId, ViewId};

/// Insertion-ordered set of element ids.
#[derive(Clone, Debug, Default)]
pub(crate) struct ElementIdSet {
    order: Vec<ElementId>,
    members: FastSet<ElementId>,
}

impl ElementIdSet {
    /// Returns `true` when `id` was not present before.
    pub(crate) fn insert(&mut self, id: ElementId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    #[inline]
    pub(crate) fn contains(&self, id: ElementId) -> bool {
        self.members.contains(&id)
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[ElementId] {
        &self.order
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

/// Per-dimension boundary markers.
#[derive(Clone, Debug, Default)]
pub struct BoundaryFlags {
    flags: [FastSet<ElementId>; DIMENSION_COUNT],
}

impl BoundaryFlags {
    #[inline]
    pub fn is_boundary(&self, dim: usize, id: ElementId) -> bool {
        self.flags.get(dim).is_some_and(|f| f.contains(&id))
    }

    #[inline]
    pub(crate) fn mark(&mut self, dim: usize, id: ElementId) {
        if let Some(f) = self.flags.get_mut(dim) {
            f.insert(id);
        }
    }

    /// Marked elements of `dim`, ascending.
    pub fn marked(&self, dim: usize) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = self
            .flags
            .get(dim)
            .map_or_else(Vec::new, |f| f.iter().copied().collect());
        out.sort_unstable();
        out
    }

    pub(crate) fn clear(&mut self) {
        for f in &mut self.flags {
            f.clear();
        }
    }
}

/// Derived relations of one view, each stamped with the change counter it
/// was computed under.
#[derive(Clone, Debug, Default)]
pub(crate) struct RelationCache {
    /// `(dim, target_dim)` → lower element → higher elements containing it.
    pub(crate) coboundary: FastMap<(usize, usize), Stamped<SparseAdjacency<ElementId>>>,
    /// `(dim, connector_dim, target_dim)` → element → neighbors.
    pub(crate) neighbor: FastMap<(usize, usize, usize), Stamped<SparseAdjacency<ElementId>>>,
    pub(crate) boundary_flags: Stamped<BoundaryFlags>,
    pub(crate) region_boundary_flags: FastMap<RegionId, Stamped<BoundaryFlags>>,
}

impl InvalidateCache for RelationCache {
    fn invalidate_cache(&mut self) {
        self.coboundary.values_mut().for_each(|s| s.invalidate_cache());
        self.neighbor.values_mut().for_each(|s| s.invalidate_cache());
        self.boundary_flags.invalidate_cache();
        self.region_boundary_flags
            .values_mut()
            .for_each(|s| s.invalidate_cache());
    }
}

/// One node of the view tree.
#[derive(Clone, Debug)]
pub struct MeshView {
    id: ViewId,
    parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
    pub(crate) name: String,
    pub(crate) elements: [ElementIdSet; DIMENSION_COUNT],
    /// Private coordinates; `None` reads through to the nearest owning ancestor.
    pub(crate) vertex_buffer: Option<VertexBuffer>,
    pub(crate) cache: RelationCache,
}

impl MeshView {
    pub(crate) fn new(id: ViewId, parent: Option<ViewId>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            name: String::new(),
            elements: Default::default(),
            vertex_buffer: None,
            cache: RelationCache::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Parent view, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Direct children in creation order.
    #[inline]
    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element ids of `dim` visible in this view, in insertion order.
    #[inline]
    pub fn elements(&self, dim: usize) -> &[ElementId] {
        self.elements.get(dim).map_or(&[][..], ElementIdSet::as_slice)
    }

    #[inline]
    pub fn element_count(&self, dim: usize) -> usize {
        self.elements.get(dim).map_or(0, ElementIdSet::len)
    }

    #[inline]
    pub fn contains(&self, dim: usize, id: ElementId) -> bool {
        self.elements.get(dim).is_some_and(|s| s.contains(id))
    }

    /// Highest dimension with at least one visible element.
    pub fn cell_dimension(&self) -> Option<usize> {
        (0..DIMENSION_COUNT)
            .rev()
            .find(|&d| self.element_count(d) > 0)
    }

    /// Whether this view holds its own copy of the vertex coordinates.
    #[inline]
    pub fn owns_vertex_buffer(&self) -> bool {
        self.vertex_buffer.is_some()
    }
}
