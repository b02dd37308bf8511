//! The element store: every element of every dimension, append-only.
//!
//! # Layout
//! Elements live in one [`ElementBuffer`] per topological dimension. Within a
//! buffer an element is its dense index; all cross references (boundary
//! lists, refinement ancestors, region memberships) are plain ids into these
//! buffers, never pointers.
//!
//! # Invariants
//! - For dimension `d > 0` an element is identified by its canonical key (the
//!   sorted set of its vertex ids, or of its line ids for PLCs). Creating an
//!   element whose key is already indexed returns the existing id and leaves
//!   the store untouched.
//! - An element of dimension `d` carries exactly one boundary list for every
//!   `b < d`, built once at creation from the reference-cell tables of its tag
//!   and never modified afterwards.
//! - Every structural mutation (vertex, element, region membership) bumps the
//!   [`ChangeCounter`]; cached relations compare against it.

use hashbrown::HashMap as FastMap;
use itertools::Itertools;

use crate::data::adjacency::AdjacencyBuffer;
use crate::data::coordinates::{HolePoints, VertexBuffer};
use crate::mesh_error::MeshError;
use crate::topology::cache::ChangeCounter;
use crate::topology::element_tag::{BoundaryRule, DIMENSION_COUNT, ElementTag};
use crate::topology::ids::{ElementId, RegionId};
use crate::topology::region::{RegionMut, RegionRef, RegionRegistry};

/// Canonical dedup key of an element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ElementKey {
    /// Sorted vertex ids.
    Vertices(Box<[ElementId]>),
    /// Sorted line ids (PLCs).
    Lines(Box<[ElementId]>),
}

impl ElementKey {
    pub(crate) fn new(tag: ElementTag, ids: &[ElementId]) -> Self {
        let sorted: Box<[ElementId]> = ids.iter().copied().sorted_unstable().collect();
        match tag {
            ElementTag::Plc => ElementKey::Lines(sorted),
            _ => ElementKey::Vertices(sorted),
        }
    }
}

/// Per-dimension element storage.
#[derive(Clone, Debug, Default)]
pub(crate) struct ElementBuffer {
    pub(crate) tags: Vec<ElementTag>,
    pub(crate) parents: Vec<Option<ElementId>>,
    pub(crate) regions: Vec<Vec<RegionId>>,
    /// `boundary[b]` holds one list per element, for every `b` below this dimension.
    pub(crate) boundary: Vec<AdjacencyBuffer<ElementId>>,
    pub(crate) index: FastMap<ElementKey, ElementId>,
}

impl ElementBuffer {
    fn with_dimension(dim: usize) -> Self {
        Self {
            boundary: (0..dim).map(|_| AdjacencyBuffer::new()).collect(),
            ..Self::default()
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.tags.len()
    }

    fn push(&mut self, tag: ElementTag) -> ElementId {
        let id = ElementId::from_index(self.tags.len());
        self.tags.push(tag);
        self.parents.push(None);
        self.regions.push(Vec::new());
        id
    }
}

/// Owner of all elements, coordinates, hole points and regions.
#[derive(Clone, Debug)]
pub struct ElementStore {
    buffers: [ElementBuffer; DIMENSION_COUNT],
    tag_counts: [usize; ElementTag::ALL.len()],
    vertices: VertexBuffer,
    holes: HolePoints,
    cell_dimension: Option<usize>,
    counter: ChangeCounter,
    regions: RegionRegistry,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ElementStore {
    /// Empty store whose vertices carry `geometric_dimension` coordinates.
    pub fn new(geometric_dimension: usize) -> Self {
        Self {
            buffers: std::array::from_fn(ElementBuffer::with_dimension),
            tag_counts: [0; ElementTag::ALL.len()],
            vertices: VertexBuffer::new(geometric_dimension),
            holes: HolePoints::new(geometric_dimension),
            cell_dimension: None,
            counter: ChangeCounter::new(),
            regions: RegionRegistry::default(),
        }
    }

    // ---------------------------------------------------------------------
    // Change tracking
    // ---------------------------------------------------------------------

    #[inline]
    pub fn change_counter(&self) -> ChangeCounter {
        self.counter
    }

    /// Advance the change counter, invalidating every cached relation.
    #[inline]
    pub fn bump_change_counter(&mut self) -> u64 {
        self.counter.bump()
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    #[inline]
    pub fn geometric_dimension(&self) -> usize {
        self.vertices.dimension()
    }

    /// Re-pad all coordinates (vertices and hole points) to `dimension` components.
    pub fn set_geometric_dimension(&mut self, dimension: usize) {
        self.vertices.set_dimension(dimension);
        self.holes.set_dimension(dimension);
    }

    #[inline]
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Append a vertex. Vertices are never deduplicated.
    pub fn create_vertex(&mut self, coords: &[f64]) -> Result<ElementId, MeshError> {
        self.vertices.push(coords)?;
        let id = self.buffers[0].push(ElementTag::Vertex);
        self.tag_counts[ElementTag::Vertex as usize] += 1;
        self.cell_dimension = self.cell_dimension.max(Some(0));
        self.counter.bump();
        Ok(id)
    }

    pub fn vertex_coords(&self, id: ElementId) -> Result<&[f64], MeshError> {
        self.vertices
            .get(id.index())
            .ok_or(MeshError::OutOfRange { dim: 0, id })
    }

    pub fn set_vertex_coords(&mut self, id: ElementId, coords: &[f64]) -> Result<(), MeshError> {
        match self.vertices.set(id.index(), coords)? {
            true => Ok(()),
            false => Err(MeshError::OutOfRange { dim: 0, id }),
        }
    }

    // ---------------------------------------------------------------------
    // Element creation
    // ---------------------------------------------------------------------

    /// Return the element with the canonical key of `(tag, ids)`, creating it
    /// and its whole boundary closure when absent.
    ///
    /// `ids` are vertex ids, except for [`ElementTag::Plc`] where they are
    /// line ids. All input is validated before anything is created.
    pub fn get_or_create_element(
        &mut self,
        tag: ElementTag,
        ids: &[ElementId],
    ) -> Result<ElementId, MeshError> {
        self.create_element(tag, ids).map(|(id, _)| id)
    }

    /// Like [`get_or_create_element`](Self::get_or_create_element) but also
    /// reports whether the element was newly created.
    pub(crate) fn create_element(
        &mut self,
        tag: ElementTag,
        ids: &[ElementId],
    ) -> Result<(ElementId, bool), MeshError> {
        self.validate_creation(tag, ids)?;
        let dim = tag.dimension();
        let key = ElementKey::new(tag, ids);
        if let Some(&id) = self.buffers[dim].index.get(&key) {
            log::trace!("dedup hit: {tag} {ids:?} -> {dim}/{id}");
            return Ok((id, false));
        }

        let mut lists: Vec<Vec<ElementId>> = Vec::with_capacity(dim);
        for b in 0..dim {
            let list = match tag.boundary_rule(b) {
                Some(BoundaryRule::Vertices) if tag == ElementTag::Plc => self.plc_vertices(ids),
                Some(BoundaryRule::Vertices) | Some(BoundaryRule::GivenLines) => ids.to_vec(),
                Some(BoundaryRule::Table(sub_tag, table)) => {
                    let mut out = Vec::with_capacity(table.len());
                    for local in table {
                        let verts: Vec<ElementId> = local.iter().map(|&i| ids[i]).collect();
                        out.push(self.create_element(sub_tag, &verts)?.0);
                    }
                    out
                }
                Some(BoundaryRule::CyclicEdges) => {
                    let n = ids.len();
                    let mut out = Vec::with_capacity(n);
                    for i in 0..n {
                        let edge = [ids[i], ids[(i + 1) % n]];
                        out.push(self.create_element(ElementTag::Line, &edge)?.0);
                    }
                    out
                }
                None => return Err(MeshError::InvalidDimension(b)),
            };
            lists.push(list);
        }

        let buffer = &mut self.buffers[dim];
        let id = buffer.push(tag);
        for (b, list) in lists.iter().enumerate() {
            buffer.boundary[b].push_list(list);
        }
        buffer.index.insert(key, id);
        self.tag_counts[tag as usize] += 1;
        self.cell_dimension = self.cell_dimension.max(Some(dim));
        self.counter.bump();
        log::debug!("created {tag} {dim}/{id} from {} ids", ids.len());
        Ok((id, true))
    }

    /// Look up an element by canonical key without creating it.
    pub fn find_element(&self, tag: ElementTag, ids: &[ElementId]) -> Option<ElementId> {
        let dim = tag.dimension();
        if dim == 0 || dim >= DIMENSION_COUNT {
            return None;
        }
        self.buffers[dim]
            .index
            .get(&ElementKey::new(tag, ids))
            .copied()
    }

    fn validate_creation(&self, tag: ElementTag, ids: &[ElementId]) -> Result<(), MeshError> {
        let invalid = MeshError::InvalidElementTag {
            tag,
            found: ids.len(),
        };
        if tag == ElementTag::Vertex || !tag.arity().accepts(ids.len()) {
            return Err(invalid);
        }
        let id_dim = if tag == ElementTag::Plc { 1 } else { 0 };
        for &id in ids {
            self.check_live(id_dim, id)?;
        }
        if !ids.iter().all_unique() {
            return Err(invalid);
        }
        Ok(())
    }

    /// Sorted union of the vertices of `lines`.
    fn plc_vertices(&self, lines: &[ElementId]) -> Vec<ElementId> {
        lines
            .iter()
            .flat_map(|l| self.buffers[1].boundary[0].range(l.index()).iter().copied())
            .sorted_unstable()
            .dedup()
            .collect()
    }

    // ---------------------------------------------------------------------
    // Read-only accessors
    // ---------------------------------------------------------------------

    /// `Ok` when `(dim, id)` names a live element.
    pub fn check_live(&self, dim: usize, id: ElementId) -> Result<(), MeshError> {
        let buffer = self
            .buffers
            .get(dim)
            .ok_or(MeshError::InvalidDimension(dim))?;
        if id.index() < buffer.len() {
            Ok(())
        } else {
            Err(MeshError::OutOfRange { dim, id })
        }
    }

    #[inline]
    pub fn contains(&self, dim: usize, id: ElementId) -> bool {
        self.check_live(dim, id).is_ok()
    }

    pub fn element_tag(&self, dim: usize, id: ElementId) -> Result<ElementTag, MeshError> {
        self.check_live(dim, id)?;
        Ok(self.buffers[dim].tags[id.index()])
    }

    /// Boundary list of `(dim, id)` at `boundary_dim`, in reference-cell order.
    pub fn boundary_ids(
        &self,
        dim: usize,
        id: ElementId,
        boundary_dim: usize,
    ) -> Result<&[ElementId], MeshError> {
        self.check_live(dim, id)?;
        let lists = self.buffers[dim]
            .boundary
            .get(boundary_dim)
            .ok_or(MeshError::InvalidDimension(boundary_dim))?;
        Ok(lists.range(id.index()))
    }

    /// Vertex ids of `(dim, id)`; a vertex is its own single vertex.
    pub fn vertex_ids(&self, dim: usize, id: ElementId) -> Result<Vec<ElementId>, MeshError> {
        if dim == 0 {
            self.check_live(0, id)?;
            return Ok(vec![id]);
        }
        self.boundary_ids(dim, id, 0).map(<[ElementId]>::to_vec)
    }

    /// The element itself followed by its boundary lists, lowest dimension last.
    pub fn closure(&self, dim: usize, id: ElementId) -> Result<Vec<(usize, ElementId)>, MeshError> {
        self.check_live(dim, id)?;
        let mut out = vec![(dim, id)];
        for b in (0..dim).rev() {
            out.extend(self.buffers[dim].boundary[b].range(id.index()).iter().map(|&e| (b, e)));
        }
        Ok(out)
    }

    /// Number of live elements of dimension `dim`.
    #[inline]
    pub fn element_count(&self, dim: usize) -> usize {
        self.buffers.get(dim).map_or(0, ElementBuffer::len)
    }

    /// Number of elements created with `tag`.
    #[inline]
    pub fn tag_count(&self, tag: ElementTag) -> usize {
        self.tag_counts[tag as usize]
    }

    /// Highest dimension of any created element, `None` when empty.
    #[inline]
    pub fn cell_dimension(&self) -> Option<usize> {
        self.cell_dimension
    }

    /// One below the cell dimension; `None` for empty or vertex-only stores.
    #[inline]
    pub fn facet_dimension(&self) -> Option<usize> {
        self.cell_dimension?.checked_sub(1)
    }

    /// Ids `0..element_count(dim)`.
    pub fn element_ids(&self, dim: usize) -> impl Iterator<Item = ElementId> + use<> {
        (0..self.element_count(dim)).map(ElementId::from_index)
    }

    pub(crate) fn buffer(&self, dim: usize) -> Option<&ElementBuffer> {
        self.buffers.get(dim)
    }

    #[cfg(test)]
    pub(crate) fn buffers_mut(&mut self) -> &mut [ElementBuffer; DIMENSION_COUNT] {
        &mut self.buffers
    }

    // ---------------------------------------------------------------------
    // Refinement ancestry
    // ---------------------------------------------------------------------

    pub fn parent(&self, dim: usize, id: ElementId) -> Result<Option<ElementId>, MeshError> {
        self.check_live(dim, id)?;
        Ok(self.buffers[dim].parents[id.index()])
    }

    /// Record `parent` (an element of the same dimension) as the refinement
    /// ancestor of `(dim, id)`; `None` clears it.
    pub fn set_parent(
        &mut self,
        dim: usize,
        id: ElementId,
        parent: Option<ElementId>,
    ) -> Result<(), MeshError> {
        self.check_live(dim, id)?;
        if let Some(p) = parent {
            self.check_live(dim, p)?;
        }
        self.buffers[dim].parents[id.index()] = parent;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Regions
    // ---------------------------------------------------------------------

    #[inline]
    pub fn region_registry(&self) -> &RegionRegistry {
        &self.regions
    }

    #[inline]
    pub(crate) fn region_registry_mut(&mut self) -> &mut RegionRegistry {
        &mut self.regions
    }

    pub fn make_region(&mut self) -> RegionId {
        self.regions.make_region()
    }

    pub fn get_or_create_region(&mut self, id: RegionId) -> RegionId {
        self.regions.get_or_create(id)
    }

    pub fn region(&self, id: RegionId) -> Result<RegionRef<'_>, MeshError> {
        RegionRef::new(self, id)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Result<RegionMut<'_>, MeshError> {
        RegionMut::new(self, id)
    }

    #[inline]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions `(dim, id)` belongs to, in insertion order.
    pub fn element_regions(&self, dim: usize, id: ElementId) -> Result<&[RegionId], MeshError> {
        self.check_live(dim, id)?;
        Ok(&self.buffers[dim].regions[id.index()])
    }

    pub fn is_in_region(
        &self,
        dim: usize,
        id: ElementId,
        region: RegionId,
    ) -> Result<bool, MeshError> {
        Ok(self.element_regions(dim, id)?.contains(&region))
    }

    pub(crate) fn link_region(
        &mut self,
        dim: usize,
        id: ElementId,
        region: RegionId,
    ) -> Result<bool, MeshError> {
        self.check_live(dim, id)?;
        let record = self
            .regions
            .get_mut(region)
            .ok_or(MeshError::UnknownRegion(region))?;
        let list = &mut self.buffers[dim].regions[id.index()];
        if list.contains(&region) {
            return Ok(false);
        }
        list.push(region);
        record.members[dim].insert(id);
        self.counter.bump();
        Ok(true)
    }

    pub(crate) fn unlink_region(
        &mut self,
        dim: usize,
        id: ElementId,
        region: RegionId,
    ) -> Result<bool, MeshError> {
        self.check_live(dim, id)?;
        let record = self
            .regions
            .get_mut(region)
            .ok_or(MeshError::UnknownRegion(region))?;
        let list = &mut self.buffers[dim].regions[id.index()];
        let Some(pos) = list.iter().position(|&r| r == region) else {
            return Ok(false);
        };
        list.remove(pos);
        record.members[dim].remove(&id);
        self.counter.bump();
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Hole points
    // ---------------------------------------------------------------------

    /// Attach a hole point to a PLC element. Any other tag is rejected with
    /// [`MeshError::InvalidElementTag`].
    pub fn add_hole_point(&mut self, plc: ElementId, coords: &[f64]) -> Result<(), MeshError> {
        let tag = self.element_tag(2, plc)?;
        if tag != ElementTag::Plc {
            return Err(MeshError::InvalidElementTag {
                tag,
                found: coords.len(),
            });
        }
        self.holes.push(plc, coords)
    }

    pub fn hole_points(&self, plc: ElementId) -> impl Iterator<Item = &[f64]> + '_ {
        self.holes.iter(plc)
    }

    pub fn hole_point_count(&self, plc: ElementId) -> usize {
        self.holes.count(plc)
    }

    #[inline]
    pub fn hole_point_store(&self) -> &HolePoints {
        &self.holes
    }
}
