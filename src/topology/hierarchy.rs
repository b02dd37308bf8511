//! `MeshHierarchy`: one element store plus its tree of mesh views.
//!
//! The hierarchy is the entry point used by readers, writers and algorithms:
//! it creates elements in the store, keeps the root view (and, on request,
//! child views) populated, and answers cached relation queries per view.
//!
//! # Caching
//! Coboundary, neighbor and boundary-flag queries are computed for a whole
//! view at once and stored in that view's cache, stamped with the store's
//! change counter. Any structural mutation (new vertex or element, region
//! membership change, element added to a view) bumps the counter, so the
//! next query recomputes. Cached answers are therefore never stale, at the
//! price of occasionally recomputing more than strictly necessary.
//!
//! Queries that may rebuild a cache take `&mut self`.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::algs::boundary::rebuild_boundary_flags;
use crate::algs::relations::{NeighborQuery, rebuild_coboundary, rebuild_neighbor};
use crate::data::coordinates::VertexBuffer;
use crate::mesh_error::MeshError;
use crate::topology::cache::{ChangeCounter, InvalidateCache, Stamped};
use crate::topology::element_tag::{DIMENSION_COUNT, ElementTag};
use crate::topology::ids::{ElementId, RegionId, ViewId};
use crate::topology::region::{Region, RegionMut, RegionRef};
use crate::topology::store::ElementStore;
use crate::topology::view::{BoundaryFlags, MeshView};

/// Construction settings of a [`MeshHierarchy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HierarchyOptions {
    /// Number of coordinates per vertex.
    pub geometric_dimension: usize,
    /// Insert newly created vertices and elements (with their closure) into the root view.
    pub auto_add_to_root: bool,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        Self {
            geometric_dimension: 3,
            auto_add_to_root: true,
        }
    }
}

/// An element store together with its view tree.
#[derive(Clone, Debug)]
pub struct MeshHierarchy {
    store: ElementStore,
    views: Vec<MeshView>,
    options: HierarchyOptions,
}

impl Default for MeshHierarchy {
    fn default() -> Self {
        Self::with_options(HierarchyOptions::default())
    }
}

impl InvalidateCache for MeshHierarchy {
    fn invalidate_cache(&mut self) {
        for view in &mut self.views {
            view.cache.invalidate_cache();
        }
    }
}

fn check_dimension(dim: usize) -> Result<(), MeshError> {
    if dim < DIMENSION_COUNT {
        Ok(())
    } else {
        Err(MeshError::InvalidDimension(dim))
    }
}

impl MeshHierarchy {
    /// Empty hierarchy with default options and the given geometric dimension.
    pub fn new(geometric_dimension: usize) -> Self {
        Self::with_options(HierarchyOptions {
            geometric_dimension,
            ..HierarchyOptions::default()
        })
    }

    pub fn with_options(options: HierarchyOptions) -> Self {
        Self {
            store: ElementStore::new(options.geometric_dimension),
            views: vec![MeshView::new(ViewId::ROOT, None)],
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> HierarchyOptions {
        self.options
    }

    /// Toggle automatic insertion of new elements into the root view.
    pub fn set_auto_add_to_root(&mut self, enabled: bool) {
        self.options.auto_add_to_root = enabled;
    }

    /// Read-only access to the element store.
    #[inline]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut ElementStore {
        &mut self.store
    }

    #[cfg(test)]
    pub(crate) fn view_mut(&mut self, view: ViewId) -> &mut MeshView {
        &mut self.views[view.index()]
    }

    #[inline]
    pub fn change_counter(&self) -> ChangeCounter {
        self.store.change_counter()
    }

    #[inline]
    pub fn bump_change_counter(&mut self) -> u64 {
        self.store.bump_change_counter()
    }

    // ---------------------------------------------------------------------
    // View tree
    // ---------------------------------------------------------------------

    #[inline]
    pub fn root(&self) -> ViewId {
        ViewId::ROOT
    }

    fn view_index(&self, view: ViewId) -> Result<usize, MeshError> {
        if view.index() < self.views.len() {
            Ok(view.index())
        } else {
            Err(MeshError::UnknownView(view))
        }
    }

    pub fn view(&self, view: ViewId) -> Result<&MeshView, MeshError> {
        self.views
            .get(view.index())
            .ok_or(MeshError::UnknownView(view))
    }

    /// All views in creation order; parents always precede their children.
    pub fn views(&self) -> impl Iterator<Item = &MeshView> + '_ {
        self.views.iter()
    }

    #[inline]
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Create a new, empty child of `parent`.
    pub fn make_child(&mut self, parent: ViewId) -> Result<ViewId, MeshError> {
        let parent_idx = self.view_index(parent)?;
        let id = ViewId::from_index(self.views.len());
        self.views.push(MeshView::new(id, Some(parent)));
        self.views[parent_idx].children.push(id);
        log::debug!("created view {id} under {parent}");
        Ok(id)
    }

    pub fn parent_view(&self, view: ViewId) -> Result<Option<ViewId>, MeshError> {
        Ok(self.view(view)?.parent())
    }

    pub fn children(&self, view: ViewId) -> Result<&[ViewId], MeshError> {
        Ok(self.view(view)?.children())
    }

    pub fn child_count(&self, view: ViewId) -> Result<usize, MeshError> {
        Ok(self.view(view)?.child_count())
    }

    /// Number of descendants of `view`, at any depth.
    pub fn total_child_count(&self, view: ViewId) -> Result<usize, MeshError> {
        let mut stack = self.view(view)?.children().to_vec();
        let mut total = 0;
        while let Some(child) = stack.pop() {
            total += 1;
            stack.extend_from_slice(self.view(child)?.children());
        }
        Ok(total)
    }

    pub fn is_root(&self, view: ViewId) -> Result<bool, MeshError> {
        Ok(self.view(view)?.is_root())
    }

    pub fn view_name(&self, view: ViewId) -> Result<&str, MeshError> {
        Ok(self.view(view)?.name())
    }

    pub fn set_view_name(&mut self, view: ViewId, name: &str) -> Result<(), MeshError> {
        let idx = self.view_index(view)?;
        self.views[idx].name = name.to_string();
        Ok(())
    }

    /// Ids of `dim` visible in `view`, in insertion order.
    pub fn elements(&self, view: ViewId, dim: usize) -> Result<&[ElementId], MeshError> {
        check_dimension(dim)?;
        Ok(self.view(view)?.elements(dim))
    }

    pub fn view_element_count(&self, view: ViewId, dim: usize) -> Result<usize, MeshError> {
        Ok(self.elements(view, dim)?.len())
    }

    // ---------------------------------------------------------------------
    // Element creation and view membership
    // ---------------------------------------------------------------------

    /// Append a vertex. Every view holding a private coordinate copy receives
    /// the new tuple as well.
    pub fn create_vertex(&mut self, coords: &[f64]) -> Result<ElementId, MeshError> {
        let id = self.store.create_vertex(coords)?;
        for view in &mut self.views {
            if let Some(buffer) = view.vertex_buffer.as_mut() {
                buffer.push(coords)?;
            }
        }
        if self.options.auto_add_to_root {
            self.insert_into_view(0, 0, id);
        }
        Ok(id)
    }

    /// See [`ElementStore::get_or_create_element`]. A newly created element
    /// and its closure join the root view when `auto_add_to_root` is set.
    pub fn get_or_create_element(
        &mut self,
        tag: ElementTag,
        ids: &[ElementId],
    ) -> Result<ElementId, MeshError> {
        let (id, created) = self.store.create_element(tag, ids)?;
        if created && self.options.auto_add_to_root {
            self.insert_closure(0, tag.dimension(), id)?;
        }
        Ok(id)
    }

    pub fn find_element(&self, tag: ElementTag, ids: &[ElementId]) -> Option<ElementId> {
        self.store.find_element(tag, ids)
    }

    /// Insert `(dim, id)` into `view`; returns whether it was new.
    ///
    /// # Panics
    /// Panics when [`try_add_element`](Self::try_add_element) fails, notably
    /// with [`MeshError::InconsistentView`] for a cell that is linked neither
    /// directly nor through its refinement ancestor to the parent view.
    pub fn add_element(&mut self, view: ViewId, dim: usize, id: ElementId) -> bool {
        match self.try_add_element(view, dim, id) {
            Ok(added) => added,
            Err(e) => panic!("add_element({view}, {dim}, {id}): {e}"),
        }
    }

    /// Checked variant of [`add_element`](Self::add_element).
    pub fn try_add_element(
        &mut self,
        view: ViewId,
        dim: usize,
        id: ElementId,
    ) -> Result<bool, MeshError> {
        let idx = self.view_index(view)?;
        self.store.check_live(dim, id)?;
        self.check_linkage(idx, dim, id)?;
        Ok(self.insert_into_view(idx, dim, id))
    }

    /// Insert `(dim, id)` and every element of its boundary closure into `view`.
    pub fn add_element_closure(
        &mut self,
        view: ViewId,
        dim: usize,
        id: ElementId,
    ) -> Result<(), MeshError> {
        let idx = self.view_index(view)?;
        self.store.check_live(dim, id)?;
        self.check_linkage(idx, dim, id)?;
        self.insert_closure(idx, dim, id)
    }

    fn check_linkage(&self, idx: usize, dim: usize, id: ElementId) -> Result<(), MeshError> {
        let view = &self.views[idx];
        let Some(parent) = view.parent() else {
            return Ok(());
        };
        if self.store.cell_dimension() != Some(dim) {
            return Ok(());
        }
        let parent_view = &self.views[parent.index()];
        if parent_view.contains(dim, id) {
            return Ok(());
        }
        if let Some(ancestor) = self.store.parent(dim, id)? {
            if parent_view.contains(dim, ancestor) {
                return Ok(());
            }
        }
        Err(MeshError::InconsistentView {
            view: view.id(),
            dim,
            id,
        })
    }

    fn insert_into_view(&mut self, idx: usize, dim: usize, id: ElementId) -> bool {
        let added = self.views[idx].elements[dim].insert(id);
        if added {
            self.store.bump_change_counter();
        }
        added
    }

    fn insert_closure(&mut self, idx: usize, dim: usize, id: ElementId) -> Result<(), MeshError> {
        for (d, e) in self.store.closure(dim, id)? {
            self.insert_into_view(idx, d, e);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Store queries
    // ---------------------------------------------------------------------

    pub fn element_tag(&self, dim: usize, id: ElementId) -> Result<ElementTag, MeshError> {
        self.store.element_tag(dim, id)
    }

    pub fn boundary_ids(
        &self,
        dim: usize,
        id: ElementId,
        boundary_dim: usize,
    ) -> Result<&[ElementId], MeshError> {
        self.store.boundary_ids(dim, id, boundary_dim)
    }

    pub fn vertex_ids(&self, dim: usize, id: ElementId) -> Result<Vec<ElementId>, MeshError> {
        self.store.vertex_ids(dim, id)
    }

    /// Coordinates of a vertex as held by the store (root view).
    pub fn vertex_coords(&self, id: ElementId) -> Result<&[f64], MeshError> {
        self.store.vertex_coords(id)
    }

    pub fn element_count(&self, dim: usize) -> usize {
        self.store.element_count(dim)
    }

    pub fn tag_count(&self, tag: ElementTag) -> usize {
        self.store.tag_count(tag)
    }

    pub fn cell_dimension(&self) -> Option<usize> {
        self.store.cell_dimension()
    }

    pub fn facet_dimension(&self) -> Option<usize> {
        self.store.facet_dimension()
    }

    pub fn parent(&self, dim: usize, id: ElementId) -> Result<Option<ElementId>, MeshError> {
        self.store.parent(dim, id)
    }

    pub fn set_parent(
        &mut self,
        dim: usize,
        id: ElementId,
        parent: Option<ElementId>,
    ) -> Result<(), MeshError> {
        self.store.set_parent(dim, id, parent)
    }

    pub fn element_regions(&self, dim: usize, id: ElementId) -> Result<&[RegionId], MeshError> {
        self.store.element_regions(dim, id)
    }

    pub fn is_in_region(
        &self,
        dim: usize,
        id: ElementId,
        region: RegionId,
    ) -> Result<bool, MeshError> {
        self.store.is_in_region(dim, id, region)
    }

    // ---------------------------------------------------------------------
    // Geometry and vertex buffers
    // ---------------------------------------------------------------------

    pub fn geometric_dimension(&self) -> usize {
        self.store.geometric_dimension()
    }

    /// Re-pad every coordinate buffer (store, private view copies, hole points).
    pub fn set_geometric_dimension(&mut self, dimension: usize) {
        self.store.set_geometric_dimension(dimension);
        for view in &mut self.views {
            if let Some(buffer) = view.vertex_buffer.as_mut() {
                buffer.set_dimension(dimension);
            }
        }
        self.options.geometric_dimension = dimension;
    }

    /// Index of the view whose buffer `idx` reads, `None` for the store's.
    fn vertex_buffer_owner(&self, idx: usize) -> Option<usize> {
        let mut current = Some(idx);
        while let Some(i) = current {
            if self.views[i].vertex_buffer.is_some() {
                return Some(i);
            }
            current = self.views[i].parent().map(ViewId::index);
        }
        None
    }

    /// The coordinates `view` reads: its own copy or the nearest ancestor's.
    pub fn vertex_buffer(&self, view: ViewId) -> Result<&VertexBuffer, MeshError> {
        let idx = self.view_index(view)?;
        Ok(self
            .vertex_buffer_owner(idx)
            .and_then(|i| self.views[i].vertex_buffer.as_ref())
            .unwrap_or(self.store.vertex_buffer()))
    }

    /// Give `view` a private copy of the coordinates it currently reads. The
    /// root always uses the store's buffer, so this is a no-op there.
    pub fn own_vertex_buffer(&mut self, view: ViewId) -> Result<(), MeshError> {
        let idx = self.view_index(view)?;
        if self.views[idx].is_root() || self.views[idx].owns_vertex_buffer() {
            return Ok(());
        }
        let copy = self.vertex_buffer(view)?.clone();
        self.views[idx].vertex_buffer = Some(copy);
        Ok(())
    }

    /// Drop the private copy of `view`; it reads through to its ancestors again.
    /// Returns whether a copy was dropped.
    pub fn release_vertex_buffer(&mut self, view: ViewId) -> Result<bool, MeshError> {
        let idx = self.view_index(view)?;
        Ok(self.views[idx].vertex_buffer.take().is_some())
    }

    pub fn owns_vertex_buffer(&self, view: ViewId) -> Result<bool, MeshError> {
        Ok(self.view(view)?.owns_vertex_buffer())
    }

    pub fn view_vertex_coords(&self, view: ViewId, id: ElementId) -> Result<&[f64], MeshError> {
        self.vertex_buffer(view)?
            .get(id.index())
            .ok_or(MeshError::OutOfRange { dim: 0, id })
    }

    /// Overwrite a vertex in the buffer `view` reads from.
    pub fn set_vertex_coords(
        &mut self,
        view: ViewId,
        id: ElementId,
        coords: &[f64],
    ) -> Result<(), MeshError> {
        let idx = self.view_index(view)?;
        match self.vertex_buffer_owner(idx) {
            None => self.store.set_vertex_coords(id, coords),
            Some(owner) => {
                let written = match self.views[owner].vertex_buffer.as_mut() {
                    Some(buffer) => buffer.set(id.index(), coords)?,
                    None => false,
                };
                if written {
                    Ok(())
                } else {
                    Err(MeshError::OutOfRange { dim: 0, id })
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Hole points
    // ---------------------------------------------------------------------

    pub fn add_hole_point(&mut self, plc: ElementId, coords: &[f64]) -> Result<(), MeshError> {
        self.store.add_hole_point(plc, coords)
    }

    pub fn hole_points(&self, plc: ElementId) -> impl Iterator<Item = &[f64]> + '_ {
        self.store.hole_points(plc)
    }

    pub fn hole_point_count(&self, plc: ElementId) -> usize {
        self.store.hole_point_count(plc)
    }

    // ---------------------------------------------------------------------
    // Regions
    // ---------------------------------------------------------------------

    pub fn make_region(&mut self) -> RegionId {
        self.store.make_region()
    }

    pub fn get_or_create_region(&mut self, id: RegionId) -> RegionId {
        self.store.get_or_create_region(id)
    }

    pub fn region(&self, id: RegionId) -> Result<RegionRef<'_>, MeshError> {
        self.store.region(id)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Result<RegionMut<'_>, MeshError> {
        self.store.region_mut(id)
    }

    /// Regions in ascending id order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.store.region_registry().iter()
    }

    pub fn region_count(&self) -> usize {
        self.store.region_count()
    }

    // ---------------------------------------------------------------------
    // Cached relations
    // ---------------------------------------------------------------------

    fn ensure_coboundary(&mut self, idx: usize, dim: usize, target_dim: usize) {
        let counter = self.store.change_counter();
        let key = (dim, target_dim);
        let view = &mut self.views[idx];
        if view
            .cache
            .coboundary
            .get(&key)
            .is_some_and(|s| s.is_current(counter))
        {
            return;
        }
        let mut slot = view.cache.coboundary.remove(&key).unwrap_or_default();
        rebuild_coboundary(
            slot.value_mut(),
            &self.store,
            view.elements(target_dim),
            dim,
            target_dim,
        );
        slot.mark_current(counter);
        view.cache.coboundary.insert(key, slot);
    }

    /// Elements of `target_dim` in `view` whose boundary contains `(dim, id)`.
    ///
    /// Requires `dim < target_dim`. The list follows the view's insertion
    /// order of the target elements.
    pub fn coboundary(
        &mut self,
        view: ViewId,
        dim: usize,
        id: ElementId,
        target_dim: usize,
    ) -> Result<&[ElementId], MeshError> {
        check_dimension(target_dim)?;
        if target_dim <= dim {
            return Err(MeshError::InvalidDimension(target_dim));
        }
        let idx = self.view_index(view)?;
        self.store.check_live(dim, id)?;
        self.ensure_coboundary(idx, dim, target_dim);
        Ok(self.views[idx]
            .cache
            .coboundary
            .get(&(dim, target_dim))
            .map_or(&[][..], |s| s.value().range(id)))
    }

    /// Elements of `target_dim` sharing a `connector_dim` element with `(dim, id)`.
    ///
    /// Connectors are reached through the boundary when `connector_dim < dim`
    /// and through the coboundary otherwise. The element itself and its own
    /// boundary members are excluded. The list is sorted by id and empty
    /// when `connector_dim` equals `dim` or `target_dim`.
    pub fn neighbor(
        &mut self,
        view: ViewId,
        dim: usize,
        id: ElementId,
        connector_dim: usize,
        target_dim: usize,
    ) -> Result<&[ElementId], MeshError> {
        check_dimension(connector_dim)?;
        check_dimension(target_dim)?;
        let idx = self.view_index(view)?;
        self.store.check_live(dim, id)?;
        let query = NeighborQuery {
            dim,
            connector_dim,
            target_dim,
        };
        if !query.is_valid() {
            return Ok(&[]);
        }
        if connector_dim > dim {
            self.ensure_coboundary(idx, dim, connector_dim);
        }
        if target_dim > connector_dim {
            self.ensure_coboundary(idx, connector_dim, target_dim);
        }

        let counter = self.store.change_counter();
        let key = (dim, connector_dim, target_dim);
        let view = &mut self.views[idx];
        let current = view
            .cache
            .neighbor
            .get(&key)
            .is_some_and(|s| s.is_current(counter));
        if !current {
            let mut slot = view.cache.neighbor.remove(&key).unwrap_or_default();
            let up = view
                .cache
                .coboundary
                .get(&(dim, connector_dim))
                .map(Stamped::value);
            let across = view
                .cache
                .coboundary
                .get(&(connector_dim, target_dim))
                .map(Stamped::value);
            rebuild_neighbor(
                slot.value_mut(),
                &self.store,
                view.elements(dim),
                query,
                up,
                across,
            );
            slot.mark_current(counter);
            view.cache.neighbor.insert(key, slot);
        }
        Ok(self.views[idx]
            .cache
            .neighbor
            .get(&key)
            .map_or(&[][..], |s| s.value().range(id)))
    }

    fn ensure_boundary_flags(
        &mut self,
        idx: usize,
        region: Option<RegionId>,
    ) -> Result<(), MeshError> {
        let counter = self.store.change_counter();
        let cache = &self.views[idx].cache;
        let current = match region {
            None => cache.boundary_flags.is_current(counter),
            Some(r) => cache
                .region_boundary_flags
                .get(&r)
                .is_some_and(|s| s.is_current(counter)),
        };
        if current {
            return Ok(());
        }

        let facet_dim = self.views[idx]
            .cell_dimension()
            .and_then(|c| c.checked_sub(1));
        if let Some(f) = facet_dim {
            self.ensure_coboundary(idx, f, f + 1);
        }
        let region_record = match region {
            Some(r) => Some(
                self.store
                    .region_registry()
                    .get(r)
                    .ok_or(MeshError::UnknownRegion(r))?,
            ),
            None => None,
        };

        let view = &mut self.views[idx];
        let mut slot = match region {
            None => std::mem::take(&mut view.cache.boundary_flags),
            Some(r) => view
                .cache
                .region_boundary_flags
                .remove(&r)
                .unwrap_or_default(),
        };
        match facet_dim {
            Some(f) => {
                let cells_over_facets = view.cache.coboundary.get(&(f, f + 1)).map(Stamped::value);
                rebuild_boundary_flags(
                    slot.value_mut(),
                    &self.store,
                    view.elements(f),
                    f,
                    cells_over_facets,
                    region_record,
                );
            }
            None => slot.value_mut().clear(),
        }
        slot.mark_current(counter);
        match region {
            None => view.cache.boundary_flags = slot,
            Some(r) => {
                view.cache.region_boundary_flags.insert(r, slot);
            }
        }
        Ok(())
    }

    /// Recompute the boundary flags of `view` if the store changed since the
    /// last computation.
    pub fn compute_boundary_flags(&mut self, view: ViewId) -> Result<(), MeshError> {
        let idx = self.view_index(view)?;
        self.ensure_boundary_flags(idx, None)
    }

    /// Region-scoped variant of [`compute_boundary_flags`](Self::compute_boundary_flags).
    pub fn compute_region_boundary_flags(
        &mut self,
        view: ViewId,
        region: RegionId,
    ) -> Result<(), MeshError> {
        let idx = self.view_index(view)?;
        self.ensure_boundary_flags(idx, Some(region))
    }

    /// Up-to-date boundary flags of `view`.
    pub fn boundary_flags(&mut self, view: ViewId) -> Result<&BoundaryFlags, MeshError> {
        let idx = self.view_index(view)?;
        self.ensure_boundary_flags(idx, None)?;
        Ok(self.views[idx].cache.boundary_flags.value())
    }

    /// Up-to-date boundary flags of `region` within `view`.
    pub fn region_boundary_flags(
        &mut self,
        view: ViewId,
        region: RegionId,
    ) -> Result<&BoundaryFlags, MeshError> {
        let idx = self.view_index(view)?;
        self.ensure_boundary_flags(idx, Some(region))?;
        self.views[idx]
            .cache
            .region_boundary_flags
            .get(&region)
            .map(Stamped::value)
            .ok_or(MeshError::UnknownRegion(region))
    }

    /// Whether `(dim, id)` lies on the boundary of the cells of `view`.
    pub fn is_boundary(&mut self, view: ViewId, dim: usize, id: ElementId) -> Result<bool, MeshError> {
        self.store.check_live(dim, id)?;
        Ok(self.boundary_flags(view)?.is_boundary(dim, id))
    }

    /// Whether `(dim, id)` lies on the boundary of the cells of `region` in `view`.
    pub fn is_region_boundary(
        &mut self,
        view: ViewId,
        region: RegionId,
        dim: usize,
        id: ElementId,
    ) -> Result<bool, MeshError> {
        self.store.check_live(dim, id)?;
        Ok(self.region_boundary_flags(view, region)?.is_boundary(dim, id))
    }
}

/// Reference-counted, lock-protected handle to a [`MeshHierarchy`].
///
/// Cloning (or [`retain`](Self::retain)) adds an owner; the hierarchy is
/// dropped together with its last handle. Writers take the write lock, so
/// mutation is serialized while readers may proceed concurrently.
#[derive(Clone, Debug, Default)]
pub struct SharedHierarchy(Arc<RwLock<MeshHierarchy>>);

impl SharedHierarchy {
    pub fn new(hierarchy: MeshHierarchy) -> Self {
        SharedHierarchy(Arc::new(RwLock::new(hierarchy)))
    }

    /// Another handle to the same hierarchy.
    pub fn retain(&self) -> Self {
        self.clone()
    }

    /// Give up this handle. Returns `true` when it was the last one and the
    /// hierarchy has been destroyed.
    pub fn release(self) -> bool {
        Arc::into_inner(self.0).is_some()
    }

    /// Number of live handles.
    pub fn use_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MeshHierarchy> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, MeshHierarchy> {
        self.0.write()
    }
}

impl From<MeshHierarchy> for SharedHierarchy {
    fn from(hierarchy: MeshHierarchy) -> Self {
        SharedHierarchy::new(hierarchy)
    }
}
