//! Regions: named, id-addressable subsets of elements.
//!
//! A region records its members per dimension; each member element also
//! lists the regions it belongs to (see
//! [`ElementStore::element_regions`](crate::topology::store::ElementStore::element_regions)).
//! Both sides are updated together and every membership change bumps the
//! store's change counter, which invalidates cached region boundary flags.
//!
//! Regions are reached through short-lived handles borrowing the store:
//! [`RegionRef`] for queries and [`RegionMut`] for membership edits.

use std::collections::{BTreeMap, BTreeSet, btree_set};

use crate::mesh_error::MeshError;
use crate::topology::element_tag::DIMENSION_COUNT;
use crate::topology::ids::{ElementId, RegionId};
use crate::topology::store::ElementStore;

/// A named subset of elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    id: RegionId,
    name: String,
    pub(crate) members: [BTreeSet<ElementId>; DIMENSION_COUNT],
}

impl Region {
    /// New empty region named after its decimal id.
    pub(crate) fn new(id: RegionId) -> Self {
        Self {
            id,
            name: id.to_string(),
            members: Default::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `id` is a direct member at `dim`.
    pub fn contains_at(&self, dim: usize, id: ElementId) -> bool {
        self.members.get(dim).is_some_and(|m| m.contains(&id))
    }

    /// Direct members at `dim`, ascending.
    pub fn members(&self, dim: usize) -> impl Iterator<Item = ElementId> + '_ {
        self.members.get(dim).into_iter().flatten().copied()
    }

    pub fn member_count(&self, dim: usize) -> usize {
        self.members.get(dim).map_or(0, BTreeSet::len)
    }
}

/// All regions of a store, ordered by id.
#[derive(Clone, Debug, Default)]
pub struct RegionRegistry {
    regions: BTreeMap<RegionId, Region>,
    next_id: u32,
}

impl RegionRegistry {
    /// Allocate a fresh region with the next unused id.
    pub fn make_region(&mut self) -> RegionId {
        let id = RegionId::new(self.next_id);
        self.get_or_create(id)
    }

    /// Look up `id`, creating the region if needed. Later calls to
    /// [`make_region`](Self::make_region) allocate past every id seen here.
    pub fn get_or_create(&mut self, id: RegionId) -> RegionId {
        self.regions.entry(id).or_insert_with(|| Region::new(id));
        self.next_id = self.next_id.max(id.get().saturating_add(1));
        id
    }

    #[inline]
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: RegionId) -> bool {
        self.regions.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.values()
    }

    pub(crate) fn set_name(&mut self, id: RegionId, name: &str) -> Result<(), MeshError> {
        let region = self.get_mut(id).ok_or(MeshError::UnknownRegion(id))?;
        region.name = name.to_string();
        Ok(())
    }
}

/// Read-only handle to one region.
#[derive(Clone, Copy, Debug)]
pub struct RegionRef<'a> {
    store: &'a ElementStore,
    region: &'a Region,
}

impl<'a> RegionRef<'a> {
    pub(crate) fn new(store: &'a ElementStore, id: RegionId) -> Result<Self, MeshError> {
        let region = store
            .region_registry()
            .get(id)
            .ok_or(MeshError::UnknownRegion(id))?;
        Ok(Self { store, region })
    }

    #[inline]
    pub fn id(&self) -> RegionId {
        self.region.id
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        &self.region.name
    }

    /// The underlying region record.
    #[inline]
    pub fn region(&self) -> &'a Region {
        self.region
    }

    /// Whether the cell `id` (at the store's cell dimension) is a member.
    pub fn contains(&self, id: ElementId) -> bool {
        self.store
            .cell_dimension()
            .is_some_and(|dim| self.region.contains_at(dim, id))
    }

    pub fn contains_at(&self, dim: usize, id: ElementId) -> bool {
        self.region.contains_at(dim, id)
    }

    /// Elements of dimension `dim` belonging to the region: its direct members
    /// plus every element bounding a higher-dimensional member. Ascending ids,
    /// no duplicates.
    pub fn iter_ids(&self, dim: usize) -> btree_set::IntoIter<ElementId> {
        let mut out = BTreeSet::new();
        if dim < DIMENSION_COUNT {
            out.extend(self.region.members[dim].iter().copied());
            for higher in dim + 1..DIMENSION_COUNT {
                for &member in &self.region.members[higher] {
                    if let Ok(boundary) = self.store.boundary_ids(higher, member, dim) {
                        out.extend(boundary.iter().copied());
                    }
                }
            }
        }
        out.into_iter()
    }
}

/// Mutable handle to one region.
#[derive(Debug)]
pub struct RegionMut<'a> {
    store: &'a mut ElementStore,
    id: RegionId,
}

impl<'a> RegionMut<'a> {
    pub(crate) fn new(store: &'a mut ElementStore, id: RegionId) -> Result<Self, MeshError> {
        if !store.region_registry().contains(id) {
            return Err(MeshError::UnknownRegion(id));
        }
        Ok(Self { store, id })
    }

    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.store
            .region_registry()
            .get(self.id)
            .map_or("", Region::name)
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), MeshError> {
        self.store.region_registry_mut().set_name(self.id, name)
    }

    fn cell_dimension(&self, id: ElementId) -> Result<usize, MeshError> {
        self.store
            .cell_dimension()
            .ok_or(MeshError::OutOfRange { dim: 0, id })
    }

    /// Add the cell `id`; re-adding is a no-op. Returns whether it was newly added.
    pub fn add_element(&mut self, id: ElementId) -> Result<bool, MeshError> {
        let dim = self.cell_dimension(id)?;
        self.add_element_at(dim, id)
    }

    /// Add the element `(dim, id)`.
    pub fn add_element_at(&mut self, dim: usize, id: ElementId) -> Result<bool, MeshError> {
        self.store.link_region(dim, id, self.id)
    }

    /// Remove the cell `id`; returns whether it was a member.
    pub fn remove_element(&mut self, id: ElementId) -> Result<bool, MeshError> {
        let dim = self.cell_dimension(id)?;
        self.remove_element_at(dim, id)
    }

    pub fn remove_element_at(&mut self, dim: usize, id: ElementId) -> Result<bool, MeshError> {
        self.store.unlink_region(dim, id, self.id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.reborrow().is_ok_and(|r| r.contains(id))
    }

    pub fn contains_at(&self, dim: usize, id: ElementId) -> bool {
        self.reborrow().is_ok_and(|r| r.contains_at(dim, id))
    }

    pub fn iter_ids(&self, dim: usize) -> btree_set::IntoIter<ElementId> {
        self.reborrow()
            .map(|r| r.iter_ids(dim))
            .unwrap_or_default()
    }

    /// Reborrow as a read-only handle.
    pub fn reborrow(&self) -> Result<RegionRef<'_>, MeshError> {
        RegionRef::new(self.store, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_region_allocates_past_explicit_ids() {
        let mut reg = RegionRegistry::default();
        assert_eq!(reg.make_region(), RegionId::new(0));
        assert_eq!(reg.get_or_create(RegionId::new(5)), RegionId::new(5));
        assert_eq!(reg.make_region(), RegionId::new(6));
        // a lower explicit id never rewinds allocation
        reg.get_or_create(RegionId::new(2));
        assert_eq!(reg.make_region(), RegionId::new(7));
        assert_eq!(reg.len(), 5);
        let ids: Vec<_> = reg.iter().map(Region::id).collect();
        assert_eq!(ids, [0, 2, 5, 6, 7].map(RegionId::new).to_vec());
    }

    #[test]
    fn default_name_is_decimal_id() {
        let mut reg = RegionRegistry::default();
        let id = reg.get_or_create(RegionId::new(42));
        assert_eq!(reg.get(id).unwrap().name(), "42");
        reg.set_name(id, "fluid").unwrap();
        assert_eq!(reg.get(id).unwrap().name(), "fluid");
        assert_eq!(
            reg.set_name(RegionId::new(1), "x"),
            Err(MeshError::UnknownRegion(RegionId::new(1)))
        );
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut reg = RegionRegistry::default();
        reg.get_or_create(RegionId::new(3));
        reg.set_name(RegionId::new(3), "solid").unwrap();
        reg.get_or_create(RegionId::new(3));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(RegionId::new(3)).unwrap().name(), "solid");
    }
}
