//! Boundary classification utilities.
//!
//! A facet (an element one dimension below the cell dimension of a view) lies
//! on the boundary when exactly one cell of the view contains it. Boundary
//! facets mark every element of their closure as boundary too. The
//! region-scoped variant counts only cells belonging to the region.

use crate::data::adjacency::SparseAdjacency;
use crate::mesh_error::MeshError;
use crate::topology::hierarchy::MeshHierarchy;
use crate::topology::ids::{ElementId, RegionId, ViewId};
use crate::topology::region::Region;
use crate::topology::store::ElementStore;
use crate::topology::view::BoundaryFlags;

/// Classified boundary/interior element sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundaryClassification {
    pub boundary: Vec<ElementId>,
    pub interior: Vec<ElementId>,
}

/// Recompute `out` from the facets of a view and the coboundary of those
/// facets over the view's cells.
///
/// A count of zero or of two and more cells leaves the facet unmarked.
pub(crate) fn rebuild_boundary_flags(
    out: &mut BoundaryFlags,
    store: &ElementStore,
    facets: &[ElementId],
    facet_dim: usize,
    cells_over_facets: Option<&SparseAdjacency<ElementId>>,
    region: Option<&Region>,
) {
    out.clear();
    let Some(cells_over_facets) = cells_over_facets else {
        return;
    };
    let cell_dim = facet_dim + 1;
    let mut marked = 0usize;
    for &f in facets {
        let count = cells_over_facets
            .range(f)
            .iter()
            .filter(|&&c| region.is_none_or(|r| r.contains_at(cell_dim, c)))
            .count();
        if count != 1 {
            continue;
        }
        marked += 1;
        out.mark(facet_dim, f);
        for b in 0..facet_dim {
            for &sub in store.boundary_ids(facet_dim, f, b).unwrap_or(&[]) {
                out.mark(b, sub);
            }
        }
    }
    log::debug!(
        "boundary flags: {marked} of {} facets (dim {facet_dim}) on the boundary{}",
        facets.len(),
        region.map_or(String::new(), |r| format!(" of region {}", r.id()))
    );
}

/// Split the elements of `dim` in `view` into boundary and interior sets.
///
/// Both lists are sorted by id.
pub fn classify_boundary(
    mesh: &mut MeshHierarchy,
    view: ViewId,
    dim: usize,
) -> Result<BoundaryClassification, MeshError> {
    let elements = mesh.elements(view, dim)?.to_vec();
    let flags = mesh.boundary_flags(view)?;
    Ok(split(&elements, |e| flags.is_boundary(dim, e)))
}

/// Region-scoped variant of [`classify_boundary`].
pub fn classify_region_boundary(
    mesh: &mut MeshHierarchy,
    view: ViewId,
    region: RegionId,
    dim: usize,
) -> Result<BoundaryClassification, MeshError> {
    let elements: Vec<ElementId> = mesh.region(region)?.iter_ids(dim).collect();
    let flags = mesh.region_boundary_flags(view, region)?;
    Ok(split(&elements, |e| flags.is_boundary(dim, e)))
}

fn split(elements: &[ElementId], is_boundary: impl Fn(ElementId) -> bool) -> BoundaryClassification {
    let (mut boundary, mut interior): (Vec<_>, Vec<_>) =
        elements.iter().copied().partition(|&e| is_boundary(e));
    boundary.sort_unstable();
    interior.sort_unstable();
    BoundaryClassification { boundary, interior }
}
