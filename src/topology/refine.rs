//! Creation of refined elements with topological stitching.
//!
//! A refined element is an ordinary store element that records the element
//! it was derived from as its refinement ancestor. Its boundary sub-elements
//! are linked to ancestors too, whenever an existing element of the same
//! dimension (a boundary member of the parent, or an element split by an
//! intersection vertex) covers the sub-element's vertices. The refined
//! element also joins the regions of its parent. Stitching only links ids;
//! no coordinate is ever touched.

use crate::mesh_error::MeshError;
use crate::topology::element_tag::ElementTag;
use crate::topology::hierarchy::MeshHierarchy;
use crate::topology::ids::{ElementId, ViewId};

/// A vertex created on an existing element during refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntersectionRecord {
    pub vertex: ElementId,
    pub element_dim: usize,
    pub element: ElementId,
}

/// Refinement settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefineOptions {
    /// Use intersection records while stitching: the elements they name become
    /// candidates and their vertices extend the candidates' vertex sets. When
    /// off, only the plain vertex sets of the parent's boundary are matched.
    pub stitch_intersections: bool,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            stitch_intersections: true,
        }
    }
}

/// [`create_refined_element_with`] using [`RefineOptions::default`].
pub fn create_refined_element(
    mesh: &mut MeshHierarchy,
    view: ViewId,
    parent_dim: usize,
    parent: ElementId,
    tag: ElementTag,
    vertex_ids: &[ElementId],
    intersections: &[IntersectionRecord],
) -> Result<ElementId, MeshError> {
    create_refined_element_with(
        mesh,
        view,
        parent_dim,
        parent,
        tag,
        vertex_ids,
        intersections,
        RefineOptions::default(),
    )
}

/// Create (or find) the element `tag(vertex_ids)`, record `parent` as its
/// refinement ancestor, add it to every region of `parent` and insert it with
/// its closure into `view`. If the view insertion fails, the ancestor and
/// region links are rolled back.
///
/// `parent` must be an element of the same dimension as `tag`. Each boundary
/// sub-element (dimension 1 and up) without an ancestor is matched against
/// the candidates of its dimension, in this order: the parent's boundary
/// members, then the elements named by `intersections` in order of first
/// appearance. A candidate matches when its vertices, extended by the
/// intersection vertices recorded on it, cover every vertex of the
/// sub-element. The first match becomes the ancestor.
#[allow(clippy::too_many_arguments)]
pub fn create_refined_element_with(
    mesh: &mut MeshHierarchy,
    view: ViewId,
    parent_dim: usize,
    parent: ElementId,
    tag: ElementTag,
    vertex_ids: &[ElementId],
    intersections: &[IntersectionRecord],
    options: RefineOptions,
) -> Result<ElementId, MeshError> {
    let dim = tag.dimension();
    if dim != parent_dim {
        return Err(MeshError::InvalidDimension(parent_dim));
    }
    mesh.view(view)?;
    mesh.store().check_live(parent_dim, parent)?;
    for record in intersections {
        mesh.store().check_live(0, record.vertex)?;
        mesh.store().check_live(record.element_dim, record.element)?;
    }

    let id = mesh.get_or_create_element(tag, vertex_ids)?;
    if id == parent {
        return Err(MeshError::InvalidElementTag {
            tag,
            found: vertex_ids.len(),
        });
    }
    let previous = mesh.parent(dim, id)?;
    mesh.set_parent(dim, id, Some(parent))?;
    let mut joined = Vec::new();
    for region in mesh.element_regions(parent_dim, parent)?.to_vec() {
        if mesh.region_mut(region)?.add_element_at(dim, id)? {
            joined.push(region);
        }
    }
    if let Err(e) = mesh.add_element_closure(view, dim, id) {
        for region in joined {
            mesh.region_mut(region)?.remove_element_at(dim, id)?;
        }
        mesh.set_parent(dim, id, previous)?;
        return Err(e);
    }

    for b in 1..dim {
        let subs = mesh.boundary_ids(dim, id, b)?.to_vec();
        for sub in subs {
            if mesh.parent(b, sub)?.is_some() {
                continue;
            }
            if let Some(ancestor) = stitch(mesh, b, sub, parent_dim, parent, intersections, options)? {
                mesh.set_parent(b, sub, Some(ancestor))?;
            }
        }
    }
    log::debug!("refined {parent_dim}/{parent} into {tag} {dim}/{id} in view {view}");
    Ok(id)
}

fn stitch(
    mesh: &MeshHierarchy,
    dim: usize,
    sub: ElementId,
    parent_dim: usize,
    parent: ElementId,
    intersections: &[IntersectionRecord],
    options: RefineOptions,
) -> Result<Option<ElementId>, MeshError> {
    let mut candidates: Vec<ElementId> = mesh.boundary_ids(parent_dim, parent, dim)?.to_vec();
    if options.stitch_intersections {
        for record in intersections.iter().filter(|r| r.element_dim == dim) {
            if !candidates.contains(&record.element) {
                candidates.push(record.element);
            }
        }
    }

    let sub_vertices = mesh.vertex_ids(dim, sub)?;
    let mut matches = Vec::new();
    for candidate in candidates {
        if candidate == sub {
            continue;
        }
        let mut covered = mesh.vertex_ids(dim, candidate)?;
        if options.stitch_intersections {
            covered.extend(
                intersections
                    .iter()
                    .filter(|r| r.element_dim == dim && r.element == candidate)
                    .map(|r| r.vertex),
            );
        }
        if sub_vertices.iter().all(|v| covered.contains(v)) {
            matches.push(candidate);
        }
    }

    if matches.len() > 1 {
        log::warn!(
            "refinement stitching: {} candidates cover {dim}/{sub}, using {}",
            matches.len(),
            matches[0]
        );
    }
    Ok(matches.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle (0,1,2) whose edge (0,1) is split by vertex 3.
    fn split_triangle() -> (MeshHierarchy, ElementId, Vec<ElementId>, ElementId) {
        let mut mesh = MeshHierarchy::new(2);
        let v: Vec<_> = [[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [1.0, 0.0]]
            .iter()
            .map(|c| mesh.create_vertex(c).unwrap())
            .collect();
        let tri = mesh
            .get_or_create_element(ElementTag::Triangle, &v[..3])
            .unwrap();
        let edge = mesh.find_element(ElementTag::Line, &[v[0], v[1]]).unwrap();
        (mesh, tri, v, edge)
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let (mut mesh, tri, v, _) = split_triangle();
        let child = mesh.make_child(mesh.root()).unwrap();
        assert_eq!(
            create_refined_element(&mut mesh, child, 2, tri, ElementTag::Line, &[v[0], v[3]], &[]),
            Err(MeshError::InvalidDimension(2))
        );
    }

    #[test]
    fn halves_link_to_split_edge() {
        let (mut mesh, tri, v, edge) = split_triangle();
        let child = mesh.make_child(mesh.root()).unwrap();
        let split = [IntersectionRecord {
            vertex: v[3],
            element_dim: 1,
            element: edge,
        }];
        let left = create_refined_element(
            &mut mesh,
            child,
            2,
            tri,
            ElementTag::Triangle,
            &[v[0], v[3], v[2]],
            &split,
        )
        .unwrap();
        assert_eq!(mesh.parent(2, left).unwrap(), Some(tri));
        assert!(mesh.view(child).unwrap().contains(2, left));

        let half = mesh.find_element(ElementTag::Line, &[v[0], v[3]]).unwrap();
        assert_eq!(mesh.parent(1, half).unwrap(), Some(edge));
        // the interior edge (3,2) lies on no parent edge
        let inner = mesh.find_element(ElementTag::Line, &[v[3], v[2]]).unwrap();
        assert_eq!(mesh.parent(1, inner).unwrap(), None);
        // the kept edge (0,2) is shared with the parent, not its own ancestor
        let kept = mesh.find_element(ElementTag::Line, &[v[0], v[2]]).unwrap();
        assert_eq!(mesh.parent(1, kept).unwrap(), None);
    }

    #[test]
    fn without_intersections_split_edges_stay_unlinked() {
        let (mut mesh, tri, v, edge) = split_triangle();
        let child = mesh.make_child(mesh.root()).unwrap();
        let split = [IntersectionRecord {
            vertex: v[3],
            element_dim: 1,
            element: edge,
        }];
        create_refined_element_with(
            &mut mesh,
            child,
            2,
            tri,
            ElementTag::Triangle,
            &[v[0], v[3], v[2]],
            &split,
            RefineOptions {
                stitch_intersections: false,
            },
        )
        .unwrap();
        let half = mesh.find_element(ElementTag::Line, &[v[0], v[3]]).unwrap();
        // (0,1) does not cover (0,3) once the split vertex is ignored
        assert_eq!(mesh.parent(1, half).unwrap(), None);
    }

    #[test]
    fn refined_cells_pass_view_linkage() {
        let (mut mesh, tri, v, _) = split_triangle();
        let root = mesh.root();
        let child = mesh.make_child(root).unwrap();
        let grandchild = mesh.make_child(child).unwrap();
        // the parent triangle is not in `child`, so `grandchild` cannot hold its refinement
        assert!(matches!(
            create_refined_element(
                &mut mesh,
                grandchild,
                2,
                tri,
                ElementTag::Triangle,
                &[v[0], v[3], v[2]],
                &[],
            ),
            Err(MeshError::InconsistentView { .. })
        ));
        let left = mesh
            .find_element(ElementTag::Triangle, &[v[0], v[3], v[2]])
            .unwrap();
        assert_eq!(mesh.parent(2, left).unwrap(), None);
    }

    #[test]
    fn refined_child_joins_parent_regions() {
        let (mut mesh, tri, v, _) = split_triangle();
        let fluid = mesh.make_region();
        let wall = mesh.make_region();
        mesh.region_mut(fluid).unwrap().add_element(tri).unwrap();
        mesh.region_mut(wall).unwrap().add_element(tri).unwrap();
        let child = mesh.make_child(mesh.root()).unwrap();
        let left = create_refined_element(
            &mut mesh,
            child,
            2,
            tri,
            ElementTag::Triangle,
            &[v[0], v[3], v[2]],
            &[],
        )
        .unwrap();
        assert_eq!(mesh.element_regions(2, left).unwrap(), &[fluid, wall]);
        assert!(mesh.region(fluid).unwrap().contains(left));
    }

    #[test]
    fn failed_insertion_leaves_regions_untouched() {
        let (mut mesh, tri, v, _) = split_triangle();
        let fluid = mesh.make_region();
        mesh.region_mut(fluid).unwrap().add_element(tri).unwrap();
        let child = mesh.make_child(mesh.root()).unwrap();
        let grandchild = mesh.make_child(child).unwrap();
        assert!(
            create_refined_element(
                &mut mesh,
                grandchild,
                2,
                tri,
                ElementTag::Triangle,
                &[v[0], v[3], v[2]],
                &[],
            )
            .is_err()
        );
        let left = mesh
            .find_element(ElementTag::Triangle, &[v[0], v[3], v[2]])
            .unwrap();
        assert!(mesh.element_regions(2, left).unwrap().is_empty());
        assert!(!mesh.region(fluid).unwrap().contains(left));
    }
}
