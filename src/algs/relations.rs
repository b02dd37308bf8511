//! Builders for the derived relations cached per view.
//!
//! Both builders rebuild into an existing [`SparseAdjacency`] so its
//! allocations survive across invalidations.

use std::collections::BTreeSet;

use crate::data::adjacency::SparseAdjacency;
use crate::topology::ids::ElementId;
use crate::topology::store::ElementStore;

/// Dimensions of a neighbor query: elements of `dim` connected through
/// elements of `connector_dim` to elements of `target_dim`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NeighborQuery {
    pub dim: usize,
    pub connector_dim: usize,
    pub target_dim: usize,
}

impl NeighborQuery {
    /// A query is meaningful only when the connector differs from both ends.
    pub fn is_valid(&self) -> bool {
        self.dim != self.connector_dim && self.connector_dim != self.target_dim
    }
}

/// Group the boundary lists of `targets` at `dim` by the referenced lower
/// element: `out[e]` lists every target whose `dim`-boundary contains `e`,
/// in the order the targets appear.
///
/// One scan over the targets; cost is `|targets| × boundary arity`.
pub(crate) fn rebuild_coboundary(
    out: &mut SparseAdjacency<ElementId>,
    store: &ElementStore,
    targets: &[ElementId],
    dim: usize,
    target_dim: usize,
) {
    let mut pairs = Vec::new();
    for &t in targets {
        if let Ok(boundary) = store.boundary_ids(target_dim, t, dim) {
            pairs.extend(boundary.iter().map(|&b| (b, t)));
        }
    }
    out.rebuild_grouped(&pairs);
    log::debug!(
        "rebuilt coboundary {dim}->{target_dim}: {} keys, {} entries",
        out.len(),
        out.total_len()
    );
}

/// Rebuild the neighbor lists of every element in `elements`.
///
/// `up` must be the coboundary `dim -> connector_dim` when the connector lies
/// above `dim`; `across` must be the coboundary `connector_dim -> target_dim`
/// when the target lies above the connector. Lists are sorted and exclude the
/// element itself (`target_dim == dim`) or its own boundary members
/// (`target_dim < dim`).
pub(crate) fn rebuild_neighbor(
    out: &mut SparseAdjacency<ElementId>,
    store: &ElementStore,
    elements: &[ElementId],
    query: NeighborQuery,
    up: Option<&SparseAdjacency<ElementId>>,
    across: Option<&SparseAdjacency<ElementId>>,
) {
    out.clear();
    if !query.is_valid() {
        return;
    }
    let NeighborQuery {
        dim,
        connector_dim,
        target_dim,
    } = query;

    let mut found: BTreeSet<ElementId> = BTreeSet::new();
    for &e in elements {
        found.clear();
        let connectors: &[ElementId] = if connector_dim < dim {
            store.boundary_ids(dim, e, connector_dim).unwrap_or(&[])
        } else {
            up.map_or(&[][..], |adj| adj.range(e))
        };
        for &c in connectors {
            let attached: &[ElementId] = if target_dim < connector_dim {
                store.boundary_ids(connector_dim, c, target_dim).unwrap_or(&[])
            } else {
                across.map_or(&[][..], |adj| adj.range(c))
            };
            found.extend(attached.iter().copied());
        }

        if target_dim == dim {
            found.remove(&e);
        } else if target_dim < dim {
            for own in store.boundary_ids(dim, e, target_dim).unwrap_or(&[]) {
                found.remove(own);
            }
        }

        let slot = out.insert_growing(e, found.len());
        for (dst, &n) in slot.iter_mut().zip(found.iter()) {
            *dst = n;
        }
    }
    log::debug!(
        "rebuilt neighbors {dim}/{connector_dim}/{target_dim}: {} keys, {} entries",
        out.len(),
        out.total_len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::element_tag::ElementTag;

    /// Two triangles sharing the edge (1, 2).
    fn two_triangles() -> (ElementStore, Vec<ElementId>) {
        let mut store = ElementStore::new(2);
        let v: Vec<_> = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
            .iter()
            .map(|c| store.create_vertex(c).unwrap())
            .collect();
        let t0 = store
            .get_or_create_element(ElementTag::Triangle, &[v[0], v[1], v[2]])
            .unwrap();
        let t1 = store
            .get_or_create_element(ElementTag::Triangle, &[v[1], v[2], v[3]])
            .unwrap();
        (store, vec![t0, t1])
    }

    #[test]
    fn coboundary_of_edges() {
        let (store, tris) = two_triangles();
        let mut adj = SparseAdjacency::new();
        rebuild_coboundary(&mut adj, &store, &tris, 1, 2);
        let shared = store
            .find_element(ElementTag::Line, &[ElementId::new(1), ElementId::new(2)])
            .unwrap();
        assert_eq!(adj.range(shared), &tris[..]);
        assert_eq!(adj.len(), 5);
        assert_eq!(adj.total_len(), 6);
    }

    #[test]
    fn triangles_neighbor_through_shared_edge() {
        let (store, tris) = two_triangles();
        let mut across = SparseAdjacency::new();
        rebuild_coboundary(&mut across, &store, &tris, 1, 2);
        let mut out = SparseAdjacency::new();
        let query = NeighborQuery {
            dim: 2,
            connector_dim: 1,
            target_dim: 2,
        };
        rebuild_neighbor(&mut out, &store, &tris, query, None, Some(&across));
        assert_eq!(out.range(tris[0]), &[tris[1]]);
        assert_eq!(out.range(tris[1]), &[tris[0]]);
    }

    #[test]
    fn lower_targets_exclude_own_boundary() {
        let (store, tris) = two_triangles();
        let mut up = SparseAdjacency::new();
        rebuild_coboundary(&mut up, &store, &tris, 0, 2);
        let vertices: Vec<_> = store.element_ids(0).collect();
        let mut out = SparseAdjacency::new();
        let query = NeighborQuery {
            dim: 2,
            connector_dim: 0,
            target_dim: 0,
        };
        assert!(!query.is_valid());
        rebuild_neighbor(&mut out, &store, &tris, query, None, None);
        assert!(out.is_empty());

        let query = NeighborQuery {
            dim: 2,
            connector_dim: 1,
            target_dim: 0,
        };
        rebuild_neighbor(&mut out, &store, &tris, query, None, None);
        assert!(out.range(tris[0]).is_empty());

        let query = NeighborQuery {
            dim: 0,
            connector_dim: 2,
            target_dim: 0,
        };
        rebuild_neighbor(&mut out, &store, &vertices, query, Some(&up), None);
        assert_eq!(out.range(vertices[0]), &[vertices[1], vertices[2]]);
        assert_eq!(out.range(vertices[1]), &[vertices[0], vertices[2], vertices[3]]);
    }
}
