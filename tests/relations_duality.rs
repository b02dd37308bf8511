use std::collections::BTreeSet;

use mesh_hierarchy::topology::element_tag::ElementTag;
use mesh_hierarchy::topology::hierarchy::MeshHierarchy;
use mesh_hierarchy::topology::ids::ElementId;
use proptest::prelude::*;

/// Tetrahedra `perm[i..i + 4]`: consecutive tetrahedra share one face.
fn tet_strip(perm: &[usize]) -> MeshHierarchy {
    let mut mesh = MeshHierarchy::new(3);
    let v: Vec<ElementId> = (0..perm.len())
        .map(|i| mesh.create_vertex(&[i as f64, (i % 2) as f64, (i % 3) as f64]).unwrap())
        .collect();
    for window in perm.windows(4) {
        let ids: Vec<_> = window.iter().map(|&i| v[i]).collect();
        mesh.get_or_create_element(ElementTag::Tetrahedron, &ids)
            .unwrap();
    }
    mesh
}

fn strip_strategy() -> impl Strategy<Value = Vec<usize>> {
    (4usize..10).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #[test]
    fn coboundary_is_inverse_of_boundary(perm in strip_strategy()) {
        let mut mesh = tet_strip(&perm);
        let root = mesh.root();
        for dim in 0..3 {
            for target in dim + 1..4 {
                for higher in mesh.elements(root, target).unwrap().to_vec() {
                    for lower in mesh.boundary_ids(target, higher, dim).unwrap().to_vec() {
                        let co = mesh.coboundary(root, dim, lower, target).unwrap();
                        prop_assert!(co.contains(&higher));
                    }
                }
                for lower in mesh.elements(root, dim).unwrap().to_vec() {
                    for higher in mesh.coboundary(root, dim, lower, target).unwrap().to_vec() {
                        prop_assert!(mesh.boundary_ids(target, higher, dim).unwrap().contains(&lower));
                    }
                }
            }
        }
    }

    #[test]
    fn strip_tets_neighbor_their_successor(perm in strip_strategy()) {
        let mut mesh = tet_strip(&perm);
        let root = mesh.root();
        let tets = mesh.elements(root, 3).unwrap().to_vec();
        for (i, &tet) in tets.iter().enumerate() {
            let mut expected = BTreeSet::new();
            if i > 0 {
                expected.insert(tets[i - 1]);
            }
            if i + 1 < tets.len() {
                expected.insert(tets[i + 1]);
            }
            let found: BTreeSet<_> = mesh.neighbor(root, 3, tet, 2, 3).unwrap().iter().copied().collect();
            prop_assert_eq!(found, expected);
        }
    }
}

#[test]
fn neighbors_are_sorted_and_exclude_self() {
    let mut mesh = tet_strip(&[0, 1, 2, 3, 4, 5]);
    let root = mesh.root();
    let tets = mesh.elements(root, 3).unwrap().to_vec();
    assert_eq!(tets.len(), 3);
    // vertex-connected: every tetrahedron of the strip shares a vertex with the others
    let through_vertices = mesh.neighbor(root, 3, tets[1], 0, 3).unwrap().to_vec();
    assert_eq!(through_vertices, vec![tets[0], tets[2]]);
    assert!(through_vertices.windows(2).all(|w| w[0] < w[1]));
    let through_faces = mesh.neighbor(root, 3, tets[0], 2, 3).unwrap();
    assert_eq!(through_faces, &[tets[1]]);
}

#[test]
fn lower_target_neighbors_skip_own_boundary() {
    let mut mesh = tet_strip(&[0, 1, 2, 3, 4]);
    let root = mesh.root();
    let first = mesh.elements(root, 3).unwrap()[0];
    // vertices reachable over the faces of the first tetrahedron, minus its own four
    let others = mesh.neighbor(root, 3, first, 2, 0).unwrap();
    assert!(others.is_empty());
    // from a vertex, over tetrahedra, to the other vertices of those tetrahedra
    let v0 = ElementId::new(0);
    let reach = mesh.neighbor(root, 0, v0, 3, 0).unwrap();
    assert_eq!(reach, &[ElementId::new(1), ElementId::new(2), ElementId::new(3)]);
}

#[test]
fn coboundary_follows_view_insertion_order() {
    let mut mesh = tet_strip(&[0, 1, 2, 3, 4, 5]);
    let root = mesh.root();
    let v3 = ElementId::new(3);
    let tets = mesh.elements(root, 3).unwrap().to_vec();
    assert_eq!(mesh.coboundary(root, 0, v3, 3).unwrap(), &tets[..]);
}
