use std::collections::BTreeSet;

use mesh_hierarchy::mesh_error::MeshError;
use mesh_hierarchy::topology::element_tag::ElementTag;
use mesh_hierarchy::topology::hierarchy::MeshHierarchy;
use mesh_hierarchy::topology::ids::ElementId;
use proptest::prelude::*;

fn e(i: u32) -> ElementId {
    ElementId::new(i)
}

fn vertices(mesh: &mut MeshHierarchy, n: usize) -> Vec<ElementId> {
    let dim = mesh.geometric_dimension();
    (0..n)
        .map(|i| {
            let coords: Vec<f64> = (0..dim).map(|k| (i * (k + 1)) as f64).collect();
            mesh.create_vertex(&coords).unwrap()
        })
        .collect()
}

#[test]
fn tetrahedron_closure_is_complete() {
    let mut mesh = MeshHierarchy::new(3);
    let v = vertices(&mut mesh, 4);
    let tet = mesh
        .get_or_create_element(ElementTag::Tetrahedron, &v)
        .unwrap();

    assert_eq!(mesh.element_count(1), 6);
    assert_eq!(mesh.element_count(2), 4);
    assert_eq!(mesh.element_count(3), 1);
    assert_eq!(mesh.cell_dimension(), Some(3));
    assert_eq!(mesh.facet_dimension(), Some(2));

    let tet_vertices: BTreeSet<_> = v.iter().copied().collect();
    let edges = mesh.boundary_ids(3, tet, 1).unwrap().to_vec();
    let faces = mesh.boundary_ids(3, tet, 2).unwrap().to_vec();
    assert_eq!(edges.iter().collect::<BTreeSet<_>>().len(), 6);
    assert_eq!(faces.iter().collect::<BTreeSet<_>>().len(), 4);

    let mut edge_keys = BTreeSet::new();
    for &edge in &edges {
        let ev = mesh.vertex_ids(1, edge).unwrap();
        assert_eq!(ev.len(), 2);
        assert!(ev.iter().all(|x| tet_vertices.contains(x)));
        edge_keys.insert(ev.into_iter().collect::<BTreeSet<_>>());
    }
    assert_eq!(edge_keys.len(), 6);

    let mut face_keys = BTreeSet::new();
    for &face in &faces {
        let fv = mesh.vertex_ids(2, face).unwrap();
        assert_eq!(fv.len(), 3);
        assert!(fv.iter().all(|x| tet_vertices.contains(x)));
        assert_eq!(mesh.boundary_ids(2, face, 1).unwrap().len(), 3);
        face_keys.insert(fv.into_iter().collect::<BTreeSet<_>>());
    }
    assert_eq!(face_keys.len(), 4);
}

#[test]
fn hexahedron_closure_counts() {
    let mut mesh = MeshHierarchy::new(3);
    let v = vertices(&mut mesh, 8);
    let hex = mesh
        .get_or_create_element(ElementTag::Hexahedron, &v)
        .unwrap();
    assert_eq!(mesh.element_count(1), 12);
    assert_eq!(mesh.element_count(2), 6);
    assert_eq!(mesh.tag_count(ElementTag::Quadrilateral), 6);
    for &face in mesh.boundary_ids(3, hex, 2).unwrap() {
        assert_eq!(mesh.element_tag(2, face).unwrap(), ElementTag::Quadrilateral);
        assert_eq!(mesh.boundary_ids(2, face, 1).unwrap().len(), 4);
    }
}

#[test]
fn polygon_edges_are_cyclic() {
    let mut mesh = MeshHierarchy::new(2);
    let v = vertices(&mut mesh, 5);
    let poly = mesh.get_or_create_element(ElementTag::Polygon, &v).unwrap();
    assert_eq!(mesh.boundary_ids(2, poly, 1).unwrap().len(), 5);
    let closing = mesh.find_element(ElementTag::Line, &[v[4], v[0]]).unwrap();
    assert!(mesh.boundary_ids(2, poly, 1).unwrap().contains(&closing));
}

#[test]
fn invalid_creation_leaves_store_untouched() {
    let mut mesh = MeshHierarchy::new(2);
    let v = vertices(&mut mesh, 3);
    let before = mesh.change_counter();

    assert_eq!(
        mesh.get_or_create_element(ElementTag::Triangle, &v[..2]),
        Err(MeshError::InvalidElementTag {
            tag: ElementTag::Triangle,
            found: 2
        })
    );
    assert_eq!(
        mesh.get_or_create_element(ElementTag::Triangle, &[v[0], v[1], v[1]]),
        Err(MeshError::InvalidElementTag {
            tag: ElementTag::Triangle,
            found: 3
        })
    );
    assert_eq!(
        mesh.get_or_create_element(ElementTag::Triangle, &[v[0], v[1], e(17)]),
        Err(MeshError::OutOfRange { dim: 0, id: e(17) })
    );
    assert_eq!(
        mesh.get_or_create_element(ElementTag::Vertex, &v[..1]),
        Err(MeshError::InvalidElementTag {
            tag: ElementTag::Vertex,
            found: 1
        })
    );
    assert_eq!(mesh.element_count(1), 0);
    assert_eq!(mesh.element_count(2), 0);
    assert_eq!(mesh.change_counter(), before);
}

#[test]
fn vertices_are_never_deduplicated() {
    let mut mesh = MeshHierarchy::new(2);
    let a = mesh.create_vertex(&[1.0, 1.0]).unwrap();
    let b = mesh.create_vertex(&[1.0, 1.0]).unwrap();
    assert_ne!(a, b);
    assert_eq!(
        mesh.create_vertex(&[1.0]),
        Err(MeshError::GeometricDimensionMismatch {
            expected: 2,
            found: 1
        })
    );
    assert_eq!(mesh.element_count(0), 2);
}

#[test]
fn plc_with_hole_points() {
    let mut mesh = MeshHierarchy::new(2);
    let v = vertices(&mut mesh, 4);
    let lines: Vec<_> = [(0, 1), (1, 2), (2, 3), (3, 0)]
        .iter()
        .map(|&(a, b)| {
            mesh.get_or_create_element(ElementTag::Line, &[v[a], v[b]])
                .unwrap()
        })
        .collect();
    let plc = mesh.get_or_create_element(ElementTag::Plc, &lines).unwrap();
    assert_eq!(mesh.boundary_ids(2, plc, 0).unwrap(), &v[..]);
    assert_eq!(mesh.boundary_ids(2, plc, 1).unwrap(), &lines[..]);

    // the same lines in another order name the same PLC
    let reversed: Vec<_> = lines.iter().rev().copied().collect();
    assert_eq!(mesh.get_or_create_element(ElementTag::Plc, &reversed), Ok(plc));

    mesh.add_hole_point(plc, &[0.5, 0.5]).unwrap();
    mesh.add_hole_point(plc, &[0.25, 0.75]).unwrap();
    assert_eq!(mesh.hole_point_count(plc), 2);
    let holes: Vec<_> = mesh.hole_points(plc).collect();
    assert_eq!(holes, vec![&[0.5, 0.5][..], &[0.25, 0.75][..]]);

    let tri = mesh
        .get_or_create_element(ElementTag::Triangle, &v[..3])
        .unwrap();
    assert!(matches!(
        mesh.add_hole_point(tri, &[0.1, 0.1]),
        Err(MeshError::InvalidElementTag { .. })
    ));
}

#[test]
fn geometric_dimension_repads_coordinates() {
    let mut mesh = MeshHierarchy::new(2);
    let a = mesh.create_vertex(&[1.0, 2.0]).unwrap();
    mesh.set_geometric_dimension(3);
    assert_eq!(mesh.vertex_coords(a).unwrap(), &[1.0, 2.0, 0.0]);
    let b = mesh.create_vertex(&[4.0, 5.0, 6.0]).unwrap();
    mesh.set_geometric_dimension(1);
    assert_eq!(mesh.vertex_coords(b).unwrap(), &[4.0]);
    assert_eq!(mesh.geometric_dimension(), 1);
}

proptest! {
    #[test]
    fn creation_is_idempotent(
        picks in prop::collection::vec(prop::sample::subsequence((0..6usize).collect::<Vec<_>>(), 3), 1..12),
        rotate in 0usize..3,
    ) {
        let mut mesh = MeshHierarchy::new(2);
        let v = vertices(&mut mesh, 6);
        for pick in picks {
            let ids: Vec<_> = pick.iter().map(|&i| v[i]).collect();
            let first = mesh.get_or_create_element(ElementTag::Triangle, &ids).unwrap();
            let counts: Vec<_> = (0..3).map(|d| mesh.element_count(d)).collect();
            let counter = mesh.change_counter();

            let mut permuted = ids.clone();
            permuted.rotate_left(rotate);
            permuted.swap(0, 1);
            let second = mesh.get_or_create_element(ElementTag::Triangle, &permuted).unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(mesh.find_element(ElementTag::Triangle, &ids), Some(first));
            let after: Vec<_> = (0..3).map(|d| mesh.element_count(d)).collect();
            prop_assert_eq!(counts, after);
            prop_assert_eq!(mesh.change_counter(), counter);
        }
    }
}
