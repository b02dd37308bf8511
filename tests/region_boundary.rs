use mesh_hierarchy::algs::boundary::classify_region_boundary;
use mesh_hierarchy::mesh_error::MeshError;
use mesh_hierarchy::topology::element_tag::ElementTag;
use mesh_hierarchy::topology::hierarchy::MeshHierarchy;
use mesh_hierarchy::topology::ids::{ElementId, RegionId};

/// Closed octahedron surface: 6 vertices, 12 edges, 8 triangles.
fn octahedron() -> (MeshHierarchy, Vec<ElementId>) {
    let mut mesh = MeshHierarchy::new(3);
    let coords = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let v: Vec<_> = coords
        .iter()
        .map(|c| mesh.create_vertex(c).unwrap())
        .collect();
    let mut triangles = Vec::new();
    for x in [0, 1] {
        for y in [2, 3] {
            for z in [4, 5] {
                triangles.push(
                    mesh.get_or_create_element(ElementTag::Triangle, &[v[x], v[y], v[z]])
                        .unwrap(),
                );
            }
        }
    }
    (mesh, triangles)
}

fn surface_region(mesh: &mut MeshHierarchy, triangles: &[ElementId]) -> RegionId {
    let region = mesh.make_region();
    let mut handle = mesh.region_mut(region).unwrap();
    handle.set_name("surface").unwrap();
    for &t in triangles {
        assert!(handle.add_element(t).unwrap());
    }
    region
}

#[test]
fn closed_surface_has_no_region_boundary() {
    let (mut mesh, triangles) = octahedron();
    assert_eq!(mesh.element_count(1), 12);
    let region = surface_region(&mut mesh, &triangles);
    let root = mesh.root();
    for edge in mesh.elements(root, 1).unwrap().to_vec() {
        assert!(!mesh.is_region_boundary(root, region, 1, edge).unwrap());
        assert!(!mesh.is_boundary(root, 1, edge).unwrap());
    }
}

#[test]
fn removing_a_triangle_opens_its_edges() {
    let (mut mesh, triangles) = octahedron();
    let region = surface_region(&mut mesh, &triangles);
    let root = mesh.root();
    // warm the cache before the membership change
    assert!(!mesh.is_region_boundary(root, region, 1, ElementId::new(0)).unwrap());

    let removed = triangles[0];
    assert!(mesh.region_mut(region).unwrap().remove_element(removed).unwrap());
    assert!(!mesh.region_mut(region).unwrap().remove_element(removed).unwrap());

    let opened = mesh.boundary_ids(2, removed, 1).unwrap().to_vec();
    for edge in mesh.elements(root, 1).unwrap().to_vec() {
        let expected = opened.contains(&edge);
        assert_eq!(
            mesh.is_region_boundary(root, region, 1, edge).unwrap(),
            expected,
            "edge {edge}"
        );
        // the unscoped flags only look at the view, which still has every triangle
        assert!(!mesh.is_boundary(root, 1, edge).unwrap());
    }

    let edges = classify_region_boundary(&mut mesh, root, region, 1).unwrap();
    let mut sorted = opened.clone();
    sorted.sort();
    assert_eq!(edges.boundary, sorted);
    assert_eq!(edges.interior.len(), 9);
}

#[test]
fn region_registry_and_membership() {
    let (mut mesh, triangles) = octahedron();
    let region = surface_region(&mut mesh, &triangles[..2]);
    assert_eq!(mesh.region_count(), 1);
    assert_eq!(mesh.region(region).unwrap().name(), "surface");
    assert_eq!(mesh.element_regions(2, triangles[0]).unwrap(), &[region]);
    assert!(mesh.is_in_region(2, triangles[1], region).unwrap());
    assert!(!mesh.is_in_region(2, triangles[2], region).unwrap());

    // re-adding is a no-op and does not invalidate caches
    let counter = mesh.change_counter();
    assert!(!mesh.region_mut(region).unwrap().add_element(triangles[0]).unwrap());
    assert_eq!(mesh.change_counter(), counter);

    // the lower-dimensional view of a region is the closure of its cells
    let handle = mesh.region(region).unwrap();
    assert!(handle.contains(triangles[0]));
    assert_eq!(handle.iter_ids(2).count(), 2);
    assert_eq!(handle.iter_ids(1).count(), 5);
    assert_eq!(handle.iter_ids(0).count(), 4);

    let explicit = mesh.get_or_create_region(RegionId::new(7));
    assert_eq!(explicit, RegionId::new(7));
    assert_eq!(mesh.region(explicit).unwrap().name(), "7");
    assert_eq!(mesh.make_region(), RegionId::new(8));
    let ids: Vec<_> = mesh.regions().map(|r| r.id()).collect();
    assert_eq!(ids, vec![region, explicit, RegionId::new(8)]);

    assert!(matches!(
        mesh.region(RegionId::new(3)),
        Err(MeshError::UnknownRegion(_))
    ));
}
