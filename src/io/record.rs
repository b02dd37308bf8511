//! Flat serialization record of a [`MeshHierarchy`].
//!
//! Every element of every dimension is recorded in id order, together with
//! the ids it was created from: vertex ids, or line ids for a PLC. Replay
//! recreates the elements lowest dimension first, so boundary closures of
//! higher elements resolve to the elements already replayed and every id
//! comes back unchanged, whatever order the original was built in.
//!
//! Replay order: vertices, regions, elements by dimension, refinement
//! ancestors, region memberships, hole points, then views root first. A
//! record whose views are not listed parent before child is rejected.

use serde::{Deserialize, Serialize};

use crate::data::adjacency::AdjacencyBuffer;
use crate::data::coordinates::VertexBuffer;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::element_tag::ElementTag;
use crate::topology::hierarchy::{HierarchyOptions, MeshHierarchy};
use crate::topology::ids::{ElementId, RegionId, ViewId};

/// Hole points of one PLC, flattened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HolePointRecord {
    pub plc: ElementId,
    pub coordinates: Vec<f64>,
}

/// Elements of one topological dimension, in id order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRecord {
    pub tags: Vec<ElementTag>,
    /// CSR offsets into `ids`, one more entry than there are elements.
    pub offsets: Vec<u32>,
    /// Creation input per element: vertex ids, or line ids for a PLC. Vertices
    /// have empty lists.
    pub ids: Vec<ElementId>,
    pub parents: Vec<Option<ElementId>>,
    pub regions: Vec<Vec<RegionId>>,
}

impl DimensionRecord {
    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// One node of the view tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    /// Index of the parent view in [`MeshRecord::views`]; `None` for the root.
    pub parent: Option<u32>,
    pub name: String,
    /// Members per dimension, each in insertion order.
    pub elements: Vec<Vec<ElementId>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub name: String,
}

/// Flat image of a hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    pub geometric_dimension: usize,
    pub auto_add_to_root: bool,
    /// `geometric_dimension` coordinates per vertex, vertex by vertex.
    pub coordinates: Vec<f64>,
    pub hole_points: Vec<HolePointRecord>,
    /// `dimensions[d]` holds the elements of dimension `d`, up to the cell
    /// dimension; empty for an empty store.
    pub dimensions: Vec<DimensionRecord>,
    pub views: Vec<ViewRecord>,
    pub regions: Vec<RegionRecord>,
}

impl MeshRecord {
    pub fn cell_dimension(&self) -> Option<usize> {
        self.dimensions.len().checked_sub(1)
    }

    pub fn element_count(&self, dim: usize) -> usize {
        self.dimensions.get(dim).map_or(0, DimensionRecord::len)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.element_count(0)
    }

    /// Number of elements of the cell dimension.
    pub fn cell_count(&self) -> usize {
        self.dimensions.last().map_or(0, DimensionRecord::len)
    }

    fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.regions.is_empty()
    }
}

fn malformed(msg: impl Into<String>) -> MeshError {
    MeshError::MalformedSerialization(msg.into())
}

/// Capture `mesh` as a [`MeshRecord`].
pub fn serialize(mesh: &MeshHierarchy) -> Result<MeshRecord, MeshError> {
    let store = mesh.store();
    let vertices = store.vertex_buffer();
    let dimension_count = store.cell_dimension().map_or(0, |cd| cd + 1);

    let mut dimensions = Vec::with_capacity(dimension_count);
    for dim in 0..dimension_count {
        let mut lists: AdjacencyBuffer<ElementId> = AdjacencyBuffer::new();
        let mut record = DimensionRecord::default();
        for id in store.element_ids(dim) {
            let tag = store.element_tag(dim, id)?;
            match tag {
                ElementTag::Vertex => lists.push_list(&[]),
                ElementTag::Plc => lists.push_list(store.boundary_ids(dim, id, 1)?),
                _ => lists.push_list(store.boundary_ids(dim, id, 0)?),
            };
            record.tags.push(tag);
            record.parents.push(store.parent(dim, id)?);
            record.regions.push(store.element_regions(dim, id)?.to_vec());
        }
        record.offsets = lists.offsets().to_vec();
        record.ids = lists.values().to_vec();
        dimensions.push(record);
    }

    let holes = store.hole_point_store();
    let hole_points = holes
        .plcs()
        .map(|plc| HolePointRecord {
            plc,
            coordinates: holes.iter(plc).flatten().copied().collect(),
        })
        .collect();

    let views = mesh
        .views()
        .map(|view| ViewRecord {
            parent: view.parent().map(ViewId::get),
            name: view.name().to_string(),
            elements: (0..dimension_count)
                .map(|dim| view.elements(dim).to_vec())
                .collect(),
        })
        .collect();

    let regions = mesh
        .regions()
        .map(|r| RegionRecord {
            id: r.id(),
            name: r.name().to_string(),
        })
        .collect();

    Ok(MeshRecord {
        geometric_dimension: vertices.dimension(),
        auto_add_to_root: mesh.options().auto_add_to_root,
        coordinates: vertices.as_flat().to_vec(),
        hole_points,
        dimensions,
        views,
        regions,
    })
}

/// Rebuild a hierarchy from `record`.
///
/// Any inconsistency (ragged arrays, ids of dead elements, elements of the
/// wrong dimension or replayed under another id, views listed before their
/// parent) is reported as [`MeshError::MalformedSerialization`].
pub fn deserialize(record: &MeshRecord) -> Result<MeshHierarchy, MeshError> {
    if record.is_empty() {
        log::warn!("deserializing an empty mesh record");
    }
    let lists = check_shape(record)?;

    let mut mesh = MeshHierarchy::with_options(HierarchyOptions {
        geometric_dimension: record.geometric_dimension,
        auto_add_to_root: false,
    });

    let coordinates = VertexBuffer::from_flat(
        record.geometric_dimension,
        record.vertex_count(),
        record.coordinates.clone(),
    )
    .map_err(|e| malformed(format!("coordinates: {e}")))?;
    for coords in coordinates.iter() {
        mesh.create_vertex(coords)?;
    }

    for region in &record.regions {
        let id = mesh.get_or_create_region(region.id);
        mesh.region_mut(id)?.set_name(&region.name)?;
    }

    for (dim, dimension) in record.dimensions.iter().enumerate().skip(1) {
        for (index, &tag) in dimension.tags.iter().enumerate() {
            let id = mesh
                .get_or_create_element(tag, lists[dim].range(index))
                .map_err(|e| malformed(format!("element {dim}/{index}: {e}")))?;
            if id.index() != index {
                return Err(malformed(format!(
                    "element {dim}/{index} was replayed as {dim}/{id}"
                )));
            }
        }
    }
    for (dim, dimension) in record.dimensions.iter().enumerate() {
        let count = mesh.element_count(dim);
        if count != dimension.len() {
            return Err(malformed(format!(
                "dimension {dim}: {} elements recorded, {count} replayed",
                dimension.len()
            )));
        }
    }

    for (dim, dimension) in record.dimensions.iter().enumerate() {
        for (index, parent) in dimension.parents.iter().enumerate() {
            let id = ElementId::from_index(index);
            mesh.set_parent(dim, id, *parent)
                .map_err(|e| malformed(format!("parent of {dim}/{index}: {e}")))?;
        }
        for (index, regions) in dimension.regions.iter().enumerate() {
            let id = ElementId::from_index(index);
            for &region in regions {
                mesh.region_mut(region)
                    .and_then(|mut r| r.add_element_at(dim, id))
                    .map_err(|e| malformed(format!("regions of {dim}/{index}: {e}")))?;
            }
        }
    }

    for hole in &record.hole_points {
        let dim = record.geometric_dimension;
        if dim == 0 || hole.coordinates.len() % dim != 0 {
            return Err(malformed(format!("hole points of PLC {}", hole.plc)));
        }
        for coords in hole.coordinates.chunks(dim) {
            mesh.add_hole_point(hole.plc, coords)
                .map_err(|e| malformed(format!("hole point of PLC {}: {e}", hole.plc)))?;
        }
    }

    for (index, view_record) in record.views.iter().enumerate() {
        let view = match view_record.parent {
            None => mesh.root(),
            Some(parent) => mesh.make_child(ViewId::new(parent))?,
        };
        if view.index() != index {
            return Err(malformed(format!("view {index} was restored as {view}")));
        }
        mesh.set_view_name(view, &view_record.name)?;
        for (dim, members) in view_record.elements.iter().enumerate() {
            for &id in members {
                mesh.try_add_element(view, dim, id)
                    .map_err(|e| malformed(format!("view {index}: {e}")))?;
            }
        }
    }

    mesh.set_auto_add_to_root(record.auto_add_to_root);
    mesh.debug_assert_invariants();
    Ok(mesh)
}

/// Array lengths, element dimensions and view order, checked before replay.
fn check_shape(record: &MeshRecord) -> Result<Vec<AdjacencyBuffer<ElementId>>, MeshError> {
    let mut lists = Vec::with_capacity(record.dimensions.len());
    for (dim, dimension) in record.dimensions.iter().enumerate() {
        let buffer =
            AdjacencyBuffer::from_parts(dimension.offsets.clone(), dimension.ids.clone())?;
        let n = dimension.len();
        if buffer.len() != n || dimension.parents.len() != n || dimension.regions.len() != n {
            return Err(malformed(format!(
                "dimension {dim}: {n} tags but {} id lists, {} parents, {} region lists",
                buffer.len(),
                dimension.parents.len(),
                dimension.regions.len()
            )));
        }
        if let Some(tag) = dimension.tags.iter().find(|t| t.dimension() != dim) {
            return Err(malformed(format!("{tag} recorded in dimension {dim}")));
        }
        if dim == 0 && !buffer.values().is_empty() {
            return Err(malformed("vertices recorded with id lists"));
        }
        lists.push(buffer);
    }

    let Some(root) = record.views.first() else {
        return Err(malformed("no root view"));
    };
    if root.parent.is_some() {
        return Err(malformed("root view has a parent"));
    }
    for (index, view) in record.views.iter().enumerate() {
        if view.elements.len() > record.dimensions.len() {
            return Err(malformed(format!(
                "view {index} lists {} dimensions",
                view.elements.len()
            )));
        }
        if index == 0 {
            continue;
        }
        match view.parent {
            Some(parent) if (parent as usize) < index => {}
            _ => {
                return Err(malformed(format!(
                    "view {index} does not follow its parent {:?}",
                    view.parent
                )));
            }
        }
    }
    Ok(lists)
}
