//! Structural validation of a [`MeshHierarchy`].

use std::collections::HashSet;

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::element_tag::{DIMENSION_COUNT, ElementTag};
use crate::topology::hierarchy::MeshHierarchy;
use crate::topology::ids::ElementId;
use crate::topology::store::ElementKey;

/// Optional validation toggles for hierarchy checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Every element is reachable through the dedup index under its own key.
    pub check_dedup_index: bool,
    /// Boundary lists have the size prescribed by the tag and name live elements.
    pub check_boundary_closure: bool,
    /// View members are live and non-root cells are linked to the parent view.
    pub check_views: bool,
    /// What to do with a finding.
    pub handling: ValidationHandling,
}

impl ValidationOptions {
    /// Enable all checks and fail on the first finding.
    pub fn all() -> Self {
        Self {
            check_dedup_index: true,
            check_boundary_closure: true,
            check_views: true,
            handling: ValidationHandling::Error,
        }
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Behavior on a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationHandling {
    /// Skip validation entirely.
    Ignore,
    /// Log a warning per finding and keep going.
    Warn,
    /// Return the first finding as [`MeshError::InvariantViolation`].
    Error,
}

struct Findings {
    handling: ValidationHandling,
    count: usize,
}

impl Findings {
    fn report(&mut self, message: String) -> Result<(), MeshError> {
        self.count += 1;
        match self.handling {
            ValidationHandling::Error => Err(MeshError::InvariantViolation(message)),
            ValidationHandling::Warn => {
                log::warn!("mesh validation: {message}");
                Ok(())
            }
            ValidationHandling::Ignore => Ok(()),
        }
    }
}

/// Validate `mesh` against `options`. Returns the number of findings
/// (always 0 in `Error` mode, since the first one is returned as an error).
pub fn validate_hierarchy(
    mesh: &MeshHierarchy,
    options: ValidationOptions,
) -> Result<usize, MeshError> {
    if options.handling == ValidationHandling::Ignore {
        return Ok(0);
    }
    let mut findings = Findings {
        handling: options.handling,
        count: 0,
    };
    if options.check_dedup_index {
        check_dedup_index(mesh, &mut findings)?;
    }
    if options.check_boundary_closure {
        check_boundary_closure(mesh, &mut findings)?;
    }
    if options.check_views {
        check_views(mesh, &mut findings)?;
    }
    Ok(findings.count)
}

fn check_dedup_index(mesh: &MeshHierarchy, findings: &mut Findings) -> Result<(), MeshError> {
    let store = mesh.store();
    for dim in 1..DIMENSION_COUNT {
        let Some(buffer) = store.buffer(dim) else {
            continue;
        };
        if buffer.index.len() != buffer.len() {
            findings.report(format!(
                "dimension {dim}: {} indexed keys for {} elements",
                buffer.index.len(),
                buffer.len()
            ))?;
        }
        for id in store.element_ids(dim) {
            let tag = buffer.tags[id.index()];
            let ids: &[ElementId] = match tag {
                ElementTag::Plc => store.boundary_ids(dim, id, 1)?,
                _ => store.boundary_ids(dim, id, 0)?,
            };
            let found = buffer.index.get(&ElementKey::new(tag, ids)).copied();
            if found != Some(id) {
                findings.report(format!(
                    "{tag} {dim}/{id} is indexed as {found:?}"
                ))?;
            }
        }
    }
    Ok(())
}

fn check_boundary_closure(mesh: &MeshHierarchy, findings: &mut Findings) -> Result<(), MeshError> {
    let store = mesh.store();
    for dim in 1..DIMENSION_COUNT {
        for id in store.element_ids(dim) {
            let tag = store.element_tag(dim, id)?;
            for b in 0..dim {
                let list = store.boundary_ids(dim, id, b)?;
                if let Some(expected) = tag.boundary_count(b) {
                    if list.len() != expected {
                        findings.report(format!(
                            "{tag} {dim}/{id}: {} boundary elements at dimension {b}, expected {expected}",
                            list.len()
                        ))?;
                    }
                }
                let mut seen = HashSet::new();
                for &sub in list {
                    if !store.contains(b, sub) {
                        findings.report(format!(
                            "{tag} {dim}/{id}: boundary element {b}/{sub} does not exist"
                        ))?;
                    }
                    if !seen.insert(sub) {
                        findings.report(format!(
                            "{tag} {dim}/{id}: boundary element {b}/{sub} listed twice"
                        ))?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_views(mesh: &MeshHierarchy, findings: &mut Findings) -> Result<(), MeshError> {
    let store = mesh.store();
    let cell_dim = store.cell_dimension();
    for view in mesh.views() {
        for dim in 0..DIMENSION_COUNT {
            for &id in view.elements(dim) {
                if !store.contains(dim, id) {
                    findings.report(format!("view {}: element {dim}/{id} does not exist", view.id()))?;
                    continue;
                }
                let Some(parent) = view.parent() else {
                    continue;
                };
                if cell_dim != Some(dim) {
                    continue;
                }
                let parent_view = mesh.view(parent)?;
                let linked = parent_view.contains(dim, id)
                    || store
                        .parent(dim, id)?
                        .is_some_and(|ancestor| parent_view.contains(dim, ancestor));
                if !linked {
                    findings.report(format!(
                        "view {}: cell {id} is not linked to parent view {parent}",
                        view.id()
                    ))?;
                }
            }
        }
        if let Some(parent) = view.parent() {
            if parent.index() >= view.id().index() {
                findings.report(format!(
                    "view {} precedes its parent {parent}",
                    view.id()
                ))?;
            }
        }
    }
    Ok(())
}

impl DebugInvariants for MeshHierarchy {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "MeshHierarchy");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        validate_hierarchy(self, ValidationOptions::all()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ids::ViewId;

    fn quad_mesh() -> MeshHierarchy {
        let mut mesh = MeshHierarchy::new(2);
        let v: Vec<_> = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
            .iter()
            .map(|c| mesh.create_vertex(c).unwrap())
            .collect();
        mesh.get_or_create_element(ElementTag::Quadrilateral, &v)
            .unwrap();
        mesh
    }

    #[test]
    fn fresh_mesh_validates() {
        let mesh = quad_mesh();
        assert_eq!(validate_hierarchy(&mesh, ValidationOptions::all()), Ok(0));
        assert!(mesh.invariants_hold());
        mesh.debug_assert_invariants();
    }

    #[test]
    fn broken_index_is_reported() {
        let mut mesh = quad_mesh();
        mesh.store_mut().buffers_mut()[1].index.clear();
        let err = validate_hierarchy(&mesh, ValidationOptions::all()).unwrap_err();
        assert!(matches!(err, MeshError::InvariantViolation(_)));

        let warn = ValidationOptions {
            handling: ValidationHandling::Warn,
            ..ValidationOptions::all()
        };
        // one count mismatch plus four unindexed edges
        assert_eq!(validate_hierarchy(&mesh, warn), Ok(5));
        let ignore = ValidationOptions {
            handling: ValidationHandling::Ignore,
            ..ValidationOptions::all()
        };
        assert_eq!(validate_hierarchy(&mesh, ignore), Ok(0));
    }

    #[test]
    fn unlinked_view_cell_is_reported() {
        let mut mesh = quad_mesh();
        let child = mesh.make_child(ViewId::ROOT).unwrap();
        let grandchild = mesh.make_child(child).unwrap();
        mesh.view_mut(grandchild).elements[2].insert(ElementId::new(0));
        let warn = ValidationOptions {
            handling: ValidationHandling::Warn,
            ..ValidationOptions::all()
        };
        assert_eq!(validate_hierarchy(&mesh, warn), Ok(1));
    }
}
