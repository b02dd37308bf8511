//! Geometric coordinate storage.
//!
//! Coordinates are stored flat with a fixed geometric dimension per point.
//! [`VertexBuffer`] holds one tuple per vertex; [`HolePoints`] holds the
//! auxiliary hole points attached to PLC elements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::ids::ElementId;

/// Coordinates of all vertices, indexed by vertex id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexBuffer {
    dimension: usize,
    count: usize,
    values: Vec<f64>,
}

impl VertexBuffer {
    /// Empty buffer for points with `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            count: 0,
            values: Vec::new(),
        }
    }

    /// Wrap a flat coordinate array; its length must be a multiple of `dimension`.
    pub fn from_flat(dimension: usize, count: usize, values: Vec<f64>) -> Result<Self, MeshError> {
        if values.len() != dimension * count {
            return Err(MeshError::GeometricDimensionMismatch {
                expected: dimension * count,
                found: values.len(),
            });
        }
        Ok(Self {
            dimension,
            count,
            values,
        })
    }

    /// Returns the spatial dimension per point.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored points.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The flat coordinate array, point-major.
    #[inline]
    pub fn as_flat(&self) -> &[f64] {
        &self.values
    }

    fn check_len(&self, coords: &[f64]) -> Result<(), MeshError> {
        if coords.len() != self.dimension {
            return Err(MeshError::GeometricDimensionMismatch {
                expected: self.dimension,
                found: coords.len(),
            });
        }
        Ok(())
    }

    /// Append a point; returns its index.
    pub fn push(&mut self, coords: &[f64]) -> Result<usize, MeshError> {
        self.check_len(coords)?;
        self.values.extend_from_slice(coords);
        self.count += 1;
        Ok(self.count - 1)
    }

    /// Coordinates of point `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[f64]> {
        if index >= self.count {
            return None;
        }
        let start = index * self.dimension;
        Some(&self.values[start..start + self.dimension])
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [f64]> {
        if index >= self.count {
            return None;
        }
        let start = index * self.dimension;
        Some(&mut self.values[start..start + self.dimension])
    }

    /// Overwrite point `index`. Returns `Ok(false)` when the index is past the end.
    pub fn set(&mut self, index: usize, coords: &[f64]) -> Result<bool, MeshError> {
        self.check_len(coords)?;
        match self.get_mut(index) {
            Some(slot) => {
                slot.copy_from_slice(coords);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Change the dimension, keeping the first `min(old, new)` components of
    /// every point and zero-filling the rest.
    pub fn set_dimension(&mut self, dimension: usize) {
        if dimension == self.dimension {
            return;
        }
        let keep = self.dimension.min(dimension);
        let mut values = vec![0.0; self.count * dimension];
        for i in 0..self.count {
            let src = &self.values[i * self.dimension..i * self.dimension + keep];
            values[i * dimension..i * dimension + keep].copy_from_slice(src);
        }
        self.values = values;
        self.dimension = dimension;
    }

    /// Iterate points in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.count).filter_map(move |i| self.get(i))
    }
}

/// Hole points of PLC elements, keyed by PLC id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HolePoints {
    dimension: usize,
    points: BTreeMap<ElementId, VertexBuffer>,
}

impl HolePoints {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, plc: ElementId, coords: &[f64]) -> Result<(), MeshError> {
        let dimension = self.dimension;
        self.points
            .entry(plc)
            .or_insert_with(|| VertexBuffer::new(dimension))
            .push(coords)
            .map(|_| ())
    }

    /// Hole points of `plc`, in insertion order.
    pub fn iter(&self, plc: ElementId) -> impl Iterator<Item = &[f64]> + '_ {
        self.points.get(&plc).into_iter().flat_map(|buf| buf.iter())
    }

    pub fn count(&self, plc: ElementId) -> usize {
        self.points.get(&plc).map_or(0, VertexBuffer::len)
    }

    /// Every PLC with hole points, ascending.
    pub fn plcs(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.points.keys().copied()
    }

    pub fn set_dimension(&mut self, dimension: usize) {
        self.dimension = dimension;
        for buf in self.points.values_mut() {
            buf.set_dimension(dimension);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_get_set() {
        let mut buf = VertexBuffer::new(2);
        assert_eq!(buf.push(&[1.0, 2.0]).unwrap(), 0);
        assert_eq!(buf.push(&[3.0, 4.0]).unwrap(), 1);
        assert_eq!(
            buf.push(&[1.0]),
            Err(MeshError::GeometricDimensionMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.get(1), Some(&[3.0, 4.0][..]));
        assert_eq!(buf.get(2), None);
        assert!(buf.set(0, &[5.0, 6.0]).unwrap());
        assert!(!buf.set(9, &[5.0, 6.0]).unwrap());
        assert_eq!(buf.as_flat(), &[5.0, 6.0, 3.0, 4.0]);
    }

    #[test]
    fn set_dimension_repads() {
        let mut buf = VertexBuffer::new(2);
        buf.push(&[1.0, 2.0]).unwrap();
        buf.push(&[3.0, 4.0]).unwrap();
        buf.set_dimension(3);
        assert_eq!(buf.get(0), Some(&[1.0, 2.0, 0.0][..]));
        assert_eq!(buf.get(1), Some(&[3.0, 4.0, 0.0][..]));
        buf.set_dimension(1);
        assert_eq!(buf.as_flat(), &[1.0, 3.0]);
    }

    #[test]
    fn zero_dimensional_points_still_count() {
        let mut buf = VertexBuffer::new(0);
        buf.push(&[]).unwrap();
        buf.push(&[]).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.get(1), Some(&[][..]));
    }

    #[test]
    fn from_flat_checks_length() {
        assert!(VertexBuffer::from_flat(3, 2, vec![0.0; 6]).is_ok());
        assert!(VertexBuffer::from_flat(3, 2, vec![0.0; 5]).is_err());
    }

    #[test]
    fn hole_points_by_plc() {
        let mut holes = HolePoints::new(2);
        let plc = ElementId::new(4);
        holes.push(plc, &[0.5, 0.5]).unwrap();
        holes.push(plc, &[0.25, 0.75]).unwrap();
        assert_eq!(holes.count(plc), 2);
        assert_eq!(holes.count(ElementId::new(0)), 0);
        let pts: Vec<_> = holes.iter(plc).collect();
        assert_eq!(pts, vec![&[0.5, 0.5][..], &[0.25, 0.75][..]]);
        holes.set_dimension(3);
        assert_eq!(holes.iter(plc).next(), Some(&[0.5, 0.5, 0.0][..]));
        assert_eq!(holes.plcs().collect::<Vec<_>>(), vec![plc]);
    }
}
