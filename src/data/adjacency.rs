//! CSR (Compressed Sparse Row) list-of-lists containers.
//!
//! [`AdjacencyBuffer`] stores one variable-length list per dense index as an
//! `offsets` array plus one packed `values` array; list `i` lives in
//! `values[offsets[i]..offsets[i + 1]]`. It backs the immutable boundary
//! relation of every element.
//!
//! [`SparseAdjacency`] adds a key → list map on top and is rebuilt wholesale by
//! the derived-relation caches: a first pass measures every list, a second pass
//! fills them, so the packed array is allocated exactly once per rebuild.

use hashbrown::HashMap as FastMap;

use crate::mesh_error::MeshError;
use crate::topology::ids::ElementId;

/// Offsets are `u32`, so one buffer holds at most `u32::MAX` entries.
#[inline]
fn offset(n: usize) -> u32 {
    debug_assert!(
        u32::try_from(n).is_ok(),
        "adjacency buffer exceeds u32::MAX entries"
    );
    n as u32
}

/// Dense CSR buffer of lists indexed `0..len()`.
///
/// Offsets are stored as `u32`: a buffer holds at most `u32::MAX` entries and
/// `u32::MAX` lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjacencyBuffer<T> {
    offsets: Vec<u32>,
    values: Vec<T>,
}

impl<T> Default for AdjacencyBuffer<T> {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            values: Vec::new(),
        }
    }
}

impl<T: Copy + Default> AdjacencyBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate room for `lists` lists holding `values` entries in total.
    pub fn with_capacity(lists: usize, values: usize) -> Self {
        let mut offsets = Vec::with_capacity(lists + 1);
        offsets.push(0);
        Self {
            offsets,
            values: Vec::with_capacity(values),
        }
    }

    /// Rebuild from raw CSR arrays, checking that offsets start at zero, never
    /// decrease and end at `values.len()`.
    pub fn from_parts(offsets: Vec<u32>, values: Vec<T>) -> Result<Self, MeshError> {
        if offsets.first() != Some(&0) {
            return Err(MeshError::MalformedSerialization(
                "offsets must start at 0".into(),
            ));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(MeshError::MalformedSerialization(
                "offsets must be non-decreasing".into(),
            ));
        }
        if offsets.last().map(|&o| o as usize) != Some(values.len()) {
            return Err(MeshError::MalformedSerialization(format!(
                "offsets end at {:?} but {} values are present",
                offsets.last(),
                values.len()
            )));
        }
        Ok(Self { offsets, values })
    }

    /// Number of lists.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries over all lists.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.values.len()
    }

    /// Append a new list of `count` default entries and hand it out for filling.
    pub fn append(&mut self, count: usize) -> &mut [T] {
        let start = self.values.len();
        self.values.resize(start + count, T::default());
        self.offsets.push(offset(start + count));
        &mut self.values[start..]
    }

    /// Append a new list copied from `items`; returns its index.
    pub fn push_list(&mut self, items: &[T]) -> usize {
        self.values.extend_from_slice(items);
        self.offsets.push(offset(self.values.len()));
        self.len() - 1
    }

    /// List `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[T]> {
        let start = *self.offsets.get(index)? as usize;
        let end = *self.offsets.get(index + 1)? as usize;
        Some(&self.values[start..end])
    }

    /// List `index`; empty past the end.
    #[inline]
    pub fn range(&self, index: usize) -> &[T] {
        self.get(index).unwrap_or(&[])
    }

    #[inline]
    pub fn range_mut(&mut self, index: usize) -> Option<&mut [T]> {
        let start = *self.offsets.get(index)? as usize;
        let end = *self.offsets.get(index + 1)? as usize;
        Some(&mut self.values[start..end])
    }

    /// Drop every list but keep the allocations for the next rebuild.
    pub fn clear(&mut self) {
        self.offsets.truncate(1);
        self.values.clear();
    }

    /// Iterate lists in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.values[w[0] as usize..w[1] as usize])
    }

    #[inline]
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// CSR lists keyed by element id; keys without a list read as empty.
#[derive(Clone, Debug, Default)]
pub struct SparseAdjacency<T> {
    slots: FastMap<ElementId, u32>,
    lists: AdjacencyBuffer<T>,
}

impl<T: Copy + Default> SparseAdjacency<T> {
    pub fn new() -> Self {
        Self {
            slots: FastMap::new(),
            lists: AdjacencyBuffer::new(),
        }
    }

    /// Append a list of `count` entries for `key` and hand it out for filling.
    ///
    /// Each key is inserted once per rebuild; inserting it again redirects the
    /// key to the new list.
    pub fn insert_growing(&mut self, key: ElementId, count: usize) -> &mut [T] {
        let slot = offset(self.lists.len());
        self.slots.insert(key, slot);
        self.lists.append(count)
    }

    /// The list stored for `key`.
    #[inline]
    pub fn range(&self, key: ElementId) -> &[T] {
        match self.slots.get(&key) {
            Some(&slot) => self.lists.range(slot as usize),
            None => &[],
        }
    }

    #[inline]
    pub fn range_mut(&mut self, key: ElementId) -> Option<&mut [T]> {
        let slot = *self.slots.get(&key)?;
        self.lists.range_mut(slot as usize)
    }

    #[inline]
    pub fn contains_key(&self, key: ElementId) -> bool {
        self.slots.contains_key(&key)
    }

    /// Number of keys with a list.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of entries over all lists.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.lists.total_len()
    }

    pub fn keys(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.slots.keys().copied()
    }

    /// O(1) reset; allocations are kept.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.lists.clear();
    }

    /// Replace the contents with `pairs` grouped by key.
    ///
    /// Lists are laid out in ascending key order and keep the relative order
    /// in which their values appear in `pairs`.
    pub fn rebuild_grouped(&mut self, pairs: &[(ElementId, T)]) {
        self.clear();

        // 1) degree counts
        let mut degree: FastMap<ElementId, u32> = FastMap::new();
        for &(key, _) in pairs {
            *degree.entry(key).or_insert(0) += 1;
        }
        let mut keys: Vec<ElementId> = degree.keys().copied().collect();
        keys.sort_unstable();

        // 2) allocate one list per key
        for &key in &keys {
            self.insert_growing(key, degree[&key] as usize);
        }

        // 3) fill with per-key cursors
        let mut cursor: FastMap<ElementId, usize> = FastMap::with_capacity(keys.len());
        for &(key, value) in pairs {
            let pos = cursor.entry(key).or_insert(0);
            if let Some(list) = self.range_mut(key) {
                list[*pos] = value;
            }
            *pos += 1;
        }
    }
}
