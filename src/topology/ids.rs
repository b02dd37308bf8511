//! Strong, zero-cost handles for elements, views and regions.
//!
//! Elements are addressed by `(dimension, ElementId)`: ids are dense per
//! topological dimension, assigned in creation order and never reused, since
//! the store is append-only. Views and regions get their own id types so the
//! three index spaces cannot be mixed up.
//!
//! All three wrap a `u32`, are `repr(transparent)` and serialize as a bare
//! integer.

use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                $name(raw)
            }

            /// Returns the raw `u32`.
            #[inline]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Returns the id as a `usize` suitable for indexing dense buffers.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            // regions are keyed by id, never by dense index
            #[allow(dead_code)]
            #[inline]
            pub(crate) const fn from_index(index: usize) -> Self {
                $name(index as u32)
            }
        }

        /// Displays as `Name(raw)`.
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }

        /// Prints only the raw integer.
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(raw: u32) -> Self {
                $name(raw)
            }
        }

        impl From<$name> for u32 {
            #[inline]
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

id_newtype!(
    /// Index of an element within its topological dimension.
    ElementId
);

id_newtype!(
    /// Index of a mesh view in the hierarchy; the root view is always `ViewId(0)`.
    ViewId
);

id_newtype!(
    /// Externally assignable region identifier (not necessarily dense).
    RegionId
);

impl ViewId {
    /// The root view of every hierarchy.
    pub const ROOT: ViewId = ViewId(0);
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::{assert_eq_align, assert_eq_size};

    assert_eq_size!(ElementId, u32);
    assert_eq_align!(ElementId, u32);
    assert_eq_size!(ViewId, u32);
    assert_eq_size!(RegionId, u32);
}
