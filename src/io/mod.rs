//! Mesh I/O: the flat serialization record and its encodings.
//!
//! Format readers and writers plug in through [`MeshReader`] and
//! [`MeshWriter`]; [`codec::BinaryRecordCodec`] and
//! [`codec::JsonRecordCodec`] implement them over [`record::MeshRecord`].

pub mod codec;
pub mod record;

use std::io::{Read, Write};

use crate::mesh_error::MeshError;
use crate::topology::hierarchy::MeshHierarchy;

/// Trait for mesh readers that produce a hierarchy.
pub trait MeshReader {
    /// Parse a mesh from a reader.
    fn read<R: Read>(&self, reader: R) -> Result<MeshHierarchy, MeshError>;
}

/// Trait for mesh writers that serialize a hierarchy.
pub trait MeshWriter {
    /// Write `mesh` to a writer.
    fn write<W: Write>(&self, writer: W, mesh: &MeshHierarchy) -> Result<(), MeshError>;
}
