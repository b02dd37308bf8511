//! Byte and text encodings of [`MeshRecord`].
//!
//! Both encodings wrap the record in an envelope carrying [`RECORD_MAGIC`]
//! and [`RECORD_VERSION`]; decoding rejects any other pair.

use std::io::{Read, Write};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::io::record::{self, MeshRecord};
use crate::io::{MeshReader, MeshWriter};
use crate::mesh_error::MeshError;
use crate::topology::hierarchy::MeshHierarchy;

pub const RECORD_MAGIC: u32 = 0x42F4_2F42;
pub const RECORD_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<R> {
    magic: u32,
    version: u32,
    record: R,
}

impl<R> Envelope<R> {
    fn new(record: R) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            record,
        }
    }

    fn open(self) -> Result<R, MeshError> {
        if self.magic != RECORD_MAGIC {
            return Err(MeshError::MalformedSerialization(format!(
                "bad magic {:#010x}",
                self.magic
            )));
        }
        if self.version != RECORD_VERSION {
            return Err(MeshError::MalformedSerialization(format!(
                "unsupported record version {} (expected {RECORD_VERSION})",
                self.version
            )));
        }
        Ok(self.record)
    }
}

/// Encode `record` with bincode.
pub fn encode_record(record: &MeshRecord) -> Result<Bytes, MeshError> {
    let buf = bincode::serialize(&Envelope::new(record))?;
    Ok(Bytes::from(buf))
}

pub fn decode_record(bytes: &[u8]) -> Result<MeshRecord, MeshError> {
    bincode::deserialize::<Envelope<MeshRecord>>(bytes)?.open()
}

/// Encode `record` as JSON.
pub fn encode_record_json(record: &MeshRecord, pretty: bool) -> Result<String, MeshError> {
    let envelope = Envelope::new(record);
    let text = if pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    Ok(text)
}

pub fn decode_record_json(text: &str) -> Result<MeshRecord, MeshError> {
    serde_json::from_str::<Envelope<MeshRecord>>(text)?.open()
}

/// Serialize and bincode-encode `mesh` in one step.
pub fn encode_hierarchy(mesh: &MeshHierarchy) -> Result<Bytes, MeshError> {
    encode_record(&record::serialize(mesh)?)
}

pub fn decode_hierarchy(bytes: &[u8]) -> Result<MeshHierarchy, MeshError> {
    record::deserialize(&decode_record(bytes)?)
}

/// Reads and writes hierarchies as bincode-encoded records.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryRecordCodec;

impl MeshReader for BinaryRecordCodec {
    fn read<R: Read>(&self, mut reader: R) -> Result<MeshHierarchy, MeshError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        decode_hierarchy(&buf)
    }
}

impl MeshWriter for BinaryRecordCodec {
    fn write<W: Write>(&self, mut writer: W, mesh: &MeshHierarchy) -> Result<(), MeshError> {
        let bytes = encode_hierarchy(mesh)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

/// Reads and writes hierarchies as JSON records.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRecordCodec {
    pub pretty: bool,
}

impl MeshReader for JsonRecordCodec {
    fn read<R: Read>(&self, reader: R) -> Result<MeshHierarchy, MeshError> {
        let envelope: Envelope<MeshRecord> = serde_json::from_reader(reader)?;
        record::deserialize(&envelope.open()?)
    }
}

impl MeshWriter for JsonRecordCodec {
    fn write<W: Write>(&self, writer: W, mesh: &MeshHierarchy) -> Result<(), MeshError> {
        let envelope = Envelope::new(record::serialize(mesh)?);
        if self.pretty {
            serde_json::to_writer_pretty(writer, &envelope)?;
        } else {
            serde_json::to_writer(writer, &envelope)?;
        }
        Ok(())
    }
}
