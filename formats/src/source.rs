//! Seam to the archive layer that hands out named byte buffers

/// A named blob delivered by the external archive or file reader.
///
/// The decoders never open files themselves; anything that can produce a
/// name and the raw bytes can feed them.
pub trait NamedBuffer {
    fn name(&self) -> &str;
    fn content(&self) -> &[u8];
}

/// In-memory named buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBuffer {
    pub name: String,
    pub data: Vec<u8>,
}

impl MemoryBuffer {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

impl NamedBuffer for MemoryBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &[u8] {
        &self.data
    }
}

impl NamedBuffer for (String, Vec<u8>) {
    fn name(&self) -> &str {
        &self.0
    }

    fn content(&self) -> &[u8] {
        &self.1
    }
}
