//! Error types for asset decoding

use thiserror::Error;

/// Asset family a decode error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Skeleton,
    Mesh,
    Animation,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skeleton => write!(f, "skeleton"),
            Self::Mesh => write!(f, "mesh"),
            Self::Animation => write!(f, "animation"),
        }
    }
}

/// Errors that can occur when decoding skeleton, mesh or animation buffers
///
/// A decoder that returns an error never hands back a partial structure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// A read or seek would run past the end of the buffer
    #[error("read of {len} bytes at offset 0x{offset:X} exceeds buffer length {buffer_len}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },
    /// The version field is not one the decoder understands
    #[error("unsupported {kind} version: {version}")]
    UnsupportedVersion { kind: AssetKind, version: i64 },
    /// A count, offset, bone index or pool index is structurally invalid
    #[error("malformed reference: {0}")]
    MalformedReference(String),
}

impl FormatError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedReference(msg.into())
    }
}
