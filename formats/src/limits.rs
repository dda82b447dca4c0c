//! Structural sanity limits applied while decoding

use serde::{Deserialize, Serialize};

/// Upper bounds on counts read from asset headers.
///
/// A count above its limit is reported as a malformed reference instead of
/// triggering a huge allocation from a corrupt header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeLimits {
    /// Maximum bones in a skeleton or animation (default: 1024)
    #[serde(default = "default_max_bones")]
    pub max_bones: u32,
    /// Maximum frames in an animation clip (default: 100000)
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
    /// Maximum vertices or indices in a mesh (default: 1000000)
    #[serde(default = "default_max_vertices")]
    pub max_vertices: u32,
}

fn default_max_bones() -> u32 {
    1024
}
fn default_max_frames() -> u32 {
    100_000
}
fn default_max_vertices() -> u32 {
    1_000_000
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_bones: default_max_bones(),
            max_frames: default_max_frames(),
            max_vertices: default_max_vertices(),
        }
    }
}

impl DecodeLimits {
    pub(crate) fn check_bones(&self, count: u32) -> Result<usize, crate::FormatError> {
        check(count, self.max_bones, "bone count")
    }

    pub(crate) fn check_frames(&self, count: u32) -> Result<usize, crate::FormatError> {
        check(count, self.max_frames, "frame count")
    }

    pub(crate) fn check_vertices(&self, count: u32, what: &str) -> Result<usize, crate::FormatError> {
        check(count, self.max_vertices, what)
    }
}

fn check(count: u32, max: u32, what: &str) -> Result<usize, crate::FormatError> {
    if count > max {
        return Err(crate::FormatError::malformed(format!(
            "{} {} exceeds limit {}",
            what, count, max
        )));
    }
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_bones, 1024);
        assert_eq!(limits.max_frames, 100_000);
        assert_eq!(limits.max_vertices, 1_000_000);
    }

    #[test]
    fn test_check_bones() {
        let limits = DecodeLimits {
            max_bones: 2,
            ..Default::default()
        };
        assert_eq!(limits.check_bones(2).unwrap(), 2);
        assert!(limits.check_bones(3).is_err());
    }
}
