//! Bone name normalization
//!
//! Names come from fixed-width, NUL-padded character blocks written by tools
//! that disagree on case. Every decoder produces names through
//! [`normalize_name`] so skeleton and animation bones can be matched by key.

/// Truncate at the first NUL, drop surrounding whitespace and lower-case.
///
/// Invalid UTF-8 is replaced rather than rejected. The function is idempotent.
pub fn normalize_name(raw: &[u8]) -> String {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len])
        .trim()
        .to_lowercase()
}

/// Truncate at the first NUL without changing case (material names)
pub fn c_string(raw: &[u8]) -> String {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len]).into_owned()
}

/// Normalize an already-decoded string (used for lookups by caller-supplied names)
pub fn normalize_str(name: &str) -> String {
    normalize_name(name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_at_first_nul() {
        assert_eq!(normalize_name(b"Spine\0garbage"), "spine");
        assert_eq!(normalize_name(b"\0Spine"), "");
    }

    #[test]
    fn test_padding_length_does_not_matter() {
        let short = normalize_name(b"L_UpperArm\0");
        let long = normalize_name(b"L_UpperArm\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0");
        let none = normalize_name(b"L_UpperArm");
        assert_eq!(short, "l_upperarm");
        assert_eq!(short, long);
        assert_eq!(short, none);
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_name(b"  Bip01 HEAD \0\0");
        let twice = normalize_str(&once);
        assert_eq!(once, "bip01 head");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_c_string_keeps_case() {
        assert_eq!(c_string(b"Body_Skin\0\0\0"), "Body_Skin");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let name = normalize_name(&[b'A', 0xFF, b'B', 0]);
        assert!(name.starts_with('a'));
        assert!(name.ends_with('b'));
    }
}
