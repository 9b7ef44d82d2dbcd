//! Timing-safe equality.

/// Compare two byte strings without leaking where they first differ.
///
/// A length mismatch returns early; token length is not secret. For inputs of
/// equal length every byte pair is visited and the XOR differences are
/// OR-folded, so the running time depends only on the length.
#[inline(never)]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    // Keep the optimizer from turning the fold into an early-exit memcmp.
    std::hint::black_box(diff) == 0
}

/// [`constant_time_eq`] over string contents.
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_inputs() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_single_byte_difference() {
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"xbc", b"abc"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"a"));
    }

    #[test]
    fn test_str_variant() {
        assert!(constant_time_str_eq("token", "token"));
        assert!(!constant_time_str_eq("token", "Token"));
    }
}
