use xxhash_rust::xxh64::xxh64;

const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encode a u64 value as a base62 string (11 chars, zero-padded).
fn base62_encode(mut value: u64) -> String {
    if value == 0 {
        return "0".repeat(11);
    }
    let mut result = Vec::with_capacity(11);
    while value > 0 {
        let idx = (value % 62) as usize;
        result.push(BASE62_CHARS[idx]);
        value /= 62;
    }
    while result.len() < 11 {
        result.push(b'0');
    }
    result.reverse();
    String::from_utf8(result).expect("base62 chars are valid UTF-8")
}

/// Compute the freshness hash of a module's file content.
///
/// hash = base62(xxhash64(bytes)); stored on `ModuleIR::file_hash` at build
/// time and recomputed by the freshness tracker to detect drift.
pub fn hash_file_content(bytes: &[u8]) -> String {
    base62_encode(xxh64(bytes, 0))
}

/// Stable id generator for patch-plan operations and local-patch markers.
/// Not a content hash: combines a counter with the seed text so ids are
/// deterministic given the same bundle construction order.
pub fn stable_id(seed: &str, counter: u64) -> String {
    let mut input = String::with_capacity(seed.len() + 20);
    input.push_str(seed);
    input.push('\0');
    input.push_str(&counter.to_string());
    base62_encode(xxh64(input.as_bytes(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let h1 = hash_file_content(b"def f():\n    return 1\n");
        let h2 = hash_file_content(b"def f():\n    return 1\n");
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_length_is_fixed() {
        assert_eq!(hash_file_content(b"").len(), 11);
        assert_eq!(hash_file_content(b"x").len(), 11);
    }

    #[test]
    fn hash_changes_with_content() {
        let h1 = hash_file_content(b"a = 1\n");
        let h2 = hash_file_content(b"a = 2\n");
        assert_ne!(h1, h2);
    }

    #[test]
    fn stable_id_differs_by_counter() {
        assert_ne!(stable_id("seed", 0), stable_id("seed", 1));
    }

    #[test]
    fn base62_encoding_zero_is_all_zero_chars() {
        let encoded = base62_encode(0);
        assert_eq!(encoded.len(), 11);
        assert!(encoded.chars().all(|c| c == '0'));
    }
}
