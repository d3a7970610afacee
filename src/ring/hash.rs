//! Hashing helpers used to place keys on the ring
use md5::{Digest, Md5};

/// The ring works over a fixed 32 bit hash space
pub type HashFunctionReturnType = u32;

/// Number of bits produced by [`key_hash`]
pub const HASH_BITS: u32 = HashFunctionReturnType::BITS;

/// MD5s the key and keeps the 4 most significant bytes of the digest, read as a big-endian `u32`.
///
/// MD5 is not used for its cryptographic properties here: it gives a uniform spread and
/// keeps placements bit-exact with other implementations of the same ring layout.
pub fn key_hash(key: &[u8]) -> HashFunctionReturnType {
    let digest = Md5::digest(key);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// `2^n`, with every `n <= 1` treated as a single bucket.
pub fn pow2(n: u32) -> u64 {
    if n > 1 {
        1u64 << n
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::{key_hash, pow2};

    #[test]
    fn hash_matches_known_vectors() {
        let test_cases = [
            ("1", 3301589560u32),
            ("2", 3357438605u32),
            ("999", 3070657373u32),
            ("0", 3486326916u32),
        ];

        for (key, expected) in test_cases {
            assert_eq!(key_hash(key.as_bytes()), expected, "key {}", key);
        }
    }

    #[test]
    fn test_pow2() {
        let test_cases = [(2u32, 4u64), (3, 8), (4, 16), (32, 4294967296)];
        for (input, output) in test_cases {
            assert_eq!(pow2(input), output);
        }
    }

    #[test]
    fn pow2_single_bucket() {
        assert_eq!(pow2(0), 1);
        assert_eq!(pow2(1), 1);
    }
}
