//! SHA-256 hashing and 256-bit distance arithmetic.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 applied twice, as used by base58check checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Hash a text token into a 256-bit unsigned integer (big-endian bytes).
///
/// The token is hashed as its UTF-8 text, so `"ab12-0"` and the block hash
/// string as printed by the node hash the same on every machine.
pub fn hash_value(token: &str) -> [u8; 32] {
    sha256(token.as_bytes())
}

/// `|a - b|` for two big-endian 256-bit unsigned integers.
pub fn distance(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = i16::from(hi[i]) - i16::from(lo[i]) - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be(n: u128) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&n.to_be_bytes());
        out
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256d_is_double() {
        assert_eq!(sha256d(b"sentinel"), sha256(&sha256(b"sentinel")));
    }

    #[test]
    fn hash_value_is_deterministic() {
        assert_eq!(hash_value("ab12-0"), hash_value("ab12-0"));
        assert_ne!(hash_value("ab12-0"), hash_value("ab12-1"));
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(distance(&be(5), &be(2)), be(3));
        assert_eq!(distance(&be(2), &be(5)), be(3));
        assert_eq!(distance(&be(9), &be(9)), [0u8; 32]);
    }

    #[test]
    fn distance_borrows_across_bytes() {
        assert_eq!(distance(&be(0x1_0000), &be(1)), be(0xFFFF));
        assert_eq!(distance(&be(u128::MAX), &be(0)), be(u128::MAX));
    }

    #[test]
    fn distance_uses_high_bytes() {
        let mut high = [0u8; 32];
        high[0] = 1;
        // 2^248 - 1
        let mut expected = [0xFFu8; 32];
        expected[0] = 0;
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(distance(&high, &one), expected);
    }
}
