//! Single-signature payment address validation.
//!
//! Address format: base58(version ‖ hash160 ‖ checksum)
//!
//! Checksum: first 4 bytes of SHA-256(SHA-256(version ‖ hash160)).
//! 25 decoded bytes encode to 34 (occasionally 35) base58 characters.

use sentinel_types::NetworkId;

use crate::sha256d;

/// Base58 alphabet (no 0, O, I, l).
const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Reverse lookup table: ASCII byte → base58 digit (0xFF = invalid).
const BASE58_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE58_ALPHABET;
    let mut i = 0;
    while i < 58 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const MIN_LEN: usize = 34;
const MAX_LEN: usize = 35;
/// version (1) + hash160 (20) + checksum (4).
const DECODED_LEN: usize = 25;
const CHECKSUM_LEN: usize = 4;

fn encode_base58(bytes: &[u8]) -> String {
    // Little-endian base58 digits of the big number.
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        let mut carry = u32::from(byte);
        for d in digits.iter_mut() {
            carry += u32::from(*d) << 8;
            *d = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat('1').take(leading_zeros));
    out.extend(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char));
    out
}

/// Decode base58 text. Returns `None` on characters outside the alphabet.
fn decode_base58(s: &str) -> Option<Vec<u8>> {
    // Little-endian bytes of the big number.
    let mut bytes: Vec<u8> = Vec::with_capacity(s.len());
    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE58_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        let mut carry = u32::from(val);
        for b in bytes.iter_mut() {
            carry += u32::from(*b) * 58;
            *b = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }
    let leading_ones = s.bytes().take_while(|&c| c == b'1').count();
    let mut out = vec![0u8; leading_ones];
    out.extend(bytes.iter().rev());
    Some(out)
}

/// Encode a version byte and a 20-byte key hash as a base58check address.
pub fn encode_address(version: u8, hash160: &[u8; 20]) -> String {
    let mut raw = Vec::with_capacity(DECODED_LEN);
    raw.push(version);
    raw.extend_from_slice(hash160);
    let checksum = sha256d(&raw);
    raw.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode_base58(&raw)
}

/// Extract the version byte of a well-formed address.
///
/// Returns `None` if the length is outside 34–35 characters, a character
/// is outside the base58 alphabet, or the checksum does not match.
pub fn address_version(address: &str) -> Option<u8> {
    if address.len() < MIN_LEN || address.len() > MAX_LEN {
        return None;
    }
    let decoded = decode_base58(address)?;
    if decoded.len() != DECODED_LEN {
        return None;
    }
    let (body, checksum) = decoded.split_at(DECODED_LEN - CHECKSUM_LEN);
    if sha256d(body)[..CHECKSUM_LEN] != *checksum {
        return None;
    }
    Some(body[0])
}

/// Whether `address` is a single-signature address of `network`.
pub fn validate_address(address: &str, network: NetworkId) -> bool {
    address_version(address) == Some(network.address_version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_bitcoin_genesis_address() {
        assert_eq!(address_version("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"), Some(0));
    }

    #[test]
    fn encode_then_validate_per_network() {
        let main = encode_address(NetworkId::Main.address_version(), &[7u8; 20]);
        let test = encode_address(NetworkId::Test.address_version(), &[7u8; 20]);
        assert!(main.starts_with('X'));
        assert!(test.starts_with('y'));
        assert_eq!(main.len(), 34);
        assert!(validate_address(&main, NetworkId::Main));
        assert!(!validate_address(&main, NetworkId::Test));
        assert!(validate_address(&test, NetworkId::Test));
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let addr = encode_address(NetworkId::Test.address_version(), &[9u8; 20]);
        let last = addr.chars().last().unwrap();
        let replacement = if last == 'a' { 'b' } else { 'a' };
        let mut corrupted = addr[..addr.len() - 1].to_string();
        corrupted.push(replacement);
        assert!(!validate_address(&corrupted, NetworkId::Test));
    }

    #[test]
    fn bad_characters_and_lengths_are_rejected() {
        let addr = encode_address(NetworkId::Test.address_version(), &[1u8; 20]);
        let with_zero = format!("0{}", &addr[1..]);
        assert!(!validate_address(&with_zero, NetworkId::Test));
        assert!(!validate_address(&addr[..33], NetworkId::Test));
        assert!(!validate_address(&format!("{addr}11"), NetworkId::Test));
        assert!(!validate_address("", NetworkId::Test));
    }

    #[test]
    fn base58_roundtrip_keeps_leading_zeros() {
        let raw = [0u8, 0, 1, 2, 3];
        let text = encode_base58(&raw);
        assert!(text.starts_with("11"));
        assert_eq!(decode_base58(&text).unwrap(), raw);
    }
}
