//! API key digesting.

use sha2::{Digest, Sha256};

/// Hash a raw API key with SHA-256 and return the lowercase hex digest.
///
/// Raw keys are never stored or compared; every lookup goes through this
/// digest. Constant-time comparison is not required because the digest is
/// used as an exact-match lookup key, not compared against a candidate list.
pub fn hash_api_key(raw: &str) -> String {
    let mut sha = Sha256::new();
    sha.update(raw.as_bytes());
    hex::encode(sha.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_sha256_hex() {
        // SHA-256("abc"), a fixed reference vector.
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn different_keys_produce_different_digests() {
        assert_ne!(hash_api_key("mpk_a"), hash_api_key("mpk_b"));
    }
}
