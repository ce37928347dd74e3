use sha2::{Digest, Sha256};

/// SHA-256 of a byte buffer as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_well_formed() {
        let a = sha256_hex(b"tag");
        let b = sha256_hex(b"tag");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_content_different_digest() {
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }
}
