//! Content fingerprints for cache tiers.

use sha2::{Digest, Sha256};

/// Lowercase hex sha256 of `bytes`.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawExport, RawRun};

    fn snapshot_bytes(run_id: &str) -> Vec<u8> {
        let export = RawExport {
            runs: vec![RawRun {
                run_id: run_id.to_string(),
                ..RawRun::default()
            }],
        };
        bincode::serialize(&export).unwrap()
    }

    #[test]
    fn hash_stability() {
        let a = fingerprint_bytes(&snapshot_bytes("General-0"));
        let b = fingerprint_bytes(&snapshot_bytes("General-0"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = fingerprint_bytes(&snapshot_bytes("General-0"));
        let b = fingerprint_bytes(&snapshot_bytes("General-1"));
        assert_ne!(a, b);
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            fingerprint_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
