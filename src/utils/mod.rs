// src/utils/mod.rs

pub mod cache;
pub mod config;
pub mod env;
pub mod rate_limit;

use sha2::{Digest, Sha256};

/// Deterministic fingerprint of a request's relevant parameters, used as a
/// cache key. `serde_json::Value` objects serialize with sorted keys, so the
/// same parameters always hash identically.
pub fn request_fingerprint(payload: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = request_fingerprint(&json!({"name": "acme", "hint": "leeds"}));
        let b = request_fingerprint(&json!({"hint": "leeds", "name": "acme"}));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_differs_across_inputs() {
        let a = request_fingerprint(&json!({"name": "acme"}));
        let b = request_fingerprint(&json!({"name": "acme widgets"}));
        assert_ne!(a, b);
    }
}
