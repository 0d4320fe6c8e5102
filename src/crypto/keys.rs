//! Key derivation from the project secret.
//!
//! The project secret is an arbitrary-length string, not key material of
//! the right size, so both keys are fixed-length SHA-256 normalizations:
//! the cipher key hashes the secret directly, the MAC key hashes it under
//! a domain prefix so the two can never collide.

use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

/// Domain prefix separating the MAC key from the cipher key.
const MAC_KEY_CONTEXT: &[u8] = b"keybolt-mac:";

/// Derived cipher and MAC keys for one project secret.
#[derive(Debug, Clone, Copy)]
pub struct DerivedKeys {
    /// AES-256 key: SHA-256(secret).
    pub cipher: [u8; 32],
    /// HMAC-SHA256 key: SHA-256("keybolt-mac:" || secret).
    pub mac: [u8; 32],
}

/// Cache for derived key pairs.
static KEY_CACHE: OnceCell<RwLock<HashMap<String, DerivedKeys>>> = OnceCell::new();

/// Derive the cipher/MAC key pair for a secret.
///
/// Derivation is deterministic, so pairs are cached after first use.
pub fn derive_keys(secret: &str) -> DerivedKeys {
    let cache = KEY_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(guard) = cache.read() {
        if let Some(keys) = guard.get(secret) {
            return *keys;
        }
    }

    let keys = DerivedKeys {
        cipher: Sha256::digest(secret.as_bytes()).into(),
        mac: Sha256::new()
            .chain_update(MAC_KEY_CONTEXT)
            .chain_update(secret.as_bytes())
            .finalize()
            .into(),
    };

    // Best-effort insert. If locking fails, still return the derived keys.
    if let Ok(mut guard) = cache.write() {
        guard.insert(secret.to_string(), keys);
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_keys("project-secret");
        let b = derive_keys("project-secret");
        assert_eq!(a.cipher, b.cipher);
        assert_eq!(a.mac, b.mac);
    }

    #[test]
    fn test_cipher_and_mac_keys_differ() {
        let keys = derive_keys("project-secret");
        assert_ne!(keys.cipher, keys.mac);
    }

    #[test]
    fn test_distinct_secrets_distinct_keys() {
        let a = derive_keys("secret-a");
        let b = derive_keys("secret-b");
        assert_ne!(a.cipher, b.cipher);
        assert_ne!(a.mac, b.mac);
    }

    #[test]
    fn test_cipher_key_is_sha256_of_secret() {
        let keys = derive_keys("abc");
        let expected: [u8; 32] = Sha256::digest(b"abc").into();
        assert_eq!(keys.cipher, expected);
    }
}
