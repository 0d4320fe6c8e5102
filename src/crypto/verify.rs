//! Keyed signature verification for encrypted payloads.
//!
//! The tag is HMAC-SHA256 over IV || ciphertext under the derived MAC
//! key. Verification happens over the ciphertext, before any decryption
//! is attempted, so a tampered payload never reaches the cipher.

use crate::crypto::blob::{EncryptedBlob, TAG_LEN};
use crate::crypto::keys::DerivedKeys;
use crate::KeyboltError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature tag for an IV/ciphertext pair.
pub fn sign_tag(iv: &[u8], ciphertext: &[u8], keys: &DerivedKeys) -> [u8; TAG_LEN] {
    // HMAC-SHA256 accepts keys of any length; 32 bytes never fails.
    let mut mac = HmacSha256::new_from_slice(&keys.mac).expect("HMAC accepts any key length");
    mac.update(iv);
    mac.update(ciphertext);
    mac.finalize().into_bytes().into()
}

/// Verify a blob's embedded tag against its IV and ciphertext.
///
/// Comparison is constant-time via [`Mac::verify_slice`].
///
/// # Errors
/// `SignatureMismatch` if the tag does not match.
pub fn verify_tag(blob: &EncryptedBlob, keys: &DerivedKeys) -> Result<(), KeyboltError> {
    let mut mac = HmacSha256::new_from_slice(&keys.mac).expect("HMAC accepts any key length");
    mac.update(&blob.iv);
    mac.update(&blob.ciphertext);
    mac.verify_slice(&blob.tag)
        .map_err(|_| KeyboltError::SignatureMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::blob::IV_LEN;
    use crate::crypto::keys::derive_keys;

    fn signed_blob(keys: &DerivedKeys) -> EncryptedBlob {
        let iv = [3u8; IV_LEN];
        let ciphertext = vec![9u8; 32];
        let tag = sign_tag(&iv, &ciphertext, keys);
        EncryptedBlob {
            iv,
            tag,
            ciphertext,
        }
    }

    #[test]
    fn test_valid_tag_verifies() {
        let keys = derive_keys("verify-test-secret");
        let blob = signed_blob(&keys);
        assert!(verify_tag(&blob, &keys).is_ok());
    }

    #[test]
    fn test_flipped_tag_bit_rejected() {
        let keys = derive_keys("verify-test-secret");
        let mut blob = signed_blob(&keys);
        blob.tag[0] ^= 0x01;
        assert!(matches!(
            verify_tag(&blob, &keys),
            Err(KeyboltError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let keys = derive_keys("verify-test-secret");
        let mut blob = signed_blob(&keys);
        blob.ciphertext[4] ^= 0xFF;
        assert!(matches!(
            verify_tag(&blob, &keys),
            Err(KeyboltError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_iv_rejected() {
        let keys = derive_keys("verify-test-secret");
        let mut blob = signed_blob(&keys);
        blob.iv[0] ^= 0xFF;
        assert!(matches!(
            verify_tag(&blob, &keys),
            Err(KeyboltError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = derive_keys("verify-test-secret");
        let blob = signed_blob(&keys);
        let other = derive_keys("some-other-secret");
        assert!(matches!(
            verify_tag(&blob, &other),
            Err(KeyboltError::SignatureMismatch)
        ));
    }
}
