//! Decryption pipeline composing parse, verify, and decrypt.
//!
//! The unified flow for an encrypted injectable payload:
//! 1. Parse the base64 wire blob into IV / tag / ciphertext
//! 2. Verify the HMAC tag over the ciphertext (when verification is on)
//! 3. Decrypt AES-256-CBC and strip PKCS#7 padding
//!
//! Verification is fail-closed: with `verify == true` a bad tag stops
//! the pipeline before the cipher ever runs.

use crate::crypto::blob::EncryptedBlob;
use crate::crypto::cipher::decrypt_blocks;
use crate::crypto::keys::derive_keys;
use crate::crypto::verify::verify_tag;
use crate::KeyboltError;

/// Decrypt an encoded payload without signature verification.
///
/// Only cipher-level integrity (padding) is checked. Prefer
/// [`verify_and_decrypt`] with `verify = true` unless the payload comes
/// from an already-authenticated channel.
pub fn decrypt(encoded: &str, secret: &str) -> Result<Vec<u8>, KeyboltError> {
    verify_and_decrypt(encoded, secret, false)
}

/// Verify and decrypt an encoded payload.
///
/// Pure function: no I/O, no shared state, safe to call concurrently.
///
/// # Errors
/// * `MalformedPayload` - blob is not valid base64 or is truncated
/// * `SignatureMismatch` - `verify` is true and the tag does not match;
///   decryption is never attempted in this case
/// * `DecryptionFailed` - wrong secret or corrupted ciphertext
pub fn verify_and_decrypt(
    encoded: &str,
    secret: &str,
    verify: bool,
) -> Result<Vec<u8>, KeyboltError> {
    let blob = EncryptedBlob::parse(encoded)?;
    let keys = derive_keys(secret);

    if verify {
        verify_tag(&blob, &keys)?;
    }

    decrypt_blocks(&blob, &keys)
}

/// Encrypt plaintext into a wire blob the pipeline accepts (test harness).
///
/// The IV is derived deterministically from the plaintext and secret,
/// which keeps the harness free of an RNG dependency. Production blobs
/// are produced by the licensing service, never by this SDK.
#[cfg(any(test, feature = "test-seams"))]
pub fn encrypt(plaintext: &[u8], secret: &str) -> String {
    use crate::crypto::blob::IV_LEN;
    use crate::crypto::cipher::encrypt_blocks;
    use crate::crypto::verify::sign_tag;
    use sha2::{Digest, Sha256};

    let keys = derive_keys(secret);

    let digest = Sha256::new()
        .chain_update(plaintext)
        .chain_update(secret.as_bytes())
        .finalize();
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&digest[..IV_LEN]);

    let ciphertext = encrypt_blocks(plaintext, &iv, &keys);
    let tag = sign_tag(&iv, &ciphertext, &keys);

    EncryptedBlob {
        iv,
        tag,
        ciphertext,
    }
    .encode()
}
