//! AES-256-CBC block cipher operations.

use crate::crypto::blob::EncryptedBlob;
use crate::crypto::keys::DerivedKeys;
use crate::KeyboltError;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

#[cfg(any(test, feature = "test-seams"))]
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Decrypt a blob's ciphertext with the derived cipher key.
///
/// # Errors
/// `DecryptionFailed` on any cipher-level failure: ciphertext not a
/// block multiple, or padding that does not check out (wrong key or
/// corrupted ciphertext).
pub fn decrypt_blocks(blob: &EncryptedBlob, keys: &DerivedKeys) -> Result<Vec<u8>, KeyboltError> {
    Aes256CbcDec::new((&keys.cipher).into(), (&blob.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&blob.ciphertext)
        .map_err(|_| KeyboltError::DecryptionFailed)
}

/// Encrypt plaintext under the derived cipher key (test harness).
#[cfg(any(test, feature = "test-seams"))]
pub fn encrypt_blocks(
    plaintext: &[u8],
    iv: &[u8; crate::crypto::blob::IV_LEN],
    keys: &DerivedKeys,
) -> Vec<u8> {
    use aes::cipher::BlockEncryptMut;
    Aes256CbcEnc::new((&keys.cipher).into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}
