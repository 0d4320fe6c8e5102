//! Encrypted payload wire format.
//!
//! Injectable ciphertext travels as a single base64 string:
//!
//! ```text
//! base64( IV[16] || TAG[32] || CIPHERTEXT )
//! ```
//!
//! The layout is a private contract between this SDK and the licensing
//! service. TAG is an HMAC-SHA256 over IV || CIPHERTEXT; the cipher is
//! AES-256-CBC with PKCS#7 padding.

use crate::KeyboltError;
use base64::{engine::general_purpose::STANDARD, Engine};

/// Initialization vector length (AES block size).
pub const IV_LEN: usize = 16;

/// Signature tag length (HMAC-SHA256 output).
pub const TAG_LEN: usize = 32;

/// A parsed encrypted payload: IV, signature tag, and cipher payload.
#[derive(Debug, Clone)]
pub struct EncryptedBlob {
    /// CBC initialization vector.
    pub iv: [u8; IV_LEN],
    /// HMAC-SHA256 tag over IV || ciphertext.
    pub tag: [u8; TAG_LEN],
    /// AES-256-CBC ciphertext (PKCS#7 padded).
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Parse a base64-encoded blob into its IV/tag/ciphertext parts.
    ///
    /// # Errors
    /// `MalformedPayload` if the encoding is not valid base64 or the
    /// decoded bytes are too short to contain an IV, a tag, and at least
    /// one cipher block.
    pub fn parse(encoded: &str) -> Result<Self, KeyboltError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            KeyboltError::MalformedPayload(format!("invalid base64 encoding: {}", e))
        })?;

        if bytes.len() < IV_LEN + TAG_LEN + 1 {
            return Err(KeyboltError::MalformedPayload(format!(
                "payload too short ({} bytes): missing IV, tag, or ciphertext",
                bytes.len()
            )));
        }

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[..IV_LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[IV_LEN..IV_LEN + TAG_LEN]);

        let ciphertext = bytes[IV_LEN + TAG_LEN..].to_vec();

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }

    /// Encode the blob back into its base64 wire form.
    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(IV_LEN + TAG_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.tag);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }
}
