//! The 128-bit key shared by the cipher and the MAC, and its two
//! sources: a big-endian key file, or a password run through the
//! same CBC-MAC primitive it will go on to key.

use std::fs;
use std::path::Path;

use crate::error::CodecError;
use crate::mac::{CbcMac, MAC_STATE_WORDS};

/// The default key used when no key file is present. Lifted verbatim
/// from the reference's hard-coded `static_key`.
const DEFAULT_KEY: [u32; 4] = [3_449_741_923, 1_428_823_133, 719_882_406, 2_957_402_939];

/// The non-secret key the password-derivation MAC is keyed with.
const PASSWORD_MAC_KEY: [u32; 4] = [1, 2, 3, 4];

/// A 128-bit key, serialized to/from its key file in big-endian order.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Key([u32; 4]);

impl Key {
    pub const fn from_words(words: [u32; 4]) -> Self {
        Self(words)
    }

    pub fn words(&self) -> &[u32; 4] {
        &self.0
    }

    /// Loads the key from `path`, or falls back to [`DEFAULT_KEY`] if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, CodecError> {
        if !path.exists() {
            log::info!("no key file at {}, using the default key", path.display());
            return Ok(Self(DEFAULT_KEY));
        }

        let bytes = fs::read(path)?;
        if bytes.len() != 16 {
            return Err(CodecError::InvalidKeyFile { found: bytes.len() });
        }

        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes(chunk.try_into().unwrap());
        }
        log::info!("loaded key from {}", path.display());
        Ok(Self(words))
    }

    /// Writes the key to `path` as 16 big-endian bytes.
    pub fn save(&self, path: &Path) -> Result<(), CodecError> {
        let mut bytes = Vec::with_capacity(16);
        for word in self.0 {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Derives a key from a password using the same CBC-MAC primitive
    /// used for payload integrity, ported byte-for-byte from the
    /// reference's `make_key`: each password byte is sign-extended the
    /// way a C `signed char` widens to a wider integer, five bytes feed
    /// one MAC-state word at a time, and a trailing partial chunk
    /// leaves the unfilled state words holding whatever the previous
    /// chunk put there. This quirk is intentionally preserved rather
    /// than "fixed", since changing it would change which key a given
    /// password derives to.
    pub fn derive_from_password(password: &[u8]) -> Self {
        let mut mac = CbcMac::new(&Self(PASSWORD_MAC_KEY));
        let mut buffer = [0u32; MAC_STATE_WORDS];

        for chunk in password.chunks(MAC_STATE_WORDS) {
            for (slot, &byte) in buffer.iter_mut().zip(chunk) {
                *slot = (byte as i8 as i32) as u32;
            }
            mac.update(&buffer);
        }

        let digest = mac.digest();
        Self([digest[0], digest[1], digest[2], digest[3]])
    }
}

impl Default for Key {
    fn default() -> Self {
        Self(DEFAULT_KEY)
    }
}
