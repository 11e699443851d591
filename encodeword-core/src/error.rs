use std::fmt;

use thiserror::Error;

/// Which of the two emitted digests a MAC-mismatch error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacSlot {
    /// The digest of the first super-block, emitted near the stream head.
    Initial,
    /// The digest of the whole ciphertext, emitted at the stream tail.
    Final,
}

impl fmt::Display for MacSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MacSlot::Initial => "initial",
            MacSlot::Final => "final",
        })
    }
}

/// Every way the codec can fail, replacing the reference's ad-hoc
/// `(file:line) message` exception with typed, structured variants.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("key file must be exactly 16 bytes, found {found}")]
    InvalidKeyFile { found: usize },

    #[error("dictionary source has only {found} usable entries, need at least {needed}")]
    MalformedDictionary { found: usize, needed: usize },

    #[error("word `{0}` is not a valid dictionary entry (must be 1-8 ASCII, non-whitespace bytes)")]
    MalformedWord(String),

    #[error("cipher refused input of {words} words (minimum 2)")]
    CipherRefused { words: usize },

    #[error("unknown word `{0}`")]
    UnknownWord(String),

    #[error("expected marker `{expected}`, found `{found}`")]
    MissingMarker { expected: char, found: String },

    #[error("unexpected end of input while reading {context}")]
    TruncatedInput { context: &'static str },

    #[error("ciphertext length {bytes} is not a whole number of 32-bit words")]
    MisalignedCiphertext { bytes: usize },

    #[error("invalid padding: bytes {start}..{end} = {bytes:02x?}")]
    InvalidPadding {
        start: usize,
        end: usize,
        bytes: Vec<u8>,
    },

    #[error("{which} MAC mismatch")]
    MacMismatch { which: MacSlot },

    #[error("trailing data after final MAC: `{0}`")]
    TrailingData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
