//! Confidential, integrity-checked byte<->word codec.
//!
//! Bytes are encrypted super-block by super-block with a hardened
//! XXTEA cipher, authenticated with a CBC-MAC keyed the same way, and
//! rendered as a stream of lowercase dictionary words bracketed by an
//! initial and a final MAC digest.

mod dictionary;
mod error;
mod key;
mod mac;
mod padding;
mod wire;
mod worker;
mod xxtea;

pub mod decoder;
pub mod encoder;

pub use dictionary::{Dictionary, SmallWord, DICTIONARY_SIZE};
pub use error::{CodecError, MacSlot};
pub use key::Key;

/// Size in bytes of one processing unit: 5,120 32-bit words, matching
/// the 5-word MAC state times 1,024.
pub const SUPER_BLOCK_BYTES: usize = 20_480;

/// [`SUPER_BLOCK_BYTES`] expressed in 32-bit words.
pub const SUPER_BLOCK_WORDS: usize = SUPER_BLOCK_BYTES / 4;

/// Number of 16-bit dictionary indices needed to carry one full
/// super-block (two indices per 32-bit word).
pub const SUPER_BLOCK_INDICES: usize = SUPER_BLOCK_WORDS * 2;

/// Width, in 16-bit indices, of a serialized MAC digest.
pub const MAC_DIGEST_INDICES: usize = mac::MAC_STATE_WORDS * 2;
