//! A CBC-MAC built from the XXTEA block function, using HMAC-style
//! inner/outer key masks over a 160-bit (5-word) state.

use crate::key::Key;
use crate::xxtea;

/// 5 × 32 bits = 160 bits, the same width as SHA-1.
pub const MAC_STATE_WORDS: usize = 5;

const IPAD: u32 = 0x3636_3636;
const OPAD: u32 = 0x5C5C_5C5C;

#[derive(Clone)]
pub struct CbcMac {
    k1: [u32; 4],
    k2: [u32; 4],
    state: [u32; MAC_STATE_WORDS],
}

impl CbcMac {
    pub fn new(key: &Key) -> Self {
        let mut k1 = *key.words();
        let mut k2 = *key.words();
        for word in &mut k1 {
            *word ^= IPAD;
        }
        for word in &mut k2 {
            *word ^= OPAD;
        }
        Self {
            k1,
            k2,
            state: [0; MAC_STATE_WORDS],
        }
    }

    /// XORs `msg` into the running state, then enciphers the state
    /// under `K1`.
    pub fn update(&mut self, msg: &[u32; MAC_STATE_WORDS]) {
        for (s, m) in self.state.iter_mut().zip(msg) {
            *s ^= m;
        }
        xxtea::xxtea(&mut self.state, MAC_STATE_WORDS as i64, &self.k1);
    }

    /// Enciphers a snapshot of the state under `K2` and returns it.
    /// Does not disturb `state`; further `update` calls remain valid.
    pub fn digest(&self) -> [u32; MAC_STATE_WORDS] {
        let mut snapshot = self.state;
        xxtea::xxtea(&mut snapshot, MAC_STATE_WORDS as i64, &self.k2);
        snapshot
    }
}

/// Feeds a ciphertext buffer of arbitrary word length into `mac`,
/// framing it into `MAC_STATE_WORDS`-sized blocks. A strict tail
/// shorter than a full block is zero-padded into one trailing
/// `update`; an exact multiple has no tail block at all.
pub(crate) fn update_framed(mac: &mut CbcMac, ciphertext_words: &[u32]) {
    let mut chunks = ciphertext_words.chunks_exact(MAC_STATE_WORDS);
    for chunk in &mut chunks {
        let block: [u32; MAC_STATE_WORDS] = chunk.try_into().expect("chunks_exact yields exact-size slices");
        mac.update(&block);
    }
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let mut block = [0u32; MAC_STATE_WORDS];
        block[..remainder.len()].copy_from_slice(remainder);
        mac.update(&block);
    }
}

/// Timing-safe equality: every word is compared, and the outcome is
/// not decided until all of them have contributed to the accumulator.
pub(crate) fn constant_time_eq(a: &[u32; MAC_STATE_WORDS], b: &[u32; MAC_STATE_WORDS]) -> bool {
    let mut diff = 0u32;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}
