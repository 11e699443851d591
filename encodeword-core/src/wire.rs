//! Big-endian conversions between bytes, 32-bit words and the 16-bit
//! dictionary indices carried inside them. The reference used
//! `htonl`/`ntohl`; this is the portable, libc-free equivalent.

/// Converts a byte slice (length a multiple of 4) into big-endian `u32`s.
pub(crate) fn bytes_to_words_be(bytes: &[u8]) -> Vec<u32> {
    debug_assert_eq!(bytes.len() % 4, 0);
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes(c.try_into().unwrap()))
        .collect()
}

/// Converts big-endian `u32`s back into bytes.
pub(crate) fn words_to_bytes_be(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}

/// Splits each 32-bit word into its two big-endian 16-bit halves, in
/// order — the mapping between ciphertext words and dictionary indices.
pub(crate) fn words_to_indices_be(words: &[u32]) -> Vec<u16> {
    let mut indices = Vec::with_capacity(words.len() * 2);
    for word in words {
        indices.push((word >> 16) as u16);
        indices.push((word & 0xFFFF) as u16);
    }
    indices
}

/// Recombines big-endian 16-bit index pairs back into `u32` words, the
/// inverse of [`words_to_indices_be`].
pub(crate) fn indices_to_words_be(indices: &[u16]) -> Vec<u32> {
    debug_assert_eq!(indices.len() % 2, 0);
    indices
        .chunks_exact(2)
        .map(|pair| ((pair[0] as u32) << 16) | pair[1] as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_word_round_trip() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0xDE, 0xAD, 0xBE, 0xEF];
        let words = bytes_to_words_be(&bytes);
        assert_eq!(words, vec![0x0102_0304, 0xDEAD_BEEF]);
        assert_eq!(words_to_bytes_be(&words), bytes);
    }

    #[test]
    fn word_to_indices_is_big_endian_halves() {
        let words = [0x0001_0002u32];
        let indices = words_to_indices_be(&words);
        assert_eq!(indices, vec![0x0001, 0x0002]);
    }

    #[test]
    fn indices_to_words_inverts_words_to_indices() {
        let words = vec![0x0102_0304u32, 0xDEAD_BEEF];
        let indices = words_to_indices_be(&words);
        assert_eq!(indices_to_words_be(&indices), words);
    }
}
