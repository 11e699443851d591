//! Turns an arbitrary byte stream into a confidential, integrity
//! checked stream of lowercase dictionary words.

use std::io::{Read, Write};

use crate::dictionary::Dictionary;
use crate::error::CodecError;
use crate::key::Key;
use crate::mac::CbcMac;
use crate::padding;
use crate::wire;
use crate::worker::MacWorkerHandle;
use crate::SUPER_BLOCK_BYTES;

/// Dictionary words emitted per output line, purely for readability.
const WORDS_PER_LINE: usize = 12;

/// Reads up to [`SUPER_BLOCK_BYTES`] bytes into `buf`, filling from the
/// front. Returns the number of bytes actually read (0 at EOF).
fn read_super_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, CodecError> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

struct WordWriter<'a, W: Write> {
    out: &'a mut W,
    on_line: usize,
}

impl<'a, W: Write> WordWriter<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self { out, on_line: 0 }
    }

    fn write_index(&mut self, dict: &Dictionary, index: u16) -> Result<(), CodecError> {
        if self.on_line == WORDS_PER_LINE {
            self.out.write_all(b"\n")?;
            self.on_line = 0;
        } else if self.on_line > 0 {
            self.out.write_all(b" ")?;
        }
        self.out.write_all(dict.word(index).as_str().as_bytes())?;
        self.on_line += 1;
        Ok(())
    }

    fn write_indices(&mut self, dict: &Dictionary, indices: &[u16]) -> Result<(), CodecError> {
        for &index in indices {
            self.write_index(dict, index)?;
        }
        Ok(())
    }

    fn write_marker(&mut self, marker: &str) -> Result<(), CodecError> {
        if self.on_line > 0 {
            self.out.write_all(b"\n")?;
            self.on_line = 0;
        }
        self.out.write_all(marker.as_bytes())?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

fn encrypt_block(buf: &mut [u8], bytes_read: usize, key: &Key) -> Result<Vec<u32>, CodecError> {
    let len = padding::pad(buf, bytes_read);
    let mut words = wire::bytes_to_words_be(&buf[..len]);
    let n = words.len();
    if !crate::xxtea::xxtea(&mut words, n as i64, key.words()) {
        return Err(CodecError::CipherRefused { words: n });
    }
    Ok(words)
}

/// Encodes `reader`'s entire contents as dictionary words, writing them
/// to `writer` bracketed by the initial and final MAC digests.
pub fn encode<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    key: &Key,
    dict: &Dictionary,
) -> Result<(), CodecError> {
    let mut words_out = WordWriter::new(&mut writer);
    let mut buf = vec![0u8; SUPER_BLOCK_BYTES];

    log::info!("encoding started");

    let mut mac = CbcMac::new(key);
    let bytes_read = read_super_block(&mut reader, &mut buf)?;
    let words = encrypt_block(&mut buf, bytes_read, key)?;
    crate::mac::update_framed(&mut mac, &words);

    let initial_digest = mac.digest();
    words_out.write_indices(dict, &digest_to_indices(&initial_digest))?;
    words_out.write_marker(",")?;
    words_out.write_indices(dict, &wire::words_to_indices_be(&words))?;

    let mac = if bytes_read < SUPER_BLOCK_BYTES {
        mac
    } else {
        log::debug!("payload exceeds one super-block, handing remaining MAC updates to a worker thread");
        let worker = MacWorkerHandle::spawn(mac);
        loop {
            let mut buf = vec![0u8; SUPER_BLOCK_BYTES];
            let bytes_read = read_super_block(&mut reader, &mut buf)?;
            let words = encrypt_block(&mut buf, bytes_read, key)?;
            words_out.write_indices(dict, &wire::words_to_indices_be(&words))?;
            worker.push(words);
            if bytes_read < SUPER_BLOCK_BYTES {
                break;
            }
        }
        worker.finish()
    };

    words_out.write_marker(".")?;
    let final_digest = mac.digest();
    words_out.write_indices(dict, &digest_to_indices(&final_digest))?;
    writer.write_all(b"\n")?;
    log::info!("encoding finished");
    Ok(())
}

fn digest_to_indices(digest: &[u32; crate::mac::MAC_STATE_WORDS]) -> Vec<u16> {
    wire::words_to_indices_be(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_dict() -> Dictionary {
        crate::dictionary::testing::sequential_dictionary()
    }

    #[test]
    fn encodes_empty_input_to_initial_and_final_markers() {
        let key = Key::default();
        let dict = test_dict();
        let mut out = Vec::new();
        encode(Cursor::new(&[][..]), &mut out, &key, &dict).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(",\n"));
        assert!(text.contains(".\n"));
    }

    #[test]
    fn small_input_produces_bit_identical_initial_and_final_mac() {
        let key = Key::default();
        let dict = test_dict();
        let mut out = Vec::new();
        encode(Cursor::new(b"hello world".as_slice()), &mut out, &key, &dict).unwrap();

        let text = String::from_utf8(out).unwrap();
        let comma = text.find(",\n").unwrap();
        let dot = text.find(".\n").unwrap();
        let before_comma = &text[..comma];
        let after_dot = text[dot + 2..].trim();

        let initial_words: Vec<&str> = before_comma.split_whitespace().collect();
        let final_words: Vec<&str> = after_dot.split_whitespace().collect();
        assert_eq!(initial_words, final_words, "single-super-block input must yield identical MACs");
    }

    #[test]
    fn large_input_spans_multiple_super_blocks() {
        let key = Key::default();
        let dict = test_dict();
        let payload = vec![0x5Au8; SUPER_BLOCK_BYTES + 100];
        let mut out = Vec::new();
        encode(Cursor::new(payload.as_slice()), &mut out, &key, &dict).unwrap();
        assert!(!out.is_empty());
    }
}
