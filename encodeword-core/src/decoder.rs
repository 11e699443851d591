//! Turns a stream of lowercase dictionary words back into the
//! original bytes, verifying both the initial and final MAC before
//! trusting any ciphertext they bracket.

use std::io::{BufReader, Read, Write};

use crate::dictionary::{Dictionary, SmallWord};
use crate::error::{CodecError, MacSlot};
use crate::key::Key;
use crate::mac::{CbcMac, MAC_STATE_WORDS};
use crate::padding::PaddingStripper;
use crate::wire;
use crate::SUPER_BLOCK_INDICES;

const MAC_TOKEN_COUNT: usize = MAC_STATE_WORDS * 2;

/// Whitespace-delimited token reader. `,` and `.` are markers; every
/// other token is expected to be a dictionary word.
struct Tokenizer<R> {
    reader: R,
    byte: [u8; 1],
}

impl<R: Read> Tokenizer<R> {
    fn new(reader: R) -> Self {
        Self { reader, byte: [0] }
    }

    fn next_token(&mut self) -> Result<Option<String>, CodecError> {
        let mut token = Vec::new();
        loop {
            let n = self.reader.read(&mut self.byte)?;
            if n == 0 {
                return Ok(if token.is_empty() {
                    None
                } else {
                    Some(String::from_utf8_lossy(&token).into_owned())
                });
            }
            let b = self.byte[0];
            if b.is_ascii_whitespace() {
                if !token.is_empty() {
                    return Ok(Some(String::from_utf8_lossy(&token).into_owned()));
                }
            } else {
                token.push(b);
            }
        }
    }

    fn next_required(&mut self, context: &'static str) -> Result<String, CodecError> {
        self.next_token()?.ok_or(CodecError::TruncatedInput { context })
    }
}

fn word_index(dict: &Dictionary, token: &str) -> Result<u16, CodecError> {
    let word = SmallWord::parse(token).map_err(|_| CodecError::UnknownWord(token.to_owned()))?;
    dict.index(&word).ok_or_else(|| CodecError::UnknownWord(token.to_owned()))
}

fn read_mac_indices<R: Read>(
    tokenizer: &mut Tokenizer<R>,
    dict: &Dictionary,
    context: &'static str,
) -> Result<[u32; MAC_STATE_WORDS], CodecError> {
    let mut indices = Vec::with_capacity(MAC_TOKEN_COUNT);
    for _ in 0..MAC_TOKEN_COUNT {
        let token = tokenizer.next_required(context)?;
        indices.push(word_index(dict, &token)?);
    }
    let words = wire::indices_to_words_be(&indices);
    Ok(words.try_into().expect("exactly MAC_STATE_WORDS words read"))
}

fn expect_marker<R: Read>(tokenizer: &mut Tokenizer<R>, expected: char) -> Result<(), CodecError> {
    let token = tokenizer.next_required("marker")?;
    if token == expected.to_string() {
        Ok(())
    } else {
        Err(CodecError::MissingMarker { expected, found: token })
    }
}

/// Decodes a dictionary-word stream back into bytes, failing closed on
/// any MAC mismatch, unknown word, or malformed framing.
pub fn decode<R: Read, W: Write>(reader: R, mut writer: W, key: &Key, dict: &Dictionary) -> Result<(), CodecError> {
    log::info!("decoding started");
    let mut tokenizer = Tokenizer::new(BufReader::new(reader));
    let mut mac = CbcMac::new(key);

    let expected_initial = read_mac_indices(&mut tokenizer, dict, "initial MAC")?;
    expect_marker(&mut tokenizer, ',')?;

    let mut stripper = PaddingStripper::new();
    let mut indices = Vec::with_capacity(SUPER_BLOCK_INDICES);
    let mut first_block_checked = false;

    loop {
        let token = tokenizer.next_required("ciphertext word")?;
        if token == "." {
            break;
        }
        indices.push(word_index(dict, &token)?);

        if indices.len() == SUPER_BLOCK_INDICES {
            let words = wire::indices_to_words_be(&indices);
            indices.clear();
            crate::mac::update_framed(&mut mac, &words);

            if !first_block_checked {
                first_block_checked = true;
                if !crate::mac::constant_time_eq(&mac.digest(), &expected_initial) {
                    return Err(CodecError::MacMismatch { which: MacSlot::Initial });
                }
            }

            let mut words = words;
            let n = words.len();
            if !crate::xxtea::xxtea(&mut words, -(n as i64), key.words()) {
                return Err(CodecError::CipherRefused { words: n });
            }
            let plaintext = wire::words_to_bytes_be(&words);
            if let Some(emitted) = stripper.push(plaintext) {
                writer.write_all(&emitted)?;
            }
        }
    }

    let mut residual_words = Vec::new();
    if !indices.is_empty() {
        if indices.len() % 2 != 0 {
            return Err(CodecError::MisalignedCiphertext { bytes: indices.len() * 2 });
        }
        residual_words = wire::indices_to_words_be(&indices);
        crate::mac::update_framed(&mut mac, &residual_words);

        // For inputs no longer than one super-block, this residual
        // block *is* the first super-block, and the loop above never
        // ran its own check: do it here instead, so a tampered initial
        // MAC is still caught before the final MAC is even read.
        if !first_block_checked && !crate::mac::constant_time_eq(&mac.digest(), &expected_initial) {
            return Err(CodecError::MacMismatch { which: MacSlot::Initial });
        }
    }

    let expected_final = read_mac_indices(&mut tokenizer, dict, "final MAC")?;
    if !crate::mac::constant_time_eq(&mac.digest(), &expected_final) {
        return Err(CodecError::MacMismatch { which: MacSlot::Final });
    }

    if !residual_words.is_empty() {
        let n = residual_words.len();
        if !crate::xxtea::xxtea(&mut residual_words, -(n as i64), key.words()) {
            return Err(CodecError::CipherRefused { words: n });
        }
        let plaintext = wire::words_to_bytes_be(&residual_words);
        if let Some(emitted) = stripper.push(plaintext) {
            writer.write_all(&emitted)?;
        }
    }

    let tail = stripper.finish()?;
    writer.write_all(&tail)?;

    if let Some(trailing) = tokenizer.next_token()? {
        return Err(CodecError::TrailingData(trailing));
    }

    log::info!("decoding finished");
    Ok(())
}
