//! The deterministic 65,536-word vocabulary and its bijection with
//! 16-bit indices.

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::CodecError;

/// The dictionary's fixed size: one word per 16-bit index.
pub const DICTIONARY_SIZE: usize = 1 << 16;

/// An ASCII word of 1-8 bytes, stored zero-padded so it is `Copy`,
/// hashes without allocation, and whose derived `Ord` — compared
/// byte-by-byte including the zero padding — agrees with ordinary
/// lexicographic string order (a zero byte always sorts below any
/// printable ASCII byte, so a word is always less than any word it is
/// a strict prefix of).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SmallWord([u8; 8]);

impl SmallWord {
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > 8 || !bytes.is_ascii() || s.chars().any(|c| c.is_whitespace()) {
            return Err(CodecError::MalformedWord(s.to_owned()));
        }
        let mut word = [0u8; 8];
        word[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(word))
    }

    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        std::str::from_utf8(&self.0[..len]).expect("validated ASCII at construction")
    }

    fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(8)
    }
}

impl std::fmt::Display for SmallWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 65,536-entry bijection between small words and 16-bit indices.
pub struct Dictionary {
    /// index -> word, in descending lexicographic order.
    words: Vec<SmallWord>,
    /// word -> index, for decoder lookups.
    reverse: HashMap<SmallWord, u16>,
}

impl Dictionary {
    /// Tries the on-disk cache first; on any mismatch, rebuilds from
    /// the source word list and refreshes the cache.
    pub fn load_or_build(source: &Path, quickstart: &Path) -> Result<Self, CodecError> {
        match Self::load_quickstart(quickstart) {
            Ok(dict) => {
                log::info!("loaded dictionary from quickstart cache {}", quickstart.display());
                Ok(dict)
            }
            Err(_) => {
                log::info!("quickstart cache missing or stale, rebuilding from {}", source.display());
                let dict = Self::build_from_source(source)?;
                dict.save_quickstart(quickstart)?;
                Ok(dict)
            }
        }
    }

    fn load_quickstart(path: &Path) -> Result<Self, CodecError> {
        let text = fs::read_to_string(path)?;
        let mut words = Vec::with_capacity(DICTIONARY_SIZE);
        for line in text.lines() {
            if !line.is_empty() {
                words.push(SmallWord::parse(line)?);
            }
        }
        if words.len() != DICTIONARY_SIZE {
            return Err(CodecError::MalformedDictionary {
                found: words.len(),
                needed: DICTIONARY_SIZE,
            });
        }
        Ok(Self::from_ordered_words(words))
    }

    fn build_from_source(path: &Path) -> Result<Self, CodecError> {
        let text = fs::read_to_string(path)?;
        let mut candidates: Vec<SmallWord> = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            // Lines longer than 8 bytes are malformed for the small-word
            // representation, but selection favors the shortest words
            // first, so they are simply never among the chosen 65,536;
            // reject only candidates we would actually keep.
            if let Ok(word) = SmallWord::parse(line) {
                candidates.push(word);
            }
        }

        if candidates.len() < DICTIONARY_SIZE {
            return Err(CodecError::MalformedDictionary {
                found: candidates.len(),
                needed: DICTIONARY_SIZE,
            });
        }

        // Shorter length wins, ties broken by ascending lexicographic order.
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        candidates.truncate(DICTIONARY_SIZE);

        // Final dictionary order: descending lexicographic.
        candidates.sort_by(|a, b| b.cmp(a));

        Ok(Self::from_ordered_words(candidates))
    }

    fn from_ordered_words(words: Vec<SmallWord>) -> Self {
        let mut reverse = HashMap::with_capacity(words.len());
        for (index, word) in words.iter().enumerate() {
            reverse.insert(*word, index as u16);
        }
        Self { words, reverse }
    }

    fn save_quickstart(&self, path: &Path) -> Result<(), CodecError> {
        let file = fs::File::create(path)?;
        let mut out = BufWriter::new(file);
        for word in &self.words {
            out.write_all(word.as_str().as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    #[inline]
    pub fn word(&self, index: u16) -> SmallWord {
        self.words[index as usize]
    }

    #[inline]
    pub fn index(&self, word: &SmallWord) -> Option<u16> {
        self.reverse.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Fast in-memory dictionary construction for tests in other modules
/// that need a full-size dictionary without touching the filesystem.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub(crate) fn sequential_dictionary() -> Dictionary {
        // Fixed-width base-26 encoding is injective, so every index in
        // 0..DICTIONARY_SIZE maps to a distinct 4-letter word (26^4 is
        // comfortably larger than 65,536) with no dedup pass needed.
        let mut words: Vec<SmallWord> = (0..DICTIONARY_SIZE)
            .map(|i| SmallWord::parse(&base26(i)).expect("4-letter lowercase word is always valid"))
            .collect();
        words.sort_by(|a, b| b.cmp(a));
        Dictionary::from_ordered_words(words)
    }

    fn base26(mut i: usize) -> String {
        let mut chars = [b'a'; 4];
        for slot in chars.iter_mut().rev() {
            *slot = b'a' + (i % 26) as u8;
            i /= 26;
        }
        String::from_utf8(chars.to_vec()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_list(n: usize) -> String {
        // Generates more than enough distinct short words: every string
        // over {a..z} of length 1..=3, which is 26 + 676 + 17576 entries.
        let mut words = Vec::new();
        for a in b'a'..=b'z' {
            words.push(format!("{}", a as char));
        }
        for a in b'a'..=b'z' {
            for b in b'a'..=b'z' {
                words.push(format!("{}{}", a as char, b as char));
            }
        }
        'outer: for a in b'a'..=b'z' {
            for b in b'a'..=b'z' {
                for c in b'a'..=b'z' {
                    words.push(format!("{}{}{}", a as char, b as char, c as char));
                    if words.len() >= n {
                        break 'outer;
                    }
                }
            }
        }
        words.truncate(n);
        words.join("\n")
    }

    fn build_dict_from_text(text: &str) -> Dictionary {
        let dir = std::env::temp_dir().join(format!("encodeword-dict-test-{}-{:p}", std::process::id(), text));
        fs::create_dir_all(&dir).unwrap();
        let source = dir.join("words.txt");
        let quickstart = dir.join("words.quickstart");
        fs::write(&source, text).unwrap();
        let dict = Dictionary::load_or_build(&source, &quickstart).unwrap();
        fs::remove_dir_all(&dir).ok();
        dict
    }

    #[test]
    fn small_word_rejects_empty_overlong_and_non_ascii() {
        assert!(SmallWord::parse("").is_err());
        assert!(SmallWord::parse("123456789").is_err());
        assert!(SmallWord::parse("café1234").is_err());
        assert!(SmallWord::parse("has space").is_err());
        assert!(SmallWord::parse("abcdefgh").is_ok());
    }

    #[test]
    fn small_word_display_trims_padding() {
        let w = SmallWord::parse("hi").unwrap();
        assert_eq!(w.as_str(), "hi");
        assert_eq!(format!("{w}"), "hi");
    }

    #[test]
    fn rejects_source_with_too_few_entries() {
        let dir = std::env::temp_dir().join(format!("encodeword-dict-small-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let source = dir.join("words.txt");
        let quickstart = dir.join("words.quickstart");
        fs::write(&source, "a\nb\nc\n").unwrap();

        let err = Dictionary::load_or_build(&source, &quickstart).unwrap_err();
        assert!(matches!(err, CodecError::MalformedDictionary { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn built_dictionary_has_exact_size_and_round_trips_indices() {
        let dict = build_dict_from_text(&word_list(DICTIONARY_SIZE + 1000));
        assert_eq!(dict.len(), DICTIONARY_SIZE);
        for i in 0..dict.len() {
            let index = i as u16;
            let word = dict.word(index);
            assert_eq!(dict.index(&word), Some(index));
        }
    }

    #[test]
    fn built_dictionary_is_strictly_descending() {
        let dict = build_dict_from_text(&word_list(DICTIONARY_SIZE + 1000));
        for window in dict.words.windows(2) {
            assert!(window[0] > window[1], "dictionary must be strictly descending");
        }
    }

    #[test]
    fn unknown_word_has_no_index() {
        let dict = build_dict_from_text(&word_list(DICTIONARY_SIZE + 1000));
        let bogus = SmallWord::parse("zzzzzzzz").unwrap();
        assert_eq!(dict.index(&bogus), None);
    }
}
