use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const ABOUT: &str = "A confidential, integrity-checked byte<->word codec";
const LONG_ABOUT: &str = "\
encodeword-cli turns an arbitrary byte stream into a sequence of lowercase \
dictionary words and back. The word stream is encrypted under a 128-bit key \
and bracketed by two MAC digests, so tampering with any word is detected \
before the corresponding plaintext is ever emitted.";

#[derive(Parser, Debug)]
#[command(name = "encodeword-cli", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,
}

/// Dictionary and key-file locations shared by `enc` and `dec`.
#[derive(Args, Debug)]
pub struct DictOpts {
    /// Key file to load (falls back to the built-in default key if absent).
    #[arg(long, default_value = "encode.key")]
    pub key_file: PathBuf,

    /// Source word list used to (re)build the dictionary.
    #[arg(long, default_value = "words.txt")]
    pub dictionary: PathBuf,

    /// Cached, pre-sorted dictionary, tried before `--dictionary`.
    #[arg(long, default_value = "words.quickstart")]
    pub quickstart: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a byte stream as dictionary words.
    Enc {
        #[command(flatten)]
        dict: DictOpts,

        /// Input path, or `-` for stdin.
        input: PathBuf,

        /// Output path, or `-` for stdout. Must not be `words.txt`.
        output: PathBuf,
    },

    /// Decode dictionary words back into a byte stream.
    Dec {
        #[command(flatten)]
        dict: DictOpts,

        /// Input path, or `-` for stdin.
        input: PathBuf,

        /// Output path, or `-` for stdout.
        output: PathBuf,
    },

    /// Derive a key from a password and save it to a key file.
    Key {
        /// Where to write the derived key.
        #[arg(long, default_value = "encode.key")]
        key_file: PathBuf,

        /// The password to derive the key from.
        password: String,
    },
}
