use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as _;
use encodeword_core::{decoder, encoder, Dictionary, Key};

mod opts;

use opts::{Command, DictOpts, Opts};

const EXIT_SUCCESS: u8 = 0;
const EXIT_MISSING_ARGUMENT: u8 = 1;
const EXIT_INVALID_USAGE: u8 = 2;
const EXIT_INPUT_OPEN_ERROR: u8 = 3;
const EXIT_OUTPUT_OPEN_ERROR: u8 = 4;
const EXIT_RUNTIME_ERROR: u8 = 0xF;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("error opening input `{path}`: {source}")]
    InputOpen { path: PathBuf, source: io::Error },

    #[error("error opening output `{path}`: {source}")]
    OutputOpen { path: PathBuf, source: io::Error },

    #[error("refusing to write output to `{0}`: would overwrite the dictionary source")]
    RefusedOutputName(PathBuf),
}

fn main() -> ExitCode {
    env_logger::init();
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(err) => return exit_code_for_clap_error(err),
    };
    match run(opts) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// `--help`/`--version` exit 0 through clap's own printing path; a
/// missing required argument is exit 1, any other usage error (an
/// unrecognized subcommand, a bad flag value) is exit 2.
fn exit_code_for_clap_error(err: clap::Error) -> ExitCode {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        ErrorKind::MissingRequiredArgument => {
            let _ = err.print();
            ExitCode::from(EXIT_MISSING_ARGUMENT)
        }
        _ => {
            let _ = err.print();
            ExitCode::from(EXIT_INVALID_USAGE)
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CliError>() {
        Some(CliError::InputOpen { .. }) => EXIT_INPUT_OPEN_ERROR,
        Some(CliError::OutputOpen { .. }) | Some(CliError::RefusedOutputName(_)) => EXIT_OUTPUT_OPEN_ERROR,
        None => EXIT_RUNTIME_ERROR,
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>, CliError> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin()));
    }
    File::open(path)
        .map(|f| Box::new(BufReader::new(f)) as Box<dyn Read>)
        .map_err(|source| CliError::InputOpen { path: path.to_owned(), source })
}

fn open_output(path: &Path) -> Result<Box<dyn Write>, CliError> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdout()));
    }
    if path.file_name().is_some_and(|name| name == "words.txt") {
        return Err(CliError::RefusedOutputName(path.to_owned()));
    }
    File::create(path)
        .map(|f| Box::new(BufWriter::new(f)) as Box<dyn Write>)
        .map_err(|source| CliError::OutputOpen { path: path.to_owned(), source })
}

fn load_key_and_dictionary(dict: &DictOpts) -> anyhow::Result<(Key, Dictionary)> {
    let key = Key::load(&dict.key_file).context("loading key file")?;
    let dictionary =
        Dictionary::load_or_build(&dict.dictionary, &dict.quickstart).context("loading dictionary")?;
    Ok((key, dictionary))
}

fn run(opts: Opts) -> anyhow::Result<()> {
    match opts.command {
        Command::Enc { dict, input, output } => {
            let (key, dictionary) = load_key_and_dictionary(&dict)?;
            let reader = open_input(&input)?;
            let writer = open_output(&output)?;
            log::info!("encoding {} -> {}", input.display(), output.display());
            encoder::encode(reader, writer, &key, &dictionary)?;
        }
        Command::Dec { dict, input, output } => {
            let (key, dictionary) = load_key_and_dictionary(&dict)?;
            let reader = open_input(&input)?;
            let writer = open_output(&output)?;
            log::info!("decoding {} -> {}", input.display(), output.display());
            decoder::decode(reader, writer, &key, &dictionary)?;
        }
        Command::Key { key_file, password } => {
            let key = Key::derive_from_password(password.as_bytes());
            key.save(&key_file).context("saving derived key")?;
            log::info!("wrote derived key to {}", key_file.display());
        }
    }
    Ok(())
}
