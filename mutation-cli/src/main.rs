//! Drives `mutation::mutate` outside a full fuzz loop: reads an optional
//! seed file and dictionary, applies the engine some number of times, and
//! writes the result. Exercises the library end-to-end without
//! reimplementing the fuzz loop, coverage instrumentation, or corpus store -
//! all explicitly out of scope for the engine itself.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use common::time::now_ms;
use mutation::{mutate, Buffer, CoverageTiming, Dictionary, MutationConfig, MutationHost};

#[derive(Parser, Debug)]
#[command(name = "mutation-cli", rename_all = "kebab-case")]
struct Arguments {
    /// Seed input to mutate; an empty buffer is used (and bootstrapped) if omitted.
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Upper bound on the mutated buffer's size.
    #[arg(long, default_value_t = 4096)]
    max_input_sz: usize,

    /// Base number of operators applied per `mutate()` call.
    #[arg(long, default_value_t = 8)]
    mutations_per_run: u64,

    /// Restrict every write to printable ASCII.
    #[arg(long)]
    printable: bool,

    /// Newline-separated dictionary tokens.
    #[arg(long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Directory of prior inputs `Splice*` operators may draw from.
    #[arg(long, value_name = "DIR")]
    corpus_dir: Option<PathBuf>,

    /// Host-provided slow-input hint passed to `mutate()`.
    #[arg(long, default_value_t = 0)]
    slow_factor: u32,

    /// Number of `mutate()` calls to apply in sequence.
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Where to write the mutated buffer.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

struct CorpusHost {
    entries: Vec<PathBuf>,
}

impl CorpusHost {
    fn from_dir(dir: Option<&Path>) -> Result<Self> {
        let entries = match dir {
            Some(dir) => fs::read_dir(dir)
                .with_context(|| format!("failed to read corpus dir {}", dir.display()))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            None => Vec::new(),
        };

        Ok(Self { entries })
    }
}

impl MutationHost for CorpusHost {
    fn fetch_random_prior(&mut self) -> Option<Vec<u8>> {
        if self.entries.is_empty() {
            return None;
        }

        let path = &self.entries[fastrand::usize(..self.entries.len())];
        fs::read(path)
            .map_err(|err| log::warn!("failed to read corpus entry {}: {err}", path.display()))
            .ok()
    }
}

fn load_dictionary(path: Option<&Path>) -> Result<Dictionary> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read dictionary {}", path.display()))?;
            Ok(Dictionary::from_tokens(
                content.lines().map(|line| line.as_bytes().to_vec()),
            ))
        }
        None => Ok(Dictionary::default()),
    }
}

fn main() -> Result<()> {
    env_logger::builder().format_timestamp_secs().init();
    let args = Arguments::parse();

    let seed = match &args.seed {
        Some(path) => fs::read(path).with_context(|| format!("failed to read seed {}", path.display()))?,
        None => Vec::new(),
    };
    let mut buffer = Buffer::from_bytes(&seed, args.max_input_sz);

    let dictionary = load_dictionary(args.dictionary.as_deref())?;
    let config = MutationConfig::new(args.max_input_sz, args.mutations_per_run, args.printable)
        .with_dictionary(dictionary);

    let mut host = CorpusHost::from_dir(args.corpus_dir.as_deref())?;
    let timing = CoverageTiming::new(now_ms());

    log::info!("seed size: {}", buffer.size());
    for i in 0..args.count {
        mutate(&mut buffer, &config, &mut host, &timing, args.slow_factor);
        log::debug!("after mutate #{i}: size {}", buffer.size());
    }
    log::info!("mutated size: {}", buffer.size());

    fs::write(&args.output, buffer.as_slice())
        .with_context(|| format!("failed to write output {}", args.output.display()))?;

    Ok(())
}
