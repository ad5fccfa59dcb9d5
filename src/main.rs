//! Filter chat lines from stdin through word tables read from a directory or
//! an archive container.

use anyhow::Context;
use clap::{ArgGroup, Parser};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wordenc::{
    BlockCodec, FilterConfig, Jagfile, MemoryArchive, StoredCodec, WordFilter,
    config::TABLE_ENTRIES, to_sentence_case,
};

#[derive(Parser, Debug)]
#[command(name = "wordenc")]
#[command(about = "Censor chat lines read from stdin")]
#[command(group(ArgGroup::new("source").required(true).args(["tables", "archive"])))]
struct Args {
    /// Directory holding badenc.txt, domainenc.txt, tldlist.txt and fragmentsenc.txt
    #[arg(short, long)]
    tables: Option<PathBuf>,

    /// Archive container (such as `wordenc`) holding the same four entries
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Sentence-case each line before filtering, as chat clients do
    #[arg(short, long)]
    sentence_case: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "wordenc=info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();

    let word_filter = WordFilter::new(Arc::new(load_config(&args)?));
    info!("word filter ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut lines = 0usize;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let line = if args.sentence_case {
            to_sentence_case(&line)
        } else {
            line
        };
        writeln!(stdout, "{}", word_filter.filter(&line))?;
        lines += 1;
    }
    debug!(lines, "stdin closed");
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<FilterConfig> {
    if let Some(path) = &args.archive {
        // Entry bodies are read as stored; compressed ones fail with a codec error.
        let codec: Arc<dyn BlockCodec> = Arc::new(StoredCodec);
        let archive = Jagfile::load(path, Some(codec))
            .with_context(|| format!("opening archive {}", path.display()))?;
        info!(archive = %path.display(), entries = archive.len(), "opened word archive");
        return FilterConfig::load(&archive).context("decoding word tables");
    }

    let dir = args
        .tables
        .as_deref()
        .context("either --tables or --archive is required")?;
    let archive = MemoryArchive::from_dir(dir, &TABLE_ENTRIES)
        .with_context(|| format!("reading word tables from {}", dir.display()))?;
    info!(tables = %dir.display(), "read word tables");
    FilterConfig::load(&archive).context("decoding word tables")
}
