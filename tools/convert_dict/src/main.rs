use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pinyinkit::loader::{load_text_files, load_words};
use pinyinkit::syllables::extend_with_standard;
use pinyinkit::{save_resource, DictionarySource};

/// Build the bincode dictionary resource loaded by `pinyinkit --data`.
#[derive(Parser)]
struct Args {
    /// Character table (`codepoint,frequency,pinyin`), or a JSON-serialized
    /// dictionary source when the extension is `.json`
    #[arg(long)]
    chars: PathBuf,

    /// Word list (`word<TAB>pinyin[<TAB>score]`)
    #[arg(long)]
    words: Option<PathBuf>,

    /// Output resource path
    #[arg(long, default_value = "pinyin-dict.bin")]
    output: PathBuf,

    /// Append standard syllables the tables never mention
    #[arg(long)]
    standard_syllables: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let is_json = args.chars.extension().and_then(|s| s.to_str()) == Some("json");
    let mut source: DictionarySource = if is_json {
        let reader = BufReader::new(
            File::open(&args.chars).with_context(|| format!("failed to open {}", args.chars.display()))?,
        );
        let mut source: DictionarySource = serde_json::from_reader(reader)
            .with_context(|| format!("invalid JSON source {}", args.chars.display()))?;
        if let Some(words) = &args.words {
            let reader = BufReader::new(File::open(words).with_context(|| format!("failed to open {}", words.display()))?);
            source.words.extend(load_words(reader)?);
        }
        source
    } else {
        load_text_files(args.chars.as_path(), args.words.as_deref())
            .with_context(|| format!("failed to load tables from {}", args.chars.display()))?
    };
    if args.standard_syllables {
        extend_with_standard(&mut source);
    }

    save_resource(&args.output, &source).with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "wrote {}: {} syllables, {} characters, {} words",
        args.output.display(),
        source.syllables.len(),
        source.characters.len(),
        source.words.len()
    );
    Ok(())
}
