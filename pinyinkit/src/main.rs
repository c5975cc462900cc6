use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pinyinkit::loader::load_text_files;
use pinyinkit::syllables::{extend_with_standard, standard_source};
use pinyinkit::{load_resource, Dictionary, DictionarySource, InputResult, PinyinServer, ServerConfig};

#[derive(Parser)]
#[command(name = "pinyinkit")]
#[command(about = "Pinyin input and fuzzy phonetic search")]
#[command(version)]
struct Cli {
    /// Bincode dictionary resource (see `convert_dict`)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Character table (`codepoint,frequency,pinyin`), used when no resource is given
    #[arg(long, global = true)]
    chars: Option<PathBuf>,

    /// Word list (`word<TAB>pinyin[<TAB>score]`)
    #[arg(long, global = true)]
    words: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Text files loaded as ranking samples
    #[arg(long = "sample", global = true)]
    samples: Vec<PathBuf>,

    /// Custom word definitions (`ni hao=你好` per line)
    #[arg(long = "define", global = true)]
    definitions: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split text into syllables
    Split {
        text: String,
        #[arg(short, long)]
        ignore_case: bool,
        /// Explicit syllable separator
        #[arg(short, long, default_value_t = ' ')]
        separator: char,
    },
    /// Fuzzy-match a pinyin query against candidate strings
    Match {
        query: String,
        candidates: Vec<String>,
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
        /// Print highlighted matches instead of indices
        #[arg(long)]
        highlight: bool,
    },
    /// Rank candidates for typed input after committed text
    Input {
        input: String,
        #[arg(short, long, default_value = "")]
        prefix: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read input lines from stdin; the first candidate of each line is committed
    Repl {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn load_source(cli: &Cli) -> Result<DictionarySource> {
    if let Some(path) = &cli.data {
        return load_resource(path).with_context(|| format!("failed to load resource {}", path.display()));
    }
    if let Some(chars) = &cli.chars {
        let mut source = load_text_files(chars.as_path(), cli.words.as_deref())
            .with_context(|| format!("failed to load tables from {}", chars.display()))?;
        extend_with_standard(&mut source);
        return Ok(source);
    }
    warn!("no dictionary given, using the bare syllable inventory");
    Ok(standard_source())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn build_server(cli: &Cli) -> Result<PinyinServer> {
    let config = match &cli.config {
        Some(path) => ServerConfig::load_toml(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", path.display()))?,
        None => ServerConfig::default(),
    };
    let source = load_source(cli)?;
    let dictionary = Dictionary::from_source(&source, config.base());
    let sample_factor = config.default_sample_effectivity;
    let word_factor = config.base.custom_word_effectivity;

    let mut server = PinyinServer::new(dictionary, config);
    for path in &cli.samples {
        server.on_load_sample(&read_file(path)?, sample_factor);
    }
    for path in &cli.definitions {
        server.on_define_words(&read_file(path)?, word_factor);
    }
    Ok(server)
}

fn print_result(result: &InputResult) {
    if !result.fixed_prefix.is_empty() {
        println!("fixed: {} ({} bytes)", result.fixed_prefix, result.fixed_consumed);
    }
    for (i, c) in result.candidates.iter().enumerate() {
        println!("{:>3}. {}\t{}\t{:.4}\teat={}", i + 1, c.text, c.token, c.score, c.eat_bytes);
    }
}

fn repl(server: &PinyinServer, limit: usize) -> Result<()> {
    let stdin = io::stdin();
    let mut committed = String::new();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            committed.clear();
        } else {
            let result = server.on_input(&committed, input, limit);
            print_result(&result);
            committed.push_str(&result.fixed_prefix);
            if let Some(first) = result.candidates.first() {
                committed.push_str(&first.text);
            }
            println!("committed: {committed}");
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let server = build_server(&cli)?;

    match &cli.command {
        Commands::Split {
            text,
            ignore_case,
            separator,
        } => {
            let seg = server.table().segment(text, *ignore_case, *separator);
            let names = server.table().join_names(&seg.codes, ' ');
            println!("{names}");
            println!("offsets: {:?}", seg.offsets);
        }
        Commands::Match {
            query,
            candidates,
            limit,
            highlight,
        } => {
            if *highlight {
                for m in server.on_highlight_search(candidates, query, *limit) {
                    println!("{}\t{:.4}\t{}", m.index, m.score, m.text);
                }
            } else {
                for index in server.on_search(candidates, query, *limit) {
                    println!("{index}\t{}", candidates[index]);
                }
            }
        }
        Commands::Input {
            input,
            prefix,
            limit,
            json,
        } => {
            let limit = limit.unwrap_or(server.config().base.max_candidates);
            let result = server.on_input(prefix, input, limit);
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Commands::Repl { limit } => repl(&server, *limit)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_separator_defaults_to_space() {
        let cli = Cli::try_parse_from(["pinyinkit", "split", "xi an"]).unwrap();
        match cli.command {
            Commands::Split { text, separator, .. } => {
                assert_eq!(text, "xi an");
                assert_eq!(separator, ' ');
            }
            _ => panic!("expected split"),
        }

        let cli = Cli::try_parse_from(["pinyinkit", "split", "xi'an", "--separator", "'"]).unwrap();
        assert!(matches!(cli.command, Commands::Split { separator: '\'', .. }));
    }
}
