mod corpus;

use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wordscout::{CliOverrides, CorpusResult, JoinPolicy, SearchConfig, SearchError, Searcher};

type Result<T> = std::result::Result<T, SearchError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Word to search for (can be specified multiple times)
    #[arg(short = 'w', long = "word")]
    words: Vec<String>,

    /// Corpus file containing titled blocks
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Line that separates blocks in the corpus file
    #[arg(long, default_value = "@")]
    separator: String,

    /// Text separating each block's title from its body (\n for first-line titles) [default: :]
    #[arg(short = 'd', long)]
    delimiter: Option<String>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Report failed blocks instead of aborting on the first failure
    #[arg(long, conflicts_with = "fail_fast")]
    collect_all: bool,

    /// Abort on the first failed block (the default)
    #[arg(long)]
    fail_fast: bool,

    /// Match words regardless of case
    #[arg(long, conflicts_with = "match_case")]
    ignore_case: bool,

    /// Match words exactly as given (the default)
    #[arg(long)]
    match_case: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Show only statistics, not per-word counts
    #[arg(short, long)]
    stats: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [default: warn]
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let file_config = SearchConfig::load_from(cli.config.as_deref())?;
    let cli_config = CliOverrides {
        words: cli.words,
        title_delimiter: cli.delimiter.as_deref().map(corpus::unescape),
        thread_count: cli.threads,
        join_policy: flag_pair(cli.collect_all, cli.fail_fast).map(|collect_all| {
            if collect_all {
                JoinPolicy::CollectAll
            } else {
                JoinPolicy::FailFast
            }
        }),
        case_insensitive: flag_pair(cli.ignore_case, cli.match_case),
        log_level: cli.log_level,
    };
    let config = file_config.merge_with_cli(cli_config);

    init_logging(&config.log_level);

    let blocks = corpus::load_blocks(&cli.input, &cli.separator)?;
    debug!("Loaded {} blocks from {}", blocks.len(), cli.input.display());
    let searcher = Searcher::new(&config)?;
    let result = searcher.search_corpus(&blocks)?;

    if cli.json {
        print_json(&result)?;
    } else {
        print_search_results(&result, cli.stats);
    }
    Ok(())
}

/// `Some(true)` for the on flag, `Some(false)` for the off flag, `None` if neither was given
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_search_results(result: &CorpusResult, stats_only: bool) {
    if !stats_only {
        for block in &result.block_results {
            match &block.outcome {
                Ok(words) => {
                    let title = block
                        .title()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Block {}", block.index));
                    println!("\n{}", title.blue());
                    for r in words {
                        println!("  {}: {}", r.word, r.count());
                    }
                }
                Err(e) => {
                    println!("\n{}", format!("Block {}: {}", block.index, e).red());
                }
            }
        }
    }

    println!(
        "\nFound {} matches in {} blocks",
        result.total_matches, result.blocks_with_matches
    );
    if result.blocks_failed > 0 {
        println!("{} blocks failed", result.blocks_failed);
    }
}

fn print_json(result: &CorpusResult) -> Result<()> {
    let blocks: Vec<serde_json::Value> = result
        .block_results
        .iter()
        .map(|block| match &block.outcome {
            Ok(words) => json!(words),
            Err(e) => json!({ "error": e.to_string() }),
        })
        .collect();

    let text = serde_json::to_string_pretty(&blocks).map_err(std::io::Error::from)?;
    println!("{}", text);
    Ok(())
}
