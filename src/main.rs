use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::Parser;

use tagrank::{
    fetch::{self, HttpFetcher},
    report, Aggregator, Category, State, TagExpr,
};

/// Collect per-tag rating statistics from a user's catalog listings.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog username whose listings are collected.
    username: String,

    /// Filter expression words, joined with spaces: '|' for or,
    /// juxtaposition for and, '!' for not, parentheses for grouping.
    /// An empty expression matches every item.
    filter: Vec<String>,

    /// Categories to collect.
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "anime"
    )]
    category: Vec<Category>,

    /// Collection states to collect.
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "collect"
    )]
    state: Vec<State>,

    /// Lowest ranked count a tag needs to make the table.
    #[arg(long, default_value_t = 1)]
    min_ranked: u64,

    /// Maximum bar chart width in characters.
    #[arg(
        short = 'w',
        long,
        default_value_t = report::DEFAULT_MAX_WIDTH
    )]
    max_width: usize,

    /// Write raw histogram counts to a file after the run.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Show fetch progress on stderr.
    #[arg(short, long)]
    progress: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(if cli.progress { "info" } else { "warn" }),
    )
    .init();

    // Compile the filter before touching the network; the expression
    // and every evaluated tag set get the same case fold.
    let filter: TagExpr = cli.filter.join(" ").to_lowercase().parse()?;

    let fetcher = HttpFetcher::new(cli.username.as_str());
    let mut agg = Aggregator::default();
    fetch::collect_items(
        &fetcher,
        &cli.category,
        &cli.state,
        &filter,
        &mut agg,
    )?;

    let merged = agg.merge_variants();
    let stats = merged.tag_stats();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_tag_table(&mut out, &stats, cli.min_ranked)?;
    writeln!(out)?;
    report::write_histogram(&mut out, &merged.overall, cli.max_width)?;

    if let Some(path) = &cli.dump {
        report::dump_to_file(path, &merged)?;
    }

    Ok(())
}
