mod compile;
mod config;
mod crawl;
mod download;
mod fetch;
mod merge;
mod models;
mod parser;
mod pipeline;
#[cfg(test)]
mod test_helpers;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::bail;
use clap::Parser;
use tracing::info;

use config::{Config, RetryPolicy};
use models::{MetaField, VideoMetadata};
use pipeline::{Outcome, Pipeline, RunOptions};

#[derive(Parser)]
#[command(
    name = "savant_merger",
    about = "Download the clips behind a Baseball Savant search and merge them into one video"
)]
struct Cli {
    /// Baseball Savant statcast_search query URL
    #[arg(short, long)]
    url: String,

    /// Output video name (".mp4" is appended if missing)
    #[arg(short, long)]
    output: Option<String>,

    /// Log progress at info level and show a download bar
    #[arg(short, long)]
    verbose: bool,

    /// Extra attempts for a failed page fetch or download
    #[arg(long, default_value = "0")]
    retries: u32,

    /// Program used to concatenate the clips
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Write the resolved clip metadata to this file as JSON
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// List the resolved clips without downloading anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    if !config::is_search_url(&cli.url) {
        bail!(
            "The url you entered is not valid: expected a {}{} query",
            config::SITE_ORIGIN,
            config::SEARCH_PATH
        );
    }

    if cli.output.is_none() {
        println!("Default output name of {}", config::DEFAULT_OUTPUT);
    }
    let output = PathBuf::from(config::output_name(cli.output.as_deref()));

    let config = Config {
        retry: RetryPolicy {
            retries: cli.retries,
            ..RetryPolicy::default()
        },
        concat_tool: cli.ffmpeg,
        ..Config::default()
    };

    if !cli.dry_run && !merge::is_tool_available(&config.concat_tool).await {
        bail!(
            "{} is not available; install ffmpeg or pass --ffmpeg <PATH>",
            config.concat_tool.display()
        );
    }

    let t0 = Instant::now();
    let opts = RunOptions {
        dry_run: cli.dry_run,
        metadata_out: cli.metadata,
        show_progress: cli.verbose,
    };

    let report = Pipeline::new(config)?.run(&cli.url, &output, &opts).await?;
    let c = &report.counts;
    info!(
        "{} sections, {} detail pages, {} videos found, {} ready, {} downloaded",
        c.sections, c.detail_pages, c.discovered, c.ready, c.downloaded
    );

    match report.outcome {
        Outcome::Merged { output, clips } => {
            println!("Merged {} videos, saved as: {}", clips, output.display());
        }
        Outcome::NothingFound => println!("No videos found for this query."),
        Outcome::Listed(videos) => print_clips(&videos),
    }

    info!("Done in {:.1?}", t0.elapsed());

    Ok(())
}

fn print_clips(videos: &[VideoMetadata]) {
    if videos.is_empty() {
        println!("No downloadable videos.");
        return;
    }

    println!(
        "{:>3} | {:<10} | {:<10} | {:<20} | {:<20} | {:<16} | {:>9} | {:>9}",
        "#", "Date", "Matchup", "Batter", "Pitcher", "Pitch", "Velo", "EV"
    );
    println!("{}", "-".repeat(115));

    for (i, v) in videos.iter().enumerate() {
        let cell = |field: MetaField, max: usize| truncate(v.get(field).unwrap_or("-"), max);
        println!(
            "{:>3} | {:<10} | {:<10} | {:<20} | {:<20} | {:<16} | {:>9} | {:>9}",
            i + 1,
            cell(MetaField::Date, 10),
            cell(MetaField::Matchup, 10),
            cell(MetaField::Batter, 20),
            cell(MetaField::Pitcher, 20),
            cell(MetaField::PitchType, 16),
            cell(MetaField::PitchVelo, 9),
            cell(MetaField::ExitVelo, 9),
        );
    }

    println!("\n{} videos", videos.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
