use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use scraper::Html;
use tracing::{info, warn};

use crate::config::Config;
use crate::crawl::{compile_detail_urls, discover_videos, resolve_videos};
use crate::download::download_videos;
use crate::fetch::PageFetcher;
use crate::merge::{check_output, merge_videos};
use crate::models::{SearchSection, VideoMetadata};
use crate::parser::sections::parse_search_rows;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after metadata extraction and return the clips.
    pub dry_run: bool,
    /// Write the downloadable clips' metadata here as JSON.
    pub metadata_out: Option<PathBuf>,
    pub show_progress: bool,
}

/// How many units came out of each phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub sections: usize,
    pub detail_pages: usize,
    pub discovered: usize,
    pub ready: usize,
    pub downloaded: usize,
}

#[derive(Debug)]
pub enum Outcome {
    Merged { output: PathBuf, clips: usize },
    /// The query produced no rows or no video links.
    NothingFound,
    /// Dry run: the clips that would have been downloaded, oldest first.
    Listed(Vec<VideoMetadata>),
}

#[derive(Debug)]
pub struct RunReport {
    pub counts: PhaseCounts,
    pub outcome: Outcome,
}

pub struct Pipeline {
    config: Config,
    fetcher: PageFetcher,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let client = config.http_client()?;
        let fetcher = PageFetcher::new(client, &config);
        Ok(Self { config, fetcher })
    }

    /// Landing page → detail pages → video pages → downloads → merged file.
    pub async fn run(&self, landing_url: &str, output: &Path, opts: &RunOptions) -> Result<RunReport> {
        if !opts.dry_run {
            check_output(output, &self.config)?;
        }
        let mut counts = PhaseCounts::default();

        let videos = self.discover(landing_url, &mut counts).await?;
        if videos.is_empty() {
            return Ok(RunReport {
                counts,
                outcome: Outcome::NothingFound,
            });
        }

        let ready = resolve_videos(&self.fetcher, videos, self.config.concurrency).await;
        counts.ready = ready.len();

        if let Some(path) = &opts.metadata_out {
            write_metadata(path, &ready).await?;
        }

        if opts.dry_run {
            return Ok(RunReport {
                counts,
                outcome: Outcome::Listed(ready),
            });
        }

        let files = download_videos(self.fetcher.client(), &ready, &self.config, opts.show_progress).await;
        counts.downloaded = files.len();

        merge_videos(files, output, &self.config).await?;

        Ok(RunReport {
            outcome: Outcome::Merged {
                output: output.to_path_buf(),
                clips: counts.downloaded,
            },
            counts,
        })
    }

    /// Collect the video pages linked from every search section of the query.
    async fn discover(&self, landing_url: &str, counts: &mut PhaseCounts) -> Result<Vec<VideoMetadata>> {
        info!("Loading BaseballSavant query...");
        let body = self
            .fetcher
            .load_page(landing_url)
            .await
            .ok_or_else(|| anyhow!("Failed to load main Baseball Savant page: {}", landing_url))?;

        let sections = parse_landing(&body);
        counts.sections = sections.len();
        if sections.is_empty() {
            warn!("No search result rows found");
            return Ok(Vec::new());
        }
        info!("Parsed {} search sections", sections.len());

        let detail_urls = compile_detail_urls(landing_url, &sections);
        counts.detail_pages = detail_urls.len();
        if detail_urls.is_empty() {
            warn!("No search sections link to video details");
            return Ok(Vec::new());
        }

        let videos = discover_videos(
            &self.fetcher,
            detail_urls,
            &self.config.site_origin,
            self.config.concurrency,
        )
        .await?;
        counts.discovered = videos.len();
        if videos.is_empty() {
            warn!("No video URLs found");
        } else {
            info!("Found {} video URLs", videos.len());
        }
        Ok(videos)
    }
}

fn parse_landing(body: &str) -> Vec<SearchSection> {
    parse_search_rows(&Html::parse_document(body))
}

async fn write_metadata(path: &Path, videos: &[VideoMetadata]) -> Result<()> {
    let json = serde_json::to_string_pretty(videos)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write metadata to {}", path.display()))?;
    info!("Wrote metadata for {} videos to {}", videos.len(), path.display());
    Ok(())
}
