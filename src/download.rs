use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::{Config, RetryPolicy};
use crate::crawl::fan_out;
use crate::models::VideoMetadata;

const TEMP_PREFIX: &str = "temp_video_";
const TEMP_SUFFIX: &str = ".mp4";

/// Temp file for the clip at position `idx` of the run.
pub fn temp_path(work_dir: &Path, idx: usize) -> PathBuf {
    work_dir.join(format!("{}{}{}", TEMP_PREFIX, idx, TEMP_SUFFIX))
}

/// True for a file name `temp_path` could produce.
pub fn is_temp_name(name: &str) -> bool {
    name.strip_prefix(TEMP_PREFIX)
        .and_then(|rest| rest.strip_suffix(TEMP_SUFFIX))
        .is_some_and(|idx| !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()))
}

/// Download every clip to its own temp file.
///
/// Returns the paths of the clips that downloaded, in input order. Failed
/// clips are logged and left out; they never stop the other downloads.
pub async fn download_videos(
    client: &reqwest::Client,
    videos: &[VideoMetadata],
    config: &Config,
    show_progress: bool,
) -> Vec<PathBuf> {
    info!("Downloading {} videos...", videos.len());

    let pb = if show_progress {
        progress_bar(videos.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let jobs: Vec<Option<String>> = videos.iter().map(|v| v.mp4_video_url.clone()).collect();
    let client = client.clone();
    let work_dir = config.work_dir.clone();
    let retry = config.retry;
    let bar = pb.clone();

    let files = fan_out(jobs, config.concurrency, move |idx, media_url| {
        let client = client.clone();
        let path = temp_path(&work_dir, idx);
        let bar = bar.clone();
        async move {
            let Some(url) = media_url else {
                warn!("Video {} has no mp4 url, skipping", idx);
                return None;
            };
            let outcome = download_with_retry(&client, &url, &path, retry).await;
            bar.inc(1);
            match outcome {
                Ok(bytes) => {
                    debug!("Downloaded {} ({} bytes) to {}", url, bytes, path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Failed to download {}: {:#}", url, e);
                    None
                }
            }
        }
    })
    .await;

    pb.finish_and_clear();

    let files: Vec<PathBuf> = files.into_iter().flatten().collect();
    let failed = videos.len() - files.len();
    if failed > 0 {
        warn!("{} of {} downloads failed", failed, videos.len());
    }
    info!("Downloaded {} videos", files.len());
    files
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} videos ({eta})")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

async fn download_with_retry(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    retry: RetryPolicy,
) -> Result<u64> {
    let mut attempt = 0;
    loop {
        match download_one(client, url, path).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < retry.retries => {
                let backoff = retry.delay(attempt);
                debug!(
                    "Download of {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                    url,
                    attempt + 1,
                    retry.retries + 1,
                    backoff.as_secs_f64(),
                    e
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Stream one media URL into `path`. A partial file is removed on failure.
async fn download_one(client: &reqwest::Client, url: &str, path: &Path) -> Result<u64> {
    let result = stream_to_file(client, url, path).await;
    if result.is_err() {
        remove_partial(path).await;
    }
    result
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial download {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial download {}: {}", path.display(), e),
    }
}

async fn stream_to_file(client: &reqwest::Client, url: &str, path: &Path) -> Result<u64> {
    let response = client.get(url).send().await?.error_for_status()?;

    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}
