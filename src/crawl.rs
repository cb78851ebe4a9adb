use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use scraper::Html;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};
use url::Url;

use crate::compile::compile_url;
use crate::fetch::PageFetcher;
use crate::models::{SearchSection, VideoMetadata};
use crate::parser::{links, video};

/// Run `work` over `items` with at most `limit` units in flight.
///
/// Slot `i` of the result holds the outcome of `items[i]`, independent of
/// completion order. A unit that returns `None` or panics leaves its slot empty.
pub async fn fan_out<T, R, F, Fut>(items: Vec<T>, limit: usize, work: F) -> Vec<Option<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(usize, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<R>> + Send + 'static,
{
    let total = items.len();
    let limit = limit.max(1);
    let work = Arc::new(work);
    let semaphore = Arc::new(Semaphore::new(limit));

    // Workers send (index, outcome); the loop below slots them back in order
    let (tx, mut rx) = mpsc::channel::<(usize, Option<R>)>(limit * 2);

    for (idx, item) in items.into_iter().enumerate() {
        let work = Arc::clone(&work);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let outcome = (*work)(idx, item).await;
            let _ = tx.send((idx, outcome)).await;
        });
    }

    drop(tx);

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    while let Some((idx, outcome)) = rx.recv().await {
        slots[idx] = outcome;
    }
    slots
}

/// Compile each section into its detail URL, dropping sections without one.
pub fn compile_detail_urls(landing_url: &str, sections: &[SearchSection]) -> Vec<String> {
    sections
        .iter()
        .filter_map(|section| {
            let url = compile_url(landing_url, section);
            if url.is_none() {
                debug!("Skipping section with group_by {:?}", section.group_by);
            }
            url
        })
        .collect()
}

/// Fetch every detail page and collect its video links.
///
/// Output follows detail URL order, then link order within a page. A page
/// that fails to load contributes nothing.
pub async fn discover_videos(
    fetcher: &PageFetcher,
    detail_urls: Vec<String>,
    site_origin: &str,
    concurrency: usize,
) -> Result<Vec<VideoMetadata>> {
    let origin = Arc::new(Url::parse(site_origin)?);
    let fetcher = fetcher.clone();

    let pages = fan_out(detail_urls, concurrency, move |_, url| {
        let fetcher = fetcher.clone();
        let origin = Arc::clone(&origin);
        async move {
            let Some(body) = fetcher.load_page(&url).await else {
                return None;
            };
            Some(links::extract_video_links(&Html::parse_document(&body), &origin))
        }
    })
    .await;

    Ok(pages
        .into_iter()
        .flatten()
        .flatten()
        .map(VideoMetadata::new)
        .collect())
}

/// Load each video page, fill in its metadata and media link, and keep only
/// the entries that have a media link.
///
/// The surviving list is reversed so the output runs oldest clip first.
pub async fn resolve_videos(
    fetcher: &PageFetcher,
    videos: Vec<VideoMetadata>,
    concurrency: usize,
) -> Vec<VideoMetadata> {
    let total = videos.len();
    info!("Loading {} video pages...", total);

    let fetcher = fetcher.clone();
    let resolved = fan_out(videos, concurrency, move |_, video| {
        let fetcher = fetcher.clone();
        async move { Some(resolve_one(&fetcher, video).await) }
    })
    .await;

    let mut ready: Vec<VideoMetadata> = resolved
        .into_iter()
        .flatten()
        .filter(VideoMetadata::is_downloadable)
        .collect();

    let failed = total - ready.len();
    if failed > 0 {
        warn!("{} videos failed to get mp4 urls", failed);
    }
    info!("{} videos ready for download", ready.len());

    // Detail pages list clips newest first
    ready.reverse();
    ready
}

async fn resolve_one(fetcher: &PageFetcher, mut video: VideoMetadata) -> VideoMetadata {
    let Some(body) = fetcher.load_page(&video.video_page_url).await else {
        return video;
    };
    let doc = Html::parse_document(&body);
    if let Err(reason) = video::apply_video_page(&doc, &mut video) {
        warn!("{} on page: {}", reason, video.video_page_url);
    }
    video
}
