use std::path::PathBuf;
use std::time::Duration;

pub const SITE_ORIGIN: &str = "https://baseballsavant.mlb.com";
pub const SEARCH_PATH: &str = "/statcast_search";
pub const DEFAULT_OUTPUT: &str = "merged.mp4";
pub const MANIFEST_NAME: &str = "filelist.txt";

const MAX_WORKERS: usize = 4;
const PAGE_TIMEOUT_SECS: u64 = 30;
const BASE_BACKOFF_MS: u64 = 2000;
const USER_AGENT: &str = concat!("savant_merger/", env!("CARGO_PKG_VERSION"));

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin that relative video links are resolved against.
    pub site_origin: String,
    pub concurrency: usize,
    pub page_timeout: Duration,
    pub retry: RetryPolicy,
    pub concat_tool: PathBuf,
    /// Directory holding the temp media files and the manifest.
    pub work_dir: PathBuf,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_origin: SITE_ORIGIN.to_string(),
            concurrency: MAX_WORKERS,
            page_timeout: Duration::from_secs(PAGE_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            concat_tool: PathBuf::from("ffmpeg"),
            work_dir: PathBuf::from("."),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Retries applied to page fetches and media downloads.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure. Zero means a single try.
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            backoff: Duration::from_millis(BASE_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff * 2u32.saturating_pow(attempt)
    }
}

impl Config {
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()?)
    }
}

/// True when `url` points at a Baseball Savant statcast search.
pub fn is_search_url(url: &str) -> bool {
    url.starts_with(&format!("{}{}", SITE_ORIGIN, SEARCH_PATH))
}

/// Appends `.mp4` unless the name already carries it.
pub fn output_name(name: Option<&str>) -> String {
    match name {
        Some(n) if n.ends_with(".mp4") => n.to_string(),
        Some(n) => format!("{}.mp4", n),
        None => DEFAULT_OUTPUT.to_string(),
    }
}
