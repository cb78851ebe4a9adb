use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Every anchor target on a detail page, resolved against `origin`, in document order.
///
/// Targets that cannot be resolved into a URL are skipped.
pub fn extract_video_links(doc: &Html, origin: &Url) -> Vec<String> {
    doc.select(&ANCHOR_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| origin.join(href).ok())
        .map(String::from)
        .collect()
}
