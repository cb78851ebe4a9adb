use std::fmt;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::element_text;
use crate::models::{MetaField, VideoMetadata};

static DATA_LIST_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.mod").unwrap());
static ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());
static VIDEO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("video").unwrap());
static SOURCE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("source").unwrap());

/// Why a video page yielded no media link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMedia {
    NoVideoElement,
    NoSourceElement,
    NoSourceLink,
}

impl fmt::Display for MissingMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoVideoElement => "no video element",
            Self::NoSourceElement => "no source element",
            Self::NoSourceLink => "no mp4 link",
        };
        f.write_str(msg)
    }
}

/// Labelled fields from the page's metadata list.
///
/// Only labels present in the field table are returned.
pub fn parse_fields(doc: &Html) -> Vec<(MetaField, String)> {
    let Some(list) = doc.select(&DATA_LIST_SEL).next() else {
        return Vec::new();
    };
    list.select(&ITEM_SEL).filter_map(|li| parse_item(&li)).collect()
}

fn parse_item(li: &ElementRef) -> Option<(MetaField, String)> {
    let label = element_text(&li.select(&LABEL_SEL).next()?);
    let field = MetaField::from_label(&label)?;
    let full = element_text(li);
    let value = match full.strip_prefix(label.as_str()) {
        Some(rest) => rest.to_string(),
        None => full.replacen(label.as_str(), "", 1),
    };
    Some((field, value.trim().to_string()))
}

/// The `src` of the first `<source>` inside the first `<video>`, resolved
/// against the page URL when it is relative.
pub fn parse_media_url(doc: &Html, page_url: &str) -> Result<String, MissingMedia> {
    let video = doc
        .select(&VIDEO_SEL)
        .next()
        .ok_or(MissingMedia::NoVideoElement)?;
    let source = video
        .select(&SOURCE_SEL)
        .next()
        .ok_or(MissingMedia::NoSourceElement)?;
    let src = source
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(MissingMedia::NoSourceLink)?;

    let resolved = Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(String::from)
        .unwrap_or_else(|_| src.to_string());
    Ok(resolved)
}

/// Fill `video` from its page. Returns the reason when no media link was found.
pub fn apply_video_page(doc: &Html, video: &mut VideoMetadata) -> Result<(), MissingMedia> {
    for (field, value) in parse_fields(doc) {
        video.set(field, value);
    }
    let media = parse_media_url(doc, &video.video_page_url)?;
    video.mp4_video_url = Some(media);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="mod">
          <ul>
            <li><strong>Batter:</strong> Shohei Ohtani</li>
            <li><strong>Pitcher:</strong>   Yu   Darvish </li>
            <li><strong>Exit Velocity:</strong> 112.4 MPH</li>
            <li><strong>Matchup:</strong> LAD <span>@</span> SD</li>
            <li><strong>Inning:</strong> Top 3</li>
            <li>No label here</li>
          </ul>
        </div>
        <div class="video-box">
          <video controls><source src="https://sporty-clips.mlb.com/abc.mp4" type="video/mp4"></video>
        </div>
      </body></html>"#;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn recognised_labels_are_trimmed() {
        let fields = parse_fields(&doc(PAGE));
        assert_eq!(
            fields,
            vec![
                (MetaField::Batter, "Shohei Ohtani".to_string()),
                (MetaField::Pitcher, "Yu Darvish".to_string()),
                (MetaField::ExitVelo, "112.4 MPH".to_string()),
                (MetaField::Matchup, "LAD @ SD".to_string()),
            ]
        );
    }

    #[test]
    fn unrecognised_labels_are_ignored() {
        let mut video = VideoMetadata::new("https://baseballsavant.mlb.com/sporty-videos?playId=x");
        apply_video_page(&doc(PAGE), &mut video).unwrap();
        let json = serde_json::to_string(&video).unwrap();
        assert!(!json.contains("Top 3"));
        assert!(!json.contains("No label"));
        assert_eq!(video.description, None);
        assert_eq!(video.count, None);
    }

    #[test]
    fn media_url_found() {
        let mut video = VideoMetadata::new("https://baseballsavant.mlb.com/sporty-videos?playId=x");
        apply_video_page(&doc(PAGE), &mut video).unwrap();
        assert_eq!(
            video.mp4_video_url.as_deref(),
            Some("https://sporty-clips.mlb.com/abc.mp4")
        );
        assert_eq!(video.batter.as_deref(), Some("Shohei Ohtani"));
    }

    #[test]
    fn relative_media_url_is_resolved() {
        let page = r#"<video><source src="/clips/abc.mp4"></video>"#;
        let url = parse_media_url(&doc(page), "https://baseballsavant.mlb.com/sporty-videos?playId=x");
        assert_eq!(url.as_deref(), Ok("https://baseballsavant.mlb.com/clips/abc.mp4"));
    }

    #[test]
    fn missing_media_reasons() {
        let page_url = "https://baseballsavant.mlb.com/sporty-videos?playId=x";
        let cases = [
            ("<div>gone</div>", MissingMedia::NoVideoElement),
            ("<video controls></video>", MissingMedia::NoSourceElement),
            (r#"<video><source type="video/mp4"></video>"#, MissingMedia::NoSourceLink),
            (r#"<video><source src=" "></video>"#, MissingMedia::NoSourceLink),
        ];
        for (html, reason) in cases {
            let mut video = VideoMetadata::new(page_url);
            assert_eq!(apply_video_page(&doc(html), &mut video), Err(reason));
            assert!(!video.is_downloadable());
        }
    }

    #[test]
    fn metadata_without_container() {
        assert!(parse_fields(&doc("<ul><li><strong>Batter:</strong> X</li></ul>")).is_empty());
    }
}
