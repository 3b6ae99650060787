use crate::block::{Block, MediaKind, RichTextRun};
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// Link labels that turn `[label](url)` into a media block.
const KEYWORDS: &[&str] = &["bookmark", "embed", "video", "audio", "file", "pdf", "image", "media"];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tif", "tiff", "heic", "ico", "avif",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv", "m4v", "wmv", "ogv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "m4a", "flac", "aac"];
const FILE_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "tgz", "rar", "7z", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv",
    "txt", "json", "epub",
];

/// Inline `image` tokens and keyword links (`[video](url)`, `[bookmark](url)`, …).
///
/// Runs over the children of an `inline` token, handed over by the paragraph
/// converter when a paragraph holds nothing but media.
pub struct MediaConverter;

impl BlockConverter for MediaConverter {
    fn name(&self) -> &'static str {
        "media"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["image", "link_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        _ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let token = &tokens[idx];

        if token.kind == "image" {
            let url = required_url(token, "src", idx)?;
            let kind = classify(url).unwrap_or(MediaKind::Image);
            let caption = caption(page, &token.content, token.attr("title"));
            return Ok(Converted::one(media(kind, url, caption), idx + 1));
        }

        let close = matching_close(tokens, idx)?;
        let url = required_url(token, "href", idx)?;
        let label = link_label(&tokens[idx + 1..close]);
        let kind = match keyword_kind(&label) {
            Some(Some(kind)) => kind,
            // `media` with nothing to go on, or a label that is not a keyword
            Some(None) | None => classify(url).unwrap_or(MediaKind::Bookmark),
        };
        let caption = caption(page, "", token.attr("title"));
        Ok(Converted::one(media(kind, url, caption), close + 1))
    }
}

/// Index just past the media item starting at `children[idx]`, if it is one.
pub(crate) fn span_end(children: &[Token], idx: usize) -> Option<usize> {
    let token = children.get(idx)?;
    match token.kind.as_str() {
        "image" => Some(idx + 1),
        "link_open" => {
            let close = matching_close(children, idx).ok()?;
            let label = link_label(&children[idx + 1..close]);
            keyword_kind(&label).map(|_| close + 1)
        }
        _ => None,
    }
}

/// Whether the media item at `token` points anywhere.
pub(crate) fn has_url(token: &Token) -> bool {
    let attr = if token.kind == "image" { "src" } else { "href" };
    token.attr(attr).is_some_and(|url| !url.trim().is_empty())
}

/// `Some(Some(kind))` for a fixed keyword, `Some(None)` for `media`, `None` otherwise.
fn keyword_kind(label: &str) -> Option<Option<MediaKind>> {
    let label = label.trim().to_ascii_lowercase();
    if !KEYWORDS.contains(&label.as_str()) {
        return None;
    }
    Some(match label.as_str() {
        "bookmark" => Some(MediaKind::Bookmark),
        "embed" => Some(MediaKind::Embed),
        "video" => Some(MediaKind::Video),
        "audio" => Some(MediaKind::Audio),
        "file" => Some(MediaKind::File),
        "pdf" => Some(MediaKind::Pdf),
        "image" => Some(MediaKind::Image),
        _ => None,
    })
}

/// Media kind implied by the URL's file extension.
pub fn classify(url: &str) -> Option<MediaKind> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    let ext = ext.as_str();

    if IMAGE_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Audio)
    } else if ext == "pdf" {
        Some(MediaKind::Pdf)
    } else if FILE_EXTENSIONS.contains(&ext) {
        Some(MediaKind::File)
    } else {
        None
    }
}

fn link_label(children: &[Token]) -> String {
    children
        .iter()
        .filter(|t| t.kind == "text" || t.kind == "code_inline")
        .map(|t| t.content.as_str())
        .collect()
}

fn required_url<'t>(token: &'t Token, attr: &str, idx: usize) -> Result<&'t str, ConvertError> {
    token
        .attr(attr)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ConvertError::failed(&token.kind, idx, "media without a URL"))
}

/// Caption from the alt text, falling back to the title.
fn caption(page: &PageBuilder, alt: &str, title: Option<&str>) -> Vec<RichTextRun> {
    let source = if alt.trim().is_empty() {
        title.unwrap_or_default()
    } else {
        alt
    };
    page.segmenter().segment(source.trim())
}

fn media(kind: MediaKind, url: &str, caption: Vec<RichTextRun>) -> Block {
    Block::Media {
        kind,
        url: url.to_string(),
        caption,
    }
}
