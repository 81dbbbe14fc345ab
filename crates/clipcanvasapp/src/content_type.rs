//! # Content Classification
//!
//! Maps a storage item, or an inbound payload, to one variant of the closed
//! [`ContentType`] set that picks the viewer. Classification never panics and
//! never returns an error: anything that goes wrong is itself a value,
//! [`ContentType::Invalid`].
//!
//! ## Extension rule
//!
//! Extensions are compared with their leading dot and ASCII-lowercased
//! (`Photo.PNG` → `.png`). The first matching set wins, in this order:
//!
//! 1. image
//! 2. media
//! 3. text
//! 4. web view (`.url` means a website link, other markup is read as HTML)
//! 5. markdown
//! 6. a bounded "does this decode as text" probe
//! 7. fallback
//!
//! ## Cached invalid state
//!
//! `Invalid { needs_reinitialization: false }` is a final verdict and is reused
//! as-is, so a known-bad file is not re-probed on every view refresh. With
//! `needs_reinitialization: true` the cached value is ignored and the item is
//! classified again.

use crate::canvas_item::CollectionItem;
use crate::error::CanvasError;
use crate::payload::{PayloadFormat, PayloadSource};
use crate::reference::ReferenceFile;
use crate::result::{ErrorCode, OperationResult};
use crate::store::{FileSystem, StorageHandle};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".bmp", ".gif", ".tif", ".tiff", ".ico", ".webp", ".svg",
];
pub const MEDIA_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".mp3", ".m4a", ".wav", ".wma", ".aac", ".flac", ".mov", ".mkv",
    ".avi",
];
pub const TEXT_EXTENSIONS: &[&str] = &[".txt"];
pub const WEBVIEW_EXTENSIONS: &[&str] = &[".html", ".htm", WEBSITE_LINK_FILE_EXTENSION];
pub const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".markdown"];

pub const WEBSITE_LINK_FILE_EXTENSION: &str = ".url";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebViewMode {
    ReadHtml,
    ReadWebsite,
}

#[derive(Debug, Clone)]
pub enum ContentType {
    Image,
    Text,
    Media,
    WebView { mode: WebViewMode },
    Markdown,
    Fallback,
    Invalid {
        result: OperationResult,
        needs_reinitialization: bool,
    },
}

impl ContentType {
    pub fn invalid(result: OperationResult) -> Self {
        ContentType::Invalid {
            result,
            needs_reinitialization: false,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ContentType::Invalid { .. })
    }

    /// The cached value, if it can be trusted without classifying again.
    pub fn reusable(cached: Option<&ContentType>) -> Option<ContentType> {
        match cached {
            Some(ContentType::Invalid {
                needs_reinitialization: true,
                ..
            }) => None,
            Some(content_type) => Some(content_type.clone()),
            None => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Image => f.write_str("image"),
            ContentType::Text => f.write_str("text"),
            ContentType::Media => f.write_str("media"),
            ContentType::WebView {
                mode: WebViewMode::ReadHtml,
            } => f.write_str("html"),
            ContentType::WebView {
                mode: WebViewMode::ReadWebsite,
            } => f.write_str("website"),
            ContentType::Markdown => f.write_str("markdown"),
            ContentType::Fallback => f.write_str("file"),
            ContentType::Invalid { result, .. } => write!(f, "invalid ({})", result.code()),
        }
    }
}

/// What a paste payload turned out to be.
#[derive(Debug, Clone)]
pub enum PayloadKind {
    Content(ContentType),
    /// More than one storage item. Not a single canvas; the caller decides.
    MultipleItems(Vec<StorageHandle>),
}

/// Knobs that influence classification. Built from
/// [`CanvasConfig`](crate::config::CanvasConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierSettings {
    pub prioritize_markdown_over_text: bool,
    pub text_probe_limit: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            prioritize_markdown_over_text: false,
            text_probe_limit: 8 * 1024,
        }
    }
}

fn in_set(set: &[&str], extension: &str) -> bool {
    set.contains(&extension)
}

/// Classify a file by its (already normalized) extension, falling back to a
/// text probe and then to [`ContentType::Fallback`].
pub fn classify_from_extension(
    fs: &dyn FileSystem,
    file: &StorageHandle,
    extension: &str,
    settings: &ClassifierSettings,
) -> ContentType {
    let extension = extension.to_ascii_lowercase();

    if in_set(IMAGE_EXTENSIONS, &extension) {
        return ContentType::Image;
    }
    if in_set(MEDIA_EXTENSIONS, &extension) {
        return ContentType::Media;
    }
    if in_set(TEXT_EXTENSIONS, &extension) {
        return ContentType::Text;
    }
    if in_set(WEBVIEW_EXTENSIONS, &extension) {
        let mode = if extension == WEBSITE_LINK_FILE_EXTENSION {
            WebViewMode::ReadWebsite
        } else {
            WebViewMode::ReadHtml
        };
        return ContentType::WebView { mode };
    }
    if in_set(MARKDOWN_EXTENSIONS, &extension) {
        return ContentType::Markdown;
    }
    if can_load_as_text(fs, file, settings.text_probe_limit) {
        return ContentType::Text;
    }
    ContentType::Fallback
}

/// Read at most `limit` bytes and decide whether they look like text: no NUL
/// bytes and valid UTF-8, allowing a character cut in half at the limit.
pub fn can_load_as_text(fs: &dyn FileSystem, file: &StorageHandle, limit: usize) -> bool {
    let bytes = match fs.read_bytes(file, Some(limit)) {
        Ok(bytes) => bytes,
        Err(result) => {
            debug!(path = %file.path().display(), %result, "text probe failed");
            return false;
        }
    };
    if bytes.contains(&0) {
        return false;
    }
    match std::str::from_utf8(&bytes) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && bytes.len() >= limit,
    }
}

/// Classify any storage item: folders are rejected, reference files are
/// followed one level, everything else goes by extension.
pub fn classify_handle(
    fs: &dyn FileSystem,
    handle: &StorageHandle,
    settings: &ClassifierSettings,
) -> ContentType {
    if handle.is_folder() {
        return ContentType::invalid(CanvasError::FoldersNotSupported.into());
    }

    let file = if ReferenceFile::is_reference_file(handle) {
        match ReferenceFile::resolve(fs, handle) {
            Ok(target) => target,
            Err(result) => return invalid_from_failure(result),
        }
    } else {
        handle.clone()
    };

    if file.is_folder() {
        return ContentType::invalid(CanvasError::FoldersNotSupported.into());
    }
    classify_from_extension(fs, &file, &file.extension(), settings)
}

/// [`classify_handle`] with the cached-value rules applied first.
pub fn classify(
    fs: &dyn FileSystem,
    handle: &StorageHandle,
    cached: Option<&ContentType>,
    settings: &ClassifierSettings,
) -> ContentType {
    if let Some(content_type) = ContentType::reusable(cached) {
        return content_type;
    }
    classify_handle(fs, handle, settings)
}

/// Classify a collection item, resolving its source through the item's own
/// cache and storing the verdict on the item.
pub fn classify_item(
    fs: &dyn FileSystem,
    item: &mut CollectionItem,
    settings: &ClassifierSettings,
) -> ContentType {
    if let Some(content_type) = ContentType::reusable(item.content_type()) {
        debug!(path = %item.associated().path().display(), %content_type, "reusing cached content type");
        return content_type;
    }

    let content_type = match item.canvas_mut().source(fs) {
        Err(result) => invalid_from_failure(result),
        Ok(source) if source.is_folder() => {
            ContentType::invalid(CanvasError::FoldersNotSupported.into())
        }
        Ok(source) => classify_from_extension(fs, &source, &source.extension(), settings),
    };
    item.set_content_type(content_type.clone());
    content_type
}

/// Stale or broken references are final verdicts; anything else (permissions,
/// I/O hiccups) is worth another try later.
fn invalid_from_failure(result: OperationResult) -> ContentType {
    let final_verdict = result.is_stale_reference()
        || matches!(result.cause(), Some(CanvasError::MalformedReference(_)));
    ContentType::Invalid {
        result,
        needs_reinitialization: !final_verdict,
    }
}

fn clipboard_failure(result: &OperationResult) -> ContentType {
    warn!(%result, "couldn't read paste payload");
    ContentType::invalid(OperationResult::with_cause(
        ErrorCode::AccessUnauthorized,
        "Couldn't retrieve clipboard data",
        CanvasError::ClipboardUnavailable(result.message().to_string()),
    ))
}

/// Classify a payload that has not been persisted yet.
pub fn classify_payload(
    fs: &dyn FileSystem,
    payload: &dyn PayloadSource,
    settings: &ClassifierSettings,
) -> PayloadKind {
    if payload.contains(PayloadFormat::Bitmap) {
        return PayloadKind::Content(ContentType::Image);
    }

    if payload.contains(PayloadFormat::Text) {
        let text = match payload.get_text() {
            Ok(text) => text,
            Err(result) => return PayloadKind::Content(clipboard_failure(&result)),
        };
        return PayloadKind::Content(classify_text(&text, settings));
    }

    if payload.contains(PayloadFormat::StorageItems) {
        let mut items = match payload.get_storage_items() {
            Ok(items) => items,
            Err(result) => return PayloadKind::Content(clipboard_failure(&result)),
        };
        return match items.len() {
            0 => PayloadKind::Content(ContentType::invalid(
                CanvasError::ClipboardUnavailable("no items to paste".to_string()).into(),
            )),
            1 => {
                let item = items.remove(0);
                PayloadKind::Content(classify_handle(fs, &item, settings))
            }
            _ => PayloadKind::MultipleItems(items),
        };
    }

    PayloadKind::Content(ContentType::invalid(
        CanvasError::ClipboardUnavailable("unsupported clipboard format".to_string()).into(),
    ))
}

/// Text payloads: image URLs are images, other URLs are websites, plain text
/// is text or markdown depending on preference.
pub fn classify_text(text: &str, settings: &ClassifierSettings) -> ContentType {
    if let Some(url) = parse_url(text) {
        if is_image_url(&url) {
            return ContentType::Image;
        }
        if settings.prioritize_markdown_over_text {
            return ContentType::Markdown;
        }
        return ContentType::WebView {
            mode: WebViewMode::ReadWebsite,
        };
    }

    if settings.prioritize_markdown_over_text {
        ContentType::Markdown
    } else {
        ContentType::Text
    }
}

/// A single web URL, surrounding whitespace allowed.
pub fn parse_url(text: &str) -> Option<Url> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    matches!(url.scheme(), "http" | "https" | "ftp").then_some(url)
}

/// The URL's last path segment carries an image extension.
pub fn is_image_url(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|last| crate::store::normalize_extension(std::path::Path::new(last)))
        .is_some_and(|ext| in_set(IMAGE_EXTENSIONS, &ext))
}
