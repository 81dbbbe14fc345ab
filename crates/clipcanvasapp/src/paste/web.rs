use super::{ensure_file, payload_source_file, read_lossy, single_storage_item, CanvasView, PasteModel};
use crate::content_type::{ContentType, WebViewMode, WEBSITE_LINK_FILE_EXTENSION};
use crate::payload::PayloadSource;
use crate::result::{OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};

const SHORTCUT_SECTION: &str = "[InternetShortcut]";

/// HTML markup, or a link to a website stored as an internet shortcut:
///
/// ```text
/// [InternetShortcut]
/// URL=https://example.com/
/// ```
#[derive(Debug)]
pub struct WebViewModel {
    mode: WebViewMode,
    content: String,
}

impl WebViewModel {
    pub fn new(mode: WebViewMode) -> Self {
        Self {
            mode,
            content: String::new(),
        }
    }

    pub fn mode(&self) -> WebViewMode {
        self.mode
    }

    fn set_content(&mut self, raw: &str) {
        self.content = match self.mode {
            WebViewMode::ReadHtml => raw.to_string(),
            WebViewMode::ReadWebsite => parse_website_link(raw),
        };
    }

    fn take_payload(&mut self, fs: &dyn FileSystem, payload: &dyn PayloadSource) -> Outcome<()> {
        let raw = match single_storage_item(payload)? {
            Some(item) => read_lossy(fs, &payload_source_file(fs, &item)?)?,
            None => payload.get_text()?,
        };
        self.set_content(&raw);
        Ok(())
    }
}

/// The URL from a shortcut body, or the trimmed body when it is a bare URL.
pub fn parse_website_link(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("URL="))
        .unwrap_or_else(|| raw.trim())
        .to_string()
}

pub fn website_link_body(url: &str) -> String {
    format!("{}\r\nURL={}\r\n", SHORTCUT_SECTION, url)
}

impl PasteModel for WebViewModel {
    fn content_type(&self) -> ContentType {
        ContentType::WebView { mode: self.mode }
    }

    fn file_extension(&self) -> String {
        match self.mode {
            WebViewMode::ReadHtml => ".html".to_string(),
            WebViewMode::ReadWebsite => WEBSITE_LINK_FILE_EXTENSION.to_string(),
        }
    }

    fn load_existing(&mut self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        match ensure_file(file).and_then(|_| read_lossy(fs, file)) {
            Ok(raw) => {
                self.set_content(&raw);
                OperationResult::success()
            }
            Err(result) => result,
        }
    }

    fn set_from_payload(
        &mut self,
        fs: &dyn FileSystem,
        payload: &dyn PayloadSource,
    ) -> OperationResult {
        self.take_payload(fs, payload).into()
    }

    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        let body = match self.mode {
            WebViewMode::ReadHtml => self.content.clone(),
            WebViewMode::ReadWebsite => website_link_body(&self.content),
        };
        fs.write_text(file, &body).into()
    }

    fn view(&self) -> CanvasView {
        match self.mode {
            WebViewMode::ReadHtml => CanvasView::Html(self.content.clone()),
            WebViewMode::ReadWebsite => CanvasView::Website(self.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MemoryPayload;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn test_website_link_is_stored_as_shortcut() {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        let file = fs.add_file("/c/link.url", "");

        let mut model = WebViewModel::new(WebViewMode::ReadWebsite);
        model.set_from_payload(&fs, &MemoryPayload::text("  https://docs.rs/ \n"));
        assert!(model.save(&fs, &file).is_success());
        assert_eq!(
            fs.read_text(&file).unwrap(),
            "[InternetShortcut]\r\nURL=https://docs.rs/\r\n"
        );

        let mut loaded = WebViewModel::new(WebViewMode::ReadWebsite);
        assert!(loaded.load_existing(&fs, &file).is_success());
        assert_eq!(loaded.view(), CanvasView::Website("https://docs.rs/".into()));
    }

    #[test]
    fn test_bare_url_file() {
        assert_eq!(parse_website_link("https://a.example\n"), "https://a.example");
    }

    #[test]
    fn test_html_kept_verbatim() {
        let fs = MemBackend::new();
        let page = fs.add_file("/c/page.htm", "<p>hi</p>\n");
        let mut model = WebViewModel::new(WebViewMode::ReadHtml);
        assert!(model.load_existing(&fs, &page).is_success());
        assert_eq!(model.view(), CanvasView::Html("<p>hi</p>\n".into()));
        assert_eq!(model.file_extension(), ".html");
    }
}
