use super::{ensure_file, payload_source_file, read_lossy, single_storage_item, CanvasView, PasteModel};
use crate::content_type::ContentType;
use crate::payload::PayloadSource;
use crate::result::{OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};
use pulldown_cmark::{html, Options, Parser};

/// Text taken from a payload: the file's content for a storage item, the
/// text itself otherwise.
fn payload_text(fs: &dyn FileSystem, payload: &dyn PayloadSource) -> Outcome<String> {
    match single_storage_item(payload)? {
        Some(item) => read_lossy(fs, &payload_source_file(fs, &item)?),
        None => payload.get_text(),
    }
}

#[derive(Debug, Default)]
pub struct TextModel {
    text: String,
}

impl TextModel {
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PasteModel for TextModel {
    fn content_type(&self) -> ContentType {
        ContentType::Text
    }

    fn file_extension(&self) -> String {
        ".txt".to_string()
    }

    fn load_existing(&mut self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        let loaded = ensure_file(file).and_then(|_| read_lossy(fs, file));
        match loaded {
            Ok(text) => {
                self.text = text;
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
        match payload_text(fs, payload) {
            Ok(text) => {
                self.text = text;
                OperationResult::success()
            }
            Err(result) => result,
        }
    }

    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        fs.write_text(file, &self.text).into()
    }

    fn view(&self) -> CanvasView {
        CanvasView::Text(self.text.clone())
    }
}

/// Markdown source plus its rendered HTML.
#[derive(Debug, Default)]
pub struct MarkdownModel {
    source: String,
    html: String,
}

impl MarkdownModel {
    fn set_source(&mut self, source: String) {
        self.html = render_markdown(&source);
        self.source = source;
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::all());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

impl PasteModel for MarkdownModel {
    fn content_type(&self) -> ContentType {
        ContentType::Markdown
    }

    fn file_extension(&self) -> String {
        ".md".to_string()
    }

    fn load_existing(&mut self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        match ensure_file(file).and_then(|_| read_lossy(fs, file)) {
            Ok(source) => {
                self.set_source(source);
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
        match payload_text(fs, payload) {
            Ok(source) => {
                self.set_source(source);
                OperationResult::success()
            }
            Err(result) => result,
        }
    }

    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        fs.write_text(file, &self.source).into()
    }

    fn view(&self) -> CanvasView {
        CanvasView::Markdown {
            source: self.source.clone(),
            html: self.html.clone(),
        }
    }
}
