//! # Rendering
//!
//! Every command produces a string here, either styled for a terminal or as
//! JSON. Layout math (widths, truncation, padding) is Unicode-aware via
//! `unicode-width`; colors come from `console` and switch off by themselves
//! when stdout is not a terminal.

use super::setup::OutputMode;
use chrono::{DateTime, Utc};
use clipcanvasapp::api::{CanvasSummary, NavigationState};
use clipcanvasapp::config::CanvasConfig;
use clipcanvasapp::content_type::ContentType;
use clipcanvasapp::events::CollectionEvent;
use clipcanvasapp::paste::CanvasView;
use serde_json::json;
use std::path::Path;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
pub const KIND_WIDTH: usize = 9;
pub const CURRENT_MARKER: &str = "▸";
pub const REFERENCE_MARKER: &str = "↗";

mod styles {
    use console::Style;

    pub fn index() -> Style {
        Style::new().yellow()
    }
    pub fn current() -> Style {
        Style::new().bold()
    }
    pub fn muted() -> Style {
        Style::new().color256(246)
    }
    pub fn time() -> Style {
        Style::new().color256(246).italic()
    }
    pub fn warning() -> Style {
        Style::new().yellow()
    }
    pub fn error() -> Style {
        Style::new().red()
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    // Serializing plain data structures cannot fail
    serde_json::to_string_pretty(value).unwrap_or_default() + "\n"
}

/// Cut `text` to at most `width` columns, ending in `…` when shortened.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

fn position_line(state: &NavigationState) -> String {
    match state.current {
        Some(n) => format!("Canvas {} of {}", n, state.total),
        None => format!("New canvas ({} saved)", state.total),
    }
}

pub fn render_list(rows: &[CanvasSummary], state: &NavigationState, mode: OutputMode) -> String {
    if mode == OutputMode::Json {
        return to_json(&json!({ "state": state, "canvases": rows }));
    }
    if rows.is_empty() {
        return format!(
            "{}\n",
            styles::muted().apply_to("No canvases yet. Paste something with `clipcanvas paste`.")
        );
    }

    let mut out = String::new();
    for row in rows {
        let marker = if row.is_current { CURRENT_MARKER } else { " " };
        let index = format!("{:02}. ", row.index);
        let kind = format!("{:<width$}", row.content_type, width = KIND_WIDTH);
        let reference = if row.is_reference { REFERENCE_MARKER } else { " " };
        let time = row.created_at.map(format_time_ago).unwrap_or_default();

        let fixed = marker.width() + 1 + index.width() + KIND_WIDTH + 2 + TIME_WIDTH + 2;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let name = truncate_to_width(&row.name, available);
        let padding = " ".repeat(available.saturating_sub(name.width()));

        let name = if row.is_current {
            styles::current().apply_to(name).to_string()
        } else {
            name
        };
        out.push_str(&format!(
            "{} {}{}{} {}{} {}\n",
            marker,
            styles::index().apply_to(index),
            name,
            padding,
            reference,
            styles::muted().apply_to(kind),
            styles::time().apply_to(time),
        ));
    }
    out
}

fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn view_body(view: &CanvasView) -> String {
    match view {
        CanvasView::Text(text) | CanvasView::Html(text) => text.clone(),
        CanvasView::Markdown { source, .. } => source.clone(),
        CanvasView::Website(url) => url.clone(),
        CanvasView::Image { size, extension } => {
            format!("[image {} {}]", extension, human_size(*size))
        }
        CanvasView::Media { path } => format!("[media] {}", path.display()),
        CanvasView::File { path } => format!("[file] {}", path.display()),
    }
}

pub fn render_canvas(
    view: Option<&CanvasView>,
    state: &NavigationState,
    name: Option<&str>,
    mode: OutputMode,
) -> String {
    if mode == OutputMode::Json {
        return to_json(&json!({ "state": state, "name": name, "canvas": view }));
    }

    let mut header = position_line(state);
    if let Some(name) = name {
        header = format!("{} · {}", header, name);
    }
    let mut out = format!("{}\n", styles::muted().apply_to(header));
    if let Some(view) = view {
        let body = view_body(view);
        out.push('\n');
        out.push_str(&body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

pub fn render_pasted(name: &str, state: &NavigationState, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&json!({ "pasted": name, "state": state })),
        OutputMode::Term => format!("Pasted {} ({})\n", name, position_line(state)),
    }
}

pub fn render_message(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&json!({ "message": message })),
        OutputMode::Term => format!("{}\n", message),
    }
}

pub fn render_classification(path: &Path, content_type: &ContentType, mode: OutputMode) -> String {
    let (kind, error) = match content_type {
        ContentType::Invalid { result, .. } => ("invalid".to_string(), Some(result.message())),
        other => (other.to_string(), None),
    };
    match mode {
        OutputMode::Json => to_json(&json!({
            "path": path,
            "content_type": kind,
            "error": error,
        })),
        OutputMode::Term => match error {
            Some(error) => format!(
                "{}: {} {}\n",
                path.display(),
                styles::error().apply_to(kind),
                styles::muted().apply_to(format!("({})", error))
            ),
            None => format!("{}: {}\n", path.display(), kind),
        },
    }
}

pub fn render_config(config: &CanvasConfig, mode: OutputMode) -> String {
    let value = serde_json::to_value(config).unwrap_or_default();
    if mode == OutputMode::Json {
        return to_json(&value);
    }
    let mut out = String::new();
    if let Some(table) = value.as_object() {
        for (key, value) in table {
            let shown = match value {
                serde_json::Value::Null => "(unset)".to_string(),
                other => other.to_string(),
            };
            out.push_str(&format!("{} = {}\n", key, shown));
        }
    }
    out
}

/// Notices for stderr. Events the command output already covers yield `None`.
pub fn render_event(event: &CollectionEvent) -> Option<String> {
    match event {
        CollectionEvent::TipTextUpdateRequested(tip) => {
            Some(styles::warning().apply_to(tip).to_string())
        }
        CollectionEvent::ReturnToParent => Some(
            styles::error()
                .apply_to("The collection folder is gone.")
                .to_string(),
        ),
        CollectionEvent::CollectionErrorRaised(result) => {
            Some(styles::error().apply_to(result.message()).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn state(current: Option<usize>, total: usize) -> NavigationState {
        NavigationState {
            current,
            total,
            has_back: total > 0,
            has_next: current.is_some(),
        }
    }

    fn row(index: usize, name: &str, kind: &str) -> CanvasSummary {
        CanvasSummary {
            index,
            name: name.to_string(),
            path: PathBuf::from("/c").join(name),
            created_at: None,
            content_type: kind.to_string(),
            is_reference: false,
            is_current: false,
        }
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語のテキスト", 7), "日本語…");
    }

    #[test]
    fn test_list_lines() {
        let rows = vec![row(1, "a.txt", "text"), row(2, "b.png", "image")];
        let out = render_list(&rows, &state(None, 2), OutputMode::Term);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("01. a.txt"));
        assert!(lines[1].contains("image"));
    }

    #[test]
    fn test_empty_list() {
        let out = render_list(&[], &state(None, 0), OutputMode::Term);
        assert!(out.contains("No canvases yet"));
    }

    #[test]
    fn test_list_json() {
        let rows = vec![row(1, "a.txt", "text")];
        let out = render_list(&rows, &state(Some(1), 1), OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["canvases"][0]["name"], "a.txt");
        assert_eq!(value["state"]["current"], 1);
    }

    #[test]
    fn test_canvas_text() {
        let view = CanvasView::Text("hello".into());
        let out = render_canvas(Some(&view), &state(Some(2), 3), Some("a.txt"), OutputMode::Term);
        assert!(out.contains("Canvas 2 of 3"));
        assert!(out.ends_with("hello\n"));
    }

    #[test]
    fn test_new_canvas() {
        let out = render_canvas(None, &state(None, 3), None, OutputMode::Term);
        assert!(out.contains("New canvas (3 saved)"));
    }

    #[test]
    fn test_image_summary() {
        let view = CanvasView::Image {
            size: 2048,
            extension: ".png".into(),
        };
        assert_eq!(view_body(&view), "[image .png 2.0 KiB]");
    }

    #[test]
    fn test_config_lines() {
        let out = render_config(&CanvasConfig::default(), OutputMode::Term);
        assert!(out.contains("paste_files_as_reference = true"));
        assert!(out.contains("default_collection = (unset)"));
    }
}
