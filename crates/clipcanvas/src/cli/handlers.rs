//! One function per command. Handlers call the API and hand the results to
//! `render`; they never print.

use super::render::{
    render_canvas, render_classification, render_config, render_list, render_message,
    render_pasted,
};
use super::setup::{Commands, OutputMode};
use crate::clipboard::{bytes_payload, files_payload, read_clipboard};
use anyhow::{anyhow, Result};
use clipcanvasapp::api::CanvasApi;
use clipcanvasapp::config::CanvasConfig;
use clipcanvasapp::payload::MemoryPayload;
use clipcanvasapp::result::OperationResult;
use clipcanvasapp::store::FileSystem;
use std::io::Read;
use std::path::{Path, PathBuf};

fn check(result: OperationResult) -> Result<()> {
    if result.is_success() {
        Ok(())
    } else {
        Err(anyhow!("{}", result.message()))
    }
}

pub fn dispatch<F: FileSystem>(
    api: &mut CanvasApi<F>,
    config: &CanvasConfig,
    command: &Commands,
    mode: OutputMode,
) -> Result<String> {
    match command {
        Commands::List => list(api, mode),
        Commands::Show { index } => show(api, *index, mode),
        Commands::Next => {
            check(api.navigate_next())?;
            Ok(current(api, mode))
        }
        Commands::Back => {
            check(api.navigate_back())?;
            Ok(current(api, mode))
        }
        Commands::First => {
            api.navigate_first();
            Ok(current(api, mode))
        }
        Commands::Last => {
            check(api.navigate_last())?;
            Ok(current(api, mode))
        }
        Commands::Paste { text, file, stdin } => {
            let payload = paste_payload(text.as_deref(), file, *stdin)?;
            paste(api, &payload, mode)
        }
        Commands::Link { path } => {
            let path = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            let handle = api.link(&path).map_err(|r| anyhow!("{}", r.message()))?;
            Ok(render_pasted(&handle.name(), &api.navigation_state(), mode))
        }
        Commands::Delete { index } => {
            check(api.delete(*index))?;
            Ok(render_message(&format!("Deleted canvas {}", index), mode))
        }
        Commands::Reload => {
            check(api.reload())?;
            list(api, mode)
        }
        Commands::Classify { path } => Ok(classify(api, path, mode)),
        Commands::Config => Ok(render_config(config, mode)),
    }
}

fn list<F: FileSystem>(api: &mut CanvasApi<F>, mode: OutputMode) -> Result<String> {
    let rows = api.list().map_err(|r| anyhow!("{}", r.message()))?;
    Ok(render_list(&rows, &api.navigation_state(), mode))
}

fn current<F: FileSystem>(api: &CanvasApi<F>, mode: OutputMode) -> String {
    let name = api.current_item().map(|h| h.name());
    render_canvas(
        api.current_view().as_ref(),
        &api.navigation_state(),
        name.as_deref(),
        mode,
    )
}

fn show<F: FileSystem>(
    api: &mut CanvasApi<F>,
    index: Option<usize>,
    mode: OutputMode,
) -> Result<String> {
    if let Some(index) = index.or(api.navigation_state().current) {
        check(api.open_canvas(index))?;
    }
    Ok(current(api, mode))
}

fn paste_payload(text: Option<&str>, files: &[PathBuf], stdin: bool) -> Result<MemoryPayload> {
    if let Some(text) = text {
        return Ok(MemoryPayload::text(text));
    }
    if !files.is_empty() {
        return Ok(files_payload(files));
    }
    if stdin {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        return bytes_payload(bytes);
    }
    read_clipboard()
}

fn paste<F: FileSystem>(
    api: &mut CanvasApi<F>,
    payload: &MemoryPayload,
    mode: OutputMode,
) -> Result<String> {
    let handle = api.paste(payload).map_err(|r| anyhow!("{}", r.message()))?;
    Ok(render_pasted(&handle.name(), &api.navigation_state(), mode))
}

fn classify<F: FileSystem>(api: &CanvasApi<F>, path: &Path, mode: OutputMode) -> String {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    render_classification(&path, &api.classify_path(&path), mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcanvasapp::collection::CollectionConfiguration;
    use clipcanvasapp::store::mem_backend::MemBackend;

    fn api_with(files: &[(&str, &str)]) -> CanvasApi<MemBackend> {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        for (name, content) in files {
            fs.add_file(Path::new("/c").join(name), content);
        }
        CanvasApi::open(fs, CollectionConfiguration::new("/c"), &CanvasConfig::default())
    }

    fn run(api: &mut CanvasApi<MemBackend>, command: Commands) -> Result<String> {
        dispatch(api, &CanvasConfig::default(), &command, OutputMode::Term)
    }

    #[test]
    fn test_back_shows_previous_canvas() {
        let mut api = api_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);
        let out = run(&mut api, Commands::Back).unwrap();
        assert!(out.contains("Canvas 2 of 2"));
        assert!(out.contains("beta"));
    }

    #[test]
    fn test_next_on_new_canvas_fails() {
        let mut api = api_with(&[("a.txt", "alpha")]);
        let err = run(&mut api, Commands::Next).unwrap_err();
        assert!(err.to_string().contains("new canvas"));
    }

    #[test]
    fn test_show_restored_position() {
        let mut api = api_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);
        api.restore_position(Some(Path::new("/c/a.txt")));
        let out = run(&mut api, Commands::Show { index: None }).unwrap();
        assert!(out.contains("alpha"));
    }

    #[test]
    fn test_show_missing_index() {
        let mut api = api_with(&[("a.txt", "alpha")]);
        assert!(run(&mut api, Commands::Show { index: Some(9) }).is_err());
    }

    #[test]
    fn test_paste_text_then_list() {
        let mut api = api_with(&[]);
        let out = run(
            &mut api,
            Commands::Paste {
                text: Some("hello".into()),
                file: vec![],
                stdin: false,
            },
        )
        .unwrap();
        assert!(out.starts_with("Pasted "));
        assert!(out.contains("Canvas 1 of 1"));

        let listing = run(&mut api, Commands::List).unwrap();
        assert!(listing.contains("text"));
    }

    #[test]
    fn test_delete_and_config() {
        let mut api = api_with(&[("a.txt", "alpha")]);
        assert_eq!(
            run(&mut api, Commands::Delete { index: 1 }).unwrap(),
            "Deleted canvas 1\n"
        );
        assert!(run(&mut api, Commands::Config)
            .unwrap()
            .contains("text_probe_limit = 8192"));
    }
}
