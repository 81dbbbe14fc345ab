//! Paste payloads from outside the process: the system clipboard and stdin.

use anyhow::{anyhow, bail, Result};
use clipcanvasapp::payload::MemoryPayload;
use clipcanvasapp::store::StorageHandle;
use std::path::PathBuf;
use std::process::Command;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Reads text from the system clipboard in an OS-specific way.
/// - macOS: uses pbpaste
/// - Linux: uses xclip or xsel
/// - Windows: uses powershell Get-Clipboard
pub fn read_clipboard() -> Result<MemoryPayload> {
    let text = get_from_clipboard()?;
    if text.is_empty() {
        bail!("The clipboard is empty");
    }
    Ok(MemoryPayload::text(text))
}

/// Files as if copied in a file manager. Folders are passed along as folders.
pub fn files_payload(paths: &[PathBuf]) -> MemoryPayload {
    let items = paths
        .iter()
        .map(|path| {
            let path = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            if path.is_dir() {
                StorageHandle::folder(path)
            } else {
                StorageHandle::file(path)
            }
        })
        .collect();
    MemoryPayload::items(items)
}

/// PNG bytes become a bitmap, UTF-8 becomes text, anything else is refused.
pub fn bytes_payload(bytes: Vec<u8>) -> Result<MemoryPayload> {
    if bytes.starts_with(PNG_SIGNATURE) {
        return Ok(MemoryPayload::bitmap(bytes));
    }
    match String::from_utf8(bytes) {
        Ok(text) if text.is_empty() => bail!("Nothing to paste"),
        Ok(text) => Ok(MemoryPayload::text(text)),
        Err(_) => bail!("Piped input is neither PNG nor UTF-8 text; use --file instead"),
    }
}

fn get_from_clipboard() -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        run_reader("pbpaste", &[])
    }

    #[cfg(target_os = "linux")]
    {
        run_reader("xclip", &["-selection", "clipboard", "-o"])
            .or_else(|_| run_reader("xsel", &["--clipboard", "--output"]))
            .map_err(|e| anyhow!("{}. Install xclip or xsel.", e))
    }

    #[cfg(target_os = "windows")]
    {
        run_reader("powershell", &["-command", "Get-Clipboard"])
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        bail!("Clipboard not supported on this platform")
    }
}

fn run_reader(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| anyhow!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        bail!("{} exited with error", program);
    }
    String::from_utf8(output.stdout).map_err(|e| anyhow!("Invalid UTF-8 in clipboard: {}", e))
}
