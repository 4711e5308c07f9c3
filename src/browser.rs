//! Thin helper to open a result URL in the system browser.
//!
//! Presentation-side convenience for the front end iterating a
//! completed batch. Deliberately outside the dispatch path: the core
//! never opens anything on its own.

use crate::error::DispatchError;

/// The platform's URL opener command.
fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "cmd"
    } else {
        "xdg-open"
    }
}

/// Open `url` in the default browser, without waiting for it to close.
///
/// # Errors
///
/// Returns [`DispatchError::Unexpected`] if the opener cannot be
/// spawned. Only `http`/`https` URLs are accepted.
pub fn open_in_browser(url: &str) -> Result<(), DispatchError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(DispatchError::Unexpected(format!(
            "refusing to open non-HTTP URL \"{url}\""
        )));
    }

    let mut command = std::process::Command::new(opener());
    if cfg!(target_os = "windows") {
        command.args(["/C", "start", ""]);
    }
    command
        .arg(url)
        .spawn()
        .map(drop)
        .map_err(|e| DispatchError::Unexpected(format!("cannot open browser: {e}")))
}
