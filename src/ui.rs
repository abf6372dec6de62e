// Terminal feedback while an upload is in flight. indicatif draws to stderr
// and stays hidden when stderr is not a terminal, so running under a
// supervisor leaves the log output untouched.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner shown for the duration of one upload attempt.
fn upload_spinner(path: &Path) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    spinner.set_message(format!("Uploading {name}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Run one upload attempt with a spinner on screen. The spinner is cleared
/// before this returns, so anything logged between attempts (retry
/// backoff, for one) is written to a clean line.
pub fn with_spinner<T>(path: &Path, attempt: impl FnOnce(&ProgressBar) -> T) -> T {
    let spinner = upload_spinner(path);
    let result = attempt(&spinner);
    spinner.finish_and_clear();
    result
}
