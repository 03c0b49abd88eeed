//! Progress reporting support (requires `progress` feature)

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str =
    "{spinner:.green} {msg:>10} [{bar:40.cyan/blue}] {pos}/{len} files ({per_sec}, {eta})";

/// Progress bar for a pool run of `total` copy tasks.
///
/// Draws to stderr at most 10 times a second, so stdout stays clean for
/// command output. Set the verb shown before the bar with
/// [`ProgressBar::set_message`] and advance it from
/// [`RunningPool::progress`](crate::RunningPool::progress).
#[must_use]
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr_with_hz(10))
        .with_style(style)
}
