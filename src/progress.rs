/*!
 * Progress display for translation runs.
 */

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over subtitle blocks, fed from the scheduler's callback.
#[derive(Clone)]
pub struct TranslationProgress {
    bar: ProgressBar,
}

impl TranslationProgress {
    /// Create and start a progress bar for `total_blocks` blocks.
    pub fn new(total_blocks: u64) -> Self {
        let bar = ProgressBar::new(total_blocks);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks ({percent}%) {msg} {eta}")
            .or_else(|_| {
                ProgressStyle::default_bar()
                    .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            })
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));

        Self { bar }
    }

    /// Set the absolute number of completed blocks.
    pub fn update(&self, completed: u64) {
        self.bar.set_position(completed);
    }

    /// Finish the bar, leaving it visible.
    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}
