//! Console progress for a running transfer

use crate::display;
use chunkcp_types::{ChunkDigest, ChunkResult, TransferObserver, TransferOutcome};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Observer that drives a byte progress bar and prints the chunk log above it
///
/// Lines go through [`ProgressBar::println`] so they never tear the bar.
pub struct ConsoleObserver {
    progress_bar: Option<ProgressBar>,
    show_chunks: bool,
}

impl ConsoleObserver {
    /// Create an observer for a transfer of `total_bytes`
    ///
    /// In quiet mode nothing is drawn or printed.
    pub fn new(total_bytes: u64, quiet: bool) -> Self {
        let progress_bar = (!quiet).then(|| {
            let pb = ProgressBar::new(total_bytes);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        Self {
            progress_bar,
            show_chunks: !quiet,
        }
    }

    /// Stop printing the per-chunk lines, keeping the bar
    pub fn without_chunk_lines(mut self) -> Self {
        self.show_chunks = false;
        self
    }

    fn println(&self, line: String) {
        if let Some(pb) = &self.progress_bar {
            pb.println(line);
        }
    }
}

impl TransferObserver for ConsoleObserver {
    fn on_chunk_verified(&self, offset: u64, bytes: usize, digest: ChunkDigest) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(bytes as u64);
        }
        if self.show_chunks {
            self.println(format!("position = {}, hash = {}", offset / 1024, digest));
        }
    }

    fn on_chunk_retry(&self, offset: u64, attempt: u32) {
        self.println(format!(
            "{} chunk at {} mismatched, retry {}",
            style("↻").yellow(),
            offset,
            attempt
        ));
    }

    fn on_chunk_unresolved(&self, result: &ChunkResult) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(result.bytes_read as u64);
        }
        self.println(format!(
            "{} chunk at {} still differs after retries",
            style("⚠").yellow().bold(),
            result.offset
        ));
    }

    fn on_transfer_completed(&self, elapsed: Duration) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
            display::print_completed(elapsed);
        }
    }

    fn on_complete(&self, outcome: &TransferOutcome) {
        if self.progress_bar.is_some() {
            display::print_outcome(outcome);
        }
    }
}
