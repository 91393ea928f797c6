//! Display utilities for the chunkcp CLI

use chunkcp_io::FileComparison;
use chunkcp_types::{TransferJob, TransferMode, TransferOutcome};
use console::style;
use std::time::Duration;

/// Print what is about to be copied and how
pub fn print_job_header(job: &TransferJob, file_size: u64) {
    println!(
        "{} Copying {} to {}",
        style("→").green().bold(),
        style(job.source().display()).cyan(),
        style(job.destination().display()).cyan()
    );
    println!(
        "  Mode: {}  Chunk: {}  Size: {}",
        style(job.mode().describe(job.mode().effective_workers(job.workers()))).yellow(),
        style(format_bytes(job.chunk_size().as_u64())).dim(),
        style(format_bytes(file_size)).dim()
    );
}

/// Banner printed once every worker has finished
pub fn print_completed(elapsed: Duration) {
    println!();
    println!(
        "{} transfer completed in {} seconds",
        style("✓").green().bold(),
        style(format!("{:.3}", elapsed.as_secs_f64())).bold()
    );
}

/// Final banner with both digests and the verdict
pub fn print_outcome(outcome: &TransferOutcome) {
    print_checksums(
        &outcome.source_digest.to_hex(),
        &outcome.destination_digest.to_hex(),
        outcome.success,
    );

    println!(
        "  {} in {} chunks, {} at {}",
        format_bytes(outcome.file_size),
        outcome.report.chunks,
        format_duration(outcome.elapsed),
        format_rate(outcome.transfer_rate())
    );
    if outcome.report.retries > 0 || outcome.report.unresolved > 0 {
        display_warning(&format!(
            "{} retries, {} chunks unresolved",
            outcome.report.retries, outcome.report.unresolved
        ));
    }
}

/// Banner for a standalone verification
pub fn print_comparison(comparison: &FileComparison) {
    print_checksums(
        &comparison.source.to_hex(),
        &comparison.destination.to_hex(),
        comparison.matched,
    );
}

fn print_checksums(source: &str, destination: &str, matched: bool) {
    println!();
    for line in checksum_lines(source, destination, matched) {
        println!("{}", line);
    }
}

/// Digest lines and verdict, all destined for stdout
fn checksum_lines(source: &str, destination: &str, matched: bool) -> Vec<String> {
    let verdict = if matched {
        success_line("successful file transfer")
    } else {
        error_line("checksums don't match")
    };

    vec![
        format!("source checksum: {}", style(source).cyan()),
        format!("destination checksum: {}", style(destination).cyan()),
        String::new(),
        verdict,
    ]
}

/// Menu label for a mode
pub fn mode_label(mode: TransferMode, workers: chunkcp_types::WorkerCount) -> String {
    format!("{} - {}", mode.name(), mode.describe(workers))
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format a byte rate
pub fn format_rate(bytes_per_second: f64) -> String {
    format!("{:.2} MB/s", bytes_per_second / 1024.0 / 1024.0)
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Display a warning message
pub fn display_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

fn error_line(message: &str) -> String {
    format!("{} {}", style("✗").red().bold(), style(message).red())
}

fn success_line(message: &str) -> String {
    format!("{} {}", style("✓").green().bold(), style(message).green())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00 B")]
    #[case(1023, "1023.00 B")]
    #[case(1024, "1.00 KB")]
    #[case(10 * 1024 * 1024, "10.00 MB")]
    fn test_format_bytes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }

    #[rstest]
    #[case(Duration::from_millis(1500), "1.50s")]
    #[case(Duration::from_secs(125), "2m 5s")]
    #[case(Duration::from_secs(3725), "1h 2m 5s")]
    fn test_format_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[rstest]
    #[case(true, "✓ successful file transfer")]
    #[case(false, "✗ checksums don't match")]
    fn test_checksum_verdict_follows_digests(#[case] matched: bool, #[case] verdict: &str) {
        let lines: Vec<String> = checksum_lines("aa", "bb", matched)
            .iter()
            .map(|line| console::strip_ansi_codes(line).into_owned())
            .collect();

        assert_eq!(
            lines,
            vec![
                "source checksum: aa".to_string(),
                "destination checksum: bb".to_string(),
                String::new(),
                verdict.to_string(),
            ]
        );
    }

    #[test]
    fn test_mode_label() {
        let workers = chunkcp_types::WorkerCount::new(4).unwrap();
        assert_eq!(
            mode_label(TransferMode::FixedSplit, workers),
            "fixed-split - Fixed split (4 workers)"
        );
    }
}
