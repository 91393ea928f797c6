//! chunkcp - chunked, verified single-file copy
//!
//! Copies one file chunk by chunk, checks every chunk by reading it back, and
//! finishes with a whole-file digest comparison. The work can be split between
//! several workers either as fixed ranges or through a shared offset counter.

use anyhow::{bail, Context, Result};
use chunkcp_config::{Config, ConfigLoader, LoggingConfig};
use chunkcp_engine::{CompositeObserver, TracingObserver, TransferCoordinator};
use chunkcp_io::{inspect_source, WholeFileVerifier};
use chunkcp_types::{ChunkSize, DigestAlgorithm, TransferJob, TransferMode, WorkerCount};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

mod display;
mod json_output;
mod progress;
mod prompt;

use progress::ConsoleObserver;

/// chunkcp - chunked, verified single-file copy
#[derive(Parser)]
#[command(
    name = "chunkcp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Chunked single-file copy with per-chunk and whole-file verification",
    long_about = "chunkcp copies one file into a folder chunk by chunk.\n\
                  Every chunk is read back and compared, mismatches are retried,\n\
                  and the finished copy is checked with a SHA-256 or BLAKE3 digest."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a file into a folder
    Transfer {
        /// Source file (prompted for when omitted)
        source: Option<PathBuf>,
        /// Destination folder (prompted for when omitted)
        destination: Option<PathBuf>,
        /// Transfer mode: sequential, fixed-split, shared-counter or 1-3
        #[arg(short, long)]
        mode: Option<String>,
        /// Workers for the parallel modes
        #[arg(short, long)]
        workers: Option<usize>,
        /// Chunk size in bytes
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Extra copy attempts per mismatched chunk
        #[arg(long)]
        max_retries: Option<u32>,
        /// Whole-file digest: sha256 or blake3
        #[arg(short, long)]
        algorithm: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two files by whole-file digest
    Verify {
        /// Source file
        source: PathBuf,
        /// Destination file
        destination: PathBuf,
        /// Whole-file digest: sha256 or blake3
        #[arg(short, long)]
        algorithm: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
        /// Write the default configuration to this file
        #[arg(long, value_name = "PATH")]
        generate: Option<PathBuf>,
    },
}

/// Options of the `transfer` subcommand
struct TransferArgs {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    mode: Option<String>,
    workers: Option<usize>,
    chunk_size: Option<usize>,
    max_retries: Option<u32>,
    algorithm: Option<String>,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&config.logging, cli.debug, cli.quiet, cli.verbose)?;

    info!("chunkcp v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Transfer {
            source,
            destination,
            mode,
            workers,
            chunk_size,
            max_retries,
            algorithm,
            json,
        } => {
            let args = TransferArgs {
                source,
                destination,
                mode,
                workers,
                chunk_size,
                max_retries,
                algorithm,
                json,
            };
            transfer_command(&config, args, cli.quiet, cli.debug).await
        }
        Commands::Verify {
            source,
            destination,
            algorithm,
            json,
        } => {
            let matched =
                verify_command(&config, &source, &destination, algorithm, json, cli.quiet).await?;
            Ok(exit_code(matched))
        }
        Commands::Config { default, generate } => {
            config_command(&config, default, generate)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(logging: &LoggingConfig, debug: bool, quiet: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(logging.colored_output)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if logging.json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

async fn transfer_command(
    config: &Config,
    args: TransferArgs,
    quiet: bool,
    debug: bool,
) -> Result<ExitCode> {
    let interactive = args.source.is_none() || args.destination.is_none();
    let requested_mode = args
        .mode
        .as_deref()
        .map(str::parse::<TransferMode>)
        .transpose()?;

    let source = match args.source {
        Some(source) => source,
        None => prompt::source_file()?,
    };
    let folder = match args.destination {
        Some(folder) => folder,
        None => prompt::destination_folder()?,
    };
    ensure_folder(&folder)?;

    let mut settings = config.transfer;
    if let Some(workers) = args.workers {
        settings.workers = WorkerCount::new(workers).map_err(anyhow::Error::msg)?;
    }
    if let Some(chunk_size) = args.chunk_size {
        settings.chunk_size = ChunkSize::new(chunk_size).map_err(anyhow::Error::msg)?;
    }
    if let Some(max_retries) = args.max_retries {
        settings.max_retries = max_retries;
    }
    settings.mode = match requested_mode {
        Some(mode) => mode,
        None if interactive => prompt::transfer_mode(settings.mode, settings.workers)?,
        None => settings.mode,
    };
    let algorithm = resolve_algorithm(config, args.algorithm)?;

    let job = settings
        .apply(TransferJob::into_directory(source, &folder)?)
        .with_algorithm(algorithm);

    let file_size = inspect_source(job.source()).await?;
    let show_console = !quiet && !args.json;
    if show_console {
        display::print_job_header(&job, file_size);
    }

    // Debug logging already carries one line per chunk
    let mut console = ConsoleObserver::new(file_size, !show_console);
    if debug {
        console = console.without_chunk_lines();
    }
    let observer = CompositeObserver::new()
        .with(Arc::new(TracingObserver))
        .with(Arc::new(console));
    let coordinator = TransferCoordinator::new()
        .with_observer(Arc::new(observer))
        .with_verify_block_size(config.verification.block_size);

    let outcome = coordinator.transfer(&job).await?;
    let success = outcome.success;

    if args.json {
        let result = json_output::TransferResultJson::new(&job, outcome);
        println!("{}", json_output::to_pretty_json(&result)?);
    }

    Ok(exit_code(success))
}

async fn verify_command(
    config: &Config,
    source: &Path,
    destination: &Path,
    algorithm: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<bool> {
    let algorithm = resolve_algorithm(config, algorithm)?;
    let verifier =
        WholeFileVerifier::new(algorithm).with_block_size(config.verification.block_size);

    let comparison = verifier.compare(source, destination).await?;

    if json {
        let result = json_output::VerifyResultJson::new(
            &source.display().to_string(),
            &destination.display().to_string(),
            algorithm.to_string(),
            &comparison,
        );
        println!("{}", json_output::to_pretty_json(&result)?);
    } else if !quiet {
        display::print_comparison(&comparison);
    }

    Ok(comparison.matched)
}

fn config_command(config: &Config, default: bool, generate: Option<PathBuf>) -> Result<()> {
    if let Some(path) = generate {
        ConfigLoader::generate_default_config(&path)?;
        println!(
            "{} Wrote default configuration to {}",
            style("✓").green().bold(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
        print!("{}", serde_yaml::to_string(&Config::default())?);
    } else {
        println!("{} Current configuration:", style("⚙").blue().bold());
        match ConfigLoader::config_exists() {
            Some(path) => println!("  (loaded from {})", style(path.display()).cyan()),
            None => println!("  (no configuration file found, using defaults)"),
        }
        print!("{}", serde_yaml::to_string(config)?);
    }
    Ok(())
}

/// Make sure the destination folder exists, offering to create it when it does not
fn ensure_folder(folder: &Path) -> Result<()> {
    if folder.is_dir() {
        return Ok(());
    }
    if folder.exists() {
        bail!("{} is not a folder", folder.display());
    }
    if !console::user_attended() {
        bail!("Destination folder {} does not exist", folder.display());
    }
    if !prompt::confirm_create(folder)? {
        bail!("Operation cancelled.");
    }

    std::fs::create_dir_all(folder)
        .with_context(|| format!("Failed to create {}", folder.display()))?;
    info!("Created folder {}", folder.display());
    Ok(())
}

fn resolve_algorithm(config: &Config, flag: Option<String>) -> Result<DigestAlgorithm> {
    match flag {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.verification.algorithm),
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_transfer_args_parse() {
        let cli = Cli::parse_from([
            "chunkcp",
            "transfer",
            "in.bin",
            "out",
            "--mode",
            "shared-counter",
            "--workers",
            "4",
            "--chunk-size",
            "65536",
        ]);

        match cli.command {
            Commands::Transfer {
                source,
                destination,
                mode,
                workers,
                chunk_size,
                ..
            } => {
                assert_eq!(source, Some(PathBuf::from("in.bin")));
                assert_eq!(destination, Some(PathBuf::from("out")));
                assert_eq!(mode.as_deref(), Some("shared-counter"));
                assert_eq!(workers, Some(4));
                assert_eq!(chunk_size, Some(65536));
            }
            _ => panic!("expected transfer"),
        }
    }

    #[test]
    fn test_resolve_algorithm() {
        let config = Config::default();
        assert_eq!(resolve_algorithm(&config, None).unwrap(), DigestAlgorithm::Sha256);
        assert_eq!(
            resolve_algorithm(&config, Some("blake3".to_string())).unwrap(),
            DigestAlgorithm::Blake3
        );
        assert!(resolve_algorithm(&config, Some("md5".to_string())).is_err());
    }

    #[tokio::test]
    async fn test_verify_command_reports_match() {
        let dir = tempfile::TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();
        std::fs::write(&c, b"other bytes").unwrap();

        let config = Config::default();
        let matched = verify_command(&config, &a, &b, None, false, true).await.unwrap();
        let differs = verify_command(&config, &a, &c, None, false, true).await.unwrap();

        assert!(matched);
        assert!(!differs);
    }

    #[test]
    fn test_existing_folder_is_accepted() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ensure_folder(dir.path()).is_ok());

        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(ensure_folder(&file).is_err());
    }
}
