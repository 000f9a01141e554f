//! homesweep - find and clean duplicates, empty files, junk, large and stale files.
//!
//! Usage:
//!   sweep                     Scan the home directory and open the cleanup menu
//!   sweep --path DIR          Same, for another directory
//!   sweep scan                Print the category summary and exit
//!   sweep list <CATEGORY>     Print one category in detail
//!   sweep --help              Show help

mod interactive;
mod output;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Context, Result};
use tracing_subscriber::EnvFilter;

use homesweep_analyze::{Category, HashMode, ScanConfig, ScanError, ScanResult, Sweeper};
use homesweep_core::Settings;
use homesweep_ops::DisposalMode;

/// Items shown per category unless `--show-all` or `--limit` says otherwise.
const DEFAULT_LIMIT: usize = 20;

#[derive(Parser)]
#[command(
    name = "sweep",
    version,
    about = "Clean up your home directory by finding and removing unwanted files",
    after_help = "Categories:\n  \
                  1. Duplicates    - Files with identical content (keeps newest)\n  \
                  2. Empty files   - Zero-byte files\n  \
                  3. Empty dirs    - Directories with no content\n  \
                  4. Junk files    - .tmp, .log, .DS_Store, .bak, etc.\n  \
                  5. Large files   - Files over the large threshold (100 MiB)\n  \
                  6. Old files     - Not modified within the old threshold (120 days)"
)]
struct Cli {
    /// Directory to clean (defaults to the home directory)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Move files to the backup directory instead of deleting them
    #[arg(long, global = true, conflicts_with = "trash")]
    backup: bool,

    /// Move files to the platform trash instead of deleting them
    #[arg(long, global = true)]
    trash: bool,

    /// Threshold for large files in MiB
    #[arg(long, global = true)]
    large_mb: Option<u64>,

    /// Threshold for old files in days
    #[arg(long, global = true)]
    old_days: Option<u32>,

    /// Show all items (no limit) in category details
    #[arg(long, global = true)]
    show_all: bool,

    /// Hash entire files instead of sampling large ones
    #[arg(long, global = true)]
    full_hash: bool,

    /// Worker threads for walking and fingerprinting (0 = one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and print the category summary
    Scan {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Scan and print one category in detail
    List {
        /// Category name or menu number (1-6)
        #[arg(value_parser = parse_category)]
        category: Category,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Maximum number of items (or duplicate groups) to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load();
    let session = Session::new(&cli, &settings)?;
    session.install_interrupt_handler()?;

    match cli.command {
        Some(Command::Scan { format }) => {
            let Some(result) = session.scan()? else {
                return Ok(());
            };
            match format {
                OutputFormat::Text => output::print_summary(&result, &session.labels),
                OutputFormat::Json => output::print_summary_json(&result)?,
            }
        }
        Some(Command::List {
            category,
            format,
            limit,
        }) => {
            let Some(result) = session.scan()? else {
                return Ok(());
            };
            let limit = limit.or(session.limit);
            match format {
                OutputFormat::Text => {
                    output::print_category(&result, category, limit, &session.labels)
                }
                OutputFormat::Json => output::print_category_json(&result, category, limit)?,
            }
        }
        None => interactive::run(&session)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_category(s: &str) -> Result<Category, String> {
    if let Ok(number) = s.parse::<u8>() {
        return Category::from_number(number)
            .ok_or_else(|| format!("category number must be 1-6, got {number}"));
    }
    s.parse::<Category>().map_err(|_| {
        format!("unknown category '{s}' (duplicates, empty-files, empty-dirs, junk-files, large-files, old-files)")
    })
}

/// Everything a run needs after flags and settings are merged.
pub struct Session {
    pub config: ScanConfig,
    pub mode: DisposalMode,
    pub limit: Option<usize>,
    pub labels: output::Labels,
    scanning: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
}

impl Session {
    fn new(cli: &Cli, settings: &Settings) -> Result<Self> {
        let root = match &cli.path {
            Some(path) => path.clone(),
            None => dirs::home_dir().ok_or_else(|| eyre!("Cannot determine home directory"))?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("Invalid path: {}", root.display()))?;

        let mut config = settings.scan_config(&root);
        if let Some(mb) = cli.large_mb {
            config.large_threshold = mb.saturating_mul(1024 * 1024);
        }
        if let Some(days) = cli.old_days {
            config.old_threshold_days = days;
        }
        if cli.full_hash {
            config.hash_mode = HashMode::Full;
        }
        if let Some(threads) = cli.threads {
            config.threads = threads;
        }
        config.validate().context("Invalid configuration")?;

        let mode = if cli.backup {
            let backup_dir = settings
                .backup_dir()
                .ok_or_else(|| eyre!("Cannot determine backup directory"))?;
            let base = dirs::home_dir().unwrap_or_else(|| root.clone());
            DisposalMode::backup(backup_dir, base)
        } else if cli.trash {
            DisposalMode::Trash
        } else {
            DisposalMode::Delete
        };

        tracing::debug!(
            root = %config.root.display(),
            hash_mode = ?config.hash_mode,
            mode = ?mode,
            "Session configured"
        );

        Ok(Self {
            labels: output::Labels::new(&config),
            config,
            mode,
            limit: if cli.show_all {
                None
            } else {
                Some(DEFAULT_LIMIT)
            },
            scanning: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Ctrl-C cancels a running scan, and quits otherwise.
    fn install_interrupt_handler(&self) -> Result<()> {
        let scanning = Arc::clone(&self.scanning);
        let cancel = Arc::clone(&self.cancel);
        ctrlc::set_handler(move || {
            if scanning.load(Ordering::SeqCst) {
                cancel.store(true, Ordering::SeqCst);
            } else {
                println!("\n\nCancelled by user.\n");
                std::process::exit(0);
            }
        })
        .context("Failed to install Ctrl-C handler")
    }

    /// Run a full scan with progress on stderr.
    ///
    /// Returns `None` when the user cancelled it.
    pub fn scan(&self) -> Result<Option<ScanResult>> {
        eprintln!("\nScanning {}...\n", self.config.root.display());

        self.cancel.store(false, Ordering::SeqCst);
        self.scanning.store(true, Ordering::SeqCst);

        let sweeper = Sweeper::with_cancel_flag(Arc::clone(&self.cancel));
        let walk_rx = sweeper.subscribe_walk();
        let hash_rx = sweeper.subscribe_hash();
        let reporters = [
            thread::spawn(move || output::report_walk_progress(walk_rx)),
            thread::spawn(move || output::report_hash_progress(hash_rx)),
        ];

        let result = sweeper.scan(&self.config);
        // Dropping the sweeper closes both progress channels.
        drop(sweeper);
        for reporter in reporters {
            let _ = reporter.join();
        }
        self.scanning.store(false, Ordering::SeqCst);

        match result {
            Ok(result) => {
                eprintln!(
                    "\r  Scanned {} files in {:.1}s{}",
                    output::format_count(result.stats.files_scanned),
                    result.duration.as_secs_f64(),
                    " ".repeat(20)
                );
                if !result.warnings.is_empty() {
                    eprintln!("  {} entries could not be read", result.warnings.len());
                }
                Ok(Some(result))
            }
            Err(ScanError::Interrupted) => {
                println!("\n\nCancelled by user.\n");
                Ok(None)
            }
            Err(err) => Err(err).context("Scan failed"),
        }
    }

    /// Verb used in confirmations.
    pub fn action(&self) -> &'static str {
        match self.mode {
            DisposalMode::Delete => "permanently delete",
            DisposalMode::Trash => "move to trash",
            DisposalMode::Backup { .. } => "move to backup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("1"), Ok(Category::Duplicates));
        assert_eq!(parse_category("6"), Ok(Category::OldFiles));
        assert_eq!(parse_category("junk-files"), Ok(Category::JunkFiles));
        assert!(parse_category("0").is_err());
        assert!(parse_category("7").is_err());
        assert!(parse_category("stuff").is_err());
    }

    #[test]
    fn test_cli_rejects_negative_thresholds() {
        assert!(Cli::try_parse_from(["sweep", "--old-days", "-5"]).is_err());
        assert!(Cli::try_parse_from(["sweep", "--large-mb", "-1"]).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sweep", "list", "3", "--backup", "--limit", "5"]).unwrap();
        assert!(cli.backup);
        match cli.command {
            Some(Command::List {
                category, limit, ..
            }) => {
                assert_eq!(category, Category::EmptyDirs);
                assert_eq!(limit, Some(5));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_backup_and_trash_conflict() {
        assert!(Cli::try_parse_from(["sweep", "--backup", "--trash"]).is_err());
    }
}
