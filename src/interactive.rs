//! Interactive cleanup menu.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use color_eyre::eyre::{Context, Result};
use itertools::Itertools;
use strum::IntoEnumIterator;
use tokio::runtime::Runtime;

use homesweep_analyze::{Category, ScanResult};
use homesweep_ops::{DisposalMode, DisposalResult, OperationComplete, start_disposal};

use crate::Session;
use crate::output::{self, format_size};

/// Progress is printed every this many items.
const PROGRESS_EVERY: usize = 50;

/// A parsed menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    View(Category),
    Dispose(Category),
    DisposeAll,
    Rescan,
    Quit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "q" => Some(Self::Quit),
            "r" => Some(Self::Rescan),
            "a" => Some(Self::DisposeAll),
            _ => {
                if let Some(rest) = input.strip_prefix('d') {
                    return menu_category(rest).map(Self::Dispose);
                }
                menu_category(&input).map(Self::View)
            }
        }
    }
}

fn menu_category(s: &str) -> Option<Category> {
    let number = match s {
        "1" => 1,
        "2" => 2,
        "3" => 3,
        "4" => 4,
        "5" => 5,
        "6" => 6,
        _ => return None,
    };
    Category::from_number(number)
}

/// Scan, show the summary and loop on the menu until the user quits.
pub fn run(session: &Session) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("{:^70}", "HOME DIRECTORY CLEANUP TOOL");
    println!("{}", "=".repeat(70));

    match &session.mode {
        DisposalMode::Backup { backup_dir, .. } => println!(
            "\nBackup mode enabled: Files will be moved to {}",
            backup_dir.display()
        ),
        DisposalMode::Trash => println!("\nTrash mode enabled: Files will be moved to the trash"),
        DisposalMode::Delete => println!("\nWarning: Files will be permanently deleted!"),
    }

    let Some(mut result) = session.scan()? else {
        return Ok(());
    };
    output::print_summary(&result, &session.labels);

    if result.is_clean() {
        println!("Your directory is clean! Nothing to do.\n");
        return Ok(());
    }

    let runtime = Runtime::new().context("Failed to start runtime")?;

    loop {
        print_options();
        let Some(line) = prompt("\nEnter choice: ")? else {
            break;
        };

        match Choice::parse(&line) {
            Some(Choice::Quit) => {
                println!("\nGoodbye!\n");
                break;
            }
            Some(Choice::Rescan) => {
                let Some(fresh) = session.scan()? else {
                    return Ok(());
                };
                result = fresh;
                output::print_summary(&result, &session.labels);
            }
            Some(Choice::View(category)) => {
                output::print_category(&result, category, session.limit, &session.labels);
            }
            Some(Choice::Dispose(category)) => {
                dispose_category(session, &runtime, &mut result, category)?;
            }
            Some(Choice::DisposeAll) => dispose_all(session, &runtime, &mut result)?,
            None => println!("\nInvalid choice. Try again."),
        }
    }

    Ok(())
}

fn print_options() {
    println!("\nOPTIONS:");
    println!("  [1-6]   View details for a category");
    println!("  [d1-d6] Delete/backup items in a category");
    println!("  [a]     Delete/backup ALL categories");
    println!("  [r]     Rescan directory");
    println!("  [q]     Quit");
}

fn dispose_category(
    session: &Session,
    runtime: &Runtime,
    result: &mut ScanResult,
    category: Category,
) -> Result<()> {
    let paths = result.files_to_remove(category);
    if paths.is_empty() {
        println!("\nNo items in this category.");
        return Ok(());
    }

    println!(
        "\nAbout to {} {} {}.",
        session.action(),
        paths.len(),
        category.title().to_lowercase()
    );
    if !confirm("Are you sure?")? {
        println!("\nCancelled.");
        return Ok(());
    }

    let complete = dispose(runtime, paths, session.mode.clone());
    print_complete(&session.mode, &complete);
    result.clear(category);
    Ok(())
}

fn dispose_all(session: &Session, runtime: &Runtime, result: &mut ScanResult) -> Result<()> {
    // Large and old files overlap.
    let paths: Vec<PathBuf> = Category::iter()
        .flat_map(|c| result.files_to_remove(c))
        .unique()
        .collect();
    if paths.is_empty() {
        println!("\nNothing to clean.");
        return Ok(());
    }

    println!(
        "\nAbout to {} {} items from ALL categories.",
        session.action(),
        paths.len()
    );
    println!("This includes duplicates, empty files/dirs, junk, large, and old files!");

    if !confirm("Are you ABSOLUTELY sure?")?
        || !confirm("Last chance - this cannot be undone. Continue?")?
    {
        println!("\nCancelled.");
        return Ok(());
    }

    let complete = dispose(runtime, paths, session.mode.clone());
    print_complete(&session.mode, &complete);
    for category in Category::iter() {
        result.clear(category);
    }
    Ok(())
}

/// Run a disposal to completion, printing progress as it goes.
fn dispose(runtime: &Runtime, paths: Vec<PathBuf>, mode: DisposalMode) -> OperationComplete {
    let total = paths.len();
    runtime.block_on(async move {
        let mut rx = start_disposal(paths, mode);
        let mut complete = OperationComplete::default();
        while let Some(message) = rx.recv().await {
            match message {
                DisposalResult::Progress(progress) => {
                    if progress.items_completed % PROGRESS_EVERY == 0 {
                        print!(
                            "  Progress: {}/{total} ({:.0}%)\r",
                            progress.items_completed,
                            progress.percentage()
                        );
                        let _ = io::stdout().flush();
                    }
                }
                DisposalResult::Complete(done) => complete = done,
            }
        }
        println!("  Progress: {total}/{total}  ");
        complete
    })
}

fn print_complete(mode: &DisposalMode, complete: &OperationComplete) {
    println!("\nCompleted:");
    println!(
        "  {}: {} items ({})",
        mode.verb(),
        complete.succeeded,
        format_size(complete.bytes_processed)
    );
    if complete.failed > 0 {
        println!("  Failed: {} items", complete.failed);
        for error in complete.errors.iter().take(5) {
            println!("    {error}");
        }
    }
}

/// Read one line from stdin. `None` on end of input.
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok((read > 0).then_some(line))
}

fn confirm(message: &str) -> Result<bool> {
    loop {
        let Some(answer) = prompt(&format!("{message} [y/N]: "))? else {
            return Ok(false);
        };
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => continue,
        }
    }
}
