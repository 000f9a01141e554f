//! Plain-text and JSON presentation of scan results.

use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use color_eyre::eyre::Result;
use serde::Serialize;
use strum::IntoEnumIterator;
use tokio::sync::broadcast::{self, error::RecvError};

use homesweep_analyze::{
    Category, CategoryItem, HashProgress, ScanConfig, ScanResult, age_of, format_age,
};
use homesweep_scan::ScanProgress;

const RULE_WIDTH: usize = 70;

/// Category titles that mention the active thresholds.
pub struct Labels {
    large: String,
    old: String,
}

impl Labels {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            large: format!("Large files (>{})", format_size(config.large_threshold)),
            old: format!("Old files (>{} days)", config.old_threshold_days),
        }
    }

    pub fn title(&self, category: Category) -> &str {
        match category {
            Category::LargeFiles => &self.large,
            Category::OldFiles => &self.old,
            other => other.title(),
        }
    }
}

/// Format size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format a count with thousands separators.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("{title:^width$}", width = RULE_WIDTH);
    println!("{}\n", "=".repeat(RULE_WIDTH));
}

/// Print the six-category overview.
pub fn print_summary(result: &ScanResult, labels: &Labels) {
    banner("SCAN SUMMARY");

    println!(
        "  Total scanned: {} files, {}",
        format_count(result.stats.files_scanned),
        format_size(result.stats.bytes_scanned)
    );
    println!();

    for summary in result.summaries() {
        let number = summary.category.number();
        let title = labels.title(summary.category);
        if summary.count > 0 {
            let size = if summary.total_bytes > 0 {
                format!(" ({})", format_size(summary.total_bytes))
            } else {
                String::new()
            };
            println!(
                "  [{number}] {title}: {} items{size}",
                format_count(summary.count as u64)
            );
        } else {
            println!("  [{number}] {title}: None found");
        }
    }
    println!();
}

/// Print one category, showing at most `limit` entries (groups for duplicates).
pub fn print_category(
    result: &ScanResult,
    category: Category,
    limit: Option<usize>,
    labels: &Labels,
) {
    let summary = result.category(category);
    let title = labels.title(category).to_uppercase();

    if summary.is_empty() {
        println!("\nNo items in this category.");
        return;
    }

    let limit = limit.unwrap_or(usize::MAX);
    println!("\n{title}");

    if category == Category::Duplicates {
        println!("(First file in each group will be KEPT, others removed)\n");
        for group in result.duplicates.iter().take(limit) {
            println!("  [KEEP] {}", group.keep().path.display());
            for dup in group.removable() {
                println!("  [DEL]  {}", dup.path.display());
            }
            println!("  Size: {}\n", format_size(group.size));
        }
        if summary.count > limit {
            println!("  ... and {} more duplicate groups\n", summary.count - limit);
        }
        return;
    }
    println!();

    for item in summary.items.iter().take(limit) {
        match category {
            Category::EmptyFiles | Category::EmptyDirs => println!("  {}", item.path.display()),
            Category::JunkFiles => println!(
                "  {} ({})",
                item.path.display(),
                format_size(current_size(item))
            ),
            Category::LargeFiles => {
                println!("  {:>10}  {}", format_size(item.size), item.path.display())
            }
            Category::OldFiles => {
                let age = item
                    .modified
                    .map(|m| format_age(age_of(m, result.reference_time)))
                    .unwrap_or_default();
                println!(
                    "  {age:>18}  {:>10}  {}",
                    format_size(current_size(item)),
                    item.path.display()
                );
            }
            Category::Duplicates => {}
        }
    }
    if summary.count > limit {
        println!("  ... and {} more", summary.count - limit);
    }
    println!();
}

fn current_size(item: &CategoryItem) -> u64 {
    std::fs::metadata(&item.path).map(|m| m.len()).unwrap_or(0)
}

#[derive(Serialize)]
struct SummaryJson {
    root: PathBuf,
    files_scanned: u64,
    dirs_scanned: u64,
    bytes_scanned: u64,
    duration_secs: f64,
    warnings: usize,
    categories: Vec<CategoryJson>,
}

#[derive(Serialize)]
struct CategoryJson {
    number: u8,
    category: Category,
    title: &'static str,
    count: usize,
    total_bytes: u64,
}

#[derive(Serialize)]
struct ItemJson {
    path: PathBuf,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<usize>,
    keep: bool,
}

#[derive(Serialize)]
struct ListJson {
    category: Category,
    count: usize,
    total_bytes: u64,
    items: Vec<ItemJson>,
}

fn rfc3339(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(time).to_rfc3339()
}

/// Print the category overview as JSON.
pub fn print_summary_json(result: &ScanResult) -> Result<()> {
    let json = SummaryJson {
        root: result.root.clone(),
        files_scanned: result.stats.files_scanned,
        dirs_scanned: result.stats.dirs_scanned,
        bytes_scanned: result.stats.bytes_scanned,
        duration_secs: result.duration.as_secs_f64(),
        warnings: result.warnings.len(),
        categories: Category::iter()
            .map(|c| {
                let summary = result.category(c);
                CategoryJson {
                    number: c.number(),
                    category: c,
                    title: c.title(),
                    count: summary.count,
                    total_bytes: summary.total_bytes,
                }
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Print one category as JSON. For duplicates the limit counts groups.
pub fn print_category_json(
    result: &ScanResult,
    category: Category,
    limit: Option<usize>,
) -> Result<()> {
    let summary = result.category(category);
    let limit = limit.unwrap_or(usize::MAX);

    let item_limit = if category == Category::Duplicates {
        usize::MAX
    } else {
        limit
    };
    let items = summary
        .items
        .into_iter()
        .filter(|item| item.group.is_none_or(|group| group < limit))
        .take(item_limit)
        .map(|item| ItemJson {
            path: item.path,
            size: item.size,
            modified: item.modified.map(rfc3339),
            group: item.group,
            keep: item.keep,
        })
        .collect();

    let json = ListJson {
        category,
        count: summary.count,
        total_bytes: summary.total_bytes,
        items,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Print walk progress on one stderr line until the channel closes.
pub fn report_walk_progress(mut rx: broadcast::Receiver<ScanProgress>) {
    loop {
        match rx.blocking_recv() {
            Ok(progress) => {
                eprint!(
                    "\r  Scanned {} files, {} directories ({:.0} files/s)",
                    format_count(progress.files_scanned),
                    format_count(progress.dirs_scanned),
                    progress.files_per_second()
                );
                let _ = std::io::stderr().flush();
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// Print fingerprint progress on one stderr line until the channel closes.
pub fn report_hash_progress(mut rx: broadcast::Receiver<HashProgress>) {
    loop {
        match rx.blocking_recv() {
            Ok(progress) => {
                eprint!(
                    "\r  Hashed {}/{} files for duplicate detection",
                    format_count(progress.files_processed),
                    format_count(progress.total_files)
                );
                let _ = std::io::stderr().flush();
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_labels_use_thresholds() {
        let mut config = ScanConfig::new("/home/user");
        config.large_threshold = 500 * 1024 * 1024;
        config.old_threshold_days = 30;
        let labels = Labels::new(&config);

        assert_eq!(
            labels.title(Category::LargeFiles),
            format!("Large files (>{})", format_size(500 * 1024 * 1024))
        );
        assert_eq!(labels.title(Category::OldFiles), "Old files (>30 days)");
        assert_eq!(labels.title(Category::JunkFiles), "Junk files");
    }
}
