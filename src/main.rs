//! spacemap - incremental disk usage scanner.
//!
//! Usage:
//!   spacemap [PATH]              Scan and show the largest entries
//!   spacemap scan [PATH]         Same, with display and scan options
//!   spacemap size [PATH]         Total size of a file or directory
//!   spacemap list [PATH]         Sizes of one directory's children
//!   spacemap export [PATH]       Export scan to JSON
//!   spacemap --help              Show help

mod settings;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use spacemap_scan::{
    Completion, ScanEvent, ScanProgress, ScanResult, SizeCalculator, SortOrder, TreeScanner,
    format_size, resolve_path, resolve_root, scan_directory, start_scan,
};

use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "spacemap",
    version,
    about = "Incremental disk usage scanner",
    long_about = "spacemap walks a directory tree breadth-first, sizing every entry, \
                  and shows where your disk space goes.\n\n\
                  Settings are read from <config dir>/spacemap/config.toml; \
                  command-line flags take precedence."
)]
struct Cli {
    /// Path to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a tree and show the largest entries
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Number of top entries to show per directory
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        #[command(flatten)]
        options: ScanOptions,
    },

    /// Compute the total size of a file or directory
    Size {
        /// Path to measure
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Size the immediate children of a single directory
    List {
        /// Directory to list
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        options: ScanOptions,
    },

    /// Export scan results to JSON
    Export {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ScanOptions,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct ScanOptions {
    /// Skip this path (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATH")]
    exclude: Vec<PathBuf>,

    /// Count all entries first so progress is exact and never cuts the scan short
    #[arg(long)]
    exact_progress: bool,

    /// Concurrent directory size computations
    #[arg(short, long)]
    workers: Option<usize>,

    /// Include hidden (dot-prefixed) entries
    #[arg(long)]
    hidden: bool,

    /// Do not skip the user cache directory
    #[arg(long)]
    keep_cache: bool,

    /// Ordering of each directory listing
    #[arg(long, value_name = "ORDER")]
    sort: Option<SortOrder>,
}

impl From<ScanOptions> for Overrides {
    fn from(options: ScanOptions) -> Self {
        Self {
            exclude: options.exclude,
            exact_progress: options.exact_progress,
            workers: options.workers,
            hidden: options.hidden,
            keep_cache: options.keep_cache,
            sort: options.sort,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so reports and JSON on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Some(Command::Scan {
            path,
            depth,
            top,
            options,
        }) => {
            run_scan(&path, depth, top, &settings, options.into()).await?;
        }
        Some(Command::Size { path }) => {
            run_size(&path)?;
        }
        Some(Command::List { path, options }) => {
            run_list(&path, &settings, options.into())?;
        }
        Some(Command::Export {
            path,
            output,
            options,
        }) => {
            run_export(&path, output, &settings, options.into())?;
        }
        None => {
            run_scan(&cli.path, 3, 10, &settings, Overrides::default()).await?;
        }
    }

    Ok(())
}

/// Scan in the background with live progress, then print the tree.
async fn run_scan(
    path: &Path,
    max_depth: u32,
    top_n: usize,
    settings: &Settings,
    overrides: Overrides,
) -> Result<()> {
    let path = resolve_root(path)?;
    let config = settings.scan_config(&path, &overrides)?;

    eprintln!("Scanning {}... (Ctrl-C to stop early)", path.display());

    let (handle, mut events) = start_scan(config);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ScanEvent::Progress(progress)) => print_progress(&progress),
                Some(ScanEvent::Completed(_) | ScanEvent::Cancelled(_)) => {}
                None => break,
            },
            _ = &mut ctrl_c, if !handle.is_cancelled() => {
                handle.cancel();
            }
        }
    }
    eprintln!();

    let result = handle.join().await.context("Scan failed")?;
    print_summary(&result);
    print_children(&result, &result.root, 0, max_depth, top_n, result.total_size());

    Ok(())
}

/// Print the total size of one path.
fn run_size(path: &Path) -> Result<()> {
    let path = resolve_path(path)?;
    let report = SizeCalculator::new().compute(&path);

    println!("{}  {}", format_size(report.bytes), path.display());
    if !report.warnings.is_empty() {
        eprintln!("{} unreadable entries counted as 0 bytes", report.warnings.len());
    }
    Ok(())
}

/// Size the children of one directory.
fn run_list(path: &Path, settings: &Settings, overrides: Overrides) -> Result<()> {
    let path = resolve_root(path)?;
    let config = settings.scan_config(&path, &overrides)?;

    let entries = scan_directory(&path, &config, |percent| {
        eprint!("\r {percent:>3}%");
    });
    eprintln!();

    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!("{}  {}", format_size(total), path.display());
    for entry in &entries {
        println!(
            "  {:>10}  {}{}",
            format_size(entry.size),
            entry.name,
            if entry.is_dir { "/" } else { "" }
        );
    }
    Ok(())
}

/// Export scan results to JSON.
fn run_export(
    path: &Path,
    output: Option<PathBuf>,
    settings: &Settings,
    overrides: Overrides,
) -> Result<()> {
    let path = resolve_root(path)?;
    let config = settings.scan_config(&path, &overrides)?;

    eprintln!("Scanning {}...", path.display());

    let mut scanner = TreeScanner::new(config);
    scanner.run();
    let result = scanner.into_result();

    let json = serde_json::to_string_pretty(&result)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Could not write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

fn print_progress(progress: &ScanProgress) {
    eprint!(
        "\r {:>3}%  {} entries  {} dirs queued  {} warnings",
        progress.percent, progress.entries_processed, progress.queued, progress.errors_count
    );
}

fn print_summary(result: &ScanResult) {
    println!("{}", "─".repeat(60));
    println!(
        " {} - {}",
        result.root.display(),
        format_size(result.total_size())
    );
    println!(
        " {} entries in {} directories",
        result.entry_count(),
        result.directory_count()
    );
    println!(" Scanned in {:.2}s", result.scan_duration.as_secs_f64());
    match result.completion {
        Some(Completion::Drained) => {}
        Some(Completion::ForcedAtFullProgress) => {
            println!(" Stopped early by the progress heuristic; use --exact-progress for a full scan");
        }
        Some(Completion::Denylisted) => println!(" Root is denylisted, nothing scanned"),
        None => println!(" Scan stopped before completion, results are partial"),
    }
    if result.has_warnings() {
        println!(" {} warning(s) during scan", result.warnings.len());
    }
    println!("{}", "─".repeat(60));
    println!();
}

/// Print the children of `dir`, descending into directories whose
/// children are known.
fn print_children(
    result: &ScanResult,
    dir: &Path,
    depth: u32,
    max_depth: u32,
    top_n: usize,
    root_size: u64,
) {
    let indent = "  ".repeat(depth as usize);
    let Some(children) = result.children(dir) else {
        println!("{indent}  (contents unknown)");
        return;
    };

    for child in children.iter().take(top_n) {
        let ratio = if root_size > 0 {
            child.size as f64 / root_size as f64 * 100.0
        } else {
            0.0
        };
        let dir_marker = if child.is_dir { "/" } else { "" };

        println!(
            "{}{}{:<40} {:>10} {:>5.1}% {}",
            indent,
            if child.is_dir { "▼ " } else { "  " },
            truncate(&format!("{}{}", child.name, dir_marker), 40),
            format_size(child.size),
            ratio,
            make_bar(ratio / 100.0, 10)
        );

        if child.is_dir && depth + 1 < max_depth {
            print_children(result, &child.path, depth + 1, max_depth, top_n, root_size);
        }
    }

    let remaining = children.len().saturating_sub(top_n);
    if remaining > 0 {
        println!("{indent}  ... and {remaining} more");
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_bar() {
        assert_eq!(make_bar(0.0, 4), "[░░░░]");
        assert_eq!(make_bar(0.5, 4), "[██░░]");
        assert_eq!(make_bar(1.5, 4), "[████]");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééééé", 4), "ééé…");
    }

    #[test]
    fn test_cli_parses_scan_options() {
        let cli = Cli::try_parse_from([
            "spacemap",
            "scan",
            "/tmp",
            "-x",
            "/tmp/a",
            "--exclude",
            "/tmp/b",
            "--exact-progress",
            "--sort",
            "name",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Scan { path, options, .. }) => {
                assert_eq!(path, PathBuf::from("/tmp"));
                assert_eq!(options.exclude.len(), 2);
                assert!(options.exact_progress);
                assert_eq!(options.sort, Some(SortOrder::Name));
            }
            _ => panic!("expected scan command"),
        }
    }
}
