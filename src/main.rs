//! mediasift - find and remove duplicate media files.
//!
//! Usage:
//!   mediasift check FILES...            Load files and report duplicate groups
//!   mediasift dedupe FILES...           Preview which copies would be deleted
//!   mediasift dedupe --apply FILES...   Delete redundant copies, keep one per group
//!   mediasift --help                    Show help

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, bail};
use humansize::{DECIMAL, format_size};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use mediasift_core::ProgressEvent;
use mediasift_session::events::{
    SessionEvent, SharedSession, shared, start_check_duplicates, start_delete_duplicates,
    start_load_files,
};
use mediasift_session::{ConflictPolicy, Session};

#[derive(Parser)]
#[command(
    name = "mediasift",
    version,
    about = "Duplicate detection and cleanup for media files",
    long_about = "mediasift takes an explicit list of image and video files, fingerprints \
                  their content, and reports or removes exact duplicates, keeping one \
                  copy per group."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load files and report duplicate groups
    Check {
        /// Media files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// On a name conflict, replace the earlier file with the later one
        #[arg(long)]
        replace_conflicts: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete redundant copies, keeping the largest file per group
    Dedupe {
        /// Media files to deduplicate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// On a name conflict, replace the earlier file with the later one
        #[arg(long)]
        replace_conflicts: bool,

        /// Actually delete files (default is a dry-run preview)
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            files,
            replace_conflicts,
            format,
        } => run_check(files, policy(replace_conflicts), format).await,
        Command::Dedupe {
            files,
            replace_conflicts,
            apply,
        } => run_dedupe(files, policy(replace_conflicts), apply).await,
    }
}

fn policy(replace_conflicts: bool) -> ConflictPolicy {
    if replace_conflicts {
        ConflictPolicy::Replace
    } else {
        ConflictPolicy::Skip
    }
}

async fn run_check(
    files: Vec<PathBuf>,
    policy: ConflictPolicy,
    format: OutputFormat,
) -> Result<()> {
    let session = shared(Session::new());
    load_and_check(&session, files, policy).await?;

    let session = session.lock().unwrap_or_else(|p| p.into_inner());
    let groups = session.duplicate_groups();

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "file_count": session.file_count(),
                "group_count": groups.len(),
                "duplicate_count": groups.iter().map(|g| g.count()).sum::<usize>(),
                "groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            if groups.is_empty() {
                println!("No duplicates among {} files.", session.file_count());
                return Ok(());
            }
            for (idx, group) in groups.iter().enumerate() {
                println!(
                    "Group {} ({}, {}):",
                    idx + 1,
                    group.kind,
                    &group.fingerprint.to_hex()[..16]
                );
                for member in &group.members {
                    let created = session
                        .catalog()
                        .get(&member.path)
                        .and_then(|r| r.created_at)
                        .map(|t| {
                            DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string()
                        })
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "  {}  {}  {}",
                        member.path.display(),
                        format_size(member.size, DECIMAL),
                        created
                    );
                }
            }
            println!(
                "{} duplicates in {} groups.",
                groups.iter().map(|g| g.count()).sum::<usize>(),
                groups.len()
            );
        }
    }

    Ok(())
}

async fn run_dedupe(files: Vec<PathBuf>, policy: ConflictPolicy, apply: bool) -> Result<()> {
    let session = shared(Session::new());
    load_and_check(&session, files, policy).await?;

    if !apply {
        let session = session.lock().unwrap_or_else(|p| p.into_inner());
        let plan = session.deletion_plan();
        if plan.is_empty() {
            println!("Nothing to delete.");
            return Ok(());
        }
        for member in &plan.doomed {
            println!(
                "would delete {}  {}",
                member.path.display(),
                format_size(member.size, DECIMAL)
            );
        }
        println!(
            "{} files, {} reclaimable. Re-run with --apply to delete.",
            plan.len(),
            format_size(plan.reclaimable_bytes(), DECIMAL)
        );
        return Ok(());
    }

    let rx = start_delete_duplicates(session.clone(), CancellationToken::new());
    let Some(SessionEvent::Deleted(report)) = drain(rx).await? else {
        bail!("deletion did not complete");
    };

    for error in &report.errors {
        eprintln!("failed: {error}");
    }
    println!(
        "Deleted {} files, {} failed, {} duplicates remain.",
        report.deleted,
        report.errors.len(),
        report.remaining_duplicates
    );

    Ok(())
}

/// Run the load and check phases, printing progress and report summaries.
async fn load_and_check(
    session: &SharedSession,
    files: Vec<PathBuf>,
    policy: ConflictPolicy,
) -> Result<()> {
    let rx = start_load_files(session.clone(), files, policy, CancellationToken::new());
    let Some(SessionEvent::Loaded(report)) = drain(rx).await? else {
        bail!("load did not complete");
    };

    for name in &report.unsupported {
        eprintln!("unsupported: {name}");
    }
    for name in &report.identical {
        eprintln!("already tracked: {name}");
    }
    for name in &report.conflicting {
        eprintln!("name conflict: {name}");
    }
    for error in &report.errors {
        eprintln!("failed: {error}");
    }

    let rx = start_check_duplicates(session.clone(), CancellationToken::new());
    let Some(SessionEvent::Checked(_)) = drain(rx).await? else {
        bail!("duplicate check did not complete");
    };

    Ok(())
}

/// Consume an event stream, rendering progress; returns the terminal event.
async fn drain(mut rx: mpsc::Receiver<SessionEvent>) -> Result<Option<SessionEvent>> {
    let mut terminal = None;
    while let Some(event) = rx.recv().await {
        match event {
            SessionEvent::Progress(ev) => render_progress(&ev),
            SessionEvent::Failed(message) => {
                eprintln!();
                bail!("{message}");
            }
            SessionEvent::Cancelled => {
                eprintln!();
                bail!("operation cancelled");
            }
            other => terminal = Some(other),
        }
    }
    if terminal.is_some() {
        eprintln!();
    }
    Ok(terminal)
}

fn render_progress(event: &ProgressEvent) {
    eprint!(
        "\r{} {}/{} ({}%) {}",
        event.phase,
        event.index,
        event.total,
        event.percent(),
        event.current_name
    );
    let _ = std::io::stderr().flush();
}
