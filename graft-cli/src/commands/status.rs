//! `graft status` — seal visibility across files without failing the run.

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use graft_core::{content_kind, is_validly_signed, ContentKind};

use super::walk::{collect_files, read_text, FileArg};

/// Arguments for `graft status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Files or directories to inspect.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let files = collect_files(&self.paths)?;
        let report = build_report(&files);
        if self.json {
            print_json(report)?;
            return Ok(());
        }
        print_table(report);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

/// Seal condition of one file, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SealState {
    /// Valid seal.
    Ok,
    /// Seal present, digest mismatch or unverifiable structure.
    Modified,
    /// No seal at all.
    Unsigned,
    /// Could not be read as text.
    Unreadable,
}

#[derive(Debug, Clone)]
struct FileStatus {
    path: PathBuf,
    kind: Option<ContentKind>,
    state: SealState,
    detail: String,
    age: String,
}

#[derive(Debug, Clone)]
struct StatusReport {
    signed_count: usize,
    failing_count: usize,
    files: Vec<FileStatus>,
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    files: Vec<FileStatusJson>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    files: usize,
    signed: usize,
    failing: usize,
}

#[derive(Serialize)]
struct FileStatusJson {
    path: String,
    kind: String,
    state: String,
    detail: String,
    age: String,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
    #[tabled(rename = "age")]
    age: String,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

fn build_report(files: &[FileArg]) -> StatusReport {
    let mut rows = Vec::new();
    for file in files {
        let age = file_age(file);
        let row = match read_text(file) {
            Ok(Some(text)) => status_of(file, &text, age),
            Ok(None) | Err(_) => FileStatus {
                path: file.path.clone(),
                kind: None,
                state: SealState::Unreadable,
                detail: "not readable as text".to_string(),
                age,
            },
        };
        rows.push(row);
    }

    let signed_count = rows
        .iter()
        .filter(|r| !matches!(r.kind, None | Some(ContentKind::Unsigned)))
        .count();
    let failing_count = rows
        .iter()
        .filter(|r| r.state == SealState::Modified)
        .count();

    StatusReport {
        signed_count,
        failing_count,
        files: rows,
    }
}

fn status_of(file: &FileArg, text: &str, age: String) -> FileStatus {
    let kind = content_kind(text);
    let (state, detail) = match kind {
        ContentKind::Unsigned => (SealState::Unsigned, "no seal".to_string()),
        _ => match is_validly_signed(text) {
            Ok(true) => (SealState::Ok, "seal verified".to_string()),
            Ok(false) => (SealState::Modified, "digest mismatch".to_string()),
            Err(e) => (SealState::Modified, e.to_string()),
        },
    };
    FileStatus {
        path: file.path.clone(),
        kind: Some(kind),
        state,
        detail,
        age,
    }
}

fn file_age(file: &FileArg) -> String {
    let mtime = std::fs::metadata(&file.path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    format_system_time_age(mtime)
}

fn format_system_time_age(timestamp: SystemTime) -> String {
    let seconds = SystemTime::now()
        .duration_since(timestamp)
        .unwrap_or_default()
        .as_secs();
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_json(report: StatusReport) -> Result<()> {
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            files: report.files.len(),
            signed: report.signed_count,
            failing: report.failing_count,
        },
        files: report
            .files
            .into_iter()
            .map(|row| FileStatusJson {
                path: row.path.display().to_string(),
                kind: kind_key(row.kind),
                state: state_key(&row.state).to_string(),
                detail: row.detail,
                age: row.age,
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: StatusReport) {
    println!(
        "Graft v{} | {} files | {} signed | {} failing",
        env!("CARGO_PKG_VERSION"),
        report.files.len(),
        report.signed_count,
        report.failing_count,
    );

    if report.files.is_empty() {
        println!("Nothing to inspect.");
        return;
    }

    println!(
        "Indicators: {} OK  {} MODIFIED  {} UNSIGNED  {} UNREADABLE",
        state_indicator(&SealState::Ok),
        state_indicator(&SealState::Modified),
        state_indicator(&SealState::Unsigned),
        state_indicator(&SealState::Unreadable),
    );

    let needs_attention = report.failing_count > 0;
    let table_rows: Vec<StatusTableRow> = report
        .files
        .into_iter()
        .map(|row| StatusTableRow {
            file: row.path.display().to_string(),
            kind: kind_key(row.kind),
            state: format!("{} {}", state_indicator(&row.state), state_label(&row.state)),
            detail: row.detail,
            age: row.age,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if needs_attention {
        println!("Run 'graft verify-signed' for a failing exit code, or recommit with --clobber.");
    }
}

fn kind_key(kind: Option<ContentKind>) -> String {
    match kind {
        None => "-".to_string(),
        Some(kind) => kind.to_string(),
    }
}

fn state_key(state: &SealState) -> &'static str {
    match state {
        SealState::Ok => "ok",
        SealState::Modified => "modified",
        SealState::Unsigned => "unsigned",
        SealState::Unreadable => "unreadable",
    }
}

fn state_label(state: &SealState) -> &'static str {
    match state {
        SealState::Ok => "OK",
        SealState::Modified => "MODIFIED",
        SealState::Unsigned => "UNSIGNED",
        SealState::Unreadable => "UNREADABLE",
    }
}

fn state_indicator(state: &SealState) -> String {
    match state {
        SealState::Ok => "■".green().bold().to_string(),
        SealState::Modified => "■".red().bold().to_string(),
        SealState::Unsigned => "■".bright_black().bold().to_string(),
        SealState::Unreadable => "■".magenta().bold().to_string(),
    }
}
