//! Performance view: summary cards, the log table, and text bundle export.
//!
//! Rendering is pure. The snapshot is fetched fresh on every load and never
//! cached, so two loads over identical service data render identically.

use crate::error::HybridResult;
use chrono::{DateTime, Local, TimeZone};
use directories_next::UserDirs;
use hybridcrypt_contract::{
    LogEntry, LogRecord, PerformanceSnapshot, PerformanceStatistics, TelemetryGateway,
};
use log::debug;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const EXPORT_ROOT_ENV: &str = "HYBRIDCRYPT_EXPORT_DIR";
pub const NO_LOGS_PLACEHOLDER: &str = "No logs available";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// One of the four fixed summary counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: u64,
}

/// Rendered row of the log table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub operation: String,
    pub timing: String,
    pub details: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Entry(LogRow),
    /// Shown alone when the service returned no logs.
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceView {
    pub cards: [StatCard; 4],
    pub rows: Vec<TableRow>,
}

/// Freshly fetched snapshot together with its rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub snapshot: PerformanceSnapshot,
    pub view: PerformanceView,
}

/// Cards in display order: total, key generations, encryptions, decryptions.
pub fn display_stats(stats: &PerformanceStatistics) -> [StatCard; 4] {
    [
        StatCard {
            title: "Total Operations",
            value: stats.total_operations,
        },
        StatCard {
            title: "Key Generations",
            value: stats.key_generation_count,
        },
        StatCard {
            title: "Enkripsi",
            value: stats.encryption_count,
        },
        StatCard {
            title: "Dekripsi",
            value: stats.decryption_count,
        },
    ]
}

/// Average timings reported alongside the counters, in seconds.
pub fn averages(stats: &PerformanceStatistics) -> [(&'static str, f64); 4] {
    [
        ("Key Generation", stats.average_key_generation_time),
        ("Key Exchange", stats.average_key_exchange_time),
        ("Encryption", stats.average_encryption_time),
        ("Decryption", stats.average_decryption_time),
    ]
}

/// Category-specific detail text. Unknown categories yield an empty string.
pub fn log_details(record: &LogRecord) -> String {
    match record {
        LogRecord::KeyGeneration(timing) => format!("Total: {:.6}s", timing.total_time),
        LogRecord::KeyExchange(timing) => format!(
            "Alice: {:.6}s, Bob: {:.6}s",
            timing.alice_time, timing.bob_time
        ),
        LogRecord::Encryption(timing) => format!(
            "Waktu: {:.6}s, Ukuran: {} bytes",
            timing.encryption_time, timing.original_size
        ),
        LogRecord::Decryption(timing) => format!(
            "Waktu: {:.6}s, Ukuran: {} bytes",
            timing.decryption_time, timing.decrypted_size
        ),
        LogRecord::Unrecognized(_) => String::new(),
    }
}

/// Render an epoch-seconds timestamp in the given zone.
pub fn format_timestamp<Tz>(epoch_seconds: f64, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let secs = epoch_seconds.floor();
    let nanos = ((epoch_seconds - secs) * 1e9) as u32;
    match zone.timestamp_opt(secs as i64, nanos).single() {
        Some(moment) => moment.format(TIMESTAMP_FORMAT).to_string(),
        None => format!("{epoch_seconds}"),
    }
}

fn render_row<Tz>(entry: &LogEntry, zone: &Tz) -> TableRow
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let details = log_details(&entry.record);
    TableRow::Entry(LogRow {
        operation: entry.label.clone(),
        timing: details.clone(),
        details,
        timestamp: format_timestamp(entry.timestamp, zone),
    })
}

/// One row per entry in input order, or a single placeholder row.
pub fn display_logs(logs: &[LogEntry]) -> Vec<TableRow> {
    display_logs_in(logs, &Local)
}

pub fn display_logs_in<Tz>(logs: &[LogEntry], zone: &Tz) -> Vec<TableRow>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if logs.is_empty() {
        return vec![TableRow::Placeholder(NO_LOGS_PLACEHOLDER)];
    }
    logs.iter().map(|entry| render_row(entry, zone)).collect()
}

impl PerformanceView {
    pub fn render(snapshot: &PerformanceSnapshot) -> Self {
        Self {
            cards: display_stats(&snapshot.statistics),
            rows: display_logs(&snapshot.logs),
        }
    }
}

/// Fetch `{statistics, logs}` and render them.
pub async fn load_performance<G>(gateway: &G) -> HybridResult<PerformanceReport>
where
    G: TelemetryGateway + ?Sized,
{
    let snapshot = gateway.performance().await?;
    debug!(
        "performance snapshot: {} operations, {} log entries",
        snapshot.statistics.total_operations,
        snapshot.logs.len()
    );
    let view = PerformanceView::render(&snapshot);
    Ok(PerformanceReport { snapshot, view })
}

/// Write a text bundle with the rendered view and the raw snapshot.
///
/// The bundle lands in `target_dir`, else `HYBRIDCRYPT_EXPORT_DIR`, else the
/// user's Downloads directory, else the working directory.
pub fn bundle_snapshot(
    report: &PerformanceReport,
    target_dir: Option<PathBuf>,
) -> io::Result<PathBuf> {
    let export_root = target_dir
        .or_else(default_export_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&export_root)?;
    let bundle_path = export_root.join(format!("hybridcrypt-performance-{}.txt", timestamp_ms()));
    let mut bundle = File::create(&bundle_path)?;

    let generated: DateTime<Local> = Local::now();
    writeln!(
        bundle,
        "# HybridCrypt performance bundle\n# generated: {}\n",
        generated.format(TIMESTAMP_FORMAT)
    )?;

    writeln!(bundle, "## Statistics")?;
    for card in &report.view.cards {
        writeln!(bundle, "{:<18} {}", card.title, card.value)?;
    }
    writeln!(
        bundle,
        "{:<18} {}",
        "Key Exchanges", report.snapshot.statistics.key_exchange_count
    )?;
    writeln!(bundle, "\n## Averages")?;
    for (title, seconds) in averages(&report.snapshot.statistics) {
        writeln!(bundle, "{title:<18} {seconds:.6}s")?;
    }

    writeln!(bundle, "\n## Logs")?;
    for row in &report.view.rows {
        match row {
            TableRow::Entry(row) => writeln!(
                bundle,
                "{} | {} | {} | {}",
                row.operation, row.timing, row.details, row.timestamp
            )?,
            TableRow::Placeholder(text) => writeln!(bundle, "{text}")?,
        }
    }

    let raw = serde_json::to_string_pretty(&report.snapshot)?;
    writeln!(bundle, "\n## Raw snapshot\n{raw}")?;

    Ok(bundle_path)
}

fn default_export_dir() -> Option<PathBuf> {
    if let Ok(root) = std::env::var(EXPORT_ROOT_ENV) {
        if !root.trim().is_empty() {
            return Some(PathBuf::from(root));
        }
    }

    UserDirs::new().and_then(|dirs| dirs.download_dir().map(|p| p.to_path_buf()))
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_millis())
        .unwrap_or_default()
}
