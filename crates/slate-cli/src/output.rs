//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: key/value sections for humans, stable JSON for machines.
//! Errors render to stderr with their `E####` code in both modes.

use anyhow::Result;
use serde_json::json;
use slate_core::model::{Record, format_start};
use std::io::{self, Write};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable key/value and table output.
    Human,
    /// Machine-readable JSON (one object per result, or a JSON array).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// Render a single record in full.
pub fn render_record(mode: OutputMode, record: &Record) -> Result<()> {
    if mode.is_json() {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    kv(&mut out, "id", record.id().to_string())?;
    kv(&mut out, "kind", record.kind().to_string())?;
    kv(&mut out, "name", record.name())?;
    kv(&mut out, "status", record.status().to_string())?;
    if !record.description().is_empty() {
        kv(&mut out, "description", record.description())?;
    }
    if let Some(start) = record.start() {
        kv(&mut out, "start", format_start(start))?;
    }
    if let Some(minutes) = record.duration_minutes() {
        kv(&mut out, "duration", format!("{minutes}m"))?;
    }
    if let Some(end) = record.end() {
        kv(&mut out, "end", format_start(end))?;
    }
    if let Record::Child(child) = record {
        kv(&mut out, "group", child.group_id.to_string())?;
    }
    Ok(())
}

/// Render a list of records, one line per record in human mode.
pub fn render_records(mode: OutputMode, records: &[Record]) -> Result<()> {
    if mode.is_json() {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    for record in records {
        let start = record
            .start()
            .map_or_else(|| "-".to_string(), format_start);
        writeln!(
            out,
            "{:>5}  {:<10} {:<12} {:<16} {}",
            record.id().to_string(),
            record.kind().to_string(),
            record.status().to_string(),
            start,
            record.name()
        )?;
    }
    Ok(())
}

/// Render a mutation outcome: the action performed and the id it touched.
pub fn render_outcome(mode: OutputMode, action: &str, id: slate_core::model::RecordId) -> Result<()> {
    if mode.is_json() {
        println!("{}", json!({ "ok": true, "action": action, "id": id }));
    } else {
        println!("{action} {id}");
    }
    Ok(())
}

/// Render a mutation outcome that touched no single id.
pub fn render_message(mode: OutputMode, action: &str) -> Result<()> {
    if mode.is_json() {
        println!("{}", json!({ "ok": true, "action": action }));
    } else {
        println!("{action}");
    }
    Ok(())
}

/// Render an error with its stable code and optional hint, to stderr.
pub fn render_error(mode: OutputMode, code: &str, message: &str, hint: Option<&str>) {
    if mode.is_json() {
        eprintln!(
            "{}",
            json!({ "ok": false, "code": code, "error": message, "hint": hint })
        );
        return;
    }

    eprintln!("error[{code}]: {message}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
}
