//! Flat-file persistence: one header line plus one comma-separated row per
//! record, ordered by id.
//!
//! Load runs in a single pass: materialize every row by kind, then link
//! children to groups and recompute each group's aggregate, then re-claim
//! every loaded window in the slot table. Rows read from disk are trusted
//! as-is; only future creates and updates go through overlap checks.
//!
//! Field values must not contain commas or newlines; [`save`] strips them
//! from names and descriptions rather than quoting.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::StoreError;
use crate::model::{
    ChildItem, GroupDraft, GroupItem, Kind, Record, RecordId, StandaloneItem, Status,
    format_start, parse_start,
};
use crate::store::RecordStore;

/// Column order of every row.
pub const HEADER: &str = "id,kind,name,status,description,duration,start,end,group";

/// Errors from the persistence adapter. The in-memory store is never
/// affected by a failed save.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("store file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed row at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl From<PersistError> for StoreError {
    fn from(err: PersistError) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Serialize every record in the store to `path`, overwriting the file.
///
/// # Errors
///
/// [`PersistError::Io`] when the file cannot be written.
pub fn save(store: &RecordStore, path: &Path) -> Result<(), PersistError> {
    let records = store.records();
    let mut out = String::with_capacity(HEADER.len() + records.len() * 64);
    out.push_str(HEADER);
    out.push('\n');
    for record in &records {
        out.push_str(&row(record));
        out.push('\n');
    }
    fs::write(path, out)?;
    debug!(path = %path.display(), records = records.len(), "store saved");
    Ok(())
}

/// Deserialize a whole store from `path`. A missing or empty file loads as
/// an empty store.
///
/// # Errors
///
/// [`PersistError::Io`] when the file cannot be read and
/// [`PersistError::Parse`] for a malformed row.
pub fn load(path: &Path) -> Result<RecordStore, PersistError> {
    let mut store = RecordStore::new();
    if !path.exists() {
        return Ok(store);
    }

    let contents = fs::read_to_string(path)?;
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() || line == HEADER {
            continue;
        }
        let record = parse_row(line).map_err(|reason| PersistError::Parse {
            line: index + 1,
            reason,
        })?;
        store.insert_loaded(record);
    }

    store.rebuild();
    debug!(path = %path.display(), records = store.records().len(), "store loaded");
    Ok(store)
}

fn clean(field: &str) -> String {
    field.replace([',', '\n', '\r'], " ")
}

fn row(record: &Record) -> String {
    let duration = record
        .duration_minutes()
        .map(|m| m.to_string())
        .unwrap_or_default();
    let start = record.start().map(format_start).unwrap_or_default();
    let end = record.end().map(format_start).unwrap_or_default();
    let group = match record {
        Record::Child(child) => child.group_id.to_string(),
        Record::Standalone(_) | Record::Group(_) => String::new(),
    };

    format!(
        "{},{},{},{},{},{},{},{},{}",
        record.id(),
        record.kind(),
        clean(record.name()),
        record.status(),
        clean(record.description()),
        duration,
        start,
        end,
        group
    )
}

fn parse_row(line: &str) -> Result<Record, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 9 {
        return Err(format!("expected 9 fields, found {}", fields.len()));
    }

    let id = RecordId::from_str(fields[0]).map_err(|e| format!("bad id: {e}"))?;
    let kind = Kind::from_str(fields[1]).map_err(|e| e.to_string())?;
    let name = fields[2].to_string();
    let status = Status::from_str(fields[3]).map_err(|e| e.to_string())?;
    let description = fields[4].to_string();

    let duration_minutes = match fields[5].trim() {
        "" => None,
        text => Some(text.parse::<u32>().map_err(|e| format!("bad duration: {e}"))?),
    };
    let start = match fields[6].trim() {
        "" => None,
        text => Some(parse_start(text).map_err(|e| format!("bad start time: {e}"))?),
    };
    // fields[7] (end) is derived and ignored on load.

    match kind {
        Kind::Standalone => Ok(Record::Standalone(StandaloneItem {
            id,
            name,
            description,
            status,
            start,
            duration_minutes,
        })),
        Kind::Group => Ok(Record::Group(GroupItem::new(
            id,
            GroupDraft { name, description },
        ))),
        Kind::Child => {
            let group_id =
                RecordId::from_str(fields[8]).map_err(|e| format!("bad group id: {e}"))?;
            Ok(Record::Child(ChildItem {
                id,
                group_id,
                name,
                description,
                status,
                start,
                duration_minutes,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_row, row};
    use crate::model::{Kind, Record, RecordId, StandaloneItem, Status, parse_start};

    #[test]
    fn row_roundtrips_a_scheduled_standalone() {
        let item = StandaloneItem {
            id: RecordId(4),
            name: "Plan sprint".to_string(),
            description: "Planning".to_string(),
            status: Status::InProgress,
            start: Some(parse_start("02.03.2026 09:00").expect("t")),
            duration_minutes: Some(45),
        };
        let record = Record::Standalone(item);
        let reparsed = parse_row(&row(&record)).expect("reparse");
        assert_eq!(reparsed, record);
    }

    #[test]
    fn row_leaves_unscheduled_fields_blank() {
        let item = StandaloneItem {
            id: RecordId(1),
            name: "n".to_string(),
            description: "d".to_string(),
            status: Status::New,
            start: None,
            duration_minutes: None,
        };
        let rendered = row(&Record::Standalone(item));
        assert_eq!(rendered, "1,standalone,n,new,d,,,,");
    }

    #[test]
    fn commas_in_fields_are_stripped_on_save() {
        let item = StandaloneItem {
            id: RecordId(2),
            name: "a,b".to_string(),
            description: "c,d".to_string(),
            status: Status::New,
            start: None,
            duration_minutes: None,
        };
        let rendered = row(&Record::Standalone(item));
        let reparsed = parse_row(&rendered).expect("reparse");
        assert_eq!(reparsed.name(), "a b");
        assert_eq!(reparsed.description(), "c d");
    }

    #[test]
    fn malformed_rows_are_rejected_with_a_reason() {
        assert!(parse_row("not-a-row").is_err());
        assert!(parse_row("x,standalone,n,new,d,,,,").is_err());
        assert!(parse_row("1,martian,n,new,d,,,,").is_err());
        // A child row without a group id is malformed.
        assert!(parse_row("3,child,n,new,d,,,,").is_err());
    }

    #[test]
    fn child_row_carries_its_group() {
        let parsed = parse_row("5,child,n,done,d,30,01.03.2026 10:00,01.03.2026 10:30,2")
            .expect("parse");
        assert_eq!(parsed.kind(), Kind::Child);
        match parsed {
            Record::Child(child) => assert_eq!(child.group_id, RecordId(2)),
            _ => panic!("expected child"),
        }
    }
}
