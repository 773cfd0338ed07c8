//! Cross-kind read views: access history and the prioritized schedule.

use slate_core::RecordStore;

use crate::output::{self, OutputMode};

/// `slate history` — records in the order they were last fetched, least
/// recent first.
pub fn history(store: &RecordStore, mode: OutputMode) -> anyhow::Result<()> {
    output::render_records(mode, &store.history())
}

/// `slate prioritized` — scheduled standalone and child items ordered by
/// start time, ties by id.
pub fn prioritized(store: &RecordStore, mode: OutputMode) -> anyhow::Result<()> {
    output::render_records(mode, &store.prioritized())
}
