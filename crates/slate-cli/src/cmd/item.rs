//! `slate item` — standalone item commands.

use clap::Subcommand;
use slate_core::RecordStore;
use slate_core::model::{Record, RecordId};

use crate::cmd::FieldsArgs;
use crate::output::{self, OutputMode};

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// Create a standalone item.
    Add(FieldsArgs),

    /// Show one standalone item (records the access in history).
    Show {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// List all standalone items.
    List,

    /// Replace a standalone item's field values.
    Update {
        #[arg(value_name = "ID")]
        id: u64,
        #[command(flatten)]
        fields: FieldsArgs,
    },

    /// Delete a standalone item.
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Delete every standalone item.
    Clear,
}

/// Returns whether the store was mutated and needs saving.
pub fn run(store: &mut RecordStore, cmd: &ItemCommand, mode: OutputMode) -> anyhow::Result<bool> {
    match cmd {
        ItemCommand::Add(fields) => {
            let id = store.add_standalone(fields.standalone_draft()?)?;
            output::render_outcome(mode, "created", id)?;
            Ok(true)
        }
        ItemCommand::Show { id } => {
            let record = Record::Standalone(store.standalone(RecordId(*id))?.clone());
            output::render_record(mode, &record)?;
            Ok(false)
        }
        ItemCommand::List => {
            let records: Vec<Record> = store
                .standalones()
                .into_iter()
                .cloned()
                .map(Record::Standalone)
                .collect();
            output::render_records(mode, &records)?;
            Ok(false)
        }
        ItemCommand::Update { id, fields } => {
            let id = RecordId(*id);
            store.update_standalone(id, fields.standalone_draft()?)?;
            output::render_outcome(mode, "updated", id)?;
            Ok(true)
        }
        ItemCommand::Delete { id } => {
            let id = RecordId(*id);
            store.delete_standalone(id)?;
            output::render_outcome(mode, "deleted", id)?;
            Ok(true)
        }
        ItemCommand::Clear => {
            store.clear_standalones();
            output::render_message(mode, "cleared all standalone items")?;
            Ok(true)
        }
    }
}
