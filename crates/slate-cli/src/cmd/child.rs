//! `slate child` — child item commands. A child always belongs to one
//! group; `add` requires `--group`, and the group can never be changed
//! afterwards, so `update` takes no group flag.

use clap::Subcommand;
use slate_core::model::{Record, RecordId};
use slate_core::{RecordStore, StoreError};

use crate::cmd::FieldsArgs;
use crate::output::{self, OutputMode};

#[derive(Subcommand, Debug)]
pub enum ChildCommand {
    /// Create a child item inside an existing group.
    Add {
        /// Id of the owning group.
        #[arg(short, long)]
        group: u64,
        #[command(flatten)]
        fields: FieldsArgs,
    },

    /// Show one child item (records the access in history).
    Show {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// List all child items.
    List,

    /// Replace a child item's field values. The child stays in its group.
    Update {
        #[arg(value_name = "ID")]
        id: u64,
        #[command(flatten)]
        fields: FieldsArgs,
    },

    /// Delete a child item.
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Delete every child item, resetting every group's derived state.
    Clear,
}

/// Returns whether the store was mutated and needs saving.
pub fn run(store: &mut RecordStore, cmd: &ChildCommand, mode: OutputMode) -> anyhow::Result<bool> {
    match cmd {
        ChildCommand::Add { group, fields } => {
            let id = store.add_child(fields.child_draft(RecordId(*group))?)?;
            output::render_outcome(mode, "created", id)?;
            Ok(true)
        }
        ChildCommand::Show { id } => {
            let record = Record::Child(store.child(RecordId(*id))?.clone());
            output::render_record(mode, &record)?;
            Ok(false)
        }
        ChildCommand::List => {
            let records: Vec<Record> = store
                .children()
                .into_iter()
                .cloned()
                .map(Record::Child)
                .collect();
            output::render_records(mode, &records)?;
            Ok(false)
        }
        ChildCommand::Update { id, fields } => {
            let id = RecordId(*id);
            let group_id = store
                .children()
                .iter()
                .find(|child| child.id == id)
                .map(|child| child.group_id)
                .ok_or(StoreError::NotFound(id))?;
            store.update_child(id, fields.child_draft(group_id)?)?;
            output::render_outcome(mode, "updated", id)?;
            Ok(true)
        }
        ChildCommand::Delete { id } => {
            let id = RecordId(*id);
            store.delete_child(id)?;
            output::render_outcome(mode, "deleted", id)?;
            Ok(true)
        }
        ChildCommand::Clear => {
            store.clear_children();
            output::render_message(mode, "cleared all child items")?;
            Ok(true)
        }
    }
}
