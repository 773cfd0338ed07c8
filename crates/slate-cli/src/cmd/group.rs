//! `slate group` — grouping item commands. A group's status and schedule
//! are derived from its children, so create/update only take name and
//! description.

use clap::{Args, Subcommand};
use slate_core::RecordStore;
use slate_core::model::{GroupDraft, Record, RecordId};

use crate::output::{self, OutputMode};

#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Name of the group.
    #[arg(short, long)]
    pub name: String,

    /// Description text.
    #[arg(short, long, default_value = "")]
    pub description: String,
}

impl GroupArgs {
    fn draft(&self) -> GroupDraft {
        GroupDraft {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// Create a group.
    Add(GroupArgs),

    /// Show one group (records the access in history).
    Show {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// List all groups.
    List,

    /// List the children of one group.
    Children {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Replace a group's name and description.
    Update {
        #[arg(value_name = "ID")]
        id: u64,
        #[command(flatten)]
        fields: GroupArgs,
    },

    /// Delete a group together with all of its children.
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
    },

    /// Delete every group together with every child.
    Clear,
}

/// Returns whether the store was mutated and needs saving.
pub fn run(store: &mut RecordStore, cmd: &GroupCommand, mode: OutputMode) -> anyhow::Result<bool> {
    match cmd {
        GroupCommand::Add(fields) => {
            let id = store.add_group(fields.draft());
            output::render_outcome(mode, "created", id)?;
            Ok(true)
        }
        GroupCommand::Show { id } => {
            let record = Record::Group(store.group(RecordId(*id))?.clone());
            output::render_record(mode, &record)?;
            Ok(false)
        }
        GroupCommand::List => {
            let records: Vec<Record> = store
                .groups()
                .into_iter()
                .cloned()
                .map(Record::Group)
                .collect();
            output::render_records(mode, &records)?;
            Ok(false)
        }
        GroupCommand::Children { id } => {
            let records: Vec<Record> = store
                .group_children(RecordId(*id))?
                .into_iter()
                .cloned()
                .map(Record::Child)
                .collect();
            output::render_records(mode, &records)?;
            Ok(false)
        }
        GroupCommand::Update { id, fields } => {
            let id = RecordId(*id);
            store.update_group(id, fields.draft())?;
            output::render_outcome(mode, "updated", id)?;
            Ok(true)
        }
        GroupCommand::Delete { id } => {
            let id = RecordId(*id);
            store.delete_group(id)?;
            output::render_outcome(mode, "deleted", id)?;
            Ok(true)
        }
        GroupCommand::Clear => {
            store.clear_groups();
            output::render_message(mode, "cleared all groups and their children")?;
            Ok(true)
        }
    }
}
