//! Command handlers, one module per record kind plus the cross-kind views.

pub mod child;
pub mod group;
pub mod item;
pub mod views;

use clap::Args;
use slate_core::StoreError;
use slate_core::model::{
    ChildDraft, DATE_FORMAT, NaiveDateTime, RecordId, StandaloneDraft, Status, parse_start,
};

/// Field values shared by standalone and child create/update commands.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Name of the item.
    #[arg(short, long)]
    pub name: String,

    /// Description text.
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Status: new, in-progress, or done.
    #[arg(short, long, default_value = "new")]
    pub status: String,

    /// Start time, e.g. "01.03.2026 09:15".
    #[arg(long)]
    pub start: Option<String>,

    /// Duration in minutes.
    #[arg(long)]
    pub duration: Option<u32>,
}

impl FieldsArgs {
    fn status(&self) -> Result<Status, StoreError> {
        self.status
            .parse()
            .map_err(|_| StoreError::Validation(format!("invalid status '{}'", self.status)))
    }

    fn start(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        self.start
            .as_deref()
            .map(|text| {
                parse_start(text).map_err(|_| {
                    StoreError::Validation(format!(
                        "invalid start time '{text}', expected format {DATE_FORMAT}"
                    ))
                })
            })
            .transpose()
    }

    /// Build a standalone draft, rejecting malformed status or start text.
    pub fn standalone_draft(&self) -> Result<StandaloneDraft, StoreError> {
        Ok(StandaloneDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status()?,
            start: self.start()?,
            duration_minutes: self.duration,
        })
    }

    /// Build a child draft against `group_id`.
    pub fn child_draft(&self, group_id: RecordId) -> Result<ChildDraft, StoreError> {
        Ok(ChildDraft {
            group_id,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status()?,
            start: self.start()?,
            duration_minutes: self.duration,
        })
    }
}
