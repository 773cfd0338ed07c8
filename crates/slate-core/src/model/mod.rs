//! Record model: kinds, statuses, drafts, and the group aggregate.

pub mod item;

pub use chrono::NaiveDateTime;

pub use item::{
    ChildDraft, ChildItem, GroupAggregate, GroupDraft, GroupItem, Kind, Record, RecordId,
    StandaloneDraft, StandaloneItem, Status, Window, DATE_FORMAT, format_start, parse_start,
};
