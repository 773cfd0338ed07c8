use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

/// Render/parse format for start and end times (minute precision).
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Parse a start time in the [`DATE_FORMAT`] form, e.g. `01.03.2026 09:15`.
///
/// # Errors
///
/// Returns the underlying chrono error when the text does not match.
pub fn parse_start(text: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
}

/// Render a time in the [`DATE_FORMAT`] form.
#[must_use]
pub fn format_start(time: NaiveDateTime) -> String {
    time.format(DATE_FORMAT).to_string()
}

/// Identifier of a record. Unique across all three kinds; assigned once at
/// creation and never reused while any record referencing it is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The three record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Standalone,
    Group,
    Child,
}

impl Kind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Group => "group",
            Self::Child => "child",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "standalone" => Ok(Self::Standalone),
            "group" => Ok(Self::Group),
            "child" => Ok(Self::Child),
            _ => Err(ParseEnumError {
                expected: "kind",
                got: s.to_string(),
            }),
        }
    }
}

/// The three lifecycle statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    New,
    InProgress,
    Done,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::New
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "new" => Ok(Self::New),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

/// Half-open `[start, end)` span of a scheduled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Derive a window from an optional start and duration. A record with no
/// start, no duration, or a zero duration has no window and is exempt from
/// slot accounting.
fn window_of(start: Option<NaiveDateTime>, duration_minutes: Option<u32>) -> Option<Window> {
    let start = start?;
    let minutes = duration_minutes?;
    if minutes == 0 {
        return None;
    }
    Some(Window {
        start,
        end: start + Duration::minutes(i64::from(minutes)),
    })
}

/// A self-contained item with independently settable status and schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandaloneItem {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

impl StandaloneItem {
    pub(crate) fn new(id: RecordId, draft: StandaloneDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            status: draft.status,
            start: draft.start,
            duration_minutes: draft.duration_minutes,
        }
    }

    /// Derived end time, present when both start and duration are set.
    #[must_use]
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.window().map(|w| w.end)
    }

    #[must_use]
    pub fn window(&self) -> Option<Window> {
        window_of(self.start, self.duration_minutes)
    }
}

/// An item belonging to exactly one group, referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildItem {
    pub id: RecordId,
    pub group_id: RecordId,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

impl ChildItem {
    pub(crate) fn new(id: RecordId, draft: ChildDraft) -> Self {
        Self {
            id,
            group_id: draft.group_id,
            name: draft.name,
            description: draft.description,
            status: draft.status,
            start: draft.start,
            duration_minutes: draft.duration_minutes,
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.window().map(|w| w.end)
    }

    #[must_use]
    pub fn window(&self) -> Option<Window> {
        window_of(self.start, self.duration_minutes)
    }
}

/// A grouping item. Status and schedule are derived from its children and
/// recomputed by the store after every structural change; callers can read
/// them but never set them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupItem {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    status: Status,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    duration_minutes: Option<u32>,
    children: BTreeSet<RecordId>,
}

impl GroupItem {
    pub(crate) fn new(id: RecordId, draft: GroupDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            status: Status::New,
            start: None,
            end: None,
            duration_minutes: None,
            children: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub const fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    #[must_use]
    pub const fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    /// Ids of this group's children, in ascending order.
    #[must_use]
    pub const fn child_ids(&self) -> &BTreeSet<RecordId> {
        &self.children
    }

    pub(crate) fn link_child(&mut self, id: RecordId) {
        self.children.insert(id);
    }

    pub(crate) fn unlink_child(&mut self, id: RecordId) {
        self.children.remove(&id);
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }

    pub(crate) fn apply(&mut self, aggregate: GroupAggregate) {
        self.status = aggregate.status;
        self.start = aggregate.start;
        self.end = aggregate.end;
        self.duration_minutes = aggregate.duration_minutes;
    }
}

/// Derived status and schedule of a group, computed from its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupAggregate {
    pub status: Status,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

impl GroupAggregate {
    /// Aggregation rules:
    ///
    /// - status is `New` with no children or all children `New`, `Done` when
    ///   all children are `Done` (nonempty), otherwise `InProgress`;
    /// - the window is the min start / max end across children that have a
    ///   window of their own;
    /// - duration is the sum of all child durations that are present.
    #[must_use]
    pub fn from_children(children: &[&ChildItem]) -> Self {
        let status = if children.is_empty() || children.iter().all(|c| c.status == Status::New) {
            Status::New
        } else if children.iter().all(|c| c.status == Status::Done) {
            Status::Done
        } else {
            Status::InProgress
        };

        let start = children.iter().filter_map(|c| c.window()).map(|w| w.start).min();
        let end = children.iter().filter_map(|c| c.window()).map(|w| w.end).max();

        let mut total: u32 = 0;
        let mut any = false;
        for child in children {
            if let Some(minutes) = child.duration_minutes {
                total = total.saturating_add(minutes);
                any = true;
            }
        }
        let duration_minutes = any.then_some(total);

        Self {
            status,
            start,
            end,
            duration_minutes,
        }
    }
}

/// Closed union over the three record kinds, used by history snapshots, the
/// prioritized view, persistence rows, and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Standalone(StandaloneItem),
    Group(GroupItem),
    Child(ChildItem),
}

impl Record {
    #[must_use]
    pub const fn id(&self) -> RecordId {
        match self {
            Self::Standalone(item) => item.id,
            Self::Group(item) => item.id,
            Self::Child(item) => item.id,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Standalone(_) => Kind::Standalone,
            Self::Group(_) => Kind::Group,
            Self::Child(_) => Kind::Child,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Standalone(item) => &item.name,
            Self::Group(item) => &item.name,
            Self::Child(item) => &item.name,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Standalone(item) => &item.description,
            Self::Group(item) => &item.description,
            Self::Child(item) => &item.description,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Standalone(item) => item.status,
            Self::Group(item) => item.status(),
            Self::Child(item) => item.status,
        }
    }

    #[must_use]
    pub const fn start(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Standalone(item) => item.start,
            Self::Group(item) => item.start(),
            Self::Child(item) => item.start,
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Standalone(item) => item.end(),
            Self::Group(item) => item.end(),
            Self::Child(item) => item.end(),
        }
    }

    #[must_use]
    pub const fn duration_minutes(&self) -> Option<u32> {
        match self {
            Self::Standalone(item) => item.duration_minutes,
            Self::Group(item) => item.duration_minutes(),
            Self::Child(item) => item.duration_minutes,
        }
    }
}

/// Caller input for creating or updating a standalone item.
#[derive(Debug, Clone, Default)]
pub struct StandaloneDraft {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

/// Caller input for creating or updating a group. Status and schedule are
/// derived, so the draft carries none.
#[derive(Debug, Clone, Default)]
pub struct GroupDraft {
    pub name: String,
    pub description: String,
}

/// Caller input for creating or updating a child item.
#[derive(Debug, Clone)]
pub struct ChildDraft {
    pub group_id: RecordId,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub start: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(status: Status, start: Option<&str>, minutes: Option<u32>) -> ChildItem {
        ChildItem {
            id: RecordId(10),
            group_id: RecordId(1),
            name: "c".to_string(),
            description: String::new(),
            status,
            start: start.map(|s| parse_start(s).expect("valid time")),
            duration_minutes: minutes,
        }
    }

    #[test]
    fn status_display_parse_roundtrips() {
        for value in [Status::New, Status::InProgress, Status::Done] {
            let rendered = value.to_string();
            assert_eq!(Status::from_str(&rendered).expect("reparse"), value);
        }
        assert_eq!(Status::from_str("IN_PROGRESS").expect("parse"), Status::InProgress);
        assert!(Status::from_str("open").is_err());
    }

    #[test]
    fn kind_display_parse_roundtrips() {
        for value in [Kind::Standalone, Kind::Group, Kind::Child] {
            let rendered = value.to_string();
            assert_eq!(Kind::from_str(&rendered).expect("reparse"), value);
        }
        assert!(Kind::from_str("epic").is_err());
    }

    #[test]
    fn window_requires_start_and_nonzero_duration() {
        let t = parse_start("01.03.2026 09:00").expect("valid time");
        assert!(window_of(None, Some(30)).is_none());
        assert!(window_of(Some(t), None).is_none());
        assert!(window_of(Some(t), Some(0)).is_none());

        let window = window_of(Some(t), Some(45)).expect("window");
        assert_eq!(window.start, t);
        assert_eq!(window.end, t + Duration::minutes(45));
    }

    #[test]
    fn aggregate_of_no_children_is_new_and_unscheduled() {
        let agg = GroupAggregate::from_children(&[]);
        assert_eq!(agg.status, Status::New);
        assert!(agg.start.is_none());
        assert!(agg.end.is_none());
        assert!(agg.duration_minutes.is_none());
    }

    #[test]
    fn aggregate_status_matrix() {
        let all_new = [
            child(Status::New, None, None),
            child(Status::New, None, None),
        ];
        let refs: Vec<&ChildItem> = all_new.iter().collect();
        assert_eq!(GroupAggregate::from_children(&refs).status, Status::New);

        let all_done = [
            child(Status::Done, None, None),
            child(Status::Done, None, None),
        ];
        let refs: Vec<&ChildItem> = all_done.iter().collect();
        assert_eq!(GroupAggregate::from_children(&refs).status, Status::Done);

        let mixed = [
            child(Status::New, None, None),
            child(Status::Done, None, None),
        ];
        let refs: Vec<&ChildItem> = mixed.iter().collect();
        assert_eq!(
            GroupAggregate::from_children(&refs).status,
            Status::InProgress
        );

        let one_doing = [child(Status::InProgress, None, None)];
        let refs: Vec<&ChildItem> = one_doing.iter().collect();
        assert_eq!(
            GroupAggregate::from_children(&refs).status,
            Status::InProgress
        );
    }

    #[test]
    fn aggregate_window_spans_scheduled_children_only() {
        let scheduled = [
            child(Status::New, Some("01.03.2026 10:00"), Some(60)),
            child(Status::New, Some("01.03.2026 08:00"), Some(30)),
            child(Status::New, None, Some(15)),
        ];
        let refs: Vec<&ChildItem> = scheduled.iter().collect();
        let agg = GroupAggregate::from_children(&refs);

        assert_eq!(agg.start, Some(parse_start("01.03.2026 08:00").expect("t")));
        assert_eq!(agg.end, Some(parse_start("01.03.2026 11:00").expect("t")));
        // The unscheduled child still contributes its duration.
        assert_eq!(agg.duration_minutes, Some(105));
    }

    #[test]
    fn record_accessors_dispatch_by_kind() {
        let item = StandaloneItem {
            id: RecordId(3),
            name: "n".to_string(),
            description: "d".to_string(),
            status: Status::Done,
            start: None,
            duration_minutes: None,
        };
        let record = Record::Standalone(item);
        assert_eq!(record.id(), RecordId(3));
        assert_eq!(record.kind(), Kind::Standalone);
        assert_eq!(record.status(), Status::Done);
        assert!(record.start().is_none());
        assert!(record.end().is_none());
    }

    #[test]
    fn record_json_carries_kind_tag() {
        let group = GroupItem::new(
            RecordId(7),
            GroupDraft {
                name: "release".to_string(),
                description: String::new(),
            },
        );
        let json = serde_json::to_value(Record::Group(group)).expect("serialize");
        assert_eq!(json.get("kind"), Some(&serde_json::Value::from("group")));
        assert_eq!(json.get("id"), Some(&serde_json::Value::from(7)));
        assert_eq!(json.get("status"), Some(&serde_json::Value::from("new")));
    }
}
