//! The record store: three keyed collections plus the allocator, slot table,
//! and access history, mutating together as one unit per call.
//!
//! Failure semantics: `NotFound` and `Validation` never partially mutate
//! state; `SchedulingConflict` and `HorizonExceeded` abort the triggering
//! create/update with prior state intact; nothing is retried internally.

use std::collections::BTreeMap;

use tracing::debug;

use crate::alloc::IdAllocator;
use crate::error::{Result, StoreError};
use crate::history::AccessHistory;
use crate::intervals::SlotTable;
use crate::model::{
    ChildDraft, ChildItem, GroupAggregate, GroupDraft, GroupItem, Record, RecordId,
    StandaloneDraft, StandaloneItem,
};

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    standalones: BTreeMap<RecordId, StandaloneItem>,
    groups: BTreeMap<RecordId, GroupItem>,
    children: BTreeMap<RecordId, ChildItem>,
    ids: IdAllocator,
    slots: SlotTable,
    history: AccessHistory<Record>,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- standalone items ---------------------------------------------------

    /// Create a standalone item.
    ///
    /// # Errors
    ///
    /// `SchedulingConflict` / `HorizonExceeded` when the draft's window
    /// cannot be reserved; nothing is inserted in that case.
    pub fn add_standalone(&mut self, draft: StandaloneDraft) -> Result<RecordId> {
        let id = self.ids.next();
        let item = StandaloneItem::new(id, draft);
        self.slots.reserve(id, item.window())?;
        debug!(%id, name = %item.name, "standalone created");
        self.standalones.insert(id, item);
        Ok(id)
    }

    /// Replace the field values of a standalone item, keeping its identity.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent; scheduling rejections leave the
    /// record (and its prior reservation) unchanged.
    pub fn update_standalone(&mut self, id: RecordId, draft: StandaloneDraft) -> Result<()> {
        let Some(existing) = self.standalones.get(&id) else {
            return Err(StoreError::NotFound(id));
        };
        let old = existing.window();
        let item = StandaloneItem::new(id, draft);
        self.slots.reschedule(id, old, item.window())?;
        self.standalones.insert(id, item);
        Ok(())
    }

    /// Delete a standalone item, releasing its slots and purging history.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn delete_standalone(&mut self, id: RecordId) -> Result<()> {
        if self.standalones.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        self.slots.release(id);
        self.history.remove(id);
        Ok(())
    }

    /// Fetch a standalone item by id, recording the access in history.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn standalone(&mut self, id: RecordId) -> Result<&StandaloneItem> {
        let item = self
            .standalones
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        self.history.record(id, Record::Standalone(item));
        self.standalones.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// All standalone items in id order.
    #[must_use]
    pub fn standalones(&self) -> Vec<&StandaloneItem> {
        self.standalones.values().collect()
    }

    /// Remove every standalone item, releasing slots and purging history.
    pub fn clear_standalones(&mut self) {
        for id in self.standalones.keys().copied().collect::<Vec<_>>() {
            self.slots.release(id);
            self.history.remove(id);
        }
        self.standalones.clear();
    }

    // -- group items --------------------------------------------------------

    /// Create a group. Groups start `New` and unscheduled; their aggregate
    /// only ever changes through their children.
    pub fn add_group(&mut self, draft: GroupDraft) -> RecordId {
        let id = self.ids.next();
        let group = GroupItem::new(id, draft);
        debug!(%id, name = %group.name, "group created");
        self.groups.insert(id, group);
        id
    }

    /// Replace a group's name and description. The derived status and
    /// schedule are not caller input and stay untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn update_group(&mut self, id: RecordId, draft: GroupDraft) -> Result<()> {
        let Some(group) = self.groups.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };
        group.name = draft.name;
        group.description = draft.description;
        Ok(())
    }

    /// Delete a group and cascade over its children: each child is removed,
    /// its slots released, and its history entry purged, before the group
    /// itself is dropped.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn delete_group(&mut self, id: RecordId) -> Result<()> {
        let Some(group) = self.groups.remove(&id) else {
            return Err(StoreError::NotFound(id));
        };
        for child_id in group.child_ids().iter().copied() {
            if self.children.remove(&child_id).is_some() {
                self.slots.release(child_id);
                self.history.remove(child_id);
            }
        }
        self.history.remove(id);
        Ok(())
    }

    /// Fetch a group by id, recording the access in history.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn group(&mut self, id: RecordId) -> Result<&GroupItem> {
        let group = self
            .groups
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        self.history.record(id, Record::Group(group));
        self.groups.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// All groups in id order.
    #[must_use]
    pub fn groups(&self) -> Vec<&GroupItem> {
        self.groups.values().collect()
    }

    /// The children of one group, in child-id order.
    ///
    /// # Errors
    ///
    /// `NotFound` when the group id is absent.
    pub fn group_children(&self, group_id: RecordId) -> Result<Vec<&ChildItem>> {
        let Some(group) = self.groups.get(&group_id) else {
            return Err(StoreError::NotFound(group_id));
        };
        Ok(group
            .child_ids()
            .iter()
            .filter_map(|id| self.children.get(id))
            .collect())
    }

    /// Remove every group together with every child.
    pub fn clear_groups(&mut self) {
        for id in self.groups.keys().copied().collect::<Vec<_>>() {
            self.history.remove(id);
        }
        for id in self.children.keys().copied().collect::<Vec<_>>() {
            self.slots.release(id);
            self.history.remove(id);
        }
        self.groups.clear();
        self.children.clear();
    }

    // -- child items --------------------------------------------------------

    /// Create a child item inside an existing group, then recompute the
    /// group's aggregate.
    ///
    /// # Errors
    ///
    /// `Validation` when the referenced group does not exist; scheduling
    /// rejections abort the create with nothing inserted.
    pub fn add_child(&mut self, draft: ChildDraft) -> Result<RecordId> {
        if !self.groups.contains_key(&draft.group_id) {
            return Err(StoreError::Validation(format!(
                "group {} does not exist",
                draft.group_id
            )));
        }
        let id = self.ids.next();
        let item = ChildItem::new(id, draft);
        self.slots.reserve(id, item.window())?;
        let group_id = item.group_id;
        debug!(%id, %group_id, name = %item.name, "child created");
        self.children.insert(id, item);
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.link_child(id);
        }
        self.recompute_group(group_id);
        Ok(id)
    }

    /// Replace the field values of a child item, keeping its identity and
    /// its group, then recompute the group's aggregate.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent; `Validation` when the draft names a
    /// different group; scheduling rejections leave the record unchanged.
    pub fn update_child(&mut self, id: RecordId, draft: ChildDraft) -> Result<()> {
        let Some(existing) = self.children.get(&id) else {
            return Err(StoreError::NotFound(id));
        };
        if draft.group_id != existing.group_id {
            return Err(StoreError::Validation(format!(
                "child {id} belongs to group {}; it cannot be moved to group {}",
                existing.group_id, draft.group_id
            )));
        }
        let old = existing.window();
        let item = ChildItem::new(id, draft);
        self.slots.reschedule(id, old, item.window())?;
        let group_id = item.group_id;
        self.children.insert(id, item);
        self.recompute_group(group_id);
        Ok(())
    }

    /// Delete a child item and recompute its group's aggregate.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn delete_child(&mut self, id: RecordId) -> Result<()> {
        let Some(child) = self.children.remove(&id) else {
            return Err(StoreError::NotFound(id));
        };
        self.slots.release(id);
        self.history.remove(id);
        if let Some(group) = self.groups.get_mut(&child.group_id) {
            group.unlink_child(id);
        }
        self.recompute_group(child.group_id);
        Ok(())
    }

    /// Fetch a child item by id, recording the access in history.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn child(&mut self, id: RecordId) -> Result<&ChildItem> {
        let item = self
            .children
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;
        self.history.record(id, Record::Child(item));
        self.children.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// All child items in id order.
    #[must_use]
    pub fn children(&self) -> Vec<&ChildItem> {
        self.children.values().collect()
    }

    /// Remove every child, resetting every group's aggregate.
    pub fn clear_children(&mut self) {
        for id in self.children.keys().copied().collect::<Vec<_>>() {
            self.slots.release(id);
            self.history.remove(id);
        }
        self.children.clear();
        let group_ids: Vec<RecordId> = self.groups.keys().copied().collect();
        for group_id in group_ids {
            if let Some(group) = self.groups.get_mut(&group_id) {
                group.clear_children();
            }
            self.recompute_group(group_id);
        }
    }

    // -- cross-kind views ---------------------------------------------------

    /// Schedulable records (standalone and child, never groups) that have a
    /// start time, ordered by start ascending, ties by id ascending.
    #[must_use]
    pub fn prioritized(&self) -> Vec<Record> {
        let mut out: Vec<Record> = self
            .standalones
            .values()
            .filter(|item| item.start.is_some())
            .cloned()
            .map(Record::Standalone)
            .chain(
                self.children
                    .values()
                    .filter(|item| item.start.is_some())
                    .cloned()
                    .map(Record::Child),
            )
            .collect();
        out.sort_by(|a, b| a.start().cmp(&b.start()).then(a.id().cmp(&b.id())));
        out
    }

    /// The access history, least recently fetched first.
    #[must_use]
    pub fn history(&self) -> Vec<Record> {
        self.history.snapshot()
    }

    /// Every record across all kinds, in id order. Consumed by persistence.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let mut out: Vec<Record> = self
            .standalones
            .values()
            .cloned()
            .map(Record::Standalone)
            .chain(self.groups.values().cloned().map(Record::Group))
            .chain(self.children.values().cloned().map(Record::Child))
            .collect();
        out.sort_by_key(Record::id);
        out
    }

    /// Test support only: drops every record, the slot table, the history,
    /// and the id counter in one step. Never part of normal operation.
    pub fn reset(&mut self) {
        self.standalones.clear();
        self.groups.clear();
        self.children.clear();
        self.slots = SlotTable::new();
        self.history.clear();
        self.ids.reset();
    }

    // -- load support -------------------------------------------------------

    /// Insert a record as loaded from disk, bypassing allocation and slot
    /// checks. [`Self::rebuild`] must run after the last insert.
    pub(crate) fn insert_loaded(&mut self, record: Record) {
        match record {
            Record::Standalone(item) => {
                self.standalones.insert(item.id, item);
            }
            Record::Group(item) => {
                self.groups.insert(item.id, item);
            }
            Record::Child(item) => {
                self.children.insert(item.id, item);
            }
        }
    }

    /// Relink children to their groups, recompute every group aggregate,
    /// re-claim every loaded window (trusted as-is, no overlap checks), and
    /// seed the allocator above the highest loaded id.
    pub(crate) fn rebuild(&mut self) {
        let child_links: Vec<(RecordId, RecordId)> = self
            .children
            .values()
            .map(|child| (child.group_id, child.id))
            .collect();
        for (group_id, child_id) in child_links {
            if let Some(group) = self.groups.get_mut(&group_id) {
                group.link_child(child_id);
            }
        }

        for group_id in self.groups.keys().copied().collect::<Vec<_>>() {
            self.recompute_group(group_id);
        }

        let windows: Vec<_> = self
            .standalones
            .values()
            .filter_map(|item| item.window().map(|w| (item.id, w)))
            .chain(
                self.children
                    .values()
                    .filter_map(|item| item.window().map(|w| (item.id, w))),
            )
            .collect();
        for (id, window) in windows {
            self.slots.restore(id, window);
        }

        let highest = self
            .standalones
            .keys()
            .chain(self.groups.keys())
            .chain(self.children.keys())
            .copied()
            .max();
        if let Some(id) = highest {
            self.ids.advance_past(id);
        }
    }

    fn recompute_group(&mut self, group_id: RecordId) {
        let aggregate = {
            let Some(group) = self.groups.get(&group_id) else {
                return;
            };
            let members: Vec<&ChildItem> = group
                .child_ids()
                .iter()
                .filter_map(|id| self.children.get(id))
                .collect();
            GroupAggregate::from_children(&members)
        };
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.apply(aggregate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::error::StoreError;
    use crate::model::{ChildDraft, GroupDraft, StandaloneDraft, Status, parse_start};

    fn standalone(name: &str, start: Option<&str>, minutes: Option<u32>) -> StandaloneDraft {
        StandaloneDraft {
            name: name.to_string(),
            start: start.map(|s| parse_start(s).expect("valid time")),
            duration_minutes: minutes,
            ..StandaloneDraft::default()
        }
    }

    fn child(group_id: crate::model::RecordId, name: &str) -> ChildDraft {
        ChildDraft {
            group_id,
            name: name.to_string(),
            description: String::new(),
            status: Status::New,
            start: None,
            duration_minutes: None,
        }
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut store = RecordStore::new();
        let a = store.add_standalone(standalone("a", None, None)).expect("add");
        let g = store.add_group(GroupDraft {
            name: "g".to_string(),
            description: String::new(),
        });
        let c = store.add_child(child(g, "c")).expect("add child");

        assert_ne!(a, g);
        assert_ne!(g, c);
        assert_ne!(a, c);
    }

    #[test]
    fn child_against_missing_group_is_validation() {
        let mut store = RecordStore::new();
        let err = store
            .add_child(child(crate::model::RecordId(99), "orphan"))
            .expect_err("must reject");
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.children().is_empty());
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let mut store = RecordStore::new();
        let err = store
            .update_standalone(crate::model::RecordId(5), standalone("x", None, None))
            .expect_err("must reject");
        assert_eq!(err, StoreError::NotFound(crate::model::RecordId(5)));
    }

    #[test]
    fn fetch_records_history_in_recency_order() {
        let mut store = RecordStore::new();
        let a = store.add_standalone(standalone("a", None, None)).expect("add");
        let b = store.add_standalone(standalone("b", None, None)).expect("add");

        let _ = store.standalone(a).expect("fetch a");
        let _ = store.standalone(b).expect("fetch b");
        let _ = store.standalone(a).expect("fetch a again");

        let ids: Vec<_> = store.history().iter().map(crate::model::Record::id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn rejected_update_keeps_the_old_schedule_claimed() {
        let mut store = RecordStore::new();
        let a = store
            .add_standalone(standalone("a", Some("01.03.2026 10:00"), Some(60)))
            .expect("add a");
        let b = store
            .add_standalone(standalone("b", Some("01.03.2026 12:00"), Some(60)))
            .expect("add b");

        // Moving A onto B fails and must leave A's old claim in place...
        let err = store
            .update_standalone(a, standalone("a", Some("01.03.2026 12:00"), Some(30)))
            .expect_err("overlap");
        assert_eq!(err, StoreError::SchedulingConflict { other: b });

        // ...so a third record still cannot take A's original window.
        let err = store
            .add_standalone(standalone("c", Some("01.03.2026 10:00"), Some(15)))
            .expect_err("still claimed");
        assert_eq!(err, StoreError::SchedulingConflict { other: a });
    }

    #[test]
    fn reset_clears_everything_including_the_id_counter() {
        let mut store = RecordStore::new();
        let first = store.add_standalone(standalone("a", None, None)).expect("add");
        store.reset();

        assert!(store.standalones().is_empty());
        assert!(store.history().is_empty());
        let again = store.add_standalone(standalone("b", None, None)).expect("add");
        assert_eq!(first, again);
    }
}
