//! Save/load round trips through the flat-file adapter.

use slate_core::model::{ChildDraft, GroupDraft, StandaloneDraft, Status, parse_start};
use slate_core::{RecordStore, persist};

fn sample_store() -> RecordStore {
    let mut store = RecordStore::new();
    store
        .add_standalone(StandaloneDraft {
            name: "Kitchen tap".to_string(),
            description: "Fix the kitchen tap".to_string(),
            status: Status::InProgress,
            start: Some(parse_start("02.03.2026 10:00").expect("t")),
            duration_minutes: Some(120),
        })
        .expect("add standalone");

    let g = store.add_group(GroupDraft {
        name: "Release 1.0".to_string(),
        description: "Ship it".to_string(),
    });
    store
        .add_child(ChildDraft {
            group_id: g,
            name: "Write changelog".to_string(),
            description: String::new(),
            status: Status::Done,
            start: Some(parse_start("02.03.2026 13:00").expect("t")),
            duration_minutes: Some(45),
        })
        .expect("add child 1");
    store
        .add_child(ChildDraft {
            group_id: g,
            name: "Tag the build".to_string(),
            description: String::new(),
            status: Status::New,
            start: None,
            duration_minutes: Some(15),
        })
        .expect("add child 2");
    store
}

#[test]
fn reloaded_store_equals_the_original_record_for_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slate.csv");

    let original = sample_store();
    persist::save(&original, &path).expect("save");
    let reloaded = persist::load(&path).expect("load");

    assert_eq!(reloaded.records(), original.records());
}

#[test]
fn reloaded_group_re_derives_status_and_schedule() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slate.csv");

    let mut original = sample_store();
    persist::save(&original, &path).expect("save");
    let mut reloaded = persist::load(&path).expect("load");

    let group_id = original.groups()[0].id;
    let want = original.group(group_id).expect("group").clone();
    let got = reloaded.group(group_id).expect("group").clone();

    assert_eq!(got.status(), want.status());
    assert_eq!(got.start(), want.start());
    assert_eq!(got.end(), want.end());
    assert_eq!(got.duration_minutes(), want.duration_minutes());
    assert_eq!(got.child_ids(), want.child_ids());
}

#[test]
fn ids_continue_above_the_loaded_maximum() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slate.csv");

    let original = sample_store();
    let highest = original.records().last().expect("nonempty").id();
    persist::save(&original, &path).expect("save");

    let mut reloaded = persist::load(&path).expect("load");
    let next = reloaded
        .add_standalone(StandaloneDraft::default())
        .expect("add");
    assert!(next > highest);
}

#[test]
fn loaded_windows_block_future_overlaps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slate.csv");

    persist::save(&sample_store(), &path).expect("save");
    let mut reloaded = persist::load(&path).expect("load");

    // The standalone loaded from disk occupies 10:00-12:00.
    let err = reloaded
        .add_standalone(StandaloneDraft {
            name: "clash".to_string(),
            start: Some(parse_start("02.03.2026 10:30").expect("t")),
            duration_minutes: Some(30),
            ..StandaloneDraft::default()
        })
        .expect_err("overlap with loaded record");
    assert!(matches!(
        err,
        slate_core::StoreError::SchedulingConflict { .. }
    ));
}

#[test]
fn missing_file_loads_as_an_empty_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = persist::load(&dir.path().join("absent.csv")).expect("load");
    assert!(store.records().is_empty());
}

#[test]
fn malformed_file_reports_the_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slate.csv");
    std::fs::write(&path, format!("{}\ngarbage\n", persist::HEADER)).expect("write");

    let err = persist::load(&path).expect_err("must fail");
    assert!(err.to_string().contains("line 2"));
}
