// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{StateFolder, StoreError, WriteDurability};
use crate::client::{ExpansionStore, TreeExpansionState};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("cursus-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn tmp() -> TempDir {
    TempDir::new("state")
}

fn opened(ids: &[&str]) -> TreeExpansionState {
    TreeExpansionState { opened: ids.iter().map(|id| (*id).to_owned()).collect() }
}

#[rstest]
fn missing_file_means_no_state(tmp: TempDir) {
    let folder = StateFolder::open(tmp.path().join("never-created")).unwrap();
    assert!(folder.load("/tree/1").is_none());
}

#[rstest]
#[case(WriteDurability::BestEffort)]
#[case(WriteDurability::Durable)]
fn saved_state_survives_reopen(tmp: TempDir, #[case] durability: WriteDurability) {
    let mut folder = StateFolder::new(tmp.path()).with_durability(durability);
    folder.save("/tree/1", &opened(&["n0", "n0-101"])).unwrap();
    folder.save("/tree/7", &TreeExpansionState::default()).unwrap();

    let reopened = StateFolder::open(tmp.path()).unwrap();
    assert_eq!(reopened.load("/tree/1"), Some(opened(&["n0", "n0-101"])));
    assert_eq!(reopened.load("/tree/7"), Some(TreeExpansionState::default()));
    assert!(reopened.load("/tree/2").is_none());
}

#[rstest]
fn saving_leaves_no_temp_files_behind(tmp: TempDir) {
    let mut folder = StateFolder::new(tmp.path());
    for _ in 0..3 {
        folder.save("/tree/1", &opened(&["n0"])).unwrap();
    }
    let names = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["cursus-tree-state.json".to_owned()]);
}

#[rstest]
fn corrupt_file_is_reported(tmp: TempDir) {
    std::fs::write(tmp.path().join("cursus-tree-state.json"), "{not json").unwrap();
    let err = StateFolder::open(tmp.path()).unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }), "{err}");
}

#[rstest]
fn unknown_version_is_refused(tmp: TempDir) {
    std::fs::write(
        tmp.path().join("cursus-tree-state.json"),
        r#"{"version": 9, "trees": {}}"#,
    )
    .unwrap();
    let err = StateFolder::open(tmp.path()).unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedVersion { version: 9, .. }));
}

#[cfg(unix)]
#[rstest]
fn refuses_to_write_through_a_symlink(tmp: TempDir) {
    let target = tmp.path().join("elsewhere.json");
    std::fs::write(&target, "{}").unwrap();
    std::os::unix::fs::symlink(&target, tmp.path().join("cursus-tree-state.json")).unwrap();

    let mut folder = StateFolder::new(tmp.path());
    let err = folder.save("/tree/1", &opened(&["n0"])).unwrap_err();
    assert!(matches!(err, StoreError::SymlinkRefused { .. }));
}
