use std::fs;
use std::path::PathBuf;

use homesweep_ops::{DisposalMode, DisposalResult, dispose_blocking, start_disposal};
use tempfile::TempDir;

fn populate(root: &std::path::Path) -> Vec<PathBuf> {
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(root.join("hollow")).unwrap();
    fs::write(root.join("docs/a.log"), "0123456789").unwrap();
    fs::write(root.join("b.tmp"), "abc").unwrap();
    vec![
        root.join("docs/a.log"),
        root.join("b.tmp"),
        root.join("hollow"),
        root.join("already-gone"),
    ]
}

#[test]
fn test_delete_blocking() {
    let temp = TempDir::new().unwrap();
    let paths = populate(temp.path());

    let complete = dispose_blocking(&paths, &DisposalMode::Delete);

    assert!(complete.is_success());
    assert_eq!(complete.succeeded, 4);
    assert_eq!(complete.bytes_processed, 13);
    assert!(paths.iter().all(|p| !p.exists()));
    assert!(temp.path().join("docs").exists());
}

#[test]
fn test_backup_preserves_layout_and_renames_on_conflict() {
    let home = TempDir::new().unwrap();
    let backup = TempDir::new().unwrap();
    let paths = populate(home.path());
    fs::create_dir_all(backup.path().join("docs")).unwrap();
    fs::write(backup.path().join("docs/a.log"), "earlier backup").unwrap();

    let mode = DisposalMode::backup(backup.path(), home.path());
    let complete = dispose_blocking(&paths, &mode);

    assert!(complete.is_success());
    assert!(!home.path().join("docs/a.log").exists());
    assert_eq!(
        fs::read_to_string(backup.path().join("docs/a.log")).unwrap(),
        "earlier backup"
    );
    assert_eq!(fs::read_to_string(backup.path().join("b.tmp")).unwrap(), "abc");
    assert!(backup.path().join("hollow").is_dir());

    let renamed: Vec<String> = fs::read_dir(backup.path().join("docs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name != "a.log")
        .collect();
    assert_eq!(renamed.len(), 1);
    assert!(renamed[0].starts_with("a_") && renamed[0].ends_with(".log"));
}

#[test]
fn test_failures_are_counted() {
    let temp = TempDir::new().unwrap();
    let full = temp.path().join("full");
    fs::create_dir(&full).unwrap();
    fs::write(full.join("x"), "x").unwrap();

    let complete = dispose_blocking(&[full.clone()], &DisposalMode::Delete);

    assert_eq!(complete.failed, 1);
    assert_eq!(complete.errors[0].path, full);
}

#[tokio::test]
async fn test_start_disposal_reports_each_item() {
    let temp = TempDir::new().unwrap();
    let paths = populate(temp.path());
    let total = paths.len();

    let mut rx = start_disposal(paths, DisposalMode::Delete);
    let mut updates = 0;
    let mut complete = None;
    while let Some(message) = rx.recv().await {
        match message {
            DisposalResult::Progress(progress) => {
                updates += 1;
                assert_eq!(progress.items_completed, updates);
                assert_eq!(progress.items_total, total);
            }
            DisposalResult::Complete(done) => complete = Some(done),
        }
    }

    assert_eq!(updates, total);
    let complete = complete.unwrap();
    assert_eq!(complete.succeeded, total);
    assert_eq!(complete.bytes_processed, 13);
}

#[tokio::test]
async fn test_start_disposal_empty_list() {
    let mut rx = start_disposal(Vec::new(), DisposalMode::Delete);
    match rx.recv().await {
        Some(DisposalResult::Complete(done)) => assert_eq!(done.succeeded, 0),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn test_non_empty_dir_is_never_moved() {
    let home = TempDir::new().unwrap();
    let backup = TempDir::new().unwrap();
    let project = home.path().join("project");
    fs::create_dir_all(project.join(".git")).unwrap();
    fs::write(project.join(".git/HEAD"), "ref: refs/heads/main").unwrap();

    let modes = [
        DisposalMode::backup(backup.path(), home.path()),
        DisposalMode::Trash,
    ];
    for mode in &modes {
        let complete = dispose_blocking(&[project.clone()], mode);

        assert_eq!(complete.failed, 1);
        assert_eq!(complete.succeeded, 0);
        assert_eq!(complete.errors[0].path, project);
        assert_eq!(
            fs::read_to_string(project.join(".git/HEAD")).unwrap(),
            "ref: refs/heads/main"
        );
    }
    assert!(!backup.path().join("project").exists());
}
