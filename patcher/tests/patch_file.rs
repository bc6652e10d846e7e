use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use patcher::{exit_code, patch_file, resolve_target, Interrupt, NullProgress, PatchError, ScanOutcome, Signature};

const ZOOM_LIMITS: [u8; 14] = [
    0x00, 0x00, 0xF0, 0x44,
    0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
    0x00, 0x00, 0x96, 0x44,
];

const PATCHED_ZOOM_LIMITS: [u8; 14] = [
    0x00, 0x00, 0xF0, 0x55,
    0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
    0x00, 0x00, 0x96, 0x55,
];

fn backups_in(dir: &Path) -> Vec<OsString> {
    fs::read_dir(dir).unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name.to_string_lossy().starts_with("Terraria.exe_backup_"))
        .collect()
}

fn write_target(dir: &Path, contents: &[u8]) -> PathBuf {
    let path = dir.join("Terraria.exe");
    fs::write(&path, contents).unwrap();
    resolve_target(dir, Path::new("Terraria.exe")).unwrap()
}

#[test]
fn patches_zoom_limits_and_keeps_backup() {
    let dir = tempfile::tempdir().unwrap();
    let mut original = vec![0x11u8; 20];
    original[5..19].copy_from_slice(&ZOOM_LIMITS);
    let target = write_target(dir.path(), &original);

    let outcome = patch_file(
        &target,
        &Signature::zoom_limits().unwrap(),
        &mut NullProgress,
        &Interrupt::new(),
    ).unwrap();

    assert_eq!(outcome.exit_code(), exit_code::SUCCESS);
    match &outcome.scan {
        ScanOutcome::Patched(report) => {
            assert_eq!(report.offset, 5);
            assert_eq!(report.old, ZOOM_LIMITS);
            assert_eq!(report.new, PATCHED_ZOOM_LIMITS);
        }
        ScanOutcome::NotFound => panic!("zoom limits should have been found"),
    }

    let patched = fs::read(&target).unwrap();
    assert_eq!(&patched[..5], &original[..5]);
    assert_eq!(&patched[5..19], &PATCHED_ZOOM_LIMITS);
    assert_eq!(patched[19], original[19]);

    assert_eq!(backups_in(dir.path()), vec![outcome.backup.file_name().unwrap().to_owned()]);
    assert_eq!(fs::read(&outcome.backup).unwrap(), original);
}

#[test]
fn only_first_occurrence_is_patched() {
    let dir = tempfile::tempdir().unwrap();
    let mut original = Vec::new();
    original.extend_from_slice(&[0x90; 3]);
    original.extend_from_slice(&ZOOM_LIMITS);
    original.extend_from_slice(&[0x90; 8]);
    original.extend_from_slice(&ZOOM_LIMITS);
    let target = write_target(dir.path(), &original);

    let outcome = patch_file(
        &target,
        &Signature::zoom_limits().unwrap(),
        &mut NullProgress,
        &Interrupt::new(),
    ).unwrap();

    assert!(matches!(outcome.scan, ScanOutcome::Patched(ref report) if report.offset == 3));

    let patched = fs::read(&target).unwrap();
    assert_eq!(&patched[3..17], &PATCHED_ZOOM_LIMITS);
    assert_eq!(&patched[25..], &ZOOM_LIMITS);
}

#[test]
fn missing_pattern_leaves_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let original = (0..4096u32).map(|i| (i % 251) as u8).collect::<Vec<_>>();
    let target = write_target(dir.path(), &original);

    let outcome = patch_file(
        &target,
        &Signature::zoom_limits().unwrap(),
        &mut NullProgress,
        &Interrupt::new(),
    ).unwrap();

    assert_eq!(outcome.scan, ScanOutcome::NotFound);
    assert_eq!(outcome.exit_code(), exit_code::ERROR_INVALID_DATA);
    assert_eq!(fs::read(&target).unwrap(), original);
    assert_eq!(fs::read(&outcome.backup).unwrap(), original);
}

#[test]
fn missing_target_creates_no_backup() {
    let dir = tempfile::tempdir().unwrap();

    let error = resolve_target(dir.path(), Path::new("Terraria.exe")).unwrap_err();

    assert!(matches!(error, PatchError::TargetMissing(_)));
    assert_eq!(error.exit_code(), exit_code::ERROR_FILE_NOT_FOUND);
    assert_eq!(
        error.to_string(),
        "Could not find Terraria.exe in your current working directory!",
    );
    assert!(backups_in(dir.path()).is_empty());
}

#[test]
fn missing_target_is_rejected_by_patch_file() {
    let dir = tempfile::tempdir().unwrap();

    let error = patch_file(
        &dir.path().join("Terraria.exe"),
        &Signature::zoom_limits().unwrap(),
        &mut NullProgress,
        &Interrupt::new(),
    ).unwrap_err();

    assert_eq!(error.exit_code(), exit_code::ERROR_FILE_NOT_FOUND);
    assert!(backups_in(dir.path()).is_empty());
}

#[test]
fn directory_is_not_a_target() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("Terraria.exe")).unwrap();

    let error = resolve_target(dir.path(), Path::new("Terraria.exe")).unwrap_err();

    assert!(matches!(error, PatchError::NotAFile(_)));
    assert_eq!(error.exit_code(), exit_code::ERROR_FILE_NOT_FOUND);
}

#[test]
fn interrupt_before_start_aborts_without_backup() {
    let dir = tempfile::tempdir().unwrap();
    let mut original = vec![0u8; 6];
    original.extend_from_slice(&ZOOM_LIMITS);
    let target = write_target(dir.path(), &original);
    let interrupt = Interrupt::new();
    interrupt.trigger();

    let error = patch_file(
        &target,
        &Signature::zoom_limits().unwrap(),
        &mut NullProgress,
        &interrupt,
    ).unwrap_err();

    assert_eq!(error.exit_code(), exit_code::ERROR_PROCESS_ABORTED);
    assert_eq!(error.to_string(), "Failed patching target. Aborted!");
    assert_eq!(fs::read(&target).unwrap(), original);
    assert!(backups_in(dir.path()).is_empty());
}
