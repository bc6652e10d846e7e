use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::BackupError;

/// Builds `<name>_backup_<YYYYMMDD_HHMMSS>` next to `path`.
pub fn backup_path(path: &Path, timestamp: OffsetDateTime) -> Result<PathBuf, BackupError> {
    let name = path.file_name()
        .ok_or_else(|| BackupError::NoFileName(path.to_path_buf()))?;

    let stamp = timestamp
        .format(format_description!("[year][month][day]_[hour][minute][second]"))?;

    let mut backup_name = name.to_os_string();
    backup_name.push("_backup_");
    backup_name.push(stamp);

    Ok(path.with_file_name(backup_name))
}

/// Copies `path` to a timestamped sibling and syncs it to disk. Never
/// overwrites an existing file.
pub fn create_backup(path: &Path) -> Result<PathBuf, BackupError> {
    let backup = backup_path(path, now())?;
    copy_to_new_file(path, &backup)?;

    info!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

fn copy_to_new_file(source: &Path, destination: &Path) -> Result<(), BackupError> {
    let read_error = |source_error: io::Error| BackupError::Read {
        path: source.to_path_buf(),
        source: source_error,
    };
    let write_error = |source_error: io::Error| BackupError::Write {
        path: destination.to_path_buf(),
        source: source_error,
    };

    let mut input = fs::File::open(source).map_err(read_error)?;
    let permissions = input.metadata().map_err(read_error)?.permissions();

    let mut output = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => BackupError::Exists(destination.to_path_buf()),
            _ => write_error(e),
        })?;

    // io::copy can't tell which side failed, so drive the loop ourselves.
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let read = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        };
        output.write_all(&buffer[..read]).map_err(write_error)?;
    }

    output.sync_all().map_err(write_error)?;
    output.set_permissions(permissions).map_err(write_error)?;

    Ok(())
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| {
        warn!("Could not determine local time zone, using UTC for the backup name");
        OffsetDateTime::now_utc()
    })
}
