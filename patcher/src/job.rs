use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::backup::create_backup;
use crate::exit_code;
use crate::progress::Progress;
use crate::scan::{scan_and_patch, Interrupt, ScanOutcome};
use crate::signature::Signature;
use crate::{PatchError, ScanError};

#[derive(Debug)]
pub struct PatchOutcome {
    pub backup: PathBuf,
    pub scan: ScanOutcome,
}

impl PatchOutcome {
    pub fn exit_code(&self) -> i32 {
        match self.scan {
            ScanOutcome::Patched(_) => exit_code::SUCCESS,
            ScanOutcome::NotFound => exit_code::ERROR_INVALID_DATA,
        }
    }
}

/// Resolves `name` against `dir`. The result has to exist and be a regular
/// file.
pub fn resolve_target(dir: &Path, name: &Path) -> Result<PathBuf, PatchError> {
    let path = dir.join(name).canonicalize()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PatchError::TargetMissing(name.to_path_buf()),
            _ => PatchError::Io(e),
        })?;

    debug!("Resolved {} to {}", name.display(), path.display());
    ensure_regular_file(&path)?;
    Ok(path)
}

/// Backs up `target` and then patches the first match of `signature` in it.
/// Nothing is written to `target` unless the backup succeeded.
pub fn patch_file(
    target: &Path,
    signature: &Signature,
    progress: &mut dyn Progress,
    interrupt: &Interrupt,
) -> Result<PatchOutcome, PatchError> {
    ensure_regular_file(target)?;

    if interrupt.is_triggered() {
        return Err(ScanError::Interrupted.into());
    }

    let backup = create_backup(target)?;

    let scan = {
        let mut file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(target)?;

        scan_and_patch(&mut file, signature, progress, interrupt)?
    };

    Ok(PatchOutcome { backup, scan })
}

fn ensure_regular_file(path: &Path) -> Result<(), PatchError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PatchError::TargetMissing(path.to_path_buf()),
        _ => PatchError::Io(e),
    })?;

    if !metadata.is_file() {
        return Err(PatchError::NotAFile(path.to_path_buf()));
    }

    Ok(())
}
