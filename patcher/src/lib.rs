use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod backup;
pub mod job;
pub mod pattern;
pub mod progress;
pub mod scan;
pub mod signature;

pub use job::{patch_file, resolve_target, PatchOutcome};
pub use pattern::{Pattern, PatternByte};
pub use progress::{ConsoleProgress, NullProgress, Progress};
pub use scan::{scan_and_patch, Interrupt, PatchReport, ScanOutcome};
pub use signature::{ReplacementMask, Signature};

/// Process exit codes. Values mirror WinError.h so they read familiar to
/// players running the patcher on Windows.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    /// ERROR_FILE_NOT_FOUND
    pub const ERROR_FILE_NOT_FOUND: i32 = 2;
    /// ERROR_INVALID_DATA
    pub const ERROR_INVALID_DATA: i32 = 13;
    /// ERROR_PROCESS_ABORTED
    pub const ERROR_PROCESS_ABORTED: i32 = 1067;
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Could not find {} in your current working directory!", .0.display())]
    TargetMissing(PathBuf),
    #[error("{} is not a regular file.", .0.display())]
    NotAFile(PathBuf),
    #[error("Could not create backup. {0}")]
    Backup(#[from] BackupError),
    #[error("Failed patching target. {0}")]
    Scan(#[from] ScanError),
    #[error("Invalid signature. {0}")]
    Signature(#[from] SignatureError),
    #[error("Could not inspect target. {0}")]
    Io(#[from] io::Error),
}

impl PatchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PatchError::TargetMissing(_) | PatchError::NotAFile(_) => exit_code::ERROR_FILE_NOT_FOUND,
            PatchError::Scan(ScanError::Interrupted) => exit_code::ERROR_PROCESS_ABORTED,
            _ => exit_code::FAILURE,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed reading {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Backup {} already exists.", .0.display())]
    Exists(PathBuf),
    #[error("Target path {} has no file name.", .0.display())]
    NoFileName(PathBuf),
    #[error("Failed formatting backup timestamp. {0}")]
    Timestamp(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Aborted!")]
    Interrupted,
    #[error("I/O error while scanning. {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Pattern is empty.")]
    Empty,
    #[error("Pattern has {pattern} bytes but the replacement mask has {mask}.")]
    LengthMismatch { pattern: usize, mask: usize },
    #[error("Invalid byte {token:?} at position {position}.")]
    InvalidByte { position: usize, token: String },
    #[error("Wildcard at position {0} is not allowed in a replacement mask.")]
    WildcardInMask(usize),
}
