use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::progress::Progress;
use crate::signature::Signature;
use crate::ScanError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Set from the interrupt handler, polled by the scan.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub offset: u64,
    pub old: Vec<u8>,
    pub new: Vec<u8>,
}

impl fmt::Display for PatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found at position {:#x}:", self.offset)?;
        writeln!(f, "Old value: {}", format_bytes(&self.old))?;
        write!(f, "New value: {}", format_bytes(&self.new))
    }
}

fn format_bytes(bytes: &[u8]) -> String {
    bytes.iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Patched(PatchReport),
    NotFound,
}

/// Walks every offset of `file` front to back and patches the first window
/// matching `signature`. At most one write happens.
pub fn scan_and_patch<F: Read + Write + Seek>(
    file: &mut F,
    signature: &Signature,
    progress: &mut dyn Progress,
    interrupt: &Interrupt,
) -> Result<ScanOutcome, ScanError> {
    let result = scan(file, signature, progress, interrupt);
    progress.finish();
    result
}

fn scan<F: Read + Write + Seek>(
    file: &mut F,
    signature: &Signature,
    progress: &mut dyn Progress,
    interrupt: &Interrupt,
) -> Result<ScanOutcome, ScanError> {
    let window_len = signature.len();
    let file_len = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;

    let window_count = (file_len + 1).saturating_sub(window_len as u64);
    info!("Scanning {file_len} bytes for {}", signature.pattern());
    progress.start(window_count);

    // `buffer[0]` sits at file offset `base`. The last `window_len - 1` bytes
    // are carried over between chunks so windows spanning a boundary get
    // tested exactly once.
    let mut buffer = Vec::with_capacity(CHUNK_SIZE + window_len);
    let mut base = 0u64;

    loop {
        if interrupt.is_triggered() {
            return Err(ScanError::Interrupted);
        }

        let read = (&mut *file)
            .take(CHUNK_SIZE as u64)
            .read_to_end(&mut buffer)?;
        if read == 0 {
            break;
        }
        debug!("Read {read} bytes at {:#x}", base + (buffer.len() - read) as u64);

        if buffer.len() < window_len {
            continue;
        }

        let tested = buffer.len() - window_len + 1;
        if let Some(index) = (0..tested).find(|&i| signature.matches(&buffer[i..i + window_len])) {
            progress.advance(index as u64 + 1);

            let offset = base + index as u64;
            let old = buffer[index..index + window_len].to_vec();
            let new = signature.replacement(&old);

            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&new)?;
            file.flush()?;

            info!("Patched {window_len} bytes at {offset:#x}");
            return Ok(ScanOutcome::Patched(PatchReport { offset, old, new }));
        }

        progress.advance(tested as u64);
        buffer.drain(..tested);
        base += tested as u64;
    }

    Ok(ScanOutcome::NotFound)
}
