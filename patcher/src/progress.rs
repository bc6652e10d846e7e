use std::io::{self, Write};

/// Receives scan progress. Purely advisory, the scan never looks at what an
/// implementation does with it.
pub trait Progress {
    fn start(&mut self, total: u64);
    fn advance(&mut self, delta: u64);
    fn finish(&mut self);
}

/// Used when there is no terminal to draw on.
#[derive(Debug, Default)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn start(&mut self, _total: u64) {}
    fn advance(&mut self, _delta: u64) {}
    fn finish(&mut self) {}
}

const BAR_WIDTH: u64 = 40;

/// Single line progress bar, redrawn whenever the percentage changes.
#[derive(Debug)]
pub struct ConsoleProgress<W: Write = io::Stderr> {
    out: W,
    total: u64,
    position: u64,
    drawn_percent: Option<u64>,
    active: bool,
}

impl ConsoleProgress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            total: 0,
            position: 0,
            drawn_percent: None,
            active: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn percent(&self) -> u64 {
        match self.total {
            0 => 100,
            total => self.position.min(total) * 100 / total,
        }
    }

    fn draw(&mut self) {
        let percent = self.percent();
        if self.drawn_percent == Some(percent) {
            return;
        }
        self.drawn_percent = Some(percent);

        let filled = percent * BAR_WIDTH / 100;
        let bar = format!(
            "\r[{}{}] {:>3}% ({}/{})",
            "#".repeat(filled as usize),
            "-".repeat((BAR_WIDTH - filled) as usize),
            percent,
            self.position.min(self.total),
            self.total,
        );

        // A broken terminal shouldn't take the patch down with it.
        let _ = self.out.write_all(bar.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn start(&mut self, total: u64) {
        self.total = total;
        self.position = 0;
        self.drawn_percent = None;
        self.active = true;
        self.draw();
    }

    fn advance(&mut self, delta: u64) {
        if !self.active {
            return;
        }
        self.position = self.position.saturating_add(delta);
        self.draw();
    }

    fn finish(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
    }
}
