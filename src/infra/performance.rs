// ============================================================
// Layer 6 — Performance Log
// ============================================================
// Writes one line per log event to the trial's .pref file.
//
// The file is opened once, when the run starts, and owned by
// the training orchestrator until the run ends. Closing is
// tied to Drop, so the handle is released on every exit path,
// including an error propagating out of the epoch loop.
//
// A LineWriter flushes after every newline, so a crash never
// loses a line that was already reported as written.
//
// Example file contents:
//   [Trn] Ep:0 It:100 GS:100 LogLoss:0.512301 RegLoss:0.004120 AUC:0.7412
//   [Tst] Ep:0 GS:157 LogLoss:0.498812 AUC:0.7633

use anyhow::{Context, Result};
use std::{
    fs::{File, OpenOptions},
    io::{LineWriter, Write},
    path::{Path, PathBuf},
};

pub struct PerformanceLog {
    path:   PathBuf,
    writer: LineWriter<File>,
}

impl PerformanceLog {
    /// Start a fresh log for this run, truncating any previous one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("Cannot create performance log '{}'", path.display()))?;
        tracing::debug!("Opened performance log '{}'", path.display());
        Ok(Self { path, writer: LineWriter::new(file) })
    }

    /// Reopen an existing log and add lines after the current contents.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot open performance log '{}'", path.display()))?;
        Ok(Self { path, writer: LineWriter::new(file) })
    }

    pub fn write_line(&mut self, msg: &str) -> Result<()> {
        writeln!(self.writer, "{msg}")
            .with_context(|| format!("Cannot write to '{}'", self.path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lines_are_visible_before_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("d.1.pref");
        let mut log = PerformanceLog::create(&path).unwrap();
        log.write_line("[Trn] a").unwrap();
        log.write_line("[Tst] b").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[Trn] a\n[Tst] b\n");
    }

    #[test]
    fn test_create_truncates_and_append_keeps() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("d.1.pref");
        fs::write(&path, "old\n").unwrap();

        PerformanceLog::create(&path).unwrap().write_line("new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");

        PerformanceLog::append(&path).unwrap().write_line("more").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\nmore\n");
    }
}
