// ============================================================
// Layer 6 — Telemetry Event Stream
// ============================================================
// Every training batch produces a StepSummary. It is written
// to events.jsonl in the run directory as one JSON object per
// line, so the stream can be tailed or loaded into a notebook
// and plotted against global_step.
//
// Like the .pref log, the stream starts empty on every training
// run of a trial, so each global_step appears at most once.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::traits::StepSummary;

pub struct TelemetryWriter {
    path:   PathBuf,
    writer: BufWriter<File>,
}

impl TelemetryWriter {
    /// Start a fresh stream, truncating one left by an earlier run.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("Cannot create event stream '{}'", path.display()))?;
        Ok(Self { path, writer: BufWriter::new(file) })
    }

    pub fn add_summary(&mut self, summary: &StepSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)
            .with_context(|| format!("Cannot encode summary for '{}'", self.path.display()))?;
        writeln!(self.writer)
            .with_context(|| format!("Cannot write to '{}'", self.path.display()))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Cannot flush '{}'", self.path.display()))
    }
}
