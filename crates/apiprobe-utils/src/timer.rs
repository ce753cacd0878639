//! Named-stage stopwatch
//!
//! [`StageTimer`] records one duration per `start_counting`/`stop_counting`
//! pair and keeps every sample, so repeated pipeline runs in the same process
//! accumulate a history per [`TestStep`]. CSV exports only append samples
//! recorded since the previous export. A process-wide instance is available
//! through [`StageTimer::global`]; tests construct their own.

use anyhow::{Context, Result};
use camino::Utf8Path;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::types::TestStep;

static GLOBAL_TIMER: Lazy<Arc<StageTimer>> = Lazy::new(|| Arc::new(StageTimer::new()));

#[derive(Debug, Default)]
struct TimerState {
    running: HashMap<TestStep, Instant>,
    samples: BTreeMap<TestStep, Vec<Duration>>,
    /// Per-step count of samples already written by `export_csv`
    exported: HashMap<TestStep, usize>,
}

/// Stopwatch keyed by [`TestStep`]
#[derive(Debug, Default)]
pub struct StageTimer {
    state: Mutex<TimerState>,
}

impl StageTimer {
    /// Create an empty timer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide timer shared by every orchestrator that does not get its own
    #[must_use]
    pub fn global() -> Arc<StageTimer> {
        Arc::clone(&GLOBAL_TIMER)
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start (or restart) counting for `step`
    pub fn start_counting(&self, step: TestStep) {
        self.lock().running.insert(step, Instant::now());
    }

    /// Stop counting for `step` and record the sample
    ///
    /// Returns `None` when `step` was never started.
    pub fn stop_counting(&self, step: TestStep) -> Option<Duration> {
        let mut state = self.lock();
        let Some(started) = state.running.remove(&step) else {
            warn!(step = %step, "stop_counting called for a step that is not running");
            return None;
        };
        let elapsed = started.elapsed();
        state.samples.entry(step).or_default().push(elapsed);
        Some(elapsed)
    }

    /// Elapsed time for `step`
    ///
    /// While the step is running this is the time since it started; otherwise it
    /// is the most recent recorded sample.
    #[must_use]
    pub fn elapsed(&self, step: TestStep) -> Option<Duration> {
        let state = self.lock();
        if let Some(started) = state.running.get(&step) {
            return Some(started.elapsed());
        }
        state.samples.get(&step).and_then(|s| s.last().copied())
    }

    /// Whether `step` is currently being counted
    #[must_use]
    pub fn is_running(&self, step: TestStep) -> bool {
        self.lock().running.contains_key(&step)
    }

    /// Every recorded sample for `step`, oldest first
    #[must_use]
    pub fn samples(&self, step: TestStep) -> Vec<Duration> {
        self.lock().samples.get(&step).cloned().unwrap_or_default()
    }

    /// Snapshot of all recorded samples
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<TestStep, Vec<Duration>> {
        self.lock().samples.clone()
    }

    /// Drop all samples and running steps
    pub fn reset(&self) {
        let mut state = self.lock();
        state.running.clear();
        state.samples.clear();
        state.exported.clear();
    }

    /// Append samples not yet exported as `label,step,run,duration_ms`
    ///
    /// `run` is the sample's index in the step's full history. The header is
    /// written only when the file is created. Returns the number of rows written.
    ///
    /// # Errors
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn export_csv(&self, path: &Utf8Path, label: &str) -> Result<usize> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {parent}"))?;
        }
        let write_header = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open timing CSV: {path}"))?;

        let mut state = self.lock();
        let mut out = String::new();
        if write_header {
            out.push_str("label,step,run,duration_ms\n");
        }
        let mut rows = 0;
        let mut cursors = Vec::new();
        for (step, samples) in &state.samples {
            let from = state.exported.get(step).copied().unwrap_or(0);
            for (run, duration) in samples.iter().enumerate().skip(from) {
                out.push_str(&format!(
                    "{label},{step},{run},{}\n",
                    duration.as_millis()
                ));
                rows += 1;
            }
            cursors.push((*step, samples.len()));
        }
        file.write_all(out.as_bytes())
            .with_context(|| format!("Failed to append timing CSV: {path}"))?;
        state.exported.extend(cursors);
        Ok(rows)
    }
}
