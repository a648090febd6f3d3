//! Cooperative cancellation and advisory progress reporting
//!
//! Every unit of work in the scanner and the analyzer polls a
//! [`ProgressMonitor`] first. A tripped monitor makes the caller return
//! [`Error::Cancelled`], which unwinds to the top-level caller.

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cancellation token plus progress sink
pub trait ProgressMonitor {
    /// Non-blocking poll: should the current operation stop?
    fn is_cancelled(&self) -> bool;

    /// Record `units` of advisory work as done
    fn worked(&self, _units: u64) {}

    /// Describe what is being processed right now
    fn sub_task(&self, message: &str) {
        debug!("{}", message);
    }
}

/// Return `Err(Error::Cancelled)` if the monitor asks us to stop
pub fn check_cancel(monitor: &dyn ProgressMonitor) -> Result<()> {
    if monitor.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// A cancellation handle that can be shared across threads.
///
/// Cloning shares the same flag, so a Ctrl-C handler can hold one clone
/// while the scan polls another.
#[derive(Debug, Clone, Default)]
pub struct ScanCancellation {
    flag: Arc<AtomicBool>,
}

impl ScanCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ProgressMonitor for ScanCancellation {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Progress bar backed monitor used by the CLI
pub struct BarMonitor {
    bar: ProgressBar,
    cancellation: ScanCancellation,
}

impl BarMonitor {
    /// Total work budget, split between scanning and searching
    pub const TOTAL_WORK: u64 = 100;

    pub fn new(cancellation: ScanCancellation) -> Self {
        let bar = ProgressBar::new(Self::TOTAL_WORK);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar, cancellation }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressMonitor for BarMonitor {
    fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    fn worked(&self, units: u64) {
        self.bar.inc(units);
    }

    fn sub_task(&self, message: &str) {
        debug!("{}", message);
        self.bar.set_message(message.to_string());
    }
}

/// Converts a stream of "one more directory" calls into a bounded number
/// of work units.
///
/// One unit is reported every `calls_per_unit` calls until `max_units`
/// have been reported, so the scan never claims more than its share.
pub struct ScanProgress<'a> {
    monitor: &'a dyn ProgressMonitor,
    max_units: u64,
    calls_per_unit: u64,
    reported: u64,
    calls: u64,
}

impl<'a> ScanProgress<'a> {
    pub fn new(monitor: &'a dyn ProgressMonitor, max_units: u64, calls_per_unit: u64) -> Self {
        Self {
            monitor,
            max_units,
            calls_per_unit: calls_per_unit.max(1),
            reported: 0,
            calls: 0,
        }
    }

    pub fn tick(&mut self) {
        self.calls += 1;
        if self.reported < self.max_units && self.calls % self.calls_per_unit == 0 {
            self.monitor.worked(1);
            self.reported += 1;
        }
    }

    pub fn reported(&self) -> u64 {
        self.reported
    }
}

/// Progress helper for one analyzer pass: one unit per `effort_unit` items
pub struct PassProgress<'a> {
    monitor: &'a dyn ProgressMonitor,
    label: &'static str,
    total: usize,
    position: usize,
    effort_unit: usize,
}

impl<'a> PassProgress<'a> {
    pub fn new(monitor: &'a dyn ProgressMonitor, label: &'static str, total: usize, budget: usize) -> Self {
        let budget = budget.max(1);
        Self {
            monitor,
            label,
            total,
            position: 0,
            effort_unit: total.div_ceil(budget).max(1),
        }
    }

    /// Poll for cancellation and advance by one item
    pub fn step(&mut self) -> Result<()> {
        check_cancel(self.monitor)?;
        if self.position % self.effort_unit == 0 {
            self.monitor.worked(1);
        }
        self.position += 1;
        if self.position == 1 || self.position % 10 == 0 || self.position == self.total {
            self.monitor.sub_task(&format!(
                "Search {:>4}/{:<4} {}",
                self.position, self.total, self.label
            ));
        }
        Ok(())
    }
}
