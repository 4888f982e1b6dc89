//! Summaries of scheduler runs and prunes.
//!
//! A line starting with `Error:` flags a partial failure; the terminal
//! renderer highlights it.

use std::fmt;

use uuid::Uuid;

use crate::scheduler::{PruneReport, TickReport};

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dispatched {} backups ({} not due, {} busy)",
            self.dispatched.len(),
            self.skipped,
            self.busy
        )?;
        if !self.dispatched.is_empty() {
            writeln!(f)?;
            for plan_id in &self.dispatched {
                writeln!(f, "- DR plan {plan_id}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pruned {} expired backups across {} plans ({} failures)",
            self.pruned, self.plans_checked, self.failures
        )?;
        if self.failures > 0 {
            writeln!(
                f,
                "Error: {} plans could not be pruned, see the log for details",
                self.failures
            )?;
        }
        Ok(())
    }
}

/// Outcome of pruning a single plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneResult {
    pub plan_id: Uuid,
    pub pruned: usize,
}

impl PruneResult {
    pub fn new(plan_id: Uuid, pruned: usize) -> Self {
        Self { plan_id, pruned }
    }
}

impl fmt::Display for PruneResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Pruned {} expired backups of DR plan {}",
            self.pruned, self.plan_id
        )
    }
}
