//! Result aggregation

use crate::error::TaskError;
use crate::types::{AggregatedResult, ExtractionOutcome};
use tracing::warn;
use uuid::Uuid;

/// Reason recorded for slots that were never collected
pub const NOT_STARTED: &str = "not started";

/// Collects task outcomes into position-ordered slots
///
/// One aggregator per run. Every submitted task owns exactly one slot;
/// slots still empty at `finalize` are filled with a `Cancelled` error.
#[derive(Debug)]
pub struct ResultAggregator {
    run_id: Uuid,
    document_length: usize,
    aims: Vec<String>,
    slots: Vec<Option<ExtractionOutcome>>,
}

impl ResultAggregator {
    /// Create an aggregator with one empty slot per aim
    pub fn new(run_id: Uuid, document_length: usize, aims: Vec<String>) -> Self {
        let slots = aims.iter().map(|_| None).collect();
        Self {
            run_id,
            document_length,
            aims,
            slots,
        }
    }

    /// Record a task outcome in its slot
    ///
    /// Outcomes for unknown positions and second outcomes for a filled slot
    /// are ignored.
    pub fn collect(&mut self, outcome: ExtractionOutcome) {
        let Some(slot) = outcome
            .position
            .checked_sub(1)
            .and_then(|idx| self.slots.get_mut(idx))
        else {
            warn!(position = outcome.position, "Ignoring outcome for unknown task position");
            return;
        };

        if slot.is_some() {
            warn!(position = outcome.position, "Ignoring duplicate outcome");
            return;
        }

        *slot = Some(outcome);
    }

    /// Number of filled slots
    pub fn collected(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Close the aggregation
    pub fn finalize(self) -> AggregatedResult {
        let tasks_processed = self.collected();

        let outcomes = self
            .slots
            .into_iter()
            .zip(self.aims)
            .enumerate()
            .map(|(idx, (slot, aim))| {
                slot.unwrap_or_else(|| ExtractionOutcome {
                    position: idx + 1,
                    aim,
                    result: Err(TaskError::Cancelled(NOT_STARTED.to_string())),
                    attempts: 0,
                })
            })
            .collect();

        AggregatedResult {
            run_id: self.run_id,
            document_length: self.document_length,
            tasks_processed,
            outcomes,
        }
    }
}
