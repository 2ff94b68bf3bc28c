//! Run lifecycle.

use std::fmt;
use std::time::Instant;

use resistaid_common::{ResistaidError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStage {
    Received,
    Retrieving,
    Designing,
    Profiling,
    Scoring,
    Aggregating,
    Done,
    Failed,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Retrieving => "retrieving",
            Self::Designing => "designing",
            Self::Profiling => "profiling",
            Self::Scoring => "scoring",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Retrieving),
            Self::Retrieving => Some(Self::Designing),
            Self::Designing => Some(Self::Profiling),
            Self::Profiling => Some(Self::Scoring),
            Self::Scoring => Some(Self::Aggregating),
            Self::Aggregating => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Stages advance one step at a time; any non-terminal stage may fail.
    pub fn can_transition_to(&self, to: RunStage) -> bool {
        if to == Self::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage tracker for one run.
#[derive(Debug)]
pub struct RunState {
    run_id: String,
    mutation_id: String,
    stage: RunStage,
    history: Vec<RunStage>,
    started: Instant,
}

impl RunState {
    pub fn new(run_id: impl Into<String>, mutation_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            mutation_id: mutation_id.into(),
            stage: RunStage::Received,
            history: vec![RunStage::Received],
            started: Instant::now(),
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn history(&self) -> &[RunStage] {
        &self.history
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn advance(&mut self, to: RunStage) -> Result<()> {
        if !self.stage.can_transition_to(to) {
            return Err(ResistaidError::Other(anyhow::anyhow!(
                "illegal stage transition {} -> {}",
                self.stage,
                to
            )));
        }
        debug!(
            run_id = %self.run_id,
            mutation = %self.mutation_id,
            from = %self.stage,
            to = %to,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Run stage transition"
        );
        self.stage = to;
        self.history.push(to);
        Ok(())
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self, reason: &str) {
        if self.stage.is_terminal() {
            return;
        }
        warn!(run_id = %self.run_id, mutation = %self.mutation_id, stage = %self.stage, reason, "Run failed");
        self.stage = RunStage::Failed;
        self.history.push(RunStage::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut s = RunState::new("r1", "L755S");
        for to in [
            RunStage::Retrieving,
            RunStage::Designing,
            RunStage::Profiling,
            RunStage::Scoring,
            RunStage::Aggregating,
            RunStage::Done,
        ] {
            s.advance(to).unwrap();
        }
        assert_eq!(s.stage(), RunStage::Done);
        assert_eq!(s.history().len(), 7);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut s = RunState::new("r1", "L755S");
        assert!(s.advance(RunStage::Scoring).is_err());
        assert_eq!(s.stage(), RunStage::Received);
        s.fail("boom");
        assert_eq!(s.stage(), RunStage::Failed);
        assert!(s.advance(RunStage::Retrieving).is_err());
        assert!(!RunStage::Done.can_transition_to(RunStage::Failed));
    }
}
