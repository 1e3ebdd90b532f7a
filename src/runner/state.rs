use serde::{Deserialize, Serialize};
use std::time::Instant;

/// What a step does against the service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    StatusCheck,
    SendMessage,
    SendFile,
}

impl StepKind {
    /// Message and file sends count towards the summary; the status check does not
    pub fn is_send(&self) -> bool {
        matches!(self, StepKind::SendMessage | StepKind::SendFile)
    }
}

/// Step execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Passed | StepStatus::Failed { .. } | StepStatus::Skipped { .. }
        )
    }
}

/// State for a single step
#[derive(Debug, Clone)]
pub struct StepState {
    pub index: usize,
    pub kind: StepKind,
    pub label: String,
    pub status: StepStatus,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl StepState {
    pub fn new(index: usize, kind: StepKind, label: &str) -> Self {
        Self {
            index,
            kind,
            label: label.to_string(),
            status: StepStatus::Pending,
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(StepStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(StepStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.finish(StepStatus::Skipped { reason });
    }

    fn finish(&mut self, status: StepStatus) {
        self.status = status;
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> StepReport {
        StepReport {
            index: self.index,
            kind: self.kind,
            label: self.label.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub index: usize,
    pub kind: StepKind,
    pub label: String,
    pub status: StepStatus,
    pub duration_ms: Option<u64>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunOutcome {
    Completed,
    /// Status check failed or WhatsApp not connected
    NotReady,
    Interrupted,
}

/// State for one harness run
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub steps: Vec<StepState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            steps: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Register and start a new step, returning its index
    pub fn begin_step(&mut self, kind: StepKind, label: &str) -> usize {
        let index = self.steps.len();
        let mut step = StepState::new(index, kind, label);
        step.start();
        self.steps.push(step);
        index
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut StepState> {
        self.steps.get_mut(index)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> RunSummary {
        let mut attempted = 0;
        let mut succeeded = 0;
        let mut failed = 0;

        for step in self.steps.iter().filter(|s| s.kind.is_send()) {
            match step.status {
                StepStatus::Passed => {
                    attempted += 1;
                    succeeded += 1;
                }
                StepStatus::Failed { .. } => {
                    attempted += 1;
                    failed += 1;
                }
                _ => {}
            }
        }

        let status_checked = self
            .steps
            .iter()
            .any(|s| s.kind == StepKind::StatusCheck && s.status.is_terminal());

        let duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        RunSummary {
            attempted,
            succeeded,
            failed,
            status_checked,
            duration_ms,
        }
    }

    pub fn step_reports(&self) -> Vec<StepReport> {
        self.steps.iter().map(|s| s.to_report()).collect()
    }
}

/// Tally of message and file sends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub status_checked: bool,
    pub duration_ms: Option<u64>,
}
