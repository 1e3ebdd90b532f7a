use crate::runner::state::{RunOutcome, RunSummary, StepReport};
use serde::{Deserialize, Serialize};

/// Run results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub base_url: String,
    pub outcome: RunOutcome,
    pub steps: Vec<StepReport>,
    pub summary: RunSummary,
    pub generated_at: String,
}
