pub mod cancel;
pub mod smoke;
pub mod state;

use anyhow::{Context, Result};
use log::info;
use std::io::Write;

use crate::client::{ApiClient, ApiResult};
use crate::fixtures::{ensure_fixtures, Fixture};
use crate::report::types::RunReport;
use crate::report::Reporter;
use crate::utils::config::HarnessConfig;

pub use cancel::CancelFlag;
pub use state::*;

const INTERRUPTED: &str = "interrupted";

/// Runs the full exercise against one service:
/// status check, fixtures, greeting, one upload per fixture, completion message.
///
/// Only a failed status check ends the run early. Failed sends are
/// reported and the sequence moves on.
pub struct Harness {
    config: HarnessConfig,
    client: ApiClient,
    cancel: CancelFlag,
}

impl Harness {
    pub fn new(config: HarnessConfig, cancel: CancelFlag) -> Result<Self> {
        let client = ApiClient::new(&config.base_url).context("Failed to create HTTP client")?;
        Ok(Self {
            config,
            client,
            cancel,
        })
    }

    /// Run the sequence, print progress and return the run report.
    /// Errors are setup failures only (fixture directory, console, report file).
    pub async fn run<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<RunReport> {
        let mut run = RunState::new(&uuid::Uuid::new_v4().to_string());
        run.start();
        info!("Run {} against {}", run.run_id, self.client.base_url());

        let outcome = self.run_sequence(&mut run, reporter).await;
        run.finish();
        let outcome = outcome?;

        match outcome {
            RunOutcome::Completed => reporter.summary(&run.summary())?,
            RunOutcome::Interrupted => reporter.interrupted()?,
            RunOutcome::NotReady => {}
        }

        let report = RunReport {
            run_id: run.run_id.clone(),
            base_url: self.client.base_url().to_string(),
            outcome,
            steps: run.step_reports(),
            summary: run.summary(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        if let Some(ref path) = self.config.report_path {
            crate::report::json::write(&report, path)?;
        }

        Ok(report)
    }

    async fn run_sequence<W: Write>(
        &self,
        run: &mut RunState,
        reporter: &mut Reporter<W>,
    ) -> Result<RunOutcome> {
        reporter.header("WhatsApp File Upload API Test")?;

        // 1. Status check
        let index = run.begin_step(StepKind::StatusCheck, "API status");
        let Some(status) = self.cancel.guard(self.client.get_status()).await else {
            return Ok(interrupt(run, index));
        };
        let connection = status.status_info();
        reporter.status(&status, &connection)?;

        if !(status.success && connection.whatsapp_connected) {
            let error = status
                .error_message()
                .unwrap_or_else(|| "WhatsApp is not connected".to_string());
            info!("Status check failed: {}", error);
            if let Some(step) = run.step_mut(index) {
                step.fail(error);
            }
            reporter.not_ready()?;
            return Ok(RunOutcome::NotReady);
        }
        record(run, index, &status);
        reporter.note("")?;
        reporter.rule()?;

        // 2. Fixtures
        if self.cancel.is_cancelled() {
            return Ok(RunOutcome::Interrupted);
        }
        reporter.note("📁 Creating test files...")?;
        let fixtures = ensure_fixtures(&self.config.fixtures_dir)?;
        reporter.note(&format!("✅ Prepared {} test files", fixtures.len()))?;

        // 3. Greeting
        reporter.section("📝", "Testing text message...")?;
        if self
            .send_text(run, reporter, "Greeting", &self.config.greeting)
            .await?
            .is_none()
        {
            return Ok(RunOutcome::Interrupted);
        }

        // 4. Uploads
        reporter.section("📎", "Testing file uploads...")?;
        for fixture in &fixtures {
            if self.send_fixture(run, reporter, fixture).await?.is_none() {
                return Ok(RunOutcome::Interrupted);
            }
        }

        // 5. Completion
        reporter.section("✅", "Testing completed!")?;
        if self
            .send_text(run, reporter, "Completion", &self.config.completion_message)
            .await?
            .is_none()
        {
            return Ok(RunOutcome::Interrupted);
        }

        Ok(RunOutcome::Completed)
    }

    /// `None` when interrupted
    async fn send_text<W: Write>(
        &self,
        run: &mut RunState,
        reporter: &mut Reporter<W>,
        label: &str,
        message: &str,
    ) -> Result<Option<ApiResult>> {
        let phone = &self.config.phone_number;
        let index = run.begin_step(StepKind::SendMessage, label);
        info!("Step {}: send message ({})", index, label);

        let call = self.client.send_message(phone, message);
        let Some(result) = self.cancel.guard(call).await else {
            interrupt(run, index);
            return Ok(None);
        };
        record(run, index, &result);

        if result.success {
            reporter.report(&format!("Text message sent to {}", phone), &result)?;
        } else {
            reporter.report("Failed to send text", &result)?;
        }
        Ok(Some(result))
    }

    /// `None` when interrupted
    async fn send_fixture<W: Write>(
        &self,
        run: &mut RunState,
        reporter: &mut Reporter<W>,
        fixture: &Fixture,
    ) -> Result<Option<ApiResult>> {
        let name = fixture.file_name();
        reporter.section("📤", &format!("Uploading {}...", name))?;
        reporter.upload_started(&fixture.file_info())?;

        let index = run.begin_step(StepKind::SendFile, &name);
        info!("Step {}: send file {}", index, fixture.path.display());

        let call = self.client.send_file(
            &self.config.phone_number,
            &fixture.path,
            fixture.caption.as_deref(),
        );
        let Some(result) = self.cancel.guard(call).await else {
            interrupt(run, index);
            return Ok(None);
        };
        record(run, index, &result);

        if result.success {
            reporter.report("File sent successfully!", &result)?;
            if let Some(file_info) = result.file_info() {
                reporter.file_details(&file_info)?;
            }
        } else {
            reporter.report(&format!("Failed to upload {}", name), &result)?;
        }
        Ok(Some(result))
    }
}

fn record(run: &mut RunState, index: usize, result: &ApiResult) {
    if let Some(step) = run.step_mut(index) {
        match result.error_message() {
            None if result.success => step.pass(),
            error => step.fail(error.unwrap_or_else(|| "Unknown error".to_string())),
        }
    }
}

fn interrupt(run: &mut RunState, index: usize) -> RunOutcome {
    info!("Interrupted during step {}", index);
    if let Some(step) = run.step_mut(index) {
        step.skip(INTERRUPTED.to_string());
    }
    RunOutcome::Interrupted
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    const PHONE: &str = "628123456789";

    fn harness_for(server: &MockServer, dir: &std::path::Path) -> Harness {
        let mut config = HarnessConfig::new(&server.base_url(), PHONE);
        config.fixtures_dir = dir.join("test_files");
        Harness::new(config, CancelFlag::new()).unwrap()
    }

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    async fn connected_status(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/status");
                then.status(200)
                    .json_body(json!({"success": true, "whatsapp": {"isConnected": true}}));
            })
            .await
    }

    #[tokio::test]
    async fn test_full_run_against_healthy_service() {
        colored::control::set_override(false);
        let server = MockServer::start_async().await;
        let status = connected_status(&server).await;
        let messages = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/send-message")
                    .body_contains(PHONE);
                then.status(200).json_body(json!({"success": true}));
            })
            .await;
        let files = server
            .mock_async(|when, then| {
                when.method(POST).path("/send-file");
                then.status(200).json_body(json!({
                    "success": true,
                    "fileInfo": {"fileName": "test_document.txt", "mimeType": "text/plain", "size": 187}
                }));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let harness = harness_for(&server, dir.path());
        let mut reporter = Reporter::new(Vec::new());
        let report = harness.run(&mut reporter).await.unwrap();
        let text = output(reporter);

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.summary.attempted, 4);
        assert_eq!(report.summary.succeeded, 4);
        assert_eq!(report.summary.failed, 0);
        assert!(report.summary.status_checked);

        let kinds: Vec<StepKind> = report.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::StatusCheck,
                StepKind::SendMessage,
                StepKind::SendFile,
                StepKind::SendFile,
                StepKind::SendMessage,
            ]
        );
        assert!(report.steps.iter().all(|s| s.status == StepStatus::Passed));

        status.assert_hits_async(1).await;
        messages.assert_hits_async(2).await;
        files.assert_hits_async(2).await;

        assert!(text.contains("WhatsApp: ✅ Connected"));
        assert_eq!(text.matches("✅ Text message sent to 628123456789").count(), 2);
        assert_eq!(text.matches("✅ File sent successfully!").count(), 2);
        assert_eq!(text.matches("Size: 187.0 B").count(), 2);
        assert!(text.contains("- Operations: 4/4 succeeded"));
    }

    #[tokio::test]
    async fn test_not_connected_aborts_before_sends() {
        colored::control::set_override(false);
        let server = MockServer::start_async().await;
        let _status = server
            .mock_async(|when, then| {
                when.method(GET).path("/status");
                then.status(200).json_body(json!({
                    "success": true,
                    "whatsapp": {"isConnected": false, "phoneNumber": null}
                }));
            })
            .await;
        let sends = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({"success": true}));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let harness = harness_for(&server, dir.path());
        let mut reporter = Reporter::new(Vec::new());
        let report = harness.run(&mut reporter).await.unwrap();
        let text = output(reporter);

        assert_eq!(report.outcome, RunOutcome::NotReady);
        assert_eq!(report.steps.len(), 1);
        assert_eq!(
            report.steps[0].status,
            StepStatus::Failed {
                error: "WhatsApp is not connected".to_string()
            }
        );
        sends.assert_hits_async(0).await;
        assert!(!dir.path().join("test_files").exists());
        assert!(text.contains("WhatsApp: ❌ Not Connected"));
        assert!(text.contains("API is not ready"));
    }

    #[tokio::test]
    async fn test_unreachable_service_aborts() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::new("http://127.0.0.1:1", PHONE);
        config.fixtures_dir = dir.path().join("test_files");
        let harness = Harness::new(config, CancelFlag::new()).unwrap();

        let mut reporter = Reporter::new(Vec::new());
        let report = harness.run(&mut reporter).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::NotReady);
        assert!(output(reporter).contains("❌ API Status Error:"));
    }

    #[tokio::test]
    async fn test_failed_upload_does_not_stop_run() {
        colored::control::set_override(false);
        let server = MockServer::start_async().await;
        let _status = connected_status(&server).await;
        let messages = server
            .mock_async(|when, then| {
                when.method(POST).path("/send-message");
                then.status(200).json_body(json!({"success": true}));
            })
            .await;
        let _files = server
            .mock_async(|when, then| {
                when.method(POST).path("/send-file");
                then.status(500)
                    .json_body(json!({"success": false, "error": "Upload storage full"}));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let harness = harness_for(&server, dir.path());
        let mut reporter = Reporter::new(Vec::new());
        let report = harness.run(&mut reporter).await.unwrap();
        let text = output(reporter);

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.summary.attempted, 4);
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 2);
        messages.assert_hits_async(2).await;
        assert!(text.contains("❌ Failed to upload test_document.txt: Upload storage full"));
        assert!(text.contains("❌ Failed to upload test_data.json: Upload storage full"));
        assert!(text.contains("- Operations: 2/4 succeeded"));
    }

    #[tokio::test]
    async fn test_interrupt_mid_sequence() {
        colored::control::set_override(false);
        let server = MockServer::start_async().await;
        let _status = server
            .mock_async(|when, then| {
                when.method(GET).path("/status");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"success": true, "whatsapp": {"isConnected": true}}));
            })
            .await;
        let sends = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({"success": true}));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::new(&server.base_url(), PHONE);
        config.fixtures_dir = dir.path().join("test_files");
        let cancel = CancelFlag::new();
        let harness = Harness::new(config, cancel.clone()).unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let mut reporter = Reporter::new(Vec::new());
        let report = tokio::time::timeout(Duration::from_secs(2), harness.run(&mut reporter))
            .await
            .expect("interrupt did not stop the in-flight call")
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert_eq!(
            report.steps[0].status,
            StepStatus::Skipped {
                reason: "interrupted".to_string()
            }
        );
        sends.assert_hits_async(0).await;
        assert!(output(reporter).contains("🛑 Test interrupted by user"));
    }

    #[tokio::test]
    async fn test_interrupt_during_upload_stops_sequence() {
        colored::control::set_override(false);
        let server = MockServer::start_async().await;
        let _status = connected_status(&server).await;
        let messages = server
            .mock_async(|when, then| {
                when.method(POST).path("/send-message");
                then.status(200).json_body(json!({"success": true}));
            })
            .await;
        let _files = server
            .mock_async(|when, then| {
                when.method(POST).path("/send-file");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"success": true}));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::new(&server.base_url(), PHONE);
        config.fixtures_dir = dir.path().join("test_files");
        let cancel = CancelFlag::new();
        let harness = Harness::new(config, cancel.clone()).unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            cancel.cancel();
        });

        let mut reporter = Reporter::new(Vec::new());
        let report = tokio::time::timeout(Duration::from_secs(2), harness.run(&mut reporter))
            .await
            .expect("interrupt did not stop the upload")
            .unwrap();
        let text = output(reporter);

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        let statuses: Vec<StepStatus> = report.steps.iter().map(|s| s.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Passed,
                StepStatus::Passed,
                StepStatus::Skipped {
                    reason: "interrupted".to_string()
                },
            ]
        );
        messages.assert_hits_async(1).await;
        assert!(text.contains("📤 Uploading test_document.txt..."));
        assert!(text.contains("🛑 Test interrupted by user"));
        assert!(!text.contains("Test Summary"));
        assert!(!text.contains("Testing completed!"));
    }

    #[tokio::test]
    async fn test_report_file_written() {
        let server = MockServer::start_async().await;
        let _status = connected_status(&server).await;
        let _sends = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({"success": true}));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("out").join("run.json");
        let mut config = HarnessConfig::new(&server.base_url(), PHONE);
        config.fixtures_dir = dir.path().join("test_files");
        config.report_path = Some(report_path.clone());
        let harness = Harness::new(config, CancelFlag::new()).unwrap();

        let report = harness.run(&mut Reporter::new(Vec::new())).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(value["runId"], report.run_id.as_str());
        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["steps"].as_array().unwrap().len(), 5);
    }
}
