//! Quick status check plus one in-memory upload, printing raw responses.

use anyhow::Result;
use std::io::Write;

use super::cancel::CancelFlag;
use super::state::RunOutcome;
use crate::client::{ApiClient, ApiResult};
use crate::report::Reporter;

const SMOKE_FILE_NAME: &str = "test.txt";
const SMOKE_FILE_BODY: &str = "Hello World! This is a test file.";
const SMOKE_CAPTION: &str = "Test file upload from debug script";

/// Both steps always run unless interrupted
pub async fn run_smoke<W: Write>(
    client: &ApiClient,
    phone_number: &str,
    cancel: &CancelFlag,
    reporter: &mut Reporter<W>,
) -> Result<RunOutcome> {
    reporter.header(&format!("Smoke test against {}", client.base_url()))?;
    reporter.note("Testing API status...")?;
    let Some(status) = cancel.guard(client.get_status()).await else {
        reporter.interrupted()?;
        return Ok(RunOutcome::Interrupted);
    };
    raw_response(reporter, "", &status)?;
    if status.success {
        reporter.report("API is working", &status)?;
        reporter.note(&format!(
            "WhatsApp Connected: {}",
            status.status_info().whatsapp_connected
        ))?;
    } else {
        reporter.report("API responded but not successful", &status)?;
    }

    reporter.note("\nTesting file upload...")?;
    let upload = client.send_file_bytes(
        phone_number,
        SMOKE_FILE_NAME,
        SMOKE_FILE_BODY.as_bytes().to_vec(),
        "text/plain",
        Some(SMOKE_CAPTION),
    );
    let Some(upload) = cancel.guard(upload).await else {
        reporter.interrupted()?;
        return Ok(RunOutcome::Interrupted);
    };
    raw_response(reporter, "Upload ", &upload)?;
    reporter.report("Upload", &upload)?;

    Ok(RunOutcome::Completed)
}

fn raw_response<W: Write>(
    reporter: &mut Reporter<W>,
    prefix: &str,
    result: &ApiResult,
) -> Result<()> {
    let code = result
        .http_status
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    reporter.note(&format!("{}Status Code: {}", prefix, code))?;
    if let Some(ref body) = result.body {
        reporter.note(&format!("{}Response: {}", prefix, body))?;
    }
    Ok(())
}
