pub mod json;
pub mod types;

use colored::Colorize;
use std::io::{self, Stdout, Write};

use crate::client::{ApiResult, FileInfo, StatusInfo};
use crate::runner::state::RunSummary;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human readable size in binary steps, capped at GB.
/// Zero is "0 B"; everything else carries one decimal ("512.0 B", "1.5 KB").
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

/// Console reporter for harness progress
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "🧪 {}", title.bold())?;
        self.rule()
    }

    pub fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(40))
    }

    pub fn section(&mut self, icon: &str, title: &str) -> io::Result<()> {
        writeln!(self.out, "\n{} {}", icon, title)
    }

    pub fn note(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)
    }

    /// One pass/fail line per operation
    pub fn report(&mut self, label: &str, result: &ApiResult) -> io::Result<()> {
        if result.success {
            writeln!(self.out, "{} {}", "✅".green(), label)
        } else {
            let error = result
                .error_message()
                .unwrap_or_else(|| "Unknown error".to_string());
            writeln!(self.out, "{} {}: {}", "❌".red(), label, error.red())
        }
    }

    pub fn status(&mut self, result: &ApiResult, info: &StatusInfo) -> io::Result<()> {
        if result.http_status.is_none() {
            let error = result.error_message().unwrap_or_default();
            return writeln!(self.out, "{} API Status Error: {}", "❌".red(), error.red());
        }

        writeln!(self.out, "🔄 API Status Check:")?;
        let server = if result.server_online() {
            "✅ Online".green()
        } else {
            "❌ Offline".red()
        };
        writeln!(self.out, "  Server: {}", server)?;

        if result.success {
            let whatsapp = if info.whatsapp_connected {
                "✅ Connected".green()
            } else {
                "❌ Not Connected".red()
            };
            writeln!(self.out, "  WhatsApp: {}", whatsapp)?;
            writeln!(
                self.out,
                "  Phone: {}",
                info.phone_number.as_deref().unwrap_or("Unknown").cyan()
            )
        } else {
            let error = result.error_message().unwrap_or_default();
            writeln!(self.out, "  Error: {}", error.red())
        }
    }

    pub fn not_ready(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n{} API is not ready. Please make sure:", "❌".red())?;
        writeln!(self.out, "1. WhatsApp Service is running")?;
        writeln!(self.out, "2. WhatsApp is connected (scan QR code)")
    }

    pub fn upload_started(&mut self, info: &FileInfo) -> io::Result<()> {
        writeln!(
            self.out,
            "📎 Sending file: {} ({}, {})",
            info.file_name.cyan(),
            info.mime_type,
            format_size(info.size_bytes)
        )
    }

    pub fn file_details(&mut self, info: &FileInfo) -> io::Result<()> {
        writeln!(self.out, "  File: {}", info.file_name)?;
        writeln!(self.out, "  Type: {}", info.mime_type)?;
        writeln!(self.out, "  Size: {}", format_size(info.size_bytes))
    }

    /// Final tally of sends
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule()?;
        writeln!(self.out, "📋 Test Summary:")?;
        let checked = if summary.status_checked {
            "Checked"
        } else {
            "Not checked"
        };
        writeln!(self.out, "- API Status: {}", checked)?;

        let tally = format!("{}/{}", summary.succeeded, summary.attempted);
        let tally = if summary.failed == 0 {
            tally.green()
        } else {
            tally.yellow()
        };
        writeln!(self.out, "- Operations: {} succeeded", tally)?;
        if summary.failed > 0 {
            writeln!(self.out, "- Failed: {}", summary.failed.to_string().red())?;
        }
        if let Some(duration) = summary.duration_ms {
            writeln!(self.out, "- Duration: {}ms", duration)?;
        }
        Ok(())
    }

    pub fn interrupted(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n\n{} Test interrupted by user", "🛑".yellow())
    }
}
