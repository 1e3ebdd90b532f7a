//! Deterministic sample files used to exercise the upload path.
//!
//! Files are created only when missing and never overwritten or removed, so
//! repeated runs against the same directory see identical fixtures.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::client::mime::detect_mime_type;
use crate::client::FileInfo;

pub const TEXT_FIXTURE_NAME: &str = "test_document.txt";
pub const JSON_FIXTURE_NAME: &str = "test_data.json";

const TEXT_FIXTURE: &str = "🤖 WhatsApp File Upload Test

This is a test document created by the wa-tester API exercise.
If you receive this file, the file upload feature is working correctly!

Test Details:
- File Type: Text Document
- Encoding: UTF-8
- Created by: wa-tester
";

/// Body of the JSON fixture; field order is the serialized order
#[derive(Serialize)]
struct FixtureManifest {
    test: &'static str,
    version: &'static str,
    timestamp: &'static str,
    features: &'static [&'static str],
    status: &'static str,
}

const MANIFEST: FixtureManifest = FixtureManifest {
    test: "WhatsApp File Upload",
    version: "2.0",
    timestamp: "2024-01-01T00:00:00Z",
    features: &[
        "Text Messages",
        "File Upload",
        "Image Support",
        "Document Support",
        "Video Support",
        "Audio Support",
    ],
    status: "success",
};

/// A sample file on disk
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub caption: Option<String>,
}

impl Fixture {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn file_info(&self) -> FileInfo {
        FileInfo {
            file_name: self.file_name(),
            mime_type: detect_mime_type(&self.path).to_string(),
            size_bytes: self.size_bytes(),
        }
    }
}

/// Create the fixture files in `dir` if absent and return them in send order
pub fn ensure_fixtures(dir: &Path) -> Result<Vec<Fixture>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create fixture directory: {}", dir.display()))?;

    let json_body = serde_json::to_vec_pretty(&MANIFEST)?;
    let bodies: [(&str, &[u8]); 2] = [
        (TEXT_FIXTURE_NAME, TEXT_FIXTURE.as_bytes()),
        (JSON_FIXTURE_NAME, &json_body),
    ];

    let mut fixtures = Vec::with_capacity(bodies.len());
    for (name, body) in bodies {
        let path = dir.join(name);
        write_if_absent(&path, body)?;

        let content = fs::read(&path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        fixtures.push(Fixture {
            path,
            content,
            caption: Some(format!("📋 Test file: {}", name)),
        });
    }

    Ok(fixtures)
}

fn write_if_absent(path: &Path, body: &[u8]) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => {
            fill_or_remove(path, file, body)?;
            debug!("Created fixture {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Keeping existing fixture {}", path.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to create fixture: {}", path.display())),
    }
}

/// Write the whole body or leave no file behind
fn fill_or_remove<W: Write>(path: &Path, mut file: W, body: &[u8]) -> Result<()> {
    if let Err(e) = file.write_all(body).and_then(|_| file.flush()) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("Failed to remove partial fixture {}: {}", path.display(), remove_err);
        }
        return Err(e).with_context(|| format!("Failed to write fixture: {}", path.display()));
    }
    Ok(())
}
