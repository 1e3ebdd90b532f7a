use std::path::PathBuf;

/// Default API endpoint of the WhatsApp service
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default directory for generated fixture files
pub const DEFAULT_FIXTURES_DIR: &str = "test_files";

/// Harness configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the service (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Target phone number, international format without leading '+'
    pub phone_number: String,

    /// Directory holding the fixture files
    pub fixtures_dir: PathBuf,

    /// Text sent before the uploads
    pub greeting: String,

    /// Text sent after the uploads
    pub completion_message: String,

    /// Write a JSON run report here when set
    pub report_path: Option<PathBuf>,
}

impl HarnessConfig {
    pub fn new(base_url: &str, phone_number: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            phone_number: phone_number.to_string(),
            ..Self::default()
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            phone_number: String::new(),
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            greeting: "🤖 Starting file upload test...".to_string(),
            completion_message: "✅ File upload test completed successfully!".to_string(),
            report_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_defaults() {
        let config = HarnessConfig::new("http://10.0.0.5:3000", "628123456789");
        assert_eq!(config.base_url, "http://10.0.0.5:3000");
        assert_eq!(config.phone_number, "628123456789");
        assert_eq!(config.fixtures_dir, PathBuf::from("test_files"));
        assert!(config.report_path.is_none());
    }
}
