use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection state reported by `GET /status`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusInfo {
    pub whatsapp_connected: bool,
    pub phone_number: Option<String>,
}

/// `whatsapp` object of the status response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WhatsappStatus {
    #[serde(default)]
    pub is_connected: bool,
    pub phone_number: Option<String>,
}

impl From<WhatsappStatus> for StatusInfo {
    fn from(status: WhatsappStatus) -> Self {
        Self {
            whatsapp_connected: status.is_connected,
            phone_number: status.phone_number,
        }
    }
}

/// File description, either read from disk or echoed by `POST /send-file`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// JSON body of `POST /send-message`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageRequest<'a> {
    pub phone_number: &'a str,
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_info_from_server_echo() {
        let info: FileInfo = serde_json::from_str(
            r#"{"fileName":"test_document.txt","mimeType":"text/plain","size":187}"#,
        )
        .unwrap();
        assert_eq!(info.file_name, "test_document.txt");
        assert_eq!(info.mime_type, "text/plain");
        assert_eq!(info.size_bytes, 187);
    }

    #[test]
    fn test_send_message_request_shape() {
        let body = serde_json::to_value(SendMessageRequest {
            phone_number: "628123456789",
            message: "hi",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"phoneNumber": "628123456789", "message": "hi"})
        );
    }
}
