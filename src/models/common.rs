use serde::{Deserialize, Serialize};

/// Error body the backend sends with non-success statuses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl ErrorResponse {
    /// Most specific human-readable text in the body
    pub fn summary(&self) -> Option<String> {
        fn non_blank(text: Option<&str>) -> Option<&str> {
            text.map(str::trim).filter(|text| !text.is_empty())
        }

        non_blank(self.message.as_deref())
            .or_else(|| non_blank(self.error.as_deref()))
            .map(str::to_string)
    }

    /// Pull a message out of a response body: JSON error object or plain text
    pub fn describe(body: &str) -> Option<String> {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            if let Some(summary) = parsed.summary() {
                return Some(summary);
            }
        }

        let text = body.trim();
        (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string())
    }
}
