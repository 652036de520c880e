//! Vision-model client for extracting flow tables from screenshots.
//!
//! Flow data often arrives as a broker screenshot rather than a CSV export.
//! The client sends the image to an OpenAI-style chat completions API and
//! parses the reply into the same `FlowTable` the CSV parser produces, so
//! the analysis pipeline never cares which ingest path fed it.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use tradelog_core::flow::FlowTable;
use tradelog_shared::config::VisionConfig;

/// Instructions sent alongside the screenshot.
const EXTRACT_PROMPT: &str = "\
You are given a screenshot of an options-flow table. Extract every visible \
row and respond with JSON only, no prose and no code fences, in this shape: \
{\"rows\": [{\"symbol\": string, \"underlying\": string|null, \"expiry\": \
\"YYYY-MM-DD\"|null, \"strike\": number, \"option_type\": \"C\"|\"P\", \
\"side\": \"ASK\"|\"BID\"|\"MID\"|\"UNKNOWN\", \"price\": number|null, \
\"size\": number|null, \"premium\": number|null, \"open_interest\": \
number|null, \"iv\": number|null, \"delta\": number|null, \"timestamp\": \
string|null}], \"provider\": null}. Use null for anything unreadable and \
skip rows with no strike or contract type.";

/// Errors from the vision provider.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Transport-level failure.
    #[error("vision request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request.
    #[error("vision provider error: {0}")]
    Upstream(String),

    /// The model reply could not be read as a flow table.
    #[error("vision extraction unusable: {0}")]
    BadExtraction(String),
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for the vision provider's chat completions API.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl VisionClient {
    /// Creates a client from vision configuration, or `None` while no API
    /// key is configured.
    #[must_use]
    pub fn from_config(config: &VisionConfig) -> Option<Self> {
        if config.api_key.is_empty() {
            return None;
        }
        Some(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Extracts a flow table from screenshot bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider call fails or the reply is not a
    /// flow table.
    pub async fn extract_flow_table(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<FlowTable, VisionError> {
        let encoded = STANDARD.encode(image);
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACT_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:{content_type};base64,{encoded}")
                        }
                    }
                ]
            }],
            "temperature": 0
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Upstream(format!("status {status}: {body}")));
        }

        let reply: ChatResponse = response.json().await?;
        let text = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| VisionError::BadExtraction("empty model reply".to_string()))?;

        parse_extraction(&text)
    }
}

/// Parses a model reply into a flow table, tolerating markdown fences.
fn parse_extraction(text: &str) -> Result<FlowTable, VisionError> {
    let trimmed = text.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(stripped).map_err(|e| VisionError::BadExtraction(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradelog_core::flow::{OptionType, Side};

    const REPLY: &str = r#"{
        "rows": [{
            "symbol": "SPY 450C",
            "underlying": "SPY",
            "expiry": "2026-09-18",
            "strike": 450.0,
            "option_type": "C",
            "side": "ASK",
            "price": 2.15,
            "size": 500,
            "premium": 107500.0,
            "open_interest": null,
            "iv": 0.21,
            "delta": 0.45,
            "timestamp": null
        }],
        "provider": null
    }"#;

    #[test]
    fn test_parse_extraction_plain_json() {
        let table = parse_extraction(REPLY).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].option_type, OptionType::Call);
        assert_eq!(table.rows[0].side, Side::Ask);
        assert_eq!(table.rows[0].strike, 450.0);
    }

    #[test]
    fn test_parse_extraction_strips_code_fences() {
        let fenced = format!("```json\n{REPLY}\n```");
        let table = parse_extraction(&fenced).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_parse_extraction_rejects_prose() {
        let result = parse_extraction("I could not read the screenshot.");
        assert!(matches!(result, Err(VisionError::BadExtraction(_))));
    }

    #[test]
    fn test_client_disabled_without_api_key() {
        let config = VisionConfig::default();
        assert!(VisionClient::from_config(&config).is_none());
    }
}
