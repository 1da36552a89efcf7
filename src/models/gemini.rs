use serde::{Deserialize, Serialize};

/// Gemini Generate Content Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// Contents (messages)
    pub contents: Vec<Content>,
    /// Generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "generationConfig")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content block (message)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Role: "user" or "model"
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Part: either text or an inline binary payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

/// Inline image data, base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: Option<u32>,
}

/// Gemini Generate Content Response (non-streaming)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "modelVersion")]
    pub model_version: Option<String>,
}

/// Candidate response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// The model's answer as the rest of the system sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// `candidates[0].content.parts[0].text` was present
    Recognized(String),
    /// Success status, but no text where it should be
    Malformed,
}

impl GenerateContentRequest {
    /// Single-turn request carrying an instruction and one image
    pub fn with_image(prompt: &str, mime_type: &str, base64_data: String) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64_data,
                        },
                    },
                ],
            }],
            generation_config: None,
        }
    }
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        match self.candidates.first()?.content.as_ref()?.parts.first()? {
            Part::Text { text } => Some(text.as_str()),
            Part::InlineData { .. } => None,
        }
    }
}

impl ModelReply {
    /// Classify a success body. Anything that is not the expected shape is `Malformed`.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<GenerateContentResponse>(body) {
            Ok(response) => match response.first_text() {
                Some(text) => Self::Recognized(text.to_string()),
                None => Self::Malformed,
            },
            Err(_) => Self::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_image_request() {
        let request = GenerateContentRequest::with_image("Describe", "image/png", "AAAA".to_string());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Describe");
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["data"], "AAAA");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_reply_recognized() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "- Tablecloths: 300"}]
                },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-1.5-flash"
        }"#;
        assert_eq!(
            ModelReply::from_body(body),
            ModelReply::Recognized("- Tablecloths: 300".to_string())
        );
    }

    #[test]
    fn test_reply_malformed_shapes() {
        for body in [
            "",
            "not json",
            "{}",
            r#"{"candidates": []}"#,
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"inline_data": {"mime_type": "image/png", "data": "AA"}}]}}]}"#,
        ] {
            assert_eq!(ModelReply::from_body(body), ModelReply::Malformed, "body: {}", body);
        }
    }
}
