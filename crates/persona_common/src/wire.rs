//! Wire structs for the Ollama HTTP API.
//!
//! Covers the two calls personad makes: `/api/generate` (completion)
//! and `/api/tags` (installed-model probe).

use serde::{Deserialize, Serialize};

/// Body for POST `/api/generate`. Streaming is always disabled.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

/// Reply from `/api/generate`. Only the completion text matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// Reply from GET `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_serializes_stream_false() {
        let req = GenerateRequest {
            model: "llama2".into(),
            prompt: "hi".into(),
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                num_predict: 800,
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 800);
    }

    #[test]
    fn tags_response_tolerates_missing_models() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }
}
