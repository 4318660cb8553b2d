//! Ollama backend client: completion calls and the availability probe.

use crate::config::BackendConfig;
use anyhow::{Context, Result};
use persona_common::wire::{GenerateOptions, GenerateRequest, GenerateResponse, TagsResponse};
use persona_common::{AnalysisType, BackendError};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Seam between the orchestrator and whatever produces analysis text.
/// Lets tests drive the fallback path with failing or canned backends.
pub trait GenerationBackend: Send + Sync {
    /// Run one completion. Single attempt, hard timeout, no retry.
    fn generate(
        &self,
        input: &str,
        analysis_type: AnalysisType,
        model: &str,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;
}

impl<B: GenerationBackend> GenerationBackend for std::sync::Arc<B> {
    fn generate(
        &self,
        input: &str,
        analysis_type: AnalysisType,
        model: &str,
    ) -> impl Future<Output = Result<String, BackendError>> + Send {
        (**self).generate(input, analysis_type, model)
    }
}

/// Outcome of the availability probe. Never an error; unreachable
/// backends degrade to "unavailable" with no models.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub available: bool,
    pub models: Vec<String>,
}

impl ProbeOutcome {
    pub fn status(&self) -> &'static str {
        if self.available {
            "available"
        } else {
            "unavailable"
        }
    }
}

/// HTTP client for a local or remote Ollama instance.
pub struct OllamaClient {
    generate_http: reqwest::Client,
    probe_http: reqwest::Client,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let generate_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.generate_timeout_secs))
            .build()
            .context("failed to build generation HTTP client")?;
        let probe_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .build()
            .context("failed to build probe HTTP client")?;

        Ok(Self {
            generate_http,
            probe_http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Check whether Ollama answers its model-list endpoint.
    pub async fn probe(&self) -> ProbeOutcome {
        debug!("Checking Ollama connectivity at {}", self.base_url);

        let response = self
            .probe_http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<TagsResponse>().await {
                Ok(tags) => {
                    let models: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
                    info!("Ollama connected with {} models", models.len());
                    ProbeOutcome {
                        available: true,
                        models,
                    }
                }
                Err(e) => {
                    warn!("Ollama tags response unreadable: {}", e);
                    ProbeOutcome {
                        available: false,
                        models: Vec::new(),
                    }
                }
            },
            Ok(resp) => {
                warn!("Ollama not available: status {}", resp.status());
                ProbeOutcome {
                    available: false,
                    models: Vec::new(),
                }
            }
            Err(e) => {
                warn!("Ollama not available: {}", e);
                ProbeOutcome {
                    available: false,
                    models: Vec::new(),
                }
            }
        }
    }

    async fn generate_completion(
        &self,
        input: &str,
        analysis_type: AnalysisType,
        model: &str,
    ) -> Result<String, BackendError> {
        let body = GenerateRequest {
            model: model.to_string(),
            prompt: build_prompt(input, analysis_type),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        debug!("Calling Ollama generate with model {}", model);

        let response = self
            .generate_http
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let completion: GenerateResponse = response
            .json()
            .await
            .map_err(|_| BackendError::InvalidResponse)?;

        if completion.response.trim().is_empty() {
            return Err(BackendError::InvalidResponse);
        }

        debug!("Ollama response received successfully");
        Ok(completion.response)
    }
}

impl GenerationBackend for OllamaClient {
    fn generate(
        &self,
        input: &str,
        analysis_type: AnalysisType,
        model: &str,
    ) -> impl Future<Output = Result<String, BackendError>> + Send {
        self.generate_completion(input, analysis_type, model)
    }
}

/// Fixed analyst prompt. The six labeled sections here are the contract
/// the response parser extracts against.
fn build_prompt(input: &str, analysis_type: AnalysisType) -> String {
    format!(
        "You are an experienced API analyst. Analyze this {analysis_type} and provide insights:\n\
         \n\
         Input: {input}\n\
         \n\
         Provide analysis in this format:\n\
         **Purpose**: [What this API does]\n\
         **Audience**: [Who would use this]\n\
         **Data Sensitivity**: [low/medium/high]\n\
         **Authentication Friction**: [low/medium/high]\n\
         **Business Model**: [Internal/SaaS/Open API/Monetized]\n\
         **Example Use Case**: [Real-world usage example]\n\
         \n\
         Be specific and practical."
    )
}
