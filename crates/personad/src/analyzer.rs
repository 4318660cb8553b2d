//! Analysis orchestrator: validate, generate (live with mock
//! fallback), parse, assemble.

use crate::config::PersonadConfig;
use crate::mock;
use crate::ollama::GenerationBackend;
use crate::parser;
use chrono::Utc;
use persona_common::{AnalysisRequest, AnalysisResult, AnalyzeError, ValidationError};
use std::time::Instant;
use tracing::{info, warn};

/// Model name reported when the mock path produced the output.
pub const MOCK_MODEL: &str = "mock";

/// Runs the full analysis pipeline over a generation backend.
///
/// Stateless per call; a single instance is shared across concurrent
/// requests without coordination.
pub struct Analyzer<B> {
    backend: B,
    default_model: String,
    live_confidence: f64,
    mock_confidence: f64,
}

impl<B: GenerationBackend> Analyzer<B> {
    pub fn new(backend: B, config: &PersonadConfig) -> Self {
        Self {
            backend,
            default_model: config.backend.model.clone(),
            live_confidence: config.scoring.live_confidence,
            mock_confidence: config.scoring.mock_confidence,
        }
    }

    /// Analyze one request.
    ///
    /// Backend failures are absorbed: the mock generator takes over and
    /// the result is marked with the mock model id and its confidence
    /// constant. Only input-contract violations fail the call.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalyzeError> {
        if request.input.trim().is_empty() {
            return Err(ValidationError::MissingField("input and type").into());
        }

        let model = request
            .options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        info!(
            "Starting analysis for {}: {}",
            request.analysis_type, request.input
        );
        let start = Instant::now();

        let (raw_output, model_used, confidence) = match self
            .backend
            .generate(&request.input, request.analysis_type, &model)
            .await
        {
            Ok(text) => {
                info!("AI analysis completed successfully with {}", model);
                (text, model, self.live_confidence)
            }
            Err(e) => {
                warn!("AI analysis failed: {}. Using mock analysis", e);
                let text = mock::generate(&request.input, request.analysis_type);
                (text, MOCK_MODEL.to_string(), self.mock_confidence)
            }
        };

        let persona = parser::parse(&raw_output, &request.input, request.analysis_type);
        let processing_time_ms = start.elapsed().as_millis() as u64;
        let now = Utc::now();

        info!(
            "Analysis completed with {}, confidence: {}",
            model_used, confidence
        );

        Ok(AnalysisResult {
            id: now.timestamp_millis(),
            input: request.input.clone(),
            input_type: request.analysis_type,
            raw_model_output: raw_output,
            persona,
            confidence_score: confidence,
            model_used,
            processing_time_ms,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_common::{AnalysisOptions, AnalysisType, BackendError, Sensitivity};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedBackend {
        text: String,
        calls: AtomicUsize,
    }

    impl CannedBackend {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl GenerationBackend for CannedBackend {
        fn generate(
            &self,
            _input: &str,
            _analysis_type: AnalysisType,
            _model: &str,
        ) -> impl Future<Output = Result<String, BackendError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = self.text.clone();
            async move { Ok(text) }
        }
    }

    struct FailingBackend;

    impl GenerationBackend for FailingBackend {
        fn generate(
            &self,
            _input: &str,
            _analysis_type: AnalysisType,
            _model: &str,
        ) -> impl Future<Output = Result<String, BackendError>> + Send {
            async { Err(BackendError::RequestFailed("connection refused".to_string())) }
        }
    }

    fn request(input: &str, analysis_type: AnalysisType) -> AnalysisRequest {
        AnalysisRequest {
            input: input.to_string(),
            analysis_type,
            options: AnalysisOptions::default(),
        }
    }

    #[tokio::test]
    async fn live_backend_success_uses_live_confidence() {
        let backend = CannedBackend::new(
            "**Purpose**: X\n**Audience**: Y\n**Data Sensitivity**: low\n\
             **Authentication Friction**: low\n**Business Model**: Internal\n\
             **Example Use Case**: Z",
        );
        let analyzer = Analyzer::new(backend, &PersonadConfig::default());

        let result = analyzer
            .analyze(&request("/orders", AnalysisType::Endpoint))
            .await
            .unwrap();

        assert_eq!(result.model_used, "llama2");
        assert_eq!(result.confidence_score, 0.85);
        assert_eq!(result.persona.purpose, "X");
        assert_eq!(result.input_type, AnalysisType::Endpoint);
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_mock() {
        let analyzer = Analyzer::new(FailingBackend, &PersonadConfig::default());

        let result = analyzer
            .analyze(&request("/users/123/follow", AnalysisType::Endpoint))
            .await
            .unwrap();

        assert_eq!(result.model_used, MOCK_MODEL);
        assert_eq!(result.confidence_score, 0.7);
        assert!(result.persona.purpose.contains("follow"));
        assert_eq!(result.persona.authentication_friction, Sensitivity::High);
        assert_eq!(
            result.raw_model_output,
            mock::generate("/users/123/follow", AnalysisType::Endpoint)
        );
    }

    #[tokio::test]
    async fn empty_input_fails_before_generation() {
        let backend = CannedBackend::new("whatever");
        let analyzer = Analyzer::new(backend, &PersonadConfig::default());

        let err = analyzer
            .analyze(&request("   ", AnalysisType::Endpoint))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalyzeError::Validation(ValidationError::MissingField(_))
        ));
        assert_eq!(analyzer.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn request_model_option_overrides_default() {
        let backend = CannedBackend::new("**Purpose**: X");
        let analyzer = Analyzer::new(backend, &PersonadConfig::default());

        let mut req = request("/orders", AnalysisType::Endpoint);
        req.options.model = Some("qwen2.5:7b-instruct".to_string());

        let result = analyzer.analyze(&req).await.unwrap();
        assert_eq!(result.model_used, "qwen2.5:7b-instruct");
    }

    #[tokio::test]
    async fn personas_never_carry_empty_text_fields() {
        let analyzer = Analyzer::new(FailingBackend, &PersonadConfig::default());

        for (input, analysis_type) in [
            ("/users/5", AnalysisType::Endpoint),
            ("https://example.com/openapi.json", AnalysisType::OpenapiUrl),
            ("openapi: 3.0.0", AnalysisType::OpenapiSpec),
        ] {
            let result = analyzer
                .analyze(&request(input, analysis_type))
                .await
                .unwrap();
            assert!(!result.persona.purpose.is_empty());
            assert!(!result.persona.audience.is_empty());
            assert!(!result.persona.example_use_case.is_empty());
        }
    }
}
