//! Core data model: analysis requests, personas, and analysis results.
//!
//! Wire names are camelCase to match the public JSON contract. The
//! request side accepts `type` for the analysis kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of thing the caller wants analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Endpoint,
    OpenapiUrl,
    OpenapiSpec,
}

impl AnalysisType {
    pub const VALID_TYPES: &'static [&'static str] =
        &["endpoint", "openapi_url", "openapi_spec"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Endpoint => "endpoint",
            AnalysisType::OpenapiUrl => "openapi_url",
            AnalysisType::OpenapiSpec => "openapi_spec",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endpoint" => Ok(AnalysisType::Endpoint),
            "openapi_url" => Ok(AnalysisType::OpenapiUrl),
            "openapi_spec" => Ok(AnalysisType::OpenapiSpec),
            other => Err(crate::error::ValidationError::InvalidType(other.to_string())),
        }
    }
}

/// Per-request options. Only the model override today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Inbound analysis request. Consumed once per HTTP call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub input: String,
    #[serde(rename = "type")]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub options: AnalysisOptions,
}

/// Three-step scale used for data sensitivity and authentication friction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

impl Sensitivity {
    /// Parse a single token, accepting only the three scale values.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "low" => Some(Sensitivity::Low),
            "medium" => Some(Sensitivity::Medium),
            "high" => Some(Sensitivity::High),
            _ => None,
        }
    }
}

/// How the API in question is likely offered to its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessModel {
    Internal,
    SaaS,
    #[serde(rename = "Open API")]
    OpenApi,
    Monetized,
}

impl BusinessModel {
    /// Match order matters: first substring hit wins.
    pub const ALL: &'static [BusinessModel] = &[
        BusinessModel::Internal,
        BusinessModel::SaaS,
        BusinessModel::OpenApi,
        BusinessModel::Monetized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessModel::Internal => "Internal",
            BusinessModel::SaaS => "SaaS",
            BusinessModel::OpenApi => "Open API",
            BusinessModel::Monetized => "Monetized",
        }
    }

    /// Case-insensitive substring match against the allowed values,
    /// in declaration order.
    pub fn find_in(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| lowered.contains(&m.as_str().to_lowercase()))
    }
}

/// Structured six-field summary of an API's purpose and risk profile.
///
/// Every persona handed back to a caller has all six fields populated;
/// the parser fills defaults when extraction comes up empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub purpose: String,
    pub audience: String,
    pub data_sensitivity: Sensitivity,
    pub authentication_friction: Sensitivity,
    pub business_model: BusinessModel,
    pub example_use_case: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            purpose: String::new(),
            audience: String::new(),
            data_sensitivity: Sensitivity::Medium,
            authentication_friction: Sensitivity::Medium,
            business_model: BusinessModel::SaaS,
            example_use_case: String::new(),
        }
    }
}

/// Outcome of one analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Time-derived id, milliseconds since epoch. Not guaranteed unique
    /// under concurrent calls.
    pub id: i64,
    pub input: String,
    pub input_type: AnalysisType,
    pub raw_model_output: String,
    pub persona: Persona,
    pub confidence_score: f64,
    pub model_used: String,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
}
