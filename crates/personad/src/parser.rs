//! Tolerant parser that turns free-form model output into a Persona.
//!
//! Total function: anything it cannot extract degrades to field
//! defaults, and blank input degrades to a whole-record fallback. The
//! orchestrator's parsing phase can therefore never fail.

use once_cell::sync::Lazy;
use persona_common::{AnalysisType, BusinessModel, Persona, Sensitivity};
use regex::Regex;
use tracing::debug;

// Sections are `**Label**: value` up to the next `**` marker or end of
// text, case-insensitive, newlines allowed inside the span.
static PURPOSE_RE: Lazy<Regex> = Lazy::new(|| section_re("Purpose"));
static AUDIENCE_RE: Lazy<Regex> = Lazy::new(|| section_re("Audience"));
static BUSINESS_RE: Lazy<Regex> = Lazy::new(|| section_re("Business Model"));
static USE_CASE_RE: Lazy<Regex> = Lazy::new(|| section_re("Example Use Case"));

// Scale fields take a single token only.
static SENSITIVITY_RE: Lazy<Regex> = Lazy::new(|| token_re("Data Sensitivity"));
static FRICTION_RE: Lazy<Regex> = Lazy::new(|| token_re("Authentication Friction"));

fn section_re(label: &str) -> Regex {
    Regex::new(&format!(r"(?is)\*\*{label}\*\*:\s*(.*?)(?:\*\*|$)")).unwrap()
}

fn token_re(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\*\*{label}\*\*:\s*(\w+)")).unwrap()
}

/// Pull one section's text: trimmed, clipped to its first line.
fn capture_section(re: &Regex, raw: &str) -> Option<String> {
    let captured = re.captures(raw)?.get(1)?.as_str().trim().to_string();
    let first_line = captured.lines().next().unwrap_or("").trim().to_string();
    if first_line.is_empty() {
        None
    } else {
        Some(first_line)
    }
}

/// Extract a Persona from raw model output.
///
/// Two fallback tiers: per-field heuristics keyed off the original
/// input when `purpose` could not be extracted, and a whole-record
/// fallback when the raw text is blank.
pub fn parse(raw: &str, original_input: &str, analysis_type: AnalysisType) -> Persona {
    if raw.trim().is_empty() {
        debug!("No model output to parse, using fallback persona");
        return fallback_persona(original_input, analysis_type);
    }

    let mut persona = Persona::default();

    if let Some(purpose) = capture_section(&PURPOSE_RE, raw) {
        persona.purpose = purpose;
    }
    if let Some(audience) = capture_section(&AUDIENCE_RE, raw) {
        persona.audience = audience;
    }
    if let Some(use_case) = capture_section(&USE_CASE_RE, raw) {
        persona.example_use_case = use_case;
    }

    if let Some(captures) = SENSITIVITY_RE.captures(raw) {
        if let Some(level) = Sensitivity::parse_token(&captures[1]) {
            persona.data_sensitivity = level;
        }
    }
    if let Some(captures) = FRICTION_RE.captures(raw) {
        if let Some(level) = Sensitivity::parse_token(&captures[1]) {
            persona.authentication_friction = level;
        }
    }
    if let Some(section) = capture_section(&BUSINESS_RE, raw) {
        if let Some(model) = BusinessModel::find_in(&section) {
            persona.business_model = model;
        }
    }

    // Nothing usable extracted for purpose: fill from input keywords.
    if persona.purpose.is_empty() {
        if original_input.contains("user") {
            persona.purpose = "User management and data operations".to_string();
            persona.audience = "Frontend and mobile developers".to_string();
        } else if original_input.contains("auth") {
            persona.purpose = "Authentication and authorization services".to_string();
            persona.audience = "Application developers".to_string();
            persona.data_sensitivity = Sensitivity::High;
        } else {
            let subject = original_input
                .split_whitespace()
                .nth(1)
                .unwrap_or(original_input);
            persona.purpose = format!("API functionality for {subject}");
            persona.audience = "Application developers".to_string();
        }
    }

    // Returned personas never carry empty text fields.
    if persona.audience.is_empty() {
        persona.audience = "Application developers".to_string();
    }
    if persona.example_use_case.is_empty() {
        persona.example_use_case = default_use_case(original_input);
    }

    persona
}

/// Whole-record fallback when there is no model output at all.
fn fallback_persona(original_input: &str, analysis_type: AnalysisType) -> Persona {
    Persona {
        purpose: format!("Analysis of {analysis_type}: {original_input}"),
        audience: "Application developers".to_string(),
        example_use_case: default_use_case(original_input),
        ..Persona::default()
    }
}

fn default_use_case(original_input: &str) -> String {
    let domain = if original_input.contains("user") {
        "user management"
    } else {
        "business"
    };
    format!("Integration with {domain} systems")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TEMPLATE: &str = "**Purpose**: X\n\
                                 **Audience**: Y\n\
                                 **Data Sensitivity**: high\n\
                                 **Authentication Friction**: low\n\
                                 **Business Model**: SaaS\n\
                                 **Example Use Case**: Z";

    #[test]
    fn exact_template_round_trip() {
        let persona = parse(FULL_TEMPLATE, "/orders", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "X");
        assert_eq!(persona.audience, "Y");
        assert_eq!(persona.data_sensitivity, Sensitivity::High);
        assert_eq!(persona.authentication_friction, Sensitivity::Low);
        assert_eq!(persona.business_model, BusinessModel::SaaS);
        assert_eq!(persona.example_use_case, "Z");
    }

    #[test]
    fn labels_match_case_insensitively() {
        let raw = "**purpose**: track shipments\n**AUDIENCE**: logistics teams";
        let persona = parse(raw, "/shipments", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "track shipments");
        assert_eq!(persona.audience, "logistics teams");
    }

    #[test]
    fn out_of_scale_token_keeps_default() {
        let raw = "**Purpose**: X\n**Data Sensitivity**: critical";
        let persona = parse(raw, "/x", AnalysisType::Endpoint);
        assert_eq!(persona.data_sensitivity, Sensitivity::Medium);
    }

    #[test]
    fn section_clipped_to_first_line() {
        let raw = "**Purpose**: manages orders\nand also ships them\n**Audience**: devs";
        let persona = parse(raw, "/orders", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "manages orders");
    }

    #[test]
    fn business_model_matched_as_substring() {
        let raw = "**Purpose**: X\n**Business Model**: probably a monetized offering";
        let persona = parse(raw, "/x", AnalysisType::Endpoint);
        assert_eq!(persona.business_model, BusinessModel::Monetized);

        let raw = "**Purpose**: X\n**Business Model**: freemium something";
        let persona = parse(raw, "/x", AnalysisType::Endpoint);
        assert_eq!(persona.business_model, BusinessModel::SaaS);
    }

    #[test]
    fn mock_templates_parse_cleanly() {
        let raw = crate::mock::generate("/users/123/follow", AnalysisType::Endpoint);
        let persona = parse(&raw, "/users/123/follow", AnalysisType::Endpoint);
        assert!(persona.purpose.contains("follow"));
        assert_eq!(persona.authentication_friction, Sensitivity::High);
        assert_eq!(persona.business_model, BusinessModel::SaaS);
    }

    #[test]
    fn user_keyword_heuristic_when_purpose_missing() {
        let persona = parse("no sections here", "/users/42", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "User management and data operations");
        assert_eq!(persona.audience, "Frontend and mobile developers");
    }

    #[test]
    fn auth_keyword_heuristic_forces_high_sensitivity() {
        let persona = parse("no sections here", "/auth/token", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "Authentication and authorization services");
        assert_eq!(persona.data_sensitivity, Sensitivity::High);
    }

    #[test]
    fn generic_heuristic_uses_second_token() {
        let persona = parse("junk", "GET /orders/7", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "API functionality for /orders/7");

        let persona = parse("junk", "/orders", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "API functionality for /orders");
    }

    #[test]
    fn empty_raw_text_yields_catastrophic_fallback() {
        let persona = parse("", "/orders/7", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "Analysis of endpoint: /orders/7");
        assert_eq!(persona.audience, "Application developers");
        assert_eq!(persona.example_use_case, "Integration with business systems");
        assert_eq!(persona.data_sensitivity, Sensitivity::Medium);
        assert_eq!(persona.business_model, BusinessModel::SaaS);

        let persona = parse("   \n ", "/users", AnalysisType::OpenapiUrl);
        assert_eq!(persona.purpose, "Analysis of openapi_url: /users");
        assert_eq!(
            persona.example_use_case,
            "Integration with user management systems"
        );
    }

    #[test]
    fn no_empty_text_fields_for_partial_output() {
        // Purpose extracted but nothing else still yields a full persona.
        let persona = parse("**Purpose**: X", "/orders", AnalysisType::Endpoint);
        assert_eq!(persona.purpose, "X");
        assert!(!persona.audience.is_empty());
        assert!(!persona.example_use_case.is_empty());
    }
}
