//! Deterministic fallback generator used when Ollama is unreachable.
//!
//! Pure string-in, string-out: the same `(input, type)` always yields
//! byte-identical output. Templates carry the same six `**Label**:`
//! sections as the live prompt so the parser treats both sources alike.

use persona_common::AnalysisType;

/// Produce a canned analysis for the given input.
///
/// Endpoint inputs are matched against known path patterns in order;
/// first match wins. Everything else gets the generic template.
pub fn generate(input: &str, analysis_type: AnalysisType) -> String {
    if analysis_type == AnalysisType::Endpoint {
        if input.contains("/users") && input.contains("follow") {
            return "**Purpose**: Social following functionality - allows users to follow/unfollow other users\n\
                    **Audience**: Social media and creator platform developers\n\
                    **Data Sensitivity**: medium — involves user relationships and social connections\n\
                    **Authentication Friction**: high — requires authenticated user to perform social actions\n\
                    **Business Model**: SaaS — typical social platform feature\n\
                    **Example Use Case**: Instagram-like app where users can follow content creators"
                .to_string();
        } else if input.contains("/users") {
            return "**Purpose**: User profile management - retrieves or updates user profile information\n\
                    **Audience**: Frontend developers building user account features\n\
                    **Data Sensitivity**: medium — contains personal user information\n\
                    **Authentication Friction**: medium — user must be authenticated to access profiles\n\
                    **Business Model**: SaaS — core user management functionality\n\
                    **Example Use Case**: Profile pages in social apps, account settings in web applications"
                .to_string();
        } else if input.contains("/auth") || input.contains("/login") {
            return "**Purpose**: User authentication and authorization services\n\
                    **Audience**: Application developers implementing login systems\n\
                    **Data Sensitivity**: high — handles sensitive authentication credentials\n\
                    **Authentication Friction**: low — this IS the authentication endpoint\n\
                    **Business Model**: Internal — core authentication infrastructure\n\
                    **Example Use Case**: Login flows for web and mobile applications"
                .to_string();
        } else if input.contains("/products") || input.contains("/reviews") {
            return "**Purpose**: E-commerce product and review management\n\
                    **Audience**: E-commerce platform developers and retailers\n\
                    **Data Sensitivity**: low — public product information and reviews\n\
                    **Authentication Friction**: low — product data typically public, reviews may require auth\n\
                    **Business Model**: SaaS — e-commerce platform service\n\
                    **Example Use Case**: Online stores, marketplace platforms, review systems"
                .to_string();
        }
    }

    format!(
        "**Purpose**: API functionality for {input}\n\
         **Audience**: Application developers and system integrators\n\
         **Data Sensitivity**: medium — standard API data handling\n\
         **Authentication Friction**: medium — likely requires authentication\n\
         **Business Model**: SaaS — business API service\n\
         **Example Use Case**: Integration with business applications and workflows"
    )
}
