//! Capability interfaces the HTTP layer consults before running an
//! analysis: authentication, authorization, and rate limiting.
//!
//! Each is a trait over a normalized descriptor so implementations stay
//! decoupled from any particular web framework. The analysis pipeline
//! itself never depends on these.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

/// Framework-neutral view of an inbound request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Stable key for the caller: client IP, or "ip-userid" when
    /// an authenticated identity is known.
    pub client_key: String,
    pub path: String,
    pub method: String,
}

impl RequestDescriptor {
    pub fn new(client_key: impl Into<String>, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            client_key: client_key.into(),
            path: path.into(),
            method: method.into(),
        }
    }
}

/// Allow/deny outcome with a caller-facing reason on deny.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub role: String,
    pub blocked: bool,
}

/// Verifies a bearer token and resolves the caller's identity.
/// Returns `None` for missing, unknown, or blocked credentials.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, bearer_token: Option<&str>) -> Option<Identity>;
}

/// Token-table authenticator. Suitable for tests and single-tenant
/// deployments; production setups supply their own implementation.
#[derive(Debug, Default)]
pub struct StaticAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl StaticAuthenticator {
    pub fn new(tokens: HashMap<String, Identity>) -> Self {
        Self { tokens }
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, bearer_token: Option<&str>) -> Option<Identity> {
        let token = bearer_token?;
        let identity = self.tokens.get(token)?;
        if identity.blocked {
            warn!("authentication rejected: user {} is blocked", identity.id);
            return None;
        }
        Some(identity.clone())
    }
}

/// Ownership-or-admin check against a resource id.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, identity: &Identity, resource_id: Option<&str>) -> Decision;
}

/// Admins pass; owners pass; everyone else is denied.
///
/// When no resource id is in play the original behavior was to allow
/// (list endpoints filter by user downstream). That stays the default
/// but is an explicit knob here.
pub struct OwnershipAuthorizer {
    owners: HashMap<String, String>,
    permissive_when_unscoped: bool,
}

impl OwnershipAuthorizer {
    pub fn new(owners: HashMap<String, String>) -> Self {
        Self {
            owners,
            permissive_when_unscoped: true,
        }
    }

    pub fn with_strict_unscoped(mut self) -> Self {
        self.permissive_when_unscoped = false;
        self
    }
}

impl Authorizer for OwnershipAuthorizer {
    fn authorize(&self, identity: &Identity, resource_id: Option<&str>) -> Decision {
        if identity.role.eq_ignore_ascii_case("admin") {
            return Decision::Allow;
        }

        let Some(resource_id) = resource_id else {
            return if self.permissive_when_unscoped {
                Decision::Allow
            } else {
                Decision::Deny("resource scope required".to_string())
            };
        };

        match self.owners.get(resource_id) {
            Some(owner) if *owner == identity.id => Decision::Allow,
            Some(_) => {
                warn!(
                    "access denied: user {} does not own resource {}",
                    identity.id, resource_id
                );
                Decision::Deny("you do not own this resource".to_string())
            }
            None => Decision::Deny("resource not found".to_string()),
        }
    }
}

/// Per-caller request throttling.
pub trait RateLimiter: Send + Sync {
    fn check(&self, descriptor: &RequestDescriptor) -> Decision;
}

/// No-op limiter.
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn check(&self, _descriptor: &RequestDescriptor) -> Decision {
        Decision::Allow
    }
}

/// Throttling tier, picked from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Tier {
    General,
    Sensitive,
    Auth,
}

/// Paths exempt from throttling.
const SKIP_PATHS: &[&str] = &["/health", "/_health", "/favicon.ico", "/documentation", "/v1/health"];

/// Fixed-window rate limiter with three tiers: a general API budget,
/// a strict budget for sensitive paths, and a separate budget for
/// authentication attempts.
pub struct WindowRateLimiter {
    window: Duration,
    max_general: u32,
    max_sensitive: u32,
    max_auth: u32,
    windows: Mutex<HashMap<(Tier, String), (Instant, u32)>>,
}

impl WindowRateLimiter {
    pub fn new(window: Duration, max_general: u32, max_sensitive: u32, max_auth: u32) -> Self {
        Self {
            window,
            max_general,
            max_sensitive,
            max_auth,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn tier_for(path: &str) -> Tier {
        if path.contains("/auth/local") || path.contains("/auth/register") {
            Tier::Auth
        } else if path.contains("/auth/")
            || path.contains("/users-permissions/")
            || path.contains("/webhook/")
        {
            Tier::Sensitive
        } else {
            Tier::General
        }
    }

    fn max_for(&self, tier: Tier) -> u32 {
        match tier {
            Tier::General => self.max_general,
            Tier::Sensitive => self.max_sensitive,
            Tier::Auth => self.max_auth,
        }
    }

    fn check_at(&self, descriptor: &RequestDescriptor, now: Instant) -> Decision {
        if SKIP_PATHS.iter().any(|p| descriptor.path.starts_with(p)) {
            return Decision::Allow;
        }

        let tier = Self::tier_for(&descriptor.path);
        let max = self.max_for(tier);

        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic elsewhere; failing open keeps
            // the API serving.
            Err(poisoned) => poisoned.into_inner(),
        };

        let entry = windows
            .entry((tier, descriptor.client_key.clone()))
            .or_insert((now, 0));

        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }

        if entry.1 >= max {
            warn!(
                "rate limit exceeded for {} on {} {}",
                descriptor.client_key, descriptor.method, descriptor.path
            );
            return Decision::Deny(
                "Rate limit exceeded. Please wait before making more requests.".to_string(),
            );
        }

        entry.1 += 1;
        Decision::Allow
    }
}

impl RateLimiter for WindowRateLimiter {
    fn check(&self, descriptor: &RequestDescriptor) -> Decision {
        self.check_at(descriptor, Instant::now())
    }
}
