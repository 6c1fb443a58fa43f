//! Per-request context shared by every downstream call a handler makes.

use std::time::{Duration, Instant};

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// Immutable per-request value built once the caller has been authenticated.
///
/// Carries the caller identity, the raw credential forwarded to downstream
/// services, the correlation id and the deadline every outgoing call inherits.
#[derive(Debug, Clone)]
pub struct RequestContext {
    identity: Identity,
    credential: String,
    request_id: String,
    deadline: Instant,
}

impl RequestContext {
    pub fn new(
        identity: Identity,
        credential: impl Into<String>,
        request_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            identity,
            credential: credential.into(),
            request_id: request_id.into(),
            deadline: Instant::now() + timeout,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Subject used in capability checks.
    pub fn subject(&self) -> &str {
        &self.identity.user_id
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("request context missing; is the identity middleware installed?");
                AppError::InternalError(anyhow::anyhow!("request context missing"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: "u-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn remaining_never_underflows() {
        let ctx = RequestContext::new(identity(), "token", "req-1", Duration::ZERO);
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }

    #[test]
    fn subject_is_the_user_id() {
        let ctx = RequestContext::new(identity(), "token", "req-1", Duration::from_secs(5));
        assert_eq!(ctx.subject(), "u-1");
        assert!(ctx.remaining() <= Duration::from_secs(5));
    }
}
