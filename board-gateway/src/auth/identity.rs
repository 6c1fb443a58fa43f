use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use gateway_core::context::{Identity, RequestContext};
use gateway_core::error::AppError;
use gateway_core::middleware::tracing::request_id;

use super::token::TokenVerifier;

/// Authenticates requests from the `Authorization` header.
pub struct IdentityExtractor {
    verifier: Arc<dyn TokenVerifier>,
    scheme: String,
    request_timeout: Duration,
}

impl IdentityExtractor {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        scheme: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            verifier,
            scheme: scheme.into(),
            request_timeout,
        }
    }

    /// The credential part of `<scheme> <credential>`. Anything other than
    /// exactly two whitespace separated parts with a matching scheme is
    /// malformed.
    pub fn credential<'h>(&self, header: Option<&'h str>) -> Result<&'h str, AppError> {
        let mut parts = header.unwrap_or_default().split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(credential), None) if scheme.eq_ignore_ascii_case(&self.scheme) => {
                Ok(credential)
            }
            _ => Err(AppError::InvalidAuthorization),
        }
    }

    /// Identity and raw credential for the given header value.
    pub fn extract(&self, header: Option<&str>) -> Result<(Identity, String), AppError> {
        let credential = self.credential(header)?;
        let identity = self
            .verifier
            .verify(credential)
            .map_err(|e| AppError::InvalidToken(anyhow::Error::new(e)))?;
        Ok((identity, credential.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Middleware attaching a [`RequestContext`] to authenticated requests.
/// Rejected requests never reach the handler.
pub async fn authenticate(
    State(extractor): State<Arc<IdentityExtractor>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AppError::InvalidAuthorization)?),
        None => None,
    };

    let (identity, credential) = extractor.extract(header).map_err(|err| {
        tracing::debug!(error = %err, "request not authenticated");
        err
    })?;

    let ctx = RequestContext::new(
        identity,
        credential,
        request_id(req.headers()),
        extractor.request_timeout(),
    );
    tracing::debug!(user_id = %ctx.subject(), "request authenticated");
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
