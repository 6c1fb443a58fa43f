use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(#[source] anyhow::Error),

    #[error("Authorization header is invalid")]
    InvalidAuthorization,

    #[error("Invalid token: {0}")]
    InvalidToken(#[source] anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Downstream call failed: {0}")]
    Downstream(#[from] tonic::Status),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[source] anyhow::Error),

    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wraps the error with a description of the step that failed. The
    /// wrapped error stays reachable through `source()`.
    pub fn context(self, context: impl Into<String>) -> Self {
        AppError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        AppError::Forbidden(detail.into())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Finds an `AppError` behind a `dyn Error`, including the boxed cause held by
/// [`AppError::Context`].
pub fn as_app_error<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a AppError> {
    err.downcast_ref::<AppError>()
        .or_else(|| err.downcast_ref::<Box<AppError>>().map(|boxed| boxed.as_ref()))
}

/// Ordered list of errors recorded while handling one request.
///
/// Handlers and middleware never render error bodies themselves. They return
/// records, which travel in the response extensions until the error
/// normalizer turns them into the single error body sent to the client.
#[derive(Debug, Clone, Default)]
pub struct ErrorRecords(Vec<Arc<AppError>>);

impl ErrorRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, err: impl Into<AppError>) {
        self.0.push(Arc::new(err.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Records from the oldest to the newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AppError> {
        self.0.iter().map(|err| err.as_ref())
    }
}

impl From<AppError> for ErrorRecords {
    fn from(err: AppError) -> Self {
        let mut records = ErrorRecords::new();
        records.record(err);
        records
    }
}

impl From<tonic::Status> for ErrorRecords {
    fn from(status: tonic::Status) -> Self {
        AppError::from(status).into()
    }
}

impl From<validator::ValidationErrors> for ErrorRecords {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::from(err).into()
    }
}

impl IntoResponse for ErrorRecords {
    fn into_response(self) -> Response {
        // Placeholder status; the error normalizer replaces the whole response.
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ErrorRecords::from(self).into_response()
    }
}

/// Result type for HTTP handlers.
pub type HandlerResult<T> = Result<T, ErrorRecords>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn records_keep_insertion_order() {
        let mut records = ErrorRecords::new();
        records.record(AppError::not_found("board"));
        records.record(tonic::Status::internal("boom"));

        let kinds: Vec<_> = records.iter().map(|err| err.to_string()).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds[0].starts_with("Not found"));
        assert!(kinds[1].starts_with("Downstream call failed"));
    }

    #[test]
    fn context_keeps_the_cause_reachable() {
        let err = AppError::not_found("card").context("locating cards");
        let source = err.source().expect("context must expose its cause");
        assert!(matches!(as_app_error(source), Some(AppError::NotFound(_))));
    }

    #[test]
    fn into_response_carries_records_in_extensions() {
        let response = AppError::InvalidAuthorization.into_response();
        let records = response
            .extensions()
            .get::<ErrorRecords>()
            .expect("records must be attached");
        assert_eq!(records.len(), 1);
    }
}
