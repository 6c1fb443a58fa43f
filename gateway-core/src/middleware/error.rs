//! Error normalization: turns the errors recorded during a request into the
//! single JSON error body returned to the client.

use std::error::Error as StdError;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::{as_app_error, AppError, ErrorRecords};
use crate::grpc::error::classify_status;

/// The client-visible error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl ApiError {
    /// Body for a status with the default code and its reason phrase as message.
    pub fn from_status(status: StatusCode) -> Self {
        let code = match status {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            StatusCode::UNPROCESSABLE_ENTITY => "entity_validation",
            StatusCode::INTERNAL_SERVER_ERROR => "server_error",
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            _ => "bad_request",
        };
        Self::new(status, code, status.canonical_reason().unwrap_or_default())
    }

    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self::from_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_errors(Value::Object(validation_details(errors)))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// `{field: {rule: message}}`. Nested structs and list items are flattened into
/// dotted keys such as `data[2].board_id`.
pub fn validation_details(errors: &ValidationErrors) -> Map<String, Value> {
    let mut details = Map::new();
    collect_validation(errors, None, &mut details);
    details
}

fn collect_validation(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Map<String, Value>) {
    for (field, kind) in errors.errors() {
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let entry = out
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(rules) = entry {
                    for error in field_errors {
                        rules.insert(error.code.to_string(), Value::String(error.to_string()));
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_validation(nested, Some(&key), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let item_key = format!("{}[{}]", key, index);
                    collect_validation(nested, Some(&item_key), out);
                }
            }
        }
    }
}

/// Classification of one error in a cause chain, or `None` to keep walking.
fn classify_one(err: &(dyn StdError + 'static)) -> Option<ApiError> {
    if let Some(errors) = err.downcast_ref::<ValidationErrors>() {
        return Some(ApiError::validation(errors));
    }
    if let Some(app) = as_app_error(err) {
        return classify_app_error(app);
    }
    if let Some(status) = err.downcast_ref::<tonic::Status>() {
        return Some(classify_status(status));
    }
    None
}

fn classify_app_error(err: &AppError) -> Option<ApiError> {
    match err {
        AppError::ValidationError(errors) => Some(ApiError::validation(errors)),
        AppError::InvalidAuthorization => Some(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_authorization",
            "Authorization header is invalid",
        )),
        AppError::InvalidToken(_) => Some(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "JWT token is invalid or expired",
        )),
        AppError::Forbidden(_) => Some(ApiError::from_status(StatusCode::FORBIDDEN)),
        AppError::NotFound(_) => Some(ApiError::from_status(StatusCode::NOT_FOUND)),
        AppError::Conflict(_) => Some(ApiError::from_status(StatusCode::CONFLICT)),
        AppError::Downstream(status) => Some(classify_status(status)),
        AppError::InternalError(_)
        | AppError::ConfigError(_)
        | AppError::BadRequest(_)
        | AppError::Context { .. } => None,
    }
}

/// Errors that mean a server fault when nothing further down their chain
/// classifies.
fn is_server_fault(err: &(dyn StdError + 'static)) -> bool {
    matches!(
        as_app_error(err),
        Some(AppError::InternalError(_) | AppError::ConfigError(_))
    )
}

fn classify_chain(err: &(dyn StdError + 'static)) -> Option<ApiError> {
    let mut fallback = None;
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(api_error) = classify_one(err) {
            return Some(api_error);
        }
        if fallback.is_none() && is_server_fault(err) {
            fallback = Some(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        current = err.source();
    }
    fallback
}

/// Picks the response for a request's recorded errors.
///
/// Records are examined newest first; within a record the cause chain is
/// walked outward-in and the first classifiable error wins. Internal and
/// config wrappers only answer 500 once their whole chain has been walked.
/// With nothing classifiable the answer is a plain 400.
pub fn classify(records: &ErrorRecords) -> ApiError {
    records
        .iter()
        .rev()
        .find_map(|record| classify_chain(record))
        .unwrap_or_else(|| ApiError::from_status(StatusCode::BAD_REQUEST))
}

/// Middleware rendering recorded errors. Responses without records pass
/// through untouched, so a handler that already produced its own response is
/// never overwritten.
pub async fn error_normalizer(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let Some(records) = response.extensions_mut().remove::<ErrorRecords>() else {
        return response;
    };
    if records.is_empty() {
        return response;
    }

    let api_error = classify(&records);
    if api_error.status_code().is_server_error() {
        for record in records.iter() {
            tracing::error!(error = %record, status = api_error.status, "request failed");
        }
    } else {
        tracing::debug!(
            status = api_error.status,
            code = api_error.code,
            recorded = records.len(),
            "request rejected"
        );
    }

    api_error.into_response()
}
