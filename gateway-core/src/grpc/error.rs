//! Translation of downstream `tonic::Status` values into HTTP errors.
//!
//! | gRPC Status | HTTP |
//! |-------------|------|
//! | `INTERNAL` | 500 |
//! | `NOT_FOUND` | 404 |
//! | `ALREADY_EXISTS` | 409 |
//! | `UNAUTHENTICATED` | 401 |
//! | `PERMISSION_DENIED` | 403 |
//! | `INVALID_ARGUMENT` carrying `google.rpc.BadRequest` | 400 with field violations |
//! | anything else | 500 |

use std::collections::BTreeMap;

use axum::http::StatusCode;
use tonic::{Code, Status};
use tonic_types::StatusExt;

use crate::middleware::error::ApiError;

/// HTTP status for a downstream code with a fixed mapping.
pub fn http_status(code: Code) -> Option<StatusCode> {
    match code {
        Code::Internal => Some(StatusCode::INTERNAL_SERVER_ERROR),
        Code::NotFound => Some(StatusCode::NOT_FOUND),
        Code::AlreadyExists => Some(StatusCode::CONFLICT),
        Code::Unauthenticated => Some(StatusCode::UNAUTHORIZED),
        Code::PermissionDenied => Some(StatusCode::FORBIDDEN),
        _ => None,
    }
}

/// Field violations grouped by field name, in the order the downstream
/// reported them. `None` when the status carries no `BadRequest` detail.
pub fn field_violations(status: &Status) -> Option<BTreeMap<String, Vec<String>>> {
    let bad_request = status.get_details_bad_request()?;

    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for violation in bad_request.field_violations {
        fields
            .entry(violation.field)
            .or_default()
            .push(violation.description);
    }
    Some(fields)
}

/// Classifies a downstream status. Never fails: unknown codes become 500.
pub fn classify_status(status: &Status) -> ApiError {
    if let Some(code) = http_status(status.code()) {
        return ApiError::from_status(code);
    }

    if status.code() == Code::InvalidArgument {
        if let Some(fields) = field_violations(status) {
            return ApiError::from_status(StatusCode::BAD_REQUEST)
                .with_errors(serde_json::json!(fields));
        }
    }

    ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tonic_types::{ErrorDetails, FieldViolation};

    pub(crate) fn invalid_argument_with_violations(violations: &[(&str, &str)]) -> Status {
        let violations = violations
            .iter()
            .map(|(field, description)| FieldViolation::new(*field, *description))
            .collect::<Vec<_>>();
        Status::with_error_details(
            Code::InvalidArgument,
            "invalid",
            ErrorDetails::with_bad_request(violations),
        )
    }

    #[test]
    fn fixed_codes_map_to_http() {
        let cases = [
            (Status::internal("x"), 500),
            (Status::not_found("x"), 404),
            (Status::already_exists("x"), 409),
            (Status::unauthenticated("x"), 401),
            (Status::permission_denied("x"), 403),
        ];
        for (status, expected) in cases {
            assert_eq!(classify_status(&status).status, expected);
        }
    }

    #[test]
    fn unmapped_codes_become_server_errors() {
        for status in [
            Status::unavailable("down"),
            Status::deadline_exceeded("slow"),
            Status::invalid_argument("no details"),
        ] {
            let api = classify_status(&status);
            assert_eq!(api.status, 500);
            assert_eq!(api.code, "server_error");
        }
    }

    #[test]
    fn bad_request_details_group_by_field() {
        let status = invalid_argument_with_violations(&[
            ("name", "too long"),
            ("name", "reserved"),
            ("color", "unknown"),
        ]);

        let api = classify_status(&status);
        assert_eq!(api.status, 400);
        assert_eq!(api.code, "bad_request");
        assert_eq!(
            api.errors,
            Some(serde_json::json!({
                "color": ["unknown"],
                "name": ["too long", "reserved"],
            }))
        );
    }
}
