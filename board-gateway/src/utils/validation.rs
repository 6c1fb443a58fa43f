use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use gateway_core::error::AppError;
use gateway_core::grpc::proto::BoardType;
use gateway_core::grpc::proto::CardType;
use serde::de::DeserializeOwned;
use uuid::{Uuid, Version};
use validator::{Validate, ValidationError};

/// JSON body that is decoded and then validated. Undecodable bodies are a bad
/// request, failed rules an entity validation error.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// JSON body that is only decoded. Used when the body must be completed from
/// the path before it can be validated.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;
        Ok(JsonBody(value))
    }
}

pub struct ValidatedPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;

        value.validate()?;

        Ok(ValidatedPath(value))
    }
}

pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::Error::new(e)))?;

        value.validate()?;

        Ok(ValidatedQuery(value))
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Ids are random (v4) UUIDs.
pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    match Uuid::parse_str(value) {
        Ok(id) if id.get_version() == Some(Version::Random) => Ok(()),
        _ => Err(invalid("uuid4", "must be a UUID v4")),
    }
}

/// Optional id fields arrive as empty strings when left out.
pub fn validate_uuid_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        validate_uuid(value)
    }
}

pub fn validate_uuid_list(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|value| validate_uuid(value))
}

/// Member roles: at least one, each 1 to 50 characters.
pub fn validate_roles(roles: &[String]) -> Result<(), ValidationError> {
    if roles.is_empty() {
        return Err(invalid("required", "at least one role is required"));
    }
    if roles.iter().any(|role| role.is_empty() || role.chars().count() > 50) {
        return Err(invalid("length", "roles must be 1 to 50 characters"));
    }
    Ok(())
}

pub fn validate_card_type(value: &str) -> Result<(), ValidationError> {
    CardType::from_str_name(value)
        .map(|_| ())
        .ok_or_else(|| invalid("oneof", "must be one of UNK_CARD, TEXT"))
}

pub fn validate_board_type(value: &str) -> Result<(), ValidationError> {
    BoardType::from_str_name(value)
        .map(|_| ())
        .ok_or_else(|| invalid("oneof", "must be one of UNK_BOARD, CARDS"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_v4_uuids_are_accepted() {
        assert!(validate_uuid(&Uuid::new_v4().to_string()).is_ok());
        assert!(validate_uuid("not-a-uuid").is_err());
        // v1 layout
        assert!(validate_uuid("c232ab00-9414-11ec-b3c8-9f6bdeced846").is_err());
    }

    #[test]
    fn uuid_list_fails_on_any_bad_item() {
        let good = Uuid::new_v4().to_string();
        assert!(validate_uuid_list(&[good.clone()]).is_ok());
        assert!(validate_uuid_list(&[good, "x".to_string()]).is_err());
    }

    #[test]
    fn enum_names_follow_the_wire_names() {
        assert!(validate_card_type("TEXT").is_ok());
        assert!(validate_card_type("text").is_err());
        assert!(validate_board_type("CARDS").is_ok());
        assert!(validate_board_type("BOARD").is_err());
    }
}
