use chrono::{DateTime, Utc};
use gateway_core::grpc::proto::{UpdateUserRequest, UserResponse, UsersRequest};
use gateway_core::grpc::timestamp_to_datetime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserResponse> for UserView {
    fn from(user: UserResponse) -> Self {
        Self {
            created_at: timestamp_to_datetime(user.created_at.as_ref()),
            user_id: user.user_id,
            name: user.name,
            email: user.email,
        }
    }
}

pub fn users_request(user_id: &str) -> UsersRequest {
    UsersRequest {
        page_index: 0,
        page_size: 1,
        user_ids: vec![user_id.to_string()],
    }
}

/// Partial profile update. Changing the password needs the old one and the
/// new one typed twice.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_passwords"))]
pub struct UpdateUserDto {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    #[validate(email, length(min = 3, max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 64))]
    pub old_password: Option<String>,
    #[validate(length(min = 8, max = 64))]
    pub new_password: Option<String>,
    #[validate(length(min = 8, max = 64))]
    pub repeat_new_password: Option<String>,
}

fn validate_passwords(dto: &UpdateUserDto) -> Result<(), ValidationError> {
    if dto.new_password.is_none() {
        return Ok(());
    }
    if dto.old_password.is_none() {
        let mut error = ValidationError::new("required_with");
        error.message = Some("old_password is required to set a new password".into());
        return Err(error);
    }
    if dto.new_password != dto.repeat_new_password {
        let mut error = ValidationError::new("eqfield");
        error.message = Some("new_password must match repeat_new_password".into());
        return Err(error);
    }
    Ok(())
}

impl UpdateUserDto {
    pub fn into_request(self, user_id: String) -> UpdateUserRequest {
        UpdateUserRequest {
            user_id,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            old_password: self.old_password.unwrap_or_default(),
            new_password: self.new_password.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(json: &str) -> UpdateUserDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(dto("{}").validate().is_ok());
    }

    #[test]
    fn new_password_requires_old_and_repeat() {
        assert!(dto(r#"{"new_password":"secret-123","repeat_new_password":"secret-123"}"#)
            .validate()
            .is_err());
        assert!(dto(
            r#"{"old_password":"old-secret","new_password":"secret-123","repeat_new_password":"secret-124"}"#
        )
        .validate()
        .is_err());
        assert!(dto(
            r#"{"old_password":"old-secret","new_password":"secret-123","repeat_new_password":"secret-123"}"#
        )
        .validate()
        .is_ok());
    }

    #[test]
    fn email_must_be_well_formed() {
        let errors = dto(r#"{"email":"nope"}"#).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn request_omits_the_repeat() {
        let request = dto(r#"{"name":"Ada Lovelace"}"#).into_request("u-1".to_string());
        assert_eq!(request.user_id, "u-1");
        assert_eq!(request.name, "Ada Lovelace");
        assert!(request.new_password.is_empty());
    }
}
