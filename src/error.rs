use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Erreurs par champ : {"email": ["..."], "password": ["..."]}
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Operation not permitted on protected account '{0}'")]
    ProtectedAccount(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }

    pub fn not_found(resource: &str, id: i32) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn admin_required() -> Self {
        ApiError::Forbidden("Admin role required".to_string())
    }

    pub fn authentication_required() -> Self {
        ApiError::Unauthenticated("Authentication credentials were not provided".to_string())
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => "validation_error",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::AccountSuspended => "account_suspended",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Unauthenticated(_) => "authentication_error",
            ApiError::Forbidden(_) => "authorization_error",
            ApiError::ProtectedAccount(_) => "protected_resource",
            ApiError::NotFound(_) => "not_found",
            ApiError::Database(_) | ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::AccountSuspended
            | ApiError::InvalidToken
            | ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) | ApiError::ProtectedAccount(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(fields) => json!({
                "error": self.to_string(),
                "code": self.code(),
                "fields": fields,
            }),
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({ "error": "A database error occurred", "code": self.code() })
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "error": "An internal error occurred", "code": self.code() })
            }
            _ => json!({ "error": self.to_string(), "code": self.code() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid value ({})", e.code),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        ApiError::Validation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 6, message = "too short"))]
        password: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::field("email", "taken").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AccountSuspended.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::admin_required().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::ProtectedAccount("admin1".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::not_found("Service", 3).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_errors_are_keyed_by_field() {
        let sample = Sample { password: "abc".into() };
        let error: ApiError = sample.validate().unwrap_err().into();

        match error {
            ApiError::Validation(fields) => {
                assert_eq!(fields.get("password"), Some(&vec!["too short".to_string()]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
