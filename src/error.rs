use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        self.code == 101
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == 102
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            102 => (StatusCode::NOT_FOUND, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 100,
        message: "invalid input".into(),
    }
}

pub fn validation_error(message: &str) -> Error {
    Error {
        code: 101,
        message: message.into(),
    }
}

pub fn unknown_feature_error(tag: &str) -> Error {
    validation_error(&format!("Unknown accessibility feature: {}", tag))
}

pub fn not_found_error() -> Error {
    Error {
        code: 102,
        message: "place not found".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::debug!("database error: {:?}", err);

    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::debug!("reqwest error: {:?}", err);

    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

pub fn invalid_config_error(key: &str) -> Error {
    Error {
        code: 6,
        message: format!("invalid configuration value for {}", key),
    }
}

#[test]
fn error_kinds_test() {
    assert!(validation_error("Please fill required fields.").is_validation_error());
    assert!(not_found_error().is_not_found_error());
    assert!(!upstream_error().is_validation_error());
    assert!(unknown_feature_error("teleporter").is_validation_error());
    assert_eq!(
        validation_error("Please fill required fields.").message,
        "Please fill required fields."
    );
}

#[test]
fn error_status_test() {
    assert_eq!(
        upstream_error().into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        validation_error("missing").into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        not_found_error().into_response().status(),
        StatusCode::NOT_FOUND
    );
}
