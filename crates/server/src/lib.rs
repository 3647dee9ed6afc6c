use accounts::AccountsError;
use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};

use serde::Serialize;
pub use axum_extra::extract::cookie::SameSite;
pub use server::{
    CookieSettings, RouterError, STATIC_FILES, ServerConfig, ServerState, router, serve,
};

mod api;
mod server;
mod session;
mod views;

pub mod types {
    pub mod session {
        pub use crate::api::{Credentials, SessionStatus};
    }
}

pub enum ServerError {
    Accounts(AccountsError),
    Template(minijinja::Error),
    Payload(JsonRejection),
    Unauthorized,
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_accounts_error(err: &AccountsError) -> StatusCode {
    match err {
        AccountsError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        AccountsError::ExistingKey(_) => StatusCode::CONFLICT,
        AccountsError::Forbidden(_) => StatusCode::FORBIDDEN,
        AccountsError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AccountsError::PasswordHash(_) | AccountsError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_accounts_error(err: AccountsError) -> String {
    match err {
        AccountsError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        AccountsError::PasswordHash(hash_err) => {
            tracing::error!("password hash error: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Accounts(err) => (
                status_for_accounts_error(&err),
                message_for_accounts_error(err),
            ),
            ServerError::Template(err) => {
                tracing::error!("template error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Payload(rejection) => (rejection.status(), rejection.body_text()),
            ServerError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<AccountsError> for ServerError {
    fn from(value: AccountsError) -> Self {
        Self::Accounts(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Payload(value)
    }
}

impl From<minijinja::Error> for ServerError {
    fn from(value: minijinja::Error) -> Self {
        Self::Template(value)
    }
}
