//! JSON endpoints the SPA uses to observe and drive its session.

use accounts::users;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState, session};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub username: Option<String>,
}

impl SessionStatus {
    fn from_user(user: Option<&users::Model>) -> Self {
        Self {
            authenticated: user.is_some(),
            username: user.map(|user| user.username.clone()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn status(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<Json<SessionStatus>, ServerError> {
    let user = session::current_user(&state, &jar).await?;
    Ok(Json(SessionStatus::from_user(user.as_ref())))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionStatus>), ServerError> {
    let Json(credentials) = payload?;
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(ServerError::Generic(
            "username and password are required".to_string(),
        ));
    }

    let Some(user) = state
        .accounts
        .authenticate(&credentials.username, &credentials.password)
        .await?
    else {
        tracing::warn!("failed login for \"{}\"", credentials.username);
        return Err(ServerError::Unauthorized);
    };

    let jar = session::login(&state, jar, &user).await?;
    Ok((jar, Json(SessionStatus::from_user(Some(&user)))))
}

pub async fn logout(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ServerError> {
    let jar = session::logout(&state, jar).await?;
    Ok((jar, StatusCode::NO_CONTENT))
}
