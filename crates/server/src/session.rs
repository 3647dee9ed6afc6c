//! Glue between the cookie jar and [`accounts::Accounts`] sessions.

use accounts::users;
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{CookieSettings, ServerError, ServerState};

fn session_key(state: &ServerState, jar: &CookieJar) -> Option<String> {
    jar.get(&state.cookie.name)
        .map(|cookie| cookie.value().to_owned())
}

/// User behind the request's session cookie, if any.
pub(crate) async fn current_user(
    state: &ServerState,
    jar: &CookieJar,
) -> Result<Option<users::Model>, ServerError> {
    match session_key(state, jar) {
        Some(key) => Ok(state.accounts.session_user(&key).await?),
        None => Ok(None),
    }
}

/// Log `user` in and hand the fresh key back in the jar. Whatever key the
/// request carried is retired.
pub(crate) async fn login(
    state: &ServerState,
    jar: CookieJar,
    user: &users::Model,
) -> Result<CookieJar, ServerError> {
    let previous = session_key(state, &jar);
    let session = state.accounts.login(user, previous.as_deref()).await?;
    let max_age = state.accounts.session_ttl().num_seconds();

    Ok(jar.add(session_cookie(&state.cookie, session.session_key, max_age)))
}

pub(crate) async fn logout(state: &ServerState, jar: CookieJar) -> Result<CookieJar, ServerError> {
    if let Some(key) = session_key(state, &jar) {
        state.accounts.logout(&key).await?;
    }

    Ok(jar.remove(base_cookie(&state.cookie, String::new())))
}

fn base_cookie(settings: &CookieSettings, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((settings.name.clone(), value))
        .path("/")
        .http_only(true)
        .same_site(settings.same_site)
        .build();

    // `SameSite=None` without `Secure` is dropped by browsers
    if settings.secure || settings.same_site == SameSite::None {
        cookie.set_secure(true);
    }
    cookie
}

fn session_cookie(settings: &CookieSettings, key: String, max_age_secs: i64) -> Cookie<'static> {
    let mut cookie = base_cookie(settings, key);
    cookie.set_max_age(time::Duration::seconds(max_age_secs));
    cookie
}
