use accounts::{seed, users};
use axum::{extract::State, response::Html};
use axum_extra::extract::CookieJar;
use minijinja::context;

use crate::{ServerError, server::ServerState, session};

const INDEX_TEMPLATE: &str = "index.html";

fn render_index(
    state: &ServerState,
    user: Option<&users::Model>,
) -> Result<Html<String>, ServerError> {
    let template = state.templates.get_template(INDEX_TEMPLATE)?;
    let page = template.render(context! {
        user => user.map(|user| user.username.as_str()),
    })?;
    Ok(Html(page))
}

pub async fn index(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<Html<String>, ServerError> {
    let user = session::current_user(&state, &jar).await?;
    render_index(&state, user.as_ref())
}

/// Logs the seed user in on every hit, so the SPA on the static origin can
/// check that the session cookie comes back with its requests.
pub async fn authenticated(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ServerError> {
    let user = state.accounts.user_by_username(seed::USERNAME).await?;
    let jar = session::login(&state, jar, &user).await?;
    let page = render_index(&state, Some(&user))?;

    Ok((jar, page))
}
