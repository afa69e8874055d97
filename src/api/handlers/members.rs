use super::{fatal, fatal_with_session, html_page, user_agent, with_session, LOGOUT_FORM};
use crate::auth::{self, sanitize::escape_html, AuthState};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, instrument};

// axum handler for GET /members
#[instrument(skip_all)]
pub async fn members(state: Extension<Arc<AuthState>>, headers: HeaderMap) -> Response {
    let session = match state.sessions().start(&headers).await {
        Ok(session) => session,
        Err(err) => return fatal(&err),
    };

    match auth::login_check(state.store(), &session.data, user_agent(&headers)).await {
        Ok(true) => {
            let username = session.data.username.as_deref().unwrap_or_default();
            let body = format!(
                "<p>Welcome {}!</p>\n<p>This is an example protected page.</p>\n{LOGOUT_FORM}",
                escape_html(username)
            );
            with_session(&state, &session, html_page("Secure Login: Protected Page", &body)).await
        }
        Ok(false) => {
            debug!("members page requested without a valid session");
            let page = html_page(
                "Secure Login: Protected Page",
                "<p><span class=\"error\">You are not authorized to access this page.</span> \
                 Please <a href=\"/login\">login</a>.</p>",
            );
            with_session(&state, &session, (StatusCode::UNAUTHORIZED, page)).await
        }
        Err(err) => fatal_with_session(&state, &session, &err).await,
    }
}
