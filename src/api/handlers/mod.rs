pub mod error_page;
pub mod health;
pub mod login;
pub mod logout;
pub mod members;
pub mod session;

// common functions for the handlers
use crate::auth::{sanitize::escape_html, AuthError, AuthState, Session};
use axum::{
    http::{
        header::{SET_COOKIE, USER_AGENT},
        HeaderMap,
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

/// The request's `User-Agent`, empty when absent or not valid text.
pub(crate) fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// `303` to the error page carrying `message` in the query string.
pub(crate) fn redirect_to_error(message: &str) -> Response {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("/error?err={encoded}")).into_response()
}

/// Log a fatal auth failure and send the browser to the error page.
pub(crate) fn fatal(err: &AuthError) -> Response {
    error!("{}", err);
    redirect_to_error(&err.to_string())
}

/// Like [`fatal`], for failures after the session was started: the
/// browser already holds the old id only, so the new cookie goes out too.
pub(crate) async fn fatal_with_session(
    state: &AuthState,
    session: &Session,
    err: &AuthError,
) -> Response {
    with_session(state, session, fatal(err)).await
}

/// Persist `session` and attach its cookie to `response`.
pub(crate) async fn with_session(
    state: &AuthState,
    session: &Session,
    response: impl IntoResponse,
) -> Response {
    let cookie = match state.sessions().cookie(session) {
        Ok(cookie) => cookie,
        Err(err) => return fatal(&err),
    };
    state.sessions().save(session).await;

    let mut response = response.into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    response
}

/// Minimal HTML document; `title` is escaped, `body` is trusted markup.
pub(crate) fn html_page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    ))
}

/// Logout button; `/logout` only accepts POST.
pub(crate) const LOGOUT_FORM: &str =
    "<form action=\"/logout\" method=\"post\"><input type=\"submit\" value=\"Logout\"></form>";
