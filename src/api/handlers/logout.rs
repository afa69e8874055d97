use super::{fatal, fatal_with_session};
use crate::auth::AuthState;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{info, instrument};

// axum handler for POST /logout
#[instrument(skip_all)]
pub async fn logout(state: Extension<Arc<AuthState>>, headers: HeaderMap) -> Response {
    let mut session = match state.sessions().start(&headers).await {
        Ok(session) => session,
        Err(err) => return fatal(&err),
    };
    let expired = match state.sessions().expired_cookie() {
        Ok(cookie) => cookie,
        Err(err) => return fatal_with_session(&state, &session, &err).await,
    };

    session.data.clear();
    state.sessions().destroy(&session).await;
    info!("session destroyed");

    let mut response = Redirect::to("/login").into_response();
    response.headers_mut().append(SET_COOKIE, expired);
    response
}
