use super::{fatal, fatal_with_session, user_agent, with_session};
use crate::auth::{self, AuthState};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionResponse {
    pub user_id: String,
    pub username: String,
}

#[utoipa::path(
    get,
    path= "/session",
    responses (
        (status = 200, description = "Session belongs to a logged-in member", body = SessionResponse, content_type = "application/json"),
        (status = 204, description = "No valid session"),
        (status = 303, description = "Infrastructure failure, redirect to the error page"),
    ),
    tag= "session"
)]
// axum handler for GET /session
#[instrument(skip_all)]
pub async fn session(state: Extension<Arc<AuthState>>, headers: HeaderMap) -> Response {
    let session = match state.sessions().start(&headers).await {
        Ok(session) => session,
        Err(err) => return fatal(&err),
    };

    match auth::login_check(state.store(), &session.data, user_agent(&headers)).await {
        Ok(true) => {
            let body = SessionResponse {
                user_id: session.data.user_id.clone().unwrap_or_default(),
                username: session.data.username.clone().unwrap_or_default(),
            };
            with_session(&state, &session, Json(body)).await
        }
        Ok(false) => with_session(&state, &session, StatusCode::NO_CONTENT).await,
        Err(err) => fatal_with_session(&state, &session, &err).await,
    }
}
