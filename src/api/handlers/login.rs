use super::{
    fatal, fatal_with_session, html_page, redirect_to_error, user_agent, with_session, LOGOUT_FORM,
};
use crate::auth::{
    self,
    sanitize::{esc_url, escape_html},
    AuthState,
};
use axum::{
    extract::{Extension, Form, Query},
    http::{HeaderMap, Uri},
    response::{Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Deserialize, Debug, Default)]
pub struct LoginQuery {
    error: Option<String>,
}

/// Posted credentials. `p` is accepted for older forms.
#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    #[serde(alias = "p")]
    password: String,
}

// axum handler for GET /login
#[instrument(skip_all)]
pub async fn form(
    state: Extension<Arc<AuthState>>,
    headers: HeaderMap,
    uri: Uri,
    query: Option<Query<LoginQuery>>,
) -> Response {
    let mut session = match state.sessions().start(&headers).await {
        Ok(session) => session,
        Err(err) => return fatal(&err),
    };

    let logged_in = match auth::login_check(state.store(), &session.data, user_agent(&headers)).await
    {
        Ok(logged_in) => logged_in,
        Err(err) => return fatal_with_session(&state, &session, &err).await,
    };

    let mut body = String::new();
    if query.is_some_and(|Query(query)| query.error.is_some()) {
        body.push_str("<p class=\"error\">Error Logging In!</p>\n");
    }

    body.push_str(&format!(
        "<form action=\"{}\" method=\"post\" name=\"login_form\">\n\
         Email: <input type=\"text\" name=\"email\">\n\
         Password: <input type=\"password\" name=\"password\">\n\
         <input type=\"submit\" value=\"Login\">\n\
         </form>\n",
        esc_url(uri.path())
    ));

    if logged_in {
        let username = session.data.username.as_deref().unwrap_or_default();
        body.push_str(&format!(
            "<p>Currently logged in as {}.</p>\n{LOGOUT_FORM}\n",
            escape_html(username)
        ));
    } else {
        // A stale session has nothing worth keeping.
        session.data.clear();
        body.push_str("<p>Currently logged out.</p>\n");
    }

    with_session(&state, &session, html_page("Secure Login: Log In", &body)).await
}

// axum handler for POST /login
#[instrument(skip_all)]
pub async fn submit(
    state: Extension<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Option<Form<LoginForm>>,
) -> Response {
    let Some(Form(payload)) = payload else {
        debug!("login form is missing fields");
        return redirect_to_error("Invalid Request");
    };

    let mut session = match state.sessions().start(&headers).await {
        Ok(session) => session,
        Err(err) => return fatal(&err),
    };

    let password = SecretString::from(payload.password);
    let outcome = auth::login(
        state.store(),
        &mut session.data,
        &payload.email,
        &password,
        user_agent(&headers),
    )
    .await;

    match outcome {
        Ok(true) => with_session(&state, &session, Redirect::to("/members")).await,
        Ok(false) => with_session(&state, &session, Redirect::to("/login?error=1")).await,
        Err(err) => fatal_with_session(&state, &session, &err).await,
    }
}
