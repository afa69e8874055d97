use super::html_page;
use crate::auth::sanitize::escape_html;
use axum::{extract::Query, response::Html};
use serde::Deserialize;

const UNKNOWN_ERROR: &str = "Oops! An unknown error happened.";

#[derive(Deserialize, Debug, Default)]
pub struct ErrorQuery {
    err: Option<String>,
}

// axum handler for GET /error
pub async fn error_page(query: Option<Query<ErrorQuery>>) -> Html<String> {
    let message = query
        .and_then(|Query(query)| query.err)
        .filter(|err| !err.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    html_page(
        "Secure Login: Error",
        &format!(
            "<h1>There was a problem</h1>\n<p class=\"error\">{}</p>",
            escape_html(&message)
        ),
    )
}
