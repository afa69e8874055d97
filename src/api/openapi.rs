use super::handlers::{health, session};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, session::session),
    components(schemas(health::Health, session::SessionResponse)),
    tags(
        (name = "health", description = "Service and database status"),
        (name = "session", description = "Current member session"),
    )
)]
struct ApiDoc;

/// `OpenAPI` document for the JSON endpoints.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_json_endpoints() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/session"));
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
    }
}
