//! OpenAPI documentation
//!
//! The document is derived at startup from the `#[utoipa::path]` annotations
//! on the handlers and served next to a Swagger UI.
//!
//! - `GET /api-docs`: Swagger UI
//! - `GET /api-docs.json`: OpenAPI 3 document

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    handlers::users,
    models::{User, UserPayload},
};

/// Swagger UI mount point
pub const DOCS_PATH: &str = "/api-docs";

/// OpenAPI JSON location
pub const SPEC_PATH: &str = "/api-docs.json";

/// Annotated routes and schemas of the service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "An API for managing users"
    ),
    paths(
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user
    ),
    components(schemas(User, UserPayload)),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;

/// Builder for adjusting the generated document before it is served
///
/// # Example
///
/// ```rust
/// use users_service::openapi::{ApiDoc, OpenApiBuilder};
/// use utoipa::OpenApi;
///
/// let doc = OpenApiBuilder::new(ApiDoc::openapi())
///     .server("http://localhost:5000", None)
///     .build();
/// assert_eq!(doc.servers.map(|s| s.len()), Some(1));
/// ```
pub struct OpenApiBuilder {
    openapi: utoipa::openapi::OpenApi,
}

impl OpenApiBuilder {
    /// Create a new OpenAPI builder from an existing OpenApi instance
    pub fn new(openapi: utoipa::openapi::OpenApi) -> Self {
        Self { openapi }
    }

    /// Add a server URL
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        use utoipa::openapi::ServerBuilder;
        let mut builder = ServerBuilder::new().url(url.into());
        if let Some(desc) = description {
            builder = builder.description(Some(desc));
        }
        self.openapi
            .servers
            .get_or_insert_with(Vec::new)
            .push(builder.build());
        self
    }

    /// Build the final OpenAPI specification
    pub fn build(self) -> utoipa::openapi::OpenApi {
        self.openapi
    }
}

/// The document served by this instance, pointing at its public URL
pub fn api_doc(config: &Config) -> utoipa::openapi::OpenApi {
    OpenApiBuilder::new(ApiDoc::openapi())
        .server(config.public_url(), Some(config.service.environment.clone()))
        .build()
}

/// Router serving Swagger UI and the OpenAPI JSON
pub fn docs_router<S>(config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new(DOCS_PATH)
        .url(SPEC_PATH, api_doc(config))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_lists_user_routes() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Users API");

        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/users"));
        assert!(paths.contains_key("/users/{id}"));

        let collection = &paths["/users"];
        assert!(collection.get.is_some());
        assert!(collection.post.is_some());

        let item = &paths["/users/{id}"];
        assert!(item.get.is_some());
        assert!(item.put.is_some());
        assert!(item.delete.is_some());
    }

    #[test]
    fn test_api_doc_registers_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.expect("components").schemas;
        assert!(schemas.contains_key("User"));
        assert!(schemas.contains_key("UserPayload"));
    }

    #[test]
    fn test_api_doc_advertises_configured_server() {
        let mut config = Config::default();
        config.service.port = 5050;

        let doc = api_doc(&config);
        let servers = doc.servers.expect("servers");
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].url, "http://localhost:5050");
    }

    #[test]
    fn test_builder_appends_servers() {
        let doc = OpenApiBuilder::new(ApiDoc::openapi())
            .server("http://localhost:5000", None)
            .server("https://users.internal", Some("prod".to_string()))
            .build();
        let servers = doc.servers.expect("servers");
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1].url, "https://users.internal");
        assert_eq!(servers[1].description.as_deref(), Some("prod"));
    }
}
