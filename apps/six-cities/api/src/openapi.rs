//! OpenAPI documentation configuration

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the `bearer_auth` scheme referenced by the protected routes
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Six Cities API",
        version = "0.1.0",
        description = "Rental offers, comments, favorites and user accounts",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    modifiers(&BearerAuth),
    nest(
        (path = "/users", api = domain_users::ApiDoc),
        (path = "/offers", api = domain_offers::ApiDoc),
        (path = "/comments", api = domain_comments::ApiDoc)
    ),
    tags(
        (name = "Users", description = "Registration, login and avatars"),
        (name = "Offers", description = "Rental offers, favorites and premium listings"),
        (name = "Comments", description = "Comments on offers")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_has_bearer_scheme_and_nested_paths() {
        let doc = ApiDoc::openapi();

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/users/register"));
        assert!(doc.paths.paths.contains_key("/offers/{offer_id}"));
        assert!(doc.paths.paths.contains_key("/comments"));
    }
}
