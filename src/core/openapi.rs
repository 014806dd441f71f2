use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::changes::{feed as changes_feed, handlers as changes_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers, models as files_models};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::features::webhooks::{dtos as webhooks_dtos, handlers as webhooks_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::generate_upload_url,
        files_handlers::create_file,
        files_handlers::get_files,
        files_handlers::delete_file,
        files_handlers::restore_file,
        files_handlers::toggle_favorite,
        files_handlers::get_all_favorites,
        // Storage (public)
        files_handlers::download_object,
        // Users
        users_handlers::get_current_user,
        users_handlers::get_user_profile,
        // Change feed
        changes_handlers::subscribe_changes,
        // Webhooks (signed)
        webhooks_handlers::receive_identity_event,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // Files
            files_models::FileType,
            files_dtos::CreateFileDto,
            files_dtos::FileResponseDto,
            files_dtos::FavoriteResponseDto,
            files_dtos::UploadUrlResponseDto,
            files_dtos::ToggleFavoriteResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            ApiResponse<Vec<files_dtos::FavoriteResponseDto>>,
            ApiResponse<files_dtos::UploadUrlResponseDto>,
            ApiResponse<files_dtos::ToggleFavoriteResponseDto>,
            // Users
            users_models::OrgRole,
            users_models::OrgMembership,
            users_dtos::CurrentUserDto,
            users_dtos::UserProfileDto,
            ApiResponse<users_dtos::CurrentUserDto>,
            ApiResponse<users_dtos::UserProfileDto>,
            // Change feed
            changes_feed::ChangeEvent,
            // Webhooks
            webhooks_dtos::WebhookEnvelopeDto,
            webhooks_dtos::WebhookAckDto,
            ApiResponse<webhooks_dtos::WebhookAckDto>,
        )
    ),
    tags(
        (name = "files", description = "Org files, soft deletion and favorites"),
        (name = "storage", description = "Download redirects for stored objects (public)"),
        (name = "users", description = "Current user and user profiles"),
        (name = "changes", description = "Server-Sent Events change feed per org"),
        (name = "webhooks", description = "Identity provider lifecycle events (signed)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Fileshare API",
        version = "0.1.0",
        description = "API documentation for Fileshare",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
