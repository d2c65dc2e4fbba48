use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::{auth, errors, games, schemas, serialized, sse};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::register,
        auth::logout,
        auth::session,
        games::list_games,
        games::create_game,
        games::game,
        games::update_game,
        games::delete_game,
        games::toggle_game,
        games::stats,
        sse::event_stream,
    ),
    components(schemas(
        errors::ErrorBody,
        schemas::LoginSchema,
        schemas::RegisterSchema,
        schemas::GameInputSchema,
        serialized::User,
        serialized::Game,
        serialized::Question,
        serialized::Hint,
        serialized::Explanation,
        serialized::Pagination,
        serialized::Distribution,
        serialized::DashboardStats,
        auth::LoginResult,
        auth::RegisterResult,
        auth::LogoutResult,
        auth::SessionResult,
        games::GameList,
        games::GameResult,
        games::DeleteResult,
        games::StatsResult,
        sse::ServerEvent,
    )),
    modifiers(&Security),
    info(
        title = "escapade",
        description = "escapade-server exposes endpoints to manage escape room games"
    )
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = ApiKey::Cookie(ApiKeyValue::new(escapade_admin::SESSION_COOKIE));

            components.add_security_scheme("SessionCookie", SecurityScheme::ApiKey(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_api_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/auth/login",
            "/api/auth/session",
            "/api/games",
            "/api/games/{id}",
            "/api/games/{id}/toggle",
            "/api/events",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is missing");
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
