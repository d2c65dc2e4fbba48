use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::AdminSession,
    context::ServerContext,
    errors::{ErrorBody, ServerResult},
    schemas::{GameBody, GameInputSchema, GameListParams},
    serialized::{DashboardStats, Game, Pagination, ToSerialized},
    Router,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct GameList {
    success: bool,
    games: Vec<Game>,
    pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameResult {
    success: bool,
    game: Game,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResult {
    success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResult {
    success: bool,
    stats: DashboardStats,
}

#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    params(GameListParams),
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = GameList, description = "Matching games, newest first"),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
async fn list_games(
    _session: AdminSession,
    context: ServerContext,
    Query(params): Query<GameListParams>,
) -> ServerResult<Json<GameList>> {
    let page = context.admin.games.list_games(params.into()).await?;

    Ok(Json(GameList {
        success: true,
        games: page.items.to_serialized(),
        pagination: page.pagination.to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    request_body(
        content = GameInputSchema,
        content_type = "application/x-www-form-urlencoded"
    ),
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 201, body = GameResult),
        (status = 400, body = ErrorBody, example = json!({ "error": "Min players cannot exceed max players" })),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
async fn create_game(
    _session: AdminSession,
    context: ServerContext,
    GameBody(input): GameBody,
) -> ServerResult<(StatusCode, Json<GameResult>)> {
    let game = context.admin.games.create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(GameResult {
            success: true,
            game: game.to_serialized(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i32, Path, description = "Id of the game")),
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = GameResult),
        (status = 404, body = ErrorBody)
    )
)]
async fn game(
    _session: AdminSession,
    context: ServerContext,
    Path(game_id): Path<i32>,
) -> ServerResult<Json<GameResult>> {
    let game = context.admin.games.game_by_id(game_id).await?;

    Ok(Json(GameResult {
        success: true,
        game: game.to_serialized(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i32, Path, description = "Id of the game")),
    request_body(
        content = GameInputSchema,
        content_type = "application/x-www-form-urlencoded"
    ),
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = GameResult, description = "The given fields merged over the stored game"),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
async fn update_game(
    _session: AdminSession,
    context: ServerContext,
    Path(game_id): Path<i32>,
    GameBody(input): GameBody,
) -> ServerResult<Json<GameResult>> {
    let game = context.admin.games.update(game_id, &input).await?;

    Ok(Json(GameResult {
        success: true,
        game: game.to_serialized(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i32, Path, description = "Id of the game")),
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = DeleteResult),
        (status = 404, body = ErrorBody)
    )
)]
async fn delete_game(
    _session: AdminSession,
    context: ServerContext,
    Path(game_id): Path<i32>,
) -> ServerResult<Json<DeleteResult>> {
    context.admin.games.delete(game_id).await?;

    Ok(Json(DeleteResult { success: true }))
}

#[utoipa::path(
    post,
    path = "/api/games/{id}/toggle",
    tag = "games",
    params(("id" = i32, Path, description = "Id of the game")),
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = GameResult, description = "The game with its active flag flipped"),
        (status = 404, body = ErrorBody)
    )
)]
async fn toggle_game(
    _session: AdminSession,
    context: ServerContext,
    Path(game_id): Path<i32>,
) -> ServerResult<Json<GameResult>> {
    let game = context.admin.games.toggle_active(game_id).await?;

    Ok(Json(GameResult {
        success: true,
        game: game.to_serialized(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/games/stats",
    tag = "games",
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = StatsResult)
    )
)]
async fn stats(_session: AdminSession, context: ServerContext) -> ServerResult<Json<StatsResult>> {
    let stats = context.admin.games.dashboard_stats().await?;

    Ok(Json(StatsResult {
        success: true,
        stats: stats.to_serialized(),
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_games).post(create_game))
        .route("/stats", get(stats))
        .route("/:id", get(game).put(update_game).delete(delete_game))
        .route("/:id/toggle", post(toggle_game))
}
