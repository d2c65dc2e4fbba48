//! Page routes. Each returns the model a client renders the page from;
//! access to them is decided by the guard middleware.

use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json,
};
use serde::Serialize;

use crate::{
    auth::{MaybeSession, Session},
    context::ServerContext,
    errors::ServerResult,
    schemas::GameListParams,
    serialized::{DashboardStats, Game, Pagination, ToSerialized, User},
    Router,
};

#[derive(Debug, Serialize)]
#[serde(tag = "page", rename_all = "kebab-case")]
pub enum PageModel {
    Login,
    Register,
    Unauthorized {
        user: User,
        message: &'static str,
    },
    Dashboard {
        user: User,
        stats: DashboardStats,
    },
    Games {
        user: User,
        games: Vec<Game>,
        pagination: Pagination,
    },
}

async fn root(MaybeSession(principal): MaybeSession, context: ServerContext) -> Response {
    let to = match principal {
        Some(_) => context.admin.guard.home,
        None => context.admin.guard.login,
    };

    Redirect::temporary(to).into_response()
}

async fn login() -> Json<PageModel> {
    Json(PageModel::Login)
}

async fn register() -> Json<PageModel> {
    Json(PageModel::Register)
}

async fn unauthorized(Session(principal): Session) -> Json<PageModel> {
    Json(PageModel::Unauthorized {
        user: principal.to_serialized(),
        message: "You don't have permission to access this page",
    })
}

async fn dashboard(
    Session(principal): Session,
    context: ServerContext,
) -> ServerResult<Json<PageModel>> {
    let stats = context.admin.games.dashboard_stats().await?;

    Ok(Json(PageModel::Dashboard {
        user: principal.to_serialized(),
        stats: stats.to_serialized(),
    }))
}

async fn games(
    Session(principal): Session,
    context: ServerContext,
    Query(params): Query<GameListParams>,
) -> ServerResult<Json<PageModel>> {
    let page = context.admin.games.list_games(params.into()).await?;

    Ok(Json(PageModel::Games {
        user: principal.to_serialized(),
        games: page.items.to_serialized(),
        pagination: page.pagination.to_serialized(),
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login))
        .route("/register", get(register))
        .route("/unauthorized", get(unauthorized))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/games", get(games))
}
