mod auth;
mod config;
mod context;
mod docs;
mod errors;
mod games;
mod guard;
mod pages;
mod requests;
mod schemas;
mod serialized;
mod sse;

use std::net::{Ipv6Addr, SocketAddr};

use axum::{middleware, routing::get, Json};
use escapade_admin::Admin;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use config::*;
pub use context::ServerContext;
pub use errors::{ErrorBody, ServerError};

pub type Router = axum::Router<ServerContext>;

/// Builds the routes of the dashboard with the guard in front of the pages
pub fn app(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/games", games::router())
        .nest("/events", sse::router());

    Router::new()
        .merge(pages::router())
        .nest("/api", api_router)
        .route("/api.json", get(docs::docs))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            context.clone(),
            guard::guard_pages,
        ))
        .layer(middleware::from_fn(requests::log_requests))
        .layer(cors)
        .with_state(context)
}

async fn not_found() -> (axum::http::StatusCode, Json<ErrorBody>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
        }),
    )
}

/// Starts the escapade server
pub async fn run_server(admin: Admin, config: ServerConfig) -> std::io::Result<()> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, config.port).into();

    let context = ServerContext::new(admin, config);
    context.sse.forward(context.admin.events.clone());

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app(context).into_make_service()).await
}
