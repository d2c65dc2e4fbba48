use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use escapade_admin::GuardDecision;
use log::debug;

use crate::{auth::MaybeSession, context::ServerContext};

/// Paths the access guard leaves to the handlers themselves
const UNGUARDED_PREFIXES: [&str; 3] = ["/api", "/favicon.ico", "/static"];

/// Redirects page requests the session is not allowed to see
pub async fn guard_pages(
    State(context): State<ServerContext>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if UNGUARDED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let MaybeSession(principal) = MaybeSession::from_parts(&parts, &context);

    match context.admin.guard.decide(principal.as_ref(), &path) {
        GuardDecision::Allow => next.run(Request::from_parts(parts, body)).await,
        GuardDecision::Redirect(to) => {
            debug!("Redirecting {} to {}", path, to);
            Redirect::temporary(to).into_response()
        }
    }
}
