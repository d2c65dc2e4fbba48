use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use escapade_admin::{Credentials, Principal, Registration, SESSION_COOKIE, SESSION_MAX_AGE_SECS};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    context::ServerContext,
    errors::{ErrorBody, ServerError, ServerResult},
    schemas::{LoginSchema, RegisterSchema, ValidatedJson},
    serialized::{ToSerialized, User},
    Router,
};

/// The principal of the request's session cookie, if it holds a valid one
pub struct MaybeSession(pub Option<Principal>);

/// A signed in user
pub struct Session(pub Principal);

/// A signed in admin
pub struct AdminSession(pub Principal);

impl MaybeSession {
    pub fn from_parts(parts: &Parts, context: &ServerContext) -> Self {
        let jar = CookieJar::from_headers(&parts.headers);

        let principal = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| context.admin.sessions.decode(cookie.value()));

        Self(principal)
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for MaybeSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state))
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let MaybeSession(principal) = MaybeSession::from_parts(parts, state);

        principal.map(Self).ok_or(ServerError::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for AdminSession {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let Session(principal) = Session::from_request_parts(parts, state).await?;

        if !principal.is_admin() {
            return Err(ServerError::Forbidden);
        }

        Ok(Self(principal))
    }
}

/// Builds the session cookie. An empty token clears it.
fn session_cookie(token: String, context: &ServerContext) -> Cookie<'static> {
    let max_age = if token.is_empty() {
        time::Duration::ZERO
    } else {
        time::Duration::seconds(SESSION_MAX_AGE_SECS)
    };

    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(context.config.secure_cookies)
        .max_age(max_age)
        .path("/")
        .build()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    success: bool,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResult {
    success: bool,
    message: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResult {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResult {
    user: User,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult, description = "Sets the session cookie"),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody, example = json!({ "error": "Invalid credentials" }))
    )
)]
async fn login(
    context: ServerContext,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<(CookieJar, Json<LoginResult>)> {
    let principal = context
        .admin
        .auth
        .login(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    let token = context.admin.sessions.encode(&principal)?;
    let jar = jar.add(session_cookie(token, &context));

    Ok((
        jar,
        Json(LoginResult {
            success: true,
            user: principal.to_serialized(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 201, body = RegisterResult),
        (status = 400, body = ErrorBody, example = json!({ "error": "Passwords don't match" }))
    )
)]
async fn register(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<(StatusCode, Json<RegisterResult>)> {
    let principal = context
        .admin
        .auth
        .register(Registration {
            name: body.name,
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResult {
            success: true,
            message: "Account created successfully".to_string(),
            user: principal.to_serialized(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, body = LogoutResult, description = "Clears the session cookie")
    )
)]
async fn logout(context: ServerContext, jar: CookieJar) -> (CookieJar, Json<LogoutResult>) {
    let jar = jar.add(session_cookie(String::new(), &context));

    (
        jar,
        Json(LogoutResult {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "auth",
    security(
        ("SessionCookie" = [])
    ),
    responses(
        (status = 200, body = SessionResult),
        (status = 401, body = ErrorBody, example = json!({ "error": "Not authenticated" }))
    )
)]
async fn session(Session(principal): Session) -> Json<SessionResult> {
    Json(SessionResult {
        user: principal.to_serialized(),
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/session", get(session))
}
