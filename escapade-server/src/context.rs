use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use escapade_admin::Admin;

use crate::{config::ServerConfig, sse::ServerSentEvents};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub admin: Arc<Admin>,
    pub sse: Arc<ServerSentEvents>,
    pub config: Arc<ServerConfig>,
}

impl ServerContext {
    pub fn new(admin: Admin, config: ServerConfig) -> Self {
        Self {
            admin: Arc::new(admin),
            sse: ServerSentEvents::new(),
            config: Arc::new(config),
        }
    }
}

/// Lets handlers take the context directly
#[async_trait]
impl FromRequestParts<ServerContext> for ServerContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.clone())
    }
}
