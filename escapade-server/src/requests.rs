use std::time::Instant;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use log::{log, Level};

const TARGET: &str = "escapade_server::http";

/// Logs method, path, status and latency of every request
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();

    log!(
        target: TARGET,
        request_level(status),
        "{} {} {} {}ms",
        method,
        path,
        status.as_u16(),
        started.elapsed().as_millis()
    );

    response
}

fn request_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::Warn
    } else {
        Level::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_stand_out() {
        assert_eq!(request_level(StatusCode::OK), Level::Info);
        assert_eq!(request_level(StatusCode::UNAUTHORIZED), Level::Info);
        assert_eq!(request_level(StatusCode::INTERNAL_SERVER_ERROR), Level::Warn);
    }
}
