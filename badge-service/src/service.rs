use crate::badge::BadgeState;
use crate::errors::BadgeServiceError;
use crate::metrics_defs::BADGE_REJECTED;
use crate::pipeline::BadgePipeline;
use crate::request::{BADGE_PATH_PREFIX, BadgeRequest, RequestError};
use http::{Method, StatusCode, Uri};
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use serde::Serialize;
use shared::http::{make_boxed_error_response, make_boxed_response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = match option_env!("BADGER_COMMIT") {
    Some(commit) => commit,
    None => "no-data",
};

#[derive(Serialize)]
struct VersionInfo {
    version: &'static str,
    commit: &'static str,
}

#[derive(Debug)]
enum Endpoint {
    Badge(Result<BadgeRequest, RequestError>),
    Version,
    NotFound,
}

impl Endpoint {
    fn from_uri(uri: &Uri) -> Self {
        match uri.path() {
            "/api/badges" | "/api/badges/" => {
                Endpoint::Badge(BadgeRequest::from_query(uri.query()))
            }
            "/api/version" => Endpoint::Version,
            path if path.starts_with(BADGE_PATH_PREFIX) || path == "/badge" => {
                Endpoint::Badge(BadgeRequest::from_path(path))
            }
            _ => Endpoint::NotFound,
        }
    }
}

/// Serves badge and version requests.
pub struct BadgeService {
    pipeline: Arc<BadgePipeline>,
}

impl BadgeService {
    pub fn new(pipeline: BadgePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl Service<Request<Incoming>> for BadgeService {
    type Response = Response<BoxBody<Bytes, BadgeServiceError>>;
    type Error = BadgeServiceError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let pipeline = self.pipeline.clone();
        let method = req.method().clone();
        let uri = req.uri().clone();

        Box::pin(async move { Ok(handle(&pipeline, &method, &uri).await) })
    }
}

/// Routes a request. Badge endpoints always answer `200 OK`, invalid
/// parameters produce the `unknown` badge without calling Snyk.
pub async fn handle<E: 'static>(
    pipeline: &BadgePipeline,
    method: &Method,
    uri: &Uri,
) -> Response<BoxBody<Bytes, E>> {
    match Endpoint::from_uri(uri) {
        Endpoint::NotFound => {
            tracing::warn!(method = %method, path = %uri.path(), "No route matched");
            make_boxed_error_response(StatusCode::NOT_FOUND)
        }
        _ if method != Method::GET => make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED),
        Endpoint::Badge(Ok(request)) => {
            tracing::debug!(request = ?request, "Badge requested");
            let state = pipeline.resolve(&request).await;
            pipeline.respond(state).await
        }
        Endpoint::Badge(Err(e)) => {
            tracing::debug!(error = %e, path = %uri.path(), "Rejected badge request");
            shared::counter!(BADGE_REJECTED).increment(1);
            pipeline.respond(BadgeState::Unknown).await
        }
        Endpoint::Version => version_response(),
    }
}

fn version_response<E: 'static>() -> Response<BoxBody<Bytes, E>> {
    let info = VersionInfo {
        version: VERSION,
        commit: COMMIT,
    };

    match serde_json::to_vec(&info) {
        Ok(body) => make_boxed_response(StatusCode::OK, "application/json", body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize version");
            make_boxed_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
