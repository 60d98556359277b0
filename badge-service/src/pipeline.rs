use crate::aggregate::aggregate;
use crate::badge::{BadgeRenderer, BadgeState};
use crate::config::{Config, ValidationError};
use crate::metrics_defs::{BADGE_REQUESTS, RENDER_FALLBACK};
use crate::request::BadgeRequest;
use crate::snyk::SnykClient;
use http::StatusCode;
use http::header::{CACHE_CONTROL, HeaderValue};
use http_body_util::combinators::BoxBody;
use hyper::Response;
use hyper::body::Bytes;
use shared::http::make_boxed_response;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml;charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Request to badge: fetch projects, match, classify, render.
///
/// Holds no per-request state, one instance serves all requests.
pub struct BadgePipeline {
    snyk: SnykClient,
    renderer: BadgeRenderer,
}

impl BadgePipeline {
    /// `client` is shared by the Snyk and badge calls so connections are pooled.
    pub fn new(client: reqwest::Client, config: &Config) -> Result<Self, ValidationError> {
        Ok(BadgePipeline {
            snyk: SnykClient::new(client.clone(), &config.snyk)?,
            renderer: BadgeRenderer::new(client, &config.badges),
        })
    }

    /// Never fails: upstream errors resolve to [`BadgeState::Unknown`].
    pub async fn resolve(&self, request: &BadgeRequest) -> BadgeState {
        let projects = match self.snyk.list_projects().await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    organization = request.organization(),
                    "Could not list snyk projects"
                );
                return BadgeState::Unknown;
            }
        };

        let result = aggregate(&projects, request);
        if result.matched == 0 {
            // Indistinguishable from a clean project on the badge itself
            tracing::info!(
                organization = request.organization(),
                repository = request.repository_name(),
                project_ids = ?request.project_ids(),
                "No matching snyk project"
            );
        }

        BadgeState::classify(result.total)
    }

    /// Relays the rendered badge. If the badge service fails, the body is the
    /// badge URL as plain text instead. Always `200 OK`.
    pub async fn respond<E: 'static>(&self, state: BadgeState) -> Response<BoxBody<Bytes, E>> {
        shared::counter!(BADGE_REQUESTS, "state" => state.as_str()).increment(1);

        let url = self.renderer.badge_url(state);
        let mut response = match self.renderer.render(&url).await {
            Ok(svg) => make_boxed_response(StatusCode::OK, SVG_CONTENT_TYPE, svg),
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "Could not render badge");
                shared::counter!(RENDER_FALLBACK).increment(1);
                make_boxed_response(StatusCode::OK, TEXT_CONTENT_TYPE, url.to_string())
            }
        };

        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response
    }
}
