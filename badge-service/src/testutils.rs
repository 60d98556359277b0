use crate::config::{BadgesConfig, Config, Listener, SnykConfig};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const ORG_ID: &str = "org-1";
pub const API_KEY: &str = "token secret";

/// A project entry as returned by the Snyk API. `counts` is critical, high, medium, low.
pub fn project(name: &str, id: &str, counts: [u64; 4]) -> Value {
    let [critical, high, medium, low] = counts;
    json!({
        "name": name,
        "id": id,
        "origin": "github",
        "issueCountsBySeverity": {
            "critical": critical,
            "high": high,
            "medium": medium,
            "low": low,
        },
    })
}

pub fn snyk_config(uri: &str) -> SnykConfig {
    SnykConfig {
        api_url: Url::parse(&format!("{uri}/api/v1")).unwrap(),
        org_id: ORG_ID.to_string(),
        api_key: API_KEY.to_string(),
        timeout_secs: 5,
    }
}

pub fn badges_config(uri: &str) -> BadgesConfig {
    BadgesConfig {
        base_url: Url::parse(uri).unwrap(),
        logo: Some("snyk".to_string()),
        timeout_secs: 5,
    }
}

pub fn test_config(snyk: &MockServer, shields: &MockServer) -> Config {
    Config {
        listener: Listener {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        admin_listener: None,
        snyk: snyk_config(&snyk.uri()),
        badges: badges_config(&shields.uri()),
    }
}

/// Snyk mock answering the project list of [`ORG_ID`] with `body`.
pub async fn mock_snyk(body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/org/{ORG_ID}/projects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// shields.io mock that renders the requested badge path into the svg body.
pub async fn mock_shields() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/badge/"))
        .respond_with(|req: &Request| {
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/svg+xml")
                .set_body_string(format!("<svg>{}</svg>", req.url.path()))
        })
        .mount(&server)
        .await;
    server
}
