//! Test server wrapper for integration tests
//!
//! Drives the real router in-process through `tower::Service`, so the full
//! HTTP surface (routing, extractors, error mapping) is exercised without
//! binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use uuid::Uuid;

use pframe_ui::api::{create_router, AppContext};
use pframe_ui::state::StateManager;

const BOUNDARY: &str = "pframe-test-boundary";

/// In-process server instance over a fresh, empty playlist
pub struct TestServer {
    router: Router,
}

impl TestServer {
    pub fn start() -> Self {
        let manager = Arc::new(StateManager::new());
        let router = create_router(AppContext { manager });
        Self { router }
    }

    /// Make a JSON request to the test server
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Option<Value>), Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .method(parse_method(method)?)
            .uri(path);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = match body {
            Some(json_body) => builder.body(Body::from(json_body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let (status, _, bytes) = self.send(request).await?;
        let json_body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes)?)
        };
        Ok((status, json_body))
    }

    /// Fetch a path and return status, headers and raw body bytes
    pub async fn get_raw(
        &self,
        path: &str,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), Box<dyn std::error::Error>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        self.send(request).await
    }

    /// Upload files as a multipart request; each entry is
    /// (filename, content type, bytes)
    pub async fn upload(
        &self,
        files: &[(&str, &str, &[u8])],
    ) -> Result<(StatusCode, Option<Value>), Box<dyn std::error::Error>> {
        let mut body: Vec<u8> = Vec::new();
        for (filename, content_type, data) in files {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                    filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))?;

        let (status, _, bytes) = self.send(request).await?;
        let json_body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes)?)
        };
        Ok((status, json_body))
    }

    /// Upload images and return the assigned ids, panicking on failure
    pub async fn upload_images(&self, count: usize) -> Vec<Uuid> {
        let payloads: Vec<(String, Vec<u8>)> = (0..count)
            .map(|i| (format!("img{}.png", i), format!("png bytes {}", i).into_bytes()))
            .collect();
        let files: Vec<(&str, &str, &[u8])> = payloads
            .iter()
            .map(|(name, data)| (name.as_str(), "image/png", data.as_slice()))
            .collect();
        let (status, body) = self.upload(&files).await.expect("upload request failed");
        assert_eq!(status, StatusCode::OK, "upload failed: {:?}", body);
        body.unwrap()["added"]
            .as_array()
            .expect("added array")
            .iter()
            .map(|stub| stub["id"].as_str().unwrap().parse().unwrap())
            .collect()
    }

    /// Current state snapshot as raw JSON
    pub async fn state(&self) -> Value {
        let (status, body) = self
            .request("GET", "/api/state", None)
            .await
            .expect("state request failed");
        assert_eq!(status, StatusCode::OK);
        body.expect("state body")
    }

    async fn send(
        &self,
        request: Request<Body>,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), Box<dyn std::error::Error>> {
        use tower::Service;

        let response = self.router.clone().call(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, bytes.to_vec()))
    }
}

fn parse_method(method: &str) -> Result<Method, Box<dyn std::error::Error>> {
    Ok(match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "DELETE" => Method::DELETE,
        "PUT" => Method::PUT,
        other => return Err(format!("Unsupported method: {}", other).into()),
    })
}

/// Ids of a snapshot section, in order
pub fn section_ids(state: &Value, section: &str) -> Vec<Uuid> {
    state[section]
        .as_array()
        .expect("section array")
        .iter()
        .map(|stub| stub["id"].as_str().unwrap().parse().unwrap())
        .collect()
}
