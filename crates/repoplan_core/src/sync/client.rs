//! HTTP client for the remote nodes service.
//!
//! # Responsibility
//! - Implement fetch/create/delete against the nodes-service endpoints.
//! - Map transport failures and HTTP statuses onto `SyncError`.
//!
//! # Invariants
//! - Request paths are built from encoded segments; repository names with
//!   spaces or slashes stay one segment.
//! - A 404 on fetch means "no tree persisted yet", not a failure of the
//!   delete/create kind; callers start from an empty workspace.
//! - Response bodies are interpreted by pure helpers so status mapping is
//!   testable without a live server.

use crate::model::node::PlanNode;
use crate::sync::token::TokenProvider;
use async_trait::async_trait;
use log::{error, info};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result type used by remote node-store operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors from remote node-store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No token was available, or the service rejected the credentials.
    Unauthenticated,
    /// The repository has no persisted tree yet.
    TreeMissing,
    /// The service answered with a non-success status.
    Remote { status: u16, message: String },
    /// Connection-level failure before any HTTP status was obtained.
    Transport(String),
    /// The configured base URL is not usable for the nodes service.
    InvalidBaseUrl(String),
    /// A success response carried a body this client cannot decode.
    InvalidResponse(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => {
                write!(f, "not signed in or the nodes service rejected the credentials")
            }
            Self::TreeMissing => write!(f, "no plan tree stored for this repository"),
            Self::Remote { status, message } => {
                write!(f, "nodes service returned status {status}: {message}")
            }
            Self::Transport(message) => {
                write!(f, "could not reach the nodes service: {message}")
            }
            Self::InvalidBaseUrl(message) => {
                write!(f, "invalid nodes service base URL: {message}")
            }
            Self::InvalidResponse(message) => {
                write!(f, "undecodable nodes service response: {message}")
            }
        }
    }
}

impl Error for SyncError {}

/// Identifier pair the service allocates for a newly created node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedNode {
    /// Logical node id.
    pub node_id: String,
    /// Storage-layer key for later remote addressing.
    pub firebase_key: String,
}

#[derive(Debug, Serialize)]
struct CreateNodeRequest<'a> {
    parent_id: &'a str,
    repo_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: String,
}

/// Remote persistence seam for one repository's plan nodes.
///
/// Implementations only talk to the store; they never touch local
/// workspace state. Callers commit tree changes after a success result.
#[async_trait]
pub trait NodeSync: Send + Sync {
    /// Fetches the persisted tree for `repo_name`.
    async fn fetch_tree(&self, repo_name: &str) -> SyncResult<PlanNode>;

    /// Asks the service to allocate a new node under `parent_id`.
    async fn create_node(&self, repo_name: &str, parent_id: &str) -> SyncResult<CreatedNode>;

    /// Deletes `node_id` and its entire subtree from the store.
    async fn delete_node(&self, repo_name: &str, node_id: &str) -> SyncResult<()>;
}

/// reqwest-backed [`NodeSync`] implementation.
pub struct HttpNodeSync<P: TokenProvider> {
    client: reqwest::Client,
    base: Url,
    tokens: P,
}

impl<P: TokenProvider> HttpNodeSync<P> {
    /// Builds a client for the nodes service at `base_url`.
    ///
    /// # Errors
    /// - `InvalidBaseUrl` for anything but an absolute http(s) URL.
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, tokens: P) -> SyncResult<Self> {
        let base = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Ok(Self { client, base, tokens })
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    async fn bearer_token(&self) -> SyncResult<String> {
        match self.tokens.access_token().await {
            Some(token) => Ok(token),
            None => Err(SyncError::Unauthenticated),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                SyncError::InvalidBaseUrl("base URL cannot hold path segments".to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn fetch_tree_inner(&self, repo_name: &str) -> SyncResult<PlanNode> {
        let token = self.bearer_token().await?;
        let url = self.endpoint(&["nodes", repo_name])?;
        let (status, body) = self.execute(self.client.get(url).bearer_auth(token)).await?;
        interpret_fetch(status, &body)
    }

    async fn create_node_inner(&self, repo_name: &str, parent_id: &str) -> SyncResult<CreatedNode> {
        let token = self.bearer_token().await?;
        let url = self.endpoint(&["add-node"])?;
        let request = CreateNodeRequest {
            parent_id,
            repo_name,
        };
        let (status, body) = self
            .execute(self.client.post(url).bearer_auth(token).json(&request))
            .await?;
        interpret_create(status, &body)
    }

    async fn delete_node_inner(&self, repo_name: &str, node_id: &str) -> SyncResult<()> {
        let token = self.bearer_token().await?;
        let url = self.endpoint(&["delete-node", repo_name, node_id])?;
        let (status, body) = self.execute(self.client.delete(url).bearer_auth(token)).await?;
        interpret_delete(status, &body)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> SyncResult<(u16, String)> {
        let response = request
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl<P: TokenProvider> NodeSync for HttpNodeSync<P> {
    async fn fetch_tree(&self, repo_name: &str) -> SyncResult<PlanNode> {
        let started_at = Instant::now();
        info!("event=tree_fetch module=sync status=start repo={repo_name}");
        match self.fetch_tree_inner(repo_name).await {
            Ok(root) => {
                info!(
                    "event=tree_fetch module=sync status=ok repo={repo_name} nodes={} duration_ms={}",
                    root.subtree_len(),
                    started_at.elapsed().as_millis()
                );
                Ok(root)
            }
            Err(SyncError::TreeMissing) => {
                info!(
                    "event=tree_fetch module=sync status=miss repo={repo_name} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Err(SyncError::TreeMissing)
            }
            Err(err) => {
                error!(
                    "event=tree_fetch module=sync status=error repo={repo_name} duration_ms={} error_code=tree_fetch_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    async fn create_node(&self, repo_name: &str, parent_id: &str) -> SyncResult<CreatedNode> {
        let started_at = Instant::now();
        info!("event=node_create module=sync status=start repo={repo_name} parent={parent_id}");
        match self.create_node_inner(repo_name, parent_id).await {
            Ok(created) => {
                info!(
                    "event=node_create module=sync status=ok repo={repo_name} parent={parent_id} node={} duration_ms={}",
                    created.node_id,
                    started_at.elapsed().as_millis()
                );
                Ok(created)
            }
            Err(err) => {
                error!(
                    "event=node_create module=sync status=error repo={repo_name} parent={parent_id} duration_ms={} error_code=node_create_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    async fn delete_node(&self, repo_name: &str, node_id: &str) -> SyncResult<()> {
        let started_at = Instant::now();
        info!("event=node_delete module=sync status=start repo={repo_name} node={node_id}");
        match self.delete_node_inner(repo_name, node_id).await {
            Ok(()) => {
                info!(
                    "event=node_delete module=sync status=ok repo={repo_name} node={node_id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=node_delete module=sync status=error repo={repo_name} node={node_id} duration_ms={} error_code=node_delete_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

fn normalize_base_url(base_url: &str) -> SyncResult<Url> {
    let url = Url::parse(base_url.trim())
        .map_err(|err| SyncError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SyncError::InvalidBaseUrl(format!(
                "unsupported scheme `{other}`"
            )));
        }
    }
    if url.host_str().is_none() {
        return Err(SyncError::InvalidBaseUrl("missing host".to_string()));
    }
    Ok(url)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn interpret_fetch(status: u16, body: &str) -> SyncResult<PlanNode> {
    if status == 401 {
        return Err(SyncError::Unauthenticated);
    }
    if status == 404 {
        return Err(SyncError::TreeMissing);
    }
    if !is_success(status) {
        return Err(remote_error(status, body));
    }
    serde_json::from_str(body).map_err(|err| SyncError::InvalidResponse(err.to_string()))
}

fn interpret_create(status: u16, body: &str) -> SyncResult<CreatedNode> {
    if status == 401 {
        return Err(SyncError::Unauthenticated);
    }
    if !is_success(status) {
        return Err(remote_error(status, body));
    }
    serde_json::from_str(body).map_err(|err| SyncError::InvalidResponse(err.to_string()))
}

fn interpret_delete(status: u16, body: &str) -> SyncResult<()> {
    if status == 401 {
        return Err(SyncError::Unauthenticated);
    }
    if !is_success(status) {
        return Err(remote_error(status, body));
    }
    Ok(())
}

fn remote_error(status: u16, body: &str) -> SyncError {
    SyncError::Remote {
        status,
        message: extract_detail(status, body),
    }
}

/// Extracts the human-readable message from a failure body.
///
/// The service reports failures as `{"detail": "..."}`. Other bodies are
/// kept verbatim; an empty body becomes a generic status line.
fn extract_detail(status: u16, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.detail;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("service returned status {status}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticToken(Option<String>);

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn access_token(&self) -> Option<String> {
            self.0.clone()
        }
    }

    fn client_without_token() -> HttpNodeSync<StaticToken> {
        HttpNodeSync::new("http://localhost:8000", StaticToken(None)).unwrap()
    }

    #[test]
    fn base_url_accepts_http_and_https() {
        assert!(normalize_base_url("http://localhost:8000").is_ok());
        assert!(normalize_base_url("https://api.example.com/v1/").is_ok());
    }

    #[test]
    fn base_url_rejects_other_schemes_and_garbage() {
        assert!(matches!(
            normalize_base_url("ftp://example.com"),
            Err(SyncError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(SyncError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            normalize_base_url("data:text/plain,hello"),
            Err(SyncError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn endpoint_encodes_path_segments() {
        let sync = client_without_token();
        let url = sync.endpoint(&["nodes", "my repo"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/nodes/my%20repo");
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let sync = HttpNodeSync::new("https://api.example.com/v1/", StaticToken(None)).unwrap();
        let url = sync.endpoint(&["delete-node", "demo", "n1"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/delete-node/demo/n1");
    }

    #[tokio::test]
    async fn signed_out_session_cannot_reach_the_service() {
        let session = std::sync::Arc::new(crate::session::Session::new());
        let sync = HttpNodeSync::new("http://localhost:8000", session).unwrap();
        assert_eq!(sync.fetch_tree("demo").await, Err(SyncError::Unauthenticated));
    }

    #[tokio::test]
    async fn missing_token_fails_before_any_network_attempt() {
        // Port 8000 is not served in tests; reaching the network would
        // surface as Transport, not Unauthenticated.
        let sync = client_without_token();
        assert_eq!(sync.fetch_tree("demo").await, Err(SyncError::Unauthenticated));
        assert_eq!(
            sync.create_node("demo", "root").await,
            Err(SyncError::Unauthenticated)
        );
        assert_eq!(
            sync.delete_node("demo", "n1").await,
            Err(SyncError::Unauthenticated)
        );
    }

    #[test]
    fn fetch_decodes_camel_case_tree() {
        let body = r#"{
            "id": "root",
            "name": "Root Node",
            "description": "This is the root node",
            "createdAt": "2024-05-01T10:00:00",
            "lastModified": "2024-05-01T10:00:00",
            "isOpen": true,
            "children": [
                {
                    "id": "n1",
                    "firebaseKey": "-OaX123",
                    "name": "New Node",
                    "description": "New node description",
                    "createdAt": "2024-05-02T09:30:00",
                    "lastModified": "2024-05-02T09:30:00",
                    "isOpen": true,
                    "children": []
                }
            ]
        }"#;
        let root = interpret_fetch(200, body).unwrap();
        assert_eq!(root.id, "root");
        assert_eq!(root.remote_key, None);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].id, "n1");
        assert_eq!(root.children[0].remote_key.as_deref(), Some("-OaX123"));
        assert!(root.children[0].expanded);
    }

    #[test]
    fn fetch_maps_statuses() {
        assert_eq!(interpret_fetch(401, ""), Err(SyncError::Unauthenticated));
        assert_eq!(interpret_fetch(404, ""), Err(SyncError::TreeMissing));
        assert_eq!(
            interpret_fetch(500, r#"{"detail": "boom"}"#),
            Err(SyncError::Remote {
                status: 500,
                message: "boom".to_string()
            })
        );
        assert!(matches!(
            interpret_fetch(200, "not json"),
            Err(SyncError::InvalidResponse(_))
        ));
    }

    #[test]
    fn create_decodes_allocated_identifiers() {
        let body = r#"{"message": "Node added successfully", "node_id": "n9", "firebase_key": "-OaX9"}"#;
        let created = interpret_create(201, body).unwrap();
        assert_eq!(created.node_id, "n9");
        assert_eq!(created.firebase_key, "-OaX9");
    }

    #[test]
    fn create_maps_statuses() {
        assert_eq!(interpret_create(401, ""), Err(SyncError::Unauthenticated));
        assert_eq!(
            interpret_create(404, r#"{"detail": "Parent node not found"}"#),
            Err(SyncError::Remote {
                status: 404,
                message: "Parent node not found".to_string()
            })
        );
    }

    #[test]
    fn delete_maps_statuses() {
        assert_eq!(interpret_delete(200, r#"{"message": "ok"}"#), Ok(()));
        assert_eq!(interpret_delete(401, ""), Err(SyncError::Unauthenticated));
        assert_eq!(
            interpret_delete(500, ""),
            Err(SyncError::Remote {
                status: 500,
                message: "service returned status 500".to_string()
            })
        );
    }

    #[test]
    fn detail_extraction_falls_back_to_raw_body() {
        assert_eq!(extract_detail(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_detail(500, "  "), "service returned status 500");
        assert_eq!(extract_detail(409, r#"{"detail": "exists"}"#), "exists");
    }
}
