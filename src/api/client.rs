// HTTP client seam for the marketplace backend
//
// Flows talk to `ApiClient`; production uses `ReqwestApiClient`, the smoke modes use
// `DryRunApiClient`, tests substitute a recorder.
// No automatic retry: a failed call is surfaced and the user may retry the action.

use crate::error::PortalError;
use crate::models::responses::failure_text_from_body;
use crate::utils::logging::mask_sensitive;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use url::Url;

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PortalError>;

    async fn get_json(&self, path: &str) -> Result<Value, PortalError>;

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, PortalError>;
}

pub struct ReqwestApiClient {
    base_url: Url,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        bearer_token: Option<String>,
    ) -> anyhow::Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        debug!(
            "[PHASE: api] [STEP: client_init] base_url={} token={}",
            base_url,
            bearer_token
                .as_deref()
                .map(mask_sensitive)
                .unwrap_or_else(|| "<none>".to_string())
        );
        Ok(Self {
            base_url,
            bearer_token,
            client,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, PortalError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| PortalError::precondition(format!("Invalid API path '{}': {}", path, e)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<reqwest::Response, PortalError> {
        let started = Instant::now();
        let resp = self.authorize(req).send().await.map_err(|e| {
            warn!(
                "[PHASE: api] [STEP: send] {} transport failure after {}ms: {}",
                path,
                started.elapsed().as_millis(),
                e
            );
            PortalError::Transport(e.to_string())
        })?;

        let status = resp.status();
        debug!(
            "[PHASE: api] [STEP: send] {} -> HTTP {} ({}ms)",
            path,
            status.as_u16(),
            started.elapsed().as_millis()
        );
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(PortalError::Rejected {
            status: status.as_u16(),
            message: failure_text_from_body(&body),
        })
    }
}

#[async_trait]
impl ApiClient for ReqwestApiClient {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PortalError> {
        let url = self.endpoint(path)?;
        let resp = self.send(self.client.post(url).json(body), path).await?;
        read_json(resp).await
    }

    async fn get_json(&self, path: &str) -> Result<Value, PortalError> {
        let url = self.endpoint(path)?;
        let resp = self.send(self.client.get(url), path).await?;
        read_json(resp).await
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, PortalError> {
        let url = self.endpoint(path)?;
        let resp = self.send(self.client.get(url), path).await?;
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Issues nothing: every call is logged and answered with an empty success.
pub struct DryRunApiClient;

#[async_trait]
impl ApiClient for DryRunApiClient {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PortalError> {
        info!(
            "[PHASE: api] [STEP: dry_run] POST {} ({} bytes)",
            path,
            body.to_string().len()
        );
        Ok(json!({ "success": true }))
    }

    async fn get_json(&self, path: &str) -> Result<Value, PortalError> {
        info!("[PHASE: api] [STEP: dry_run] GET {}", path);
        Ok(Value::Null)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, PortalError> {
        info!("[PHASE: api] [STEP: dry_run] GET {} (bytes)", path);
        Ok(Vec::new())
    }
}

/// Empty 2xx bodies are treated as `null`.
async fn read_json(resp: reqwest::Response) -> Result<Value, PortalError> {
    let text = resp.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Ensure the base URL ends with `/` so relative joins append instead of replacing the last
/// path segment.
fn normalize_base_url(base_url: &str) -> anyhow::Result<Url> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        anyhow::bail!("API base URL is required");
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash)
        .map_err(|e| anyhow::anyhow!("Invalid API base URL '{}': {}", trimmed, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One canned reply per request path; unknown paths get a 404.
    async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let head = read_request_head(&mut sock).await;
                let path = head
                    .lines()
                    .next()
                    .and_then(|l| l.split_whitespace().nth(1))
                    .unwrap_or("")
                    .to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| path.ends_with(p))
                    .map(|(_, st, b)| (*st, *b))
                    .unwrap_or((404, ""));
                let reply = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{}/api/", addr)
    }

    /// Read headers plus a `Content-Length` body so the client never sees an early close.
    async fn read_request_head(sock: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let body_len = head
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return head;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    #[tokio::test]
    async fn rejected_reply_carries_server_message() {
        let base = serve(vec![(
            "contract/influencer/confirm",
            409,
            r#"{"success":false,"message":"Contract already confirmed"}"#,
        )])
        .await;
        let client = ReqwestApiClient::new(&base, Duration::from_secs(5), None).unwrap();

        let err = client
            .post("contract/influencer/confirm", &json!({ "contractId": "C1" }))
            .await
            .unwrap_err();

        match err {
            PortalError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message.as_deref(), Some("Contract already confirmed"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_has_no_message() {
        let base = serve(vec![("contract/sign", 502, "<html>Bad Gateway</html>")]).await;
        let client = ReqwestApiClient::new(&base, Duration::from_secs(5), None).unwrap();

        let err = client.post("contract/sign", &json!({})).await.unwrap_err();

        assert!(matches!(
            err,
            PortalError::Rejected {
                status: 502,
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn empty_success_body_reads_as_null() {
        let base = serve(vec![("contract/notes", 200, "")]).await;
        let client = ReqwestApiClient::new(&base, Duration::from_secs(5), None).unwrap();

        let value = client
            .post("contract/notes", &json!({ "contractId": "C1" }))
            .await
            .unwrap();

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client =
            ReqwestApiClient::new(&format!("http://{}/", addr), Duration::from_secs(5), None)
                .unwrap();

        let err = client.get_bytes("contract/pdf/C1").await.unwrap_err();

        assert!(matches!(err, PortalError::Transport(_)));
    }

    #[tokio::test]
    async fn dry_run_client_answers_without_network() {
        let client = DryRunApiClient;
        assert_eq!(
            client.post("contract/sign", &json!({})).await.unwrap(),
            json!({ "success": true })
        );
        assert!(client.get_bytes("contract/pdf/C1").await.unwrap().is_empty());
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let client =
            ReqwestApiClient::new("https://api.example.com/v1", Duration::from_secs(5), None)
                .unwrap();
        assert_eq!(
            client.endpoint("/contract/sign").unwrap().as_str(),
            "https://api.example.com/v1/contract/sign"
        );
        assert_eq!(
            client.endpoint("contract/pdf/C1").unwrap().as_str(),
            "https://api.example.com/v1/contract/pdf/C1"
        );
    }

    #[test]
    fn base_url_must_be_valid() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("not a url").is_err());
        assert_eq!(
            normalize_base_url("http://localhost:8080/api/").unwrap().as_str(),
            "http://localhost:8080/api/"
        );
    }
}
