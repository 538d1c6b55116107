//! Authenticated JSON requests against the backend
//!
//! Every request carries the stored bearer token. A 401 or 403 answer clears
//! the token and publishes [`SessionEvent::LoggedOut`] before the error
//! reaches the caller, so callers treat it like any other failure.

use crate::auth::{session_channel, SessionEvent, TokenStore};
use crate::config::ClientConfig;
use crate::Result;
use idlerealm_admin::ApiError;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Error body shapes the backend uses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Server message carried by an error body, if any
fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Shared HTTP client; cheap to clone
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    tokens: Arc<TokenStore>,
    session: Arc<watch::Sender<SessionEvent>>,
}

impl ApiClient {
    /// Build a client from configuration, opening the token file if one is set
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let tokens = match &config.token_path {
            Some(path) => TokenStore::open(path)?,
            None => TokenStore::in_memory(),
        };
        Self::with_tokens(config, Arc::new(tokens))
    }

    pub fn with_tokens(config: &ClientConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        let (session, _) = session_channel();
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
            session: Arc::new(session),
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Watch for session changes
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    pub fn session(&self) -> SessionEvent {
        *self.session.borrow()
    }

    /// Store a fresh token and mark the session active again
    pub fn login(&self, token: impl Into<String>) -> Result<()> {
        self.tokens.set(token)?;
        self.session.send_if_modified(|event| {
            let expired = *event == SessionEvent::LoggedOut;
            *event = SessionEvent::Active;
            expired
        });
        debug!("session active");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> std::result::Result<T, ApiError> {
        self.send::<T, ()>(Method::GET, path, query, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.send(Method::POST, path, &[], body).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ApiError> {
        self.send::<T, ()>(Method::DELETE, path, &[], None).await
    }

    /// Send one request and decode its JSON answer
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// targets accept it.
    pub async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            warn!(%method, path, "request failed: {err}");
            ApiError::transport(err.to_string())
        })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::new(Some(status.as_u16()), Some(err.to_string())))?;

        debug!(%method, path, status = status.as_u16(), "response received");

        if !status.is_success() {
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                self.expire_session();
            }
            return Err(ApiError::new(Some(status.as_u16()), error_message(&bytes)));
        }

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|err| {
            warn!(%method, path, "undecodable response: {err}");
            ApiError::new(Some(status.as_u16()), Some(format!("invalid response: {err}")))
        })
    }

    fn expire_session(&self) {
        if let Err(err) = self.tokens.clear() {
            warn!("failed to clear token: {err}");
        }
        self.session.send_replace(SessionEvent::LoggedOut);
        warn!("session expired, logged out");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned HTTP responses, one per accepted connection, and return
    /// the base URL plus the raw requests seen
    pub(crate) async fn serve(
        responses: Vec<(u16, &'static str)>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                seen.push(read_request(&mut socket).await);
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            seen
        });
        (format!("http://{addr}"), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + length {
                    return text;
                }
            }
            if n == 0 {
                return text;
            }
        }
    }

    pub(crate) fn client_for(base_url: &str) -> ApiClient {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(br#"{"error": "Montant invalide"}"#).as_deref(), Some("Montant invalide"));
        assert_eq!(error_message(br#"{"message": "Not allowed"}"#).as_deref(), Some("Not allowed"));
        assert_eq!(error_message(br#"{"error": " "}"#), None);
        assert_eq!(error_message(b"<html>oops</html>"), None);
    }

    #[tokio::test]
    async fn test_bearer_token_and_json() {
        let (base, server) = serve(vec![(200, r#"{"ok": true}"#)]).await;
        let client = client_for(&base);
        client.tokens().set("t0k3n").unwrap();

        let body: serde_json::Value = client.get("/api/ping", &[("q", "a b".to_string())]).await.unwrap();
        assert_eq!(body["ok"], serde_json::Value::Bool(true));

        let seen = server.await.unwrap();
        assert!(seen[0].starts_with("GET /api/ping?q=a+b HTTP/1.1"));
        assert!(seen[0].to_ascii_lowercase().contains("authorization: bearer t0k3n"));
    }

    #[tokio::test]
    async fn test_unauthorized_logs_out() {
        let (base, server) = serve(vec![(401, r#"{"message": "Token expired"}"#)]).await;
        let client = client_for(&base);
        client.tokens().set("stale").unwrap();
        let mut events = client.subscribe();

        let err = client.delete::<()>("/api/admin/realms/1").await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(err.message.as_deref(), Some("Token expired"));
        assert_eq!(client.tokens().get(), None);
        assert!(events.has_changed().unwrap());
        assert_eq!(*events.borrow_and_update(), SessionEvent::LoggedOut);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_after_expiry_reactivates_session() {
        let (base, server) = serve(vec![(403, ""), (200, "[]")]).await;
        let client = client_for(&base);
        let mut events = client.subscribe();

        client.get::<serde_json::Value>("/api/profile", &[]).await.unwrap_err();
        assert_eq!(client.session(), SessionEvent::LoggedOut);
        let _ = events.borrow_and_update();

        client.login("fresh").unwrap();
        assert_eq!(client.session(), SessionEvent::Active);
        assert!(events.has_changed().unwrap());
        assert_eq!(*events.borrow_and_update(), SessionEvent::Active);

        client.get::<serde_json::Value>("/api/profile", &[]).await.unwrap();
        let seen = server.await.unwrap();
        assert!(seen[1].to_ascii_lowercase().contains("authorization: bearer fresh"));

        // Logging in while active is not a session change
        client.login("fresher").unwrap();
        assert!(!events.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let (base, server) = serve(vec![(200, ""), (500, "")]).await;
        let client = client_for(&base);

        let nothing: Option<u32> = client.put("/api/x", &[1, 2]).await.unwrap();
        assert_eq!(nothing, None);

        let err = client.post::<(), ()>("/api/x", None).await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(err.message, None);
        assert_eq!(client.session(), SessionEvent::Active);
        server.await.unwrap();
    }
}
