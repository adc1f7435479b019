use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::config::{Config, ConfigError};

use super::provider::ProviderKind;
use super::transport::{HttpRequest, ReqwestTransport, Transport, TransportError};

/// Per-request timeout for AI calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body quoted back to the user on an HTTP error.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Everything that can go wrong in one AI turn. The `Display` text of each
/// variant is what ends up in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("[Error]: API configuration is invalid ({0}). Set AI_API_KEY and AI_API_ENDPOINT.")]
    MissingConfig(ConfigError),
    #[error("[Error]: Request to the API timed out")]
    Timeout,
    #[error("[Error connecting to API]: {0}")]
    Network(String),
    #[error("[Error]: API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("[Error]: Unexpected response format from the API (missing {0})")]
    UnexpectedShape(&'static str),
    #[error("[Error]: API response is not valid JSON")]
    InvalidJson,
}

impl From<TransportError> for AiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => AiError::Timeout,
            TransportError::Network(msg) => AiError::Network(msg),
        }
    }
}

/// Sends one prompt per call to the configured endpoint.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct AiClient {
    config: Config,
    provider: ProviderKind,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl AiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: config.clone(),
            provider: ProviderKind::detect(&config.endpoint),
            transport,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Ask the AI and always come back with displayable text.
    ///
    /// Failures are logged and rendered through [`AiError`]'s `Display`.
    pub async fn get_response(&self, prompt: &str) -> String {
        match self.try_get_response(prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("AI request failed: {:?}", e);
                e.to_string()
            }
        }
    }

    pub async fn try_get_response(&self, prompt: &str) -> Result<String, AiError> {
        self.config.validate().map_err(AiError::MissingConfig)?;

        let request = self.build_request(prompt);
        info!("Sending request to {} provider", self.provider);
        let response = self.transport.post_json(request, self.timeout).await?;

        if !response.is_success() {
            return Err(AiError::Status {
                status: response.status,
                body: truncate_chars(response.body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let data: Value =
            serde_json::from_str(&response.body).map_err(|_| AiError::InvalidJson)?;
        parse_response(self.provider, &data)
    }

    /// Build the provider-specific request for `prompt`.
    pub fn build_request(&self, prompt: &str) -> HttpRequest {
        let bearer = || {
            vec![
                ("Authorization".to_string(), format!("Bearer {}", self.config.api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        };

        match self.provider {
            ProviderKind::OpenAi => HttpRequest {
                url: self.config.endpoint.clone(),
                headers: bearer(),
                body: json!({
                    "model": self.config.model,
                    "messages": [{ "role": "user", "content": prompt }],
                }),
            },
            // Gemini takes the key in the query string, never in a header.
            ProviderKind::Gemini => HttpRequest {
                url: format!("{}?key={}", self.config.endpoint, self.config.api_key),
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: json!({ "contents": [{ "parts": [{ "text": prompt }] }] }),
            },
            ProviderKind::Generic => HttpRequest {
                url: self.config.endpoint.clone(),
                headers: bearer(),
                body: json!({ "prompt": prompt }),
            },
        }
    }
}

/// Extract the reply text from a provider's response envelope.
pub fn parse_response(provider: ProviderKind, data: &Value) -> Result<String, AiError> {
    match provider {
        ProviderKind::OpenAi => data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AiError::UnexpectedShape("choices[0].message.content")),
        ProviderKind::Gemini => data
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AiError::UnexpectedShape("candidates[0].content.parts[0].text")),
        // Unknown APIs: take `text` if present, otherwise show the whole body.
        ProviderKind::Generic => Ok(match data.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => data.to_string(),
        }),
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_openai() {
        let data = json!({ "choices": [{ "message": { "content": "hi there" } }] });
        assert_eq!(parse_response(ProviderKind::OpenAi, &data).unwrap(), "hi there");
    }

    #[test]
    fn test_parse_openai_empty_choices() {
        let data = json!({ "choices": [] });
        assert_eq!(
            parse_response(ProviderKind::OpenAi, &data),
            Err(AiError::UnexpectedShape("choices[0].message.content"))
        );
    }

    #[test]
    fn test_parse_gemini() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": "olá" }] } }]
        });
        assert_eq!(parse_response(ProviderKind::Gemini, &data).unwrap(), "olá");

        let missing = json!({ "candidates": [{ "content": {} }] });
        assert!(matches!(
            parse_response(ProviderKind::Gemini, &missing),
            Err(AiError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_parse_generic_text_and_fallback() {
        let data = json!({ "text": "plain" });
        assert_eq!(parse_response(ProviderKind::Generic, &data).unwrap(), "plain");

        let data = json!({ "output": "elsewhere" });
        assert_eq!(
            parse_response(ProviderKind::Generic, &data).unwrap(),
            r#"{"output":"elsewhere"}"#
        );
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let messages = [
            AiError::MissingConfig(ConfigError::MissingApiKey).to_string(),
            AiError::Timeout.to_string(),
            AiError::Network("refused".into()).to_string(),
            AiError::Status { status: 500, body: "oops".into() }.to_string(),
            AiError::UnexpectedShape("x").to_string(),
            AiError::InvalidJson.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            assert!(a.starts_with("[Error"), "{a}");
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(messages[1].contains("timed out"));
        assert!(messages[3].contains("500"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("ééééé", 2), "éé...");
    }

    use crate::ai::transport::fake::FakeTransport;
    use crate::config::{ENV_API_ENDPOINT, ENV_API_KEY};

    fn config(key: &str, endpoint: &str) -> Config {
        Config::from_lookup(|name| match name {
            ENV_API_KEY => Some(key.to_string()),
            ENV_API_ENDPOINT => Some(endpoint.to_string()),
            _ => None,
        })
    }

    fn client(cfg: &Config, transport: &Arc<FakeTransport>) -> AiClient {
        let transport: Arc<dyn Transport> = transport.clone();
        AiClient::with_transport(cfg, transport)
    }

    #[tokio::test]
    async fn test_openai_round_trip() {
        let cfg = config("sk-test", "https://api.openai.com/v1/chat/completions");
        let fake = Arc::new(FakeTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"hi there"}}]}"#,
        ));

        let reply = client(&cfg, &fake).get_response("hello").await;

        assert_eq!(reply, "hi there");
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(req.header("Authorization"), Some("Bearer sk-test"));
        assert_eq!(
            req.body,
            json!({ "model": "gpt-4", "messages": [{ "role": "user", "content": "hello" }] })
        );
    }

    #[tokio::test]
    async fn test_gemini_key_in_url_without_auth_header() {
        let endpoint = "https://generativelanguage.googleapis.com/v1/models/foo:generateContent";
        let cfg = config("k1", endpoint);
        let fake = Arc::new(FakeTransport::replying(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"from gemini"}]}}]}"#,
        ));

        let reply = client(&cfg, &fake).get_response("hello").await;

        assert_eq!(reply, "from gemini");
        let req = &fake.requests()[0];
        assert_eq!(req.url, format!("{endpoint}?key=k1"));
        assert_eq!(req.header("Authorization"), None);
        assert_eq!(req.body, json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
    }

    #[tokio::test]
    async fn test_generic_prompt_body_and_fallback() {
        let cfg = config("tok", "http://localhost:8080/generate");
        let fake = Arc::new(FakeTransport::replying(200, r#"{"answer":42}"#));

        let reply = client(&cfg, &fake).get_response("hello").await;

        assert_eq!(reply, r#"{"answer":42}"#);
        let req = &fake.requests()[0];
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
        assert_eq!(req.body, json!({ "prompt": "hello" }));
    }

    #[tokio::test]
    async fn test_missing_config_makes_no_call() {
        for cfg in [config("", "https://api.openai.com/v1"), config("sk", "")] {
            let fake = Arc::new(FakeTransport::replying(200, "{}"));

            let reply = client(&cfg, &fake).get_response("hello").await;

            assert!(reply.contains("configuration"), "{reply}");
            assert_eq!(fake.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported_not_raised() {
        let cfg = config("sk", "https://api.openai.com/v1");
        let fake = Arc::new(FakeTransport::failing(TransportError::Timeout));

        let reply = client(&cfg, &fake).get_response("hello").await;

        assert!(reply.contains("timed out"), "{reply}");
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let cfg = config("sk", "https://api.openai.com/v1");
        let fake = Arc::new(FakeTransport::replying(401, "  invalid key \n"));

        let result = client(&cfg, &fake).try_get_response("hello").await;

        assert_eq!(result, Err(AiError::Status { status: 401, body: "invalid key".into() }));
    }

    #[tokio::test]
    async fn test_shape_mismatch_and_invalid_json() {
        let cfg = config("sk", "https://api.openai.com/v1");
        let fake = Arc::new(FakeTransport::replying(200, r#"{"error":"nope"}"#));
        let reply = client(&cfg, &fake).get_response("hello").await;
        assert!(reply.contains("Unexpected response format"), "{reply}");

        let fake = Arc::new(FakeTransport::replying(200, "<html>"));
        let result = client(&cfg, &fake).try_get_response("hello").await;
        assert_eq!(result, Err(AiError::InvalidJson));
    }

    #[tokio::test]
    async fn test_custom_model() {
        let mut cfg = config("sk", "https://api.openai.com/v1");
        cfg.model = "gpt-4o-mini".into();
        let fake = Arc::new(FakeTransport::replying(200, "{}"));

        let _reply = client(&cfg, &fake).get_response("x").await;

        assert_eq!(fake.requests()[0].body["model"], "gpt-4o-mini");
    }

    // Real HTTP over `ReqwestTransport` against a local listener.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one request, answer with `body`, and hand back the raw request.
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 1024];
            while !(received.windows(4).any(|w| w == b"\r\n\r\n") && received.ends_with(b"}")) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..n]);
            }
            let reply = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });
        (format!("http://{addr}"), server)
    }

    #[tokio::test]
    async fn test_gemini_over_http_sends_key_in_query_only() {
        let (base, server) =
            serve_once(r#"{"candidates":[{"content":{"parts":[{"text":"from gemini"}]}}]}"#).await;
        let cfg = config("k1", &format!("{base}/v1/models/gemini-pro:generateContent"));

        let reply = AiClient::new(&cfg).get_response("hello").await;

        assert_eq!(reply, "from gemini");
        let raw = server.await.unwrap();
        assert!(
            raw.starts_with("POST /v1/models/gemini-pro:generateContent?key=k1 HTTP/1.1"),
            "{raw}"
        );
        assert!(!raw.to_lowercase().contains("authorization:"), "{raw}");
        assert!(raw.ends_with(r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#), "{raw}");
    }

    #[tokio::test]
    async fn test_openai_over_http_sends_bearer() {
        let (base, server) = serve_once(r#"{"choices":[{"message":{"content":"hi there"}}]}"#).await;
        let cfg = config("sk-test", &format!("{base}/openai/v1/chat/completions"));

        let reply = AiClient::new(&cfg).get_response("hello").await;

        assert_eq!(reply, "hi there");
        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.contains("authorization: bearer sk-test"), "{raw}");
        assert!(raw.contains("content-type: application/json"), "{raw}");
    }

    #[tokio::test]
    async fn test_timeout_over_http() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });
        let cfg = config("sk", &format!("http://{addr}/openai/v1"));

        let reply = AiClient::new(&cfg)
            .with_timeout(Duration::from_millis(200))
            .get_response("hello")
            .await;

        assert_eq!(reply, AiError::Timeout.to_string());
        assert!(reply.contains("timed out"));
        server.abort();
    }

    #[tokio::test]
    async fn test_connection_error_does_not_leak_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let cfg = config(
            "SECRET-KEY-123",
            &format!("http://{addr}/v1/models/gemini-pro:generateContent"),
        );

        let reply = AiClient::new(&cfg).get_response("hello").await;

        assert!(reply.starts_with("[Error connecting to API]"), "{reply}");
        assert!(!reply.contains("SECRET-KEY-123"), "{reply}");
    }
}
