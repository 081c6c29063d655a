//! GeminiTextService - Google Generative Language API を使う TextService
//!
//! `POST {endpoint}/v1beta/models/{model}:generateContent`
//!
//! # エラー分類
//! - API key なし: 呼び出し前に `Unconfigured`
//! - 送信失敗・タイムアウト: `NetworkFailure`
//! - 2xx 以外・decode 失敗・テキストなし: `ProviderError`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::{REWRITE_SYSTEM, SUMMARY_SYSTEM, rewrite_prompt, summary_prompt};
use crate::domain::{Article, ServiceError};
use crate::ports::TextService;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const UNCONFIGURED: &str = "AI service is not configured; set GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(system: &'a str, prompt: &'a str) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn classify_transport(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        ServiceError::network(err.to_string())
    } else {
        ServiceError::provider(err.to_string())
    }
}

pub struct GeminiTextService {
    client: Client,
    config: GeminiConfig,
}

impl GeminiTextService {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn call(&self, system: &str, prompt: &str) -> Result<String, ServiceError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(ServiceError::unconfigured(UNCONFIGURED));
        };

        let started = std::time::Instant::now();
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::new(system, prompt))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.text().await {
                Ok(body) => provider_message(&body),
                Err(e) => {
                    warn!(%status, error = %e, "failed to read error body");
                    format!("unreadable error body ({e})")
                }
            };
            return Err(ServiceError::provider(format!("HTTP {status}: {detail}")));
        }

        let decoded: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::network(e.to_string())
            } else {
                ServiceError::provider(format!("undecodable response: {e}"))
            }
        })?;

        debug!(
            model = %self.config.model,
            duration_ms = started.elapsed().as_millis() as u64,
            "generateContent completed"
        );
        decoded
            .into_text()
            .ok_or_else(|| ServiceError::provider("response contained no text"))
    }
}

#[async_trait]
impl TextService for GeminiTextService {
    async fn summarize(&self, article: &Article) -> Result<String, ServiceError> {
        self.call(SUMMARY_SYSTEM, &summary_prompt(article)).await
    }

    async fn rewrite(&self, article: &Article) -> Result<String, ServiceError> {
        self.call(REWRITE_SYSTEM, &rewrite_prompt(article)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Coordinator;
    use crate::domain::article::sample_article;
    use crate::domain::{CacheEntry, CacheKey, OperationKind, ServiceErrorKind};
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn service_for_url(endpoint: String) -> GeminiTextService {
        GeminiTextService::new(GeminiConfig {
            api_key: Some("test-key".to_string()),
            endpoint,
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    fn service_for(server: &mockito::ServerGuard) -> GeminiTextService {
        service_for_url(server.url())
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "systemInstruction": { "parts": [{ "text": SUMMARY_SYSTEM }] },
                "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "role": "model", "parts": [{ "text": "Line one. " }, { "text": "Line two." }] }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = service_for(&server)
            .summarize(&sample_article("b1"))
            .await
            .unwrap();

        assert_eq!(text, "Line one. Line two.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rewrite_uses_rewrite_instruction() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(json!({
                "systemInstruction": { "parts": [{ "text": REWRITE_SYSTEM }] }
            })))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Simple words."}]}}]}"#)
            .create_async()
            .await;

        let text = service_for(&server)
            .rewrite(&sample_article("b2"))
            .await
            .unwrap();

        assert_eq!(text, "Simple words.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_maps_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
            .create_async()
            .await;

        let err = service_for(&server)
            .summarize(&sample_article("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ServiceErrorKind::ProviderError);
        assert!(err.message().contains("API key not valid"));
    }

    #[tokio::test]
    async fn empty_candidates_map_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let err = service_for(&server)
            .summarize(&sample_article("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ServiceErrorKind::ProviderError);
    }

    #[tokio::test]
    async fn malformed_body_maps_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = service_for(&server)
            .rewrite(&sample_article("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ServiceErrorKind::ProviderError);
    }

    #[tokio::test]
    async fn unreachable_endpoint_maps_to_network_failure() {
        let service = GeminiTextService::new(GeminiConfig {
            api_key: Some("test-key".to_string()),
            endpoint: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            ..GeminiConfig::default()
        })
        .unwrap();

        let err = service.summarize(&sample_article("b1")).await.unwrap_err();
        assert_eq!(err.kind(), ServiceErrorKind::NetworkFailure);
    }

    /// Accepts connections and never answers.
    async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    fn impatient_service(endpoint: String) -> GeminiTextService {
        GeminiTextService::new(GeminiConfig {
            api_key: Some("test-key".to_string()),
            endpoint,
            timeout: Duration::from_millis(200),
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn timeout_maps_to_network_failure() {
        let service = impatient_service(silent_endpoint().await);

        let err = service.summarize(&sample_article("b1")).await.unwrap_err();
        assert_eq!(err.kind(), ServiceErrorKind::NetworkFailure);
    }

    #[tokio::test]
    async fn timed_out_request_settles_failed() {
        let service = impatient_service(silent_endpoint().await);
        let coordinator = Coordinator::new(Arc::new(service));
        let article = sample_article("b2");

        let err = coordinator
            .request(&article, OperationKind::Rewrite)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ServiceErrorKind::NetworkFailure);
        assert_eq!(
            coordinator.read(&CacheKey::rewrite("b2")),
            CacheEntry::Failed(err)
        );
    }

    #[tokio::test]
    async fn truncated_error_body_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            // drain the request until the client goes quiet
            while let Ok(Ok(n)) =
                tokio::time::timeout(Duration::from_millis(100), socket.read(&mut buf)).await
            {
                if n == 0 {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let err = service_for_url(format!("http://{addr}"))
            .summarize(&sample_article("b1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ServiceErrorKind::ProviderError);
        assert!(err.message().starts_with("HTTP 500 Internal Server Error: unreadable error body"));
    }

    #[tokio::test]
    async fn missing_key_never_reaches_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", PATH).expect(0).create_async().await;

        let service = GeminiTextService::new(GeminiConfig {
            api_key: None,
            endpoint: server.url(),
            ..GeminiConfig::default()
        })
        .unwrap();
        assert!(!service.is_configured());

        let err = service.summarize(&sample_article("b1")).await.unwrap_err();
        assert_eq!(err.kind(), ServiceErrorKind::Unconfigured);
        mock.assert_async().await;
    }

    #[test]
    fn provider_message_falls_back_to_raw_body() {
        assert_eq!(provider_message("  upstream timeout \n"), "upstream timeout");
        assert_eq!(
            provider_message(r#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
    }
}
