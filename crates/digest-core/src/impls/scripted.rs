//! ScriptedTextService - オフライン用・テスト用の決定的な TextService
//!
//! - 全ての呼び出しを記録する（呼び出し回数の検証用）
//! - gate で呼び出しを in-flight のまま止めておける
//! - key ごとに「次の n 回は失敗」を仕込める

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::domain::{Article, CacheKey, OperationKind, ServiceError, ServiceErrorKind};
use crate::ports::TextService;

/// Releases calls held by a gated `ScriptedTextService`.
#[derive(Debug, Clone)]
pub struct ServiceGate {
    permits: Arc<Semaphore>,
}

impl ServiceGate {
    /// Lets exactly one held (or future) call through.
    pub fn open_one(&self) {
        self.permits.add_permits(1);
    }

    /// Lets every held and future call through.
    pub fn open(&self) {
        self.permits.close();
    }
}

#[derive(Default)]
struct Script {
    calls: Vec<CacheKey>,
    per_key: HashMap<CacheKey, usize>,
    failures: HashMap<CacheKey, (ServiceErrorKind, usize)>,
}

/// Deterministic text service: answers `"{kind} #{n} of {id}: {title}"`.
#[derive(Default)]
pub struct ScriptedTextService {
    script: Mutex<Script>,
    gate: Option<Arc<Semaphore>>,
    latency: Duration,
}

impl ScriptedTextService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Holds every call until the returned gate lets it through.
    pub fn gated(mut self) -> (Self, ServiceGate) {
        let permits = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&permits));
        (self, ServiceGate { permits })
    }

    /// The next `times` calls for `key` fail with `kind`.
    pub fn fail_next(&self, key: CacheKey, kind: ServiceErrorKind, times: usize) {
        self.lock().failures.insert(key, (kind, times));
    }

    /// Text produced by the `n`-th call (1-based) for `(article, kind)`.
    pub fn expected_text(article: &Article, kind: OperationKind, n: usize) -> String {
        format!("{kind} #{n} of {}: {}", article.id, article.title)
    }

    pub fn calls(&self) -> Vec<CacheKey> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn calls_for(&self, key: &CacheKey) -> usize {
        self.lock().per_key.get(key).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn respond(&self, article: &Article, kind: OperationKind) -> Result<String, ServiceError> {
        let key = CacheKey::new(article.id.clone(), kind);
        let (n, failure) = {
            let mut script = self.lock();
            script.calls.push(key.clone());
            let n = {
                let count = script.per_key.entry(key.clone()).or_insert(0);
                *count += 1;
                *count
            };
            let failure = match script.failures.get_mut(&key) {
                Some((error_kind, remaining)) if *remaining > 0 => {
                    *remaining -= 1;
                    Some(*error_kind)
                }
                _ => None,
            };
            (n, failure)
        };

        if let Some(gate) = &self.gate {
            // a closed gate lets everything through
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match failure {
            Some(error_kind) => Err(ServiceError::new(
                error_kind,
                format!("scripted {kind} failure for {}", article.id),
            )),
            None => Ok(Self::expected_text(article, kind, n)),
        }
    }
}

#[async_trait]
impl TextService for ScriptedTextService {
    async fn summarize(&self, article: &Article) -> Result<String, ServiceError> {
        self.respond(article, OperationKind::Summary).await
    }

    async fn rewrite(&self, article: &Article) -> Result<String, ServiceError> {
        self.respond(article, OperationKind::Rewrite).await
    }
}
