//! Coordinator - 記事ごとの要約・書き直し結果の cache と request の調停
//!
//! # 不変条件
//! - 1 つの CacheKey につき in-flight な generation は高々 1 つ
//! - 状態遷移（check-then-set / commit）は lock 内で同期的に行い、
//!   lock を保持したまま `.await` しない
//! - 失敗は `Failed` としてそのまま保存し、自動リトライしない
//!
//! # 使用例
//! ```ignore
//! let coordinator = Coordinator::new(service);
//! let summary = coordinator.request(&article, OperationKind::Summary).await?;
//! assert_eq!(coordinator.read(&CacheKey::summary(article.id.clone())).text(), Some(summary.as_str()));
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{Instrument, debug, info, info_span, warn};

use super::handle::GenerationHandle;
use super::state::{Begin, CacheState, GenerationResult, Invalidation};
use crate::app::status::CacheStatus;
use crate::domain::{
    Article, CacheEntry, CacheKey, GenerationId, OperationKind, ServiceError, SessionId,
};
use crate::ports::{Clock, IdGenerator, SystemClock, TextService, UlidGenerator};

/// Coordinator は session 単位の結果 cache と request の調停役
///
/// clone は安価で、全ての clone が同じ cache を共有します。
/// session ごとに 1 つ作り、各ビューに渡します。
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<CacheState>,
    service: Arc<dyn TextService>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        // state transitions never panic halfway, so a poisoned table is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, key: &CacheKey, generation: GenerationId, result: GenerationResult) {
        match &result {
            Ok(text) => info!(%key, %generation, chars = text.len(), "generation ready"),
            Err(err) => warn!(%key, %generation, error = %err, "generation failed"),
        }

        let settled_at = self.clock.now();
        let waiters = self
            .lock_state()
            .commit(key, generation, result.clone(), settled_at);

        let Some(waiters) = waiters else {
            debug!(%key, %generation, "generation no longer in flight; result dropped");
            return;
        };
        for waiter in waiters {
            // a dropped handle just means nobody is listening any more
            let _ = waiter.send(result.clone());
        }
    }
}

/// CommitGuard は service の応答前に generation task が終わった場合に ProviderError を commit する
struct CommitGuard {
    inner: Arc<Inner>,
    key: CacheKey,
    generation: GenerationId,
    committed: bool,
}

impl CommitGuard {
    fn commit(mut self, result: GenerationResult) {
        self.committed = true;
        self.inner.commit(&self.key, self.generation, result);
    }
}

impl Drop for CommitGuard {
    fn drop(&mut self) {
        if !self.committed {
            self.inner.commit(
                &self.key,
                self.generation,
                Err(ServiceError::provider(
                    "generation ended before the service responded",
                )),
            );
        }
    }
}

impl Coordinator {
    /// SystemClock と ULID の generation id で Coordinator を作成
    pub fn new(service: Arc<dyn TextService>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ids = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
        Self::with_parts(service, clock, ids)
    }

    pub fn with_parts(
        service: Arc<dyn TextService>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CacheState::default()),
                service,
                clock,
                ids,
            }),
        }
    }

    /// `key` の現在の entry を返す（service を待たない）
    pub fn read(&self, key: &CacheKey) -> CacheEntry {
        self.inner.lock_state().read(key)
    }

    /// `article` の `kind` を要求
    ///
    /// - in-flight: 実行中の generation に参加
    /// - settle 済みで invalidate されていない: 保存済みの結果で resolve
    /// - それ以外: return 前に `Pending` にし、service 呼び出しを 1 回 spawn
    ///
    /// Tokio runtime 内から呼ぶこと。
    pub fn request(&self, article: &Article, kind: OperationKind) -> GenerationHandle {
        let key = CacheKey::new(article.id.clone(), kind);
        let begin = self
            .inner
            .lock_state()
            .begin(&key, || self.inner.ids.generate_generation_id());

        match begin {
            Begin::Cached(result) => {
                debug!(%key, "served from cache");
                GenerationHandle::cached(key, result)
            }
            Begin::Joined(waiter) => {
                debug!(%key, "joined in-flight generation");
                GenerationHandle::waiting(key, waiter)
            }
            Begin::Started { generation, waiter } => {
                self.spawn_generation(article.clone(), key.clone(), generation);
                GenerationHandle::waiting(key, waiter)
            }
        }
    }

    /// settle 済みの entry に印を付け、次の `request` で service を再度呼ばせる
    ///
    /// 対象がない、または generation が in-flight の場合は `false`（in-flight は取り消さない）。
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        match self.inner.lock_state().invalidate(key) {
            Invalidation::Marked => {
                debug!(%key, "entry invalidated");
                true
            }
            Invalidation::InFlight => {
                debug!(%key, "invalidate ignored; generation in flight");
                false
            }
            Invalidation::Absent => false,
        }
    }

    /// `invalidate` + `request`（「再生成」「再試行」操作）
    pub fn regenerate(&self, article: &Article, kind: OperationKind) -> GenerationHandle {
        self.invalidate(&CacheKey::new(article.id.clone(), kind));
        self.request(article, kind)
    }

    pub fn status(&self) -> CacheStatus {
        self.inner.lock_state().status()
    }

    pub(crate) fn new_session_id(&self) -> SessionId {
        self.inner.ids.generate_session_id()
    }

    fn spawn_generation(&self, article: Article, key: CacheKey, generation: GenerationId) {
        info!(%key, %generation, "generation started");
        let span = info_span!("generation", %key, %generation);
        let guard = CommitGuard {
            inner: Arc::clone(&self.inner),
            key,
            generation,
            committed: false,
        };

        tokio::spawn(
            async move {
                let result = guard
                    .inner
                    .service
                    .generate(&article, guard.key.kind)
                    .await;
                guard.commit(result);
            }
            .instrument(span),
        );
    }
}
