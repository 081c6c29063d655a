//! GenerationHandle - request の戻り値
//!
//! 同じ generation に参加した全ての handle は同じ結果で resolve します。
//! handle を drop しても generation は止まらず、結果は cache に commit されます。

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::state::GenerationResult;
use crate::domain::{CacheKey, ServiceError};

#[derive(Debug)]
enum HandleState {
    Cached(Ready<GenerationResult>),
    Waiting(oneshot::Receiver<GenerationResult>),
}

/// GenerationHandle は 1 つの cache key のテキスト（またはエラー）で resolve する Future
#[derive(Debug)]
#[must_use = "dropping the handle does not cancel the generation, but its result is lost to this caller"]
pub struct GenerationHandle {
    key: CacheKey,
    state: HandleState,
}

impl GenerationHandle {
    pub(crate) fn cached(key: CacheKey, result: GenerationResult) -> Self {
        Self {
            key,
            state: HandleState::Cached(ready(result)),
        }
    }

    pub(crate) fn waiting(key: CacheKey, waiter: oneshot::Receiver<GenerationResult>) -> Self {
        Self {
            key,
            state: HandleState::Waiting(waiter),
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// service を呼ばず settle 済みの entry から返された
    pub fn is_cached(&self) -> bool {
        matches!(self.state, HandleState::Cached(_))
    }
}

impl Future for GenerationHandle {
    type Output = Result<String, ServiceError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            HandleState::Cached(result) => Pin::new(result).poll(cx),
            HandleState::Waiting(waiter) => Pin::new(waiter).poll(cx).map(|received| {
                received.unwrap_or_else(|_| {
                    Err(ServiceError::provider(
                        "generation ended without delivering a result",
                    ))
                })
            }),
        }
    }
}
