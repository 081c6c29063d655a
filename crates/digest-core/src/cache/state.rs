//! CacheState - coordinator の裏にある slot テーブル
//!
//! 全メソッドは同期的で coordinator の lock 内で実行されるため、
//! check-then-set（`begin`）が他の呼び出しと交錯することはありません。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::app::status::{CacheCounts, CacheStatus, EntryStatus};
use crate::domain::{CacheEntry, CacheKey, EntryState, GenerationId, ServiceError};

pub(crate) type GenerationResult = Result<String, ServiceError>;

type Waiter = oneshot::Sender<GenerationResult>;

/// Slot は 1 つの key の状態（slot がない key は `Absent`）
enum Slot {
    /// generation が in-flight。全 waiter が同じ結果を受け取る
    Pending {
        generation: GenerationId,
        waiters: Vec<Waiter>,
    },

    /// 直前の generation が settle 済み。`stale` は `invalidate` が立てる
    Settled {
        generation: GenerationId,
        result: GenerationResult,
        settled_at: DateTime<Utc>,
        stale: bool,
    },
}

/// Begin は `begin` の判定結果
pub(crate) enum Begin {
    /// 使える結果がある。service は呼ばない
    Cached(GenerationResult),

    /// in-flight の generation に参加した
    Joined(oneshot::Receiver<GenerationResult>),

    /// 新しい generation を登録した。呼び出し側が実行する
    Started {
        generation: GenerationId,
        waiter: oneshot::Receiver<GenerationResult>,
    },
}

/// Invalidation は `invalidate` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Invalidation {
    Marked,
    InFlight,
    Absent,
}

#[derive(Default)]
pub(crate) struct CacheState {
    slots: HashMap<CacheKey, Slot>,
}

impl CacheState {
    pub(crate) fn read(&self, key: &CacheKey) -> CacheEntry {
        match self.slots.get(key) {
            None => CacheEntry::Absent,
            Some(Slot::Pending { .. }) => CacheEntry::Pending,
            Some(Slot::Settled { result, .. }) => match result {
                Ok(text) => CacheEntry::Ready(text.clone()),
                Err(err) => CacheEntry::Failed(err.clone()),
            },
        }
    }

    /// `key` への request の check-then-set
    pub(crate) fn begin(
        &mut self,
        key: &CacheKey,
        next_generation: impl FnOnce() -> GenerationId,
    ) -> Begin {
        match self.slots.get_mut(key) {
            Some(Slot::Pending { waiters, .. }) => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                return Begin::Joined(rx);
            }
            Some(Slot::Settled {
                result,
                stale: false,
                ..
            }) => return Begin::Cached(result.clone()),
            Some(Slot::Settled { stale: true, .. }) | None => {}
        }

        let generation = next_generation();
        let (tx, rx) = oneshot::channel();
        self.slots.insert(
            key.clone(),
            Slot::Pending {
                generation,
                waiters: vec![tx],
            },
        );
        Begin::Started {
            generation,
            waiter: rx,
        }
    }

    /// `generation` が in-flight のものなら `key` を settle し、waiter を返す
    ///
    /// generation が一致しない・存在しない場合は slot に触れず `None`。
    pub(crate) fn commit(
        &mut self,
        key: &CacheKey,
        generation: GenerationId,
        result: GenerationResult,
        settled_at: DateTime<Utc>,
    ) -> Option<Vec<Waiter>> {
        let slot = self.slots.get_mut(key)?;
        let waiters = match &mut *slot {
            Slot::Pending {
                generation: in_flight,
                waiters,
            } if *in_flight == generation => std::mem::take(waiters),
            _ => return None,
        };

        *slot = Slot::Settled {
            generation,
            result,
            settled_at,
            stale: false,
        };
        Some(waiters)
    }

    pub(crate) fn invalidate(&mut self, key: &CacheKey) -> Invalidation {
        match self.slots.get_mut(key) {
            None => Invalidation::Absent,
            Some(Slot::Pending { .. }) => Invalidation::InFlight,
            Some(Slot::Settled { stale, .. }) => {
                *stale = true;
                Invalidation::Marked
            }
        }
    }

    pub(crate) fn status(&self) -> CacheStatus {
        let mut counts = CacheCounts::default();
        let mut entries: Vec<EntryStatus> = self
            .slots
            .iter()
            .map(|(key, slot)| match slot {
                Slot::Pending { generation, .. } => {
                    counts.pending += 1;
                    EntryStatus {
                        key: key.clone(),
                        state: EntryState::Pending,
                        generation: *generation,
                        settled_at_ms: None,
                        stale: false,
                        error: None,
                    }
                }
                Slot::Settled {
                    generation,
                    result,
                    settled_at,
                    stale,
                } => {
                    let state = match result {
                        Ok(_) => {
                            counts.ready += 1;
                            EntryState::Ready
                        }
                        Err(_) => {
                            counts.failed += 1;
                            EntryState::Failed
                        }
                    };
                    if *stale {
                        counts.stale += 1;
                    }
                    EntryStatus {
                        key: key.clone(),
                        state,
                        generation: *generation,
                        settled_at_ms: Some(settled_at.timestamp_millis()),
                        stale: *stale,
                        error: result.as_ref().err().map(ServiceError::kind),
                    }
                }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStatus { counts, entries }
    }
}
