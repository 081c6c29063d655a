//! Domain model (ids, articles, operation kinds, cache entries, errors).

pub mod article;
pub mod entry;
pub mod errors;
pub mod ids;
pub mod operation;

pub use article::{Article, ensure_unique_ids};
pub use entry::{CacheEntry, EntryState};
pub use errors::{ServiceError, ServiceErrorKind, SourceError};
pub use ids::{ArticleId, GenerationId, SessionId};
pub use operation::{CacheKey, OperationKind};
