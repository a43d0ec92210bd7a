pub mod assembler;
pub mod fetcher;
pub mod resolver;
pub mod traversal;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

pub use assembler::SearchDocument;
pub use assembler::assemble;
pub use fetcher::RelationBatch;
pub use fetcher::RelationFetcher;
pub use resolver::NodeResolver;
pub use traversal::SearchRequest;
pub use traversal::Traversal;

use crate::error::TraceError;
use crate::error::TraceResult;

/// Per-request handle every store call goes through: it waits for one of the engine-wide
/// permits and stops as soon as the request is cancelled.
#[derive(Debug, Clone)]
pub struct RequestScope {
    permits: Arc<Semaphore>,
    cancel:  CancellationToken,
}

impl RequestScope {
    pub fn new(
        permits: Arc<Semaphore>,
        cancel: CancellationToken,
    ) -> Self {
        Self { permits, cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run one store call while holding a permit.
    pub async fn call<T, F>(
        &self,
        store_call: F,
    ) -> TraceResult<T>
    where
        F: Future<Output = TraceResult<T>>,
    {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(TraceError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| TraceError::Cancelled)?,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TraceError::Cancelled),
            result = store_call => result,
        }
    }
}
