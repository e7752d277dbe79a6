//! Spawning fetches and reporting their outcomes.

use crate::error::FetchError;
use crate::normalize::RawResponse;
use crate::query::QueryKey;
use crate::source::RemoteDataSource;
use futures_util::future::{AbortHandle, Abortable};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One issued request: the generation it belongs to and the key it fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub key: QueryKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub result: Result<RawResponse, FetchError>,
}

/// Runs fetches as tokio tasks and sends their outcomes to one channel.
///
/// A single dispatcher can serve many grids; outcomes are routed back by
/// `ticket.key.resource()`.
#[derive(Clone)]
pub struct FetchDispatcher {
    source: Arc<dyn RemoteDataSource>,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
}

impl FetchDispatcher {
    pub fn new(
        source: Arc<dyn RemoteDataSource>,
        outcomes: mpsc::UnboundedSender<FetchOutcome>,
    ) -> Self {
        Self { source, outcomes }
    }

    pub fn channel(
        source: Arc<dyn RemoteDataSource>,
    ) -> (Self, mpsc::UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(source, tx), rx)
    }

    /// Spawn the fetch for `ticket`. Aborting the returned handle drops the
    /// request, and no outcome is sent for it.
    pub fn dispatch(&self, ticket: FetchTicket) -> AbortHandle {
        let (handle, registration) = AbortHandle::new_pair();
        let source = Arc::clone(&self.source);
        let outcomes = self.outcomes.clone();

        tokio::spawn(async move {
            let fetched = Abortable::new(source.fetch(&ticket.key), registration).await;
            match fetched {
                Ok(result) => {
                    if outcomes.send(FetchOutcome { ticket, result }).is_err() {
                        tracing::debug!("outcome receiver dropped");
                    }
                }
                Err(_aborted) => {
                    tracing::debug!(
                        key = %ticket.key,
                        generation = ticket.generation,
                        "fetch aborted"
                    );
                }
            }
        });

        handle
    }
}

impl std::fmt::Debug for FetchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchDispatcher")
            .field("receiver_open", &!self.outcomes.is_closed())
            .finish()
    }
}
