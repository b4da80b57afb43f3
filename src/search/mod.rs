//! Debounced search.
//!
//! Keystrokes are pushed through a [`SearchInput`]. A background task waits for a
//! quiet window with no new input, then issues one search for the latest query.
//! Each request carries a sequence tag; a response whose tag is older than the
//! latest issued request is dropped, so a slow stale reply never overwrites a
//! fresher one.

use crate::api::{ApiClient, ApiError, SearchResult};
use crate::phone;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn search(&self, query: &str) -> Result<SearchResult, ApiError>;
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn search(&self, query: &str) -> Result<SearchResult, ApiError> {
        ApiClient::search(self, query).await
    }
}

/// What the search page offers when a non-empty query matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOffer {
    Number { phone: String },
    Place { name: String },
}

impl CreateOffer {
    pub fn for_query(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            None
        } else if phone::is_phone_like(trimmed) {
            Some(CreateOffer::Number {
                phone: phone::format_ru_phone(trimmed),
            })
        } else {
            Some(CreateOffer::Place {
                name: trimmed.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub seq: u64,
    pub query: String,
    pub result: SearchResult,
    pub offer: Option<CreateOffer>,
}

impl SearchState {
    pub fn not_found(&self) -> bool {
        self.offer.is_some()
    }
}

/// Normalises raw search-box input: drops a trailing ellipsis and reformats input
/// made only of phone symbols.
pub fn normalize_input(raw: &str) -> String {
    let base = raw.strip_suffix("...").unwrap_or(raw);
    if phone::is_phone_input(base) {
        phone::format_ru_phone(base)
    } else {
        base.to_string()
    }
}

#[derive(Clone)]
pub struct SearchInput {
    sender: mpsc::UnboundedSender<String>,
}

impl SearchInput {
    pub fn push(&self, query: &str) {
        if self.sender.send(query.to_string()).is_err() {
            error!("Search task is gone, input dropped");
        }
    }
}

pub struct DebouncedSearch {
    pub input: SearchInput,
    pub results: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl DebouncedSearch {
    pub fn spawn<B: SearchBackend>(backend: Arc<B>, quiet: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (state_tx, results) = watch::channel(SearchState::default());
        let task = tokio::spawn(run(backend, quiet, receiver, Arc::new(state_tx)));
        Self {
            input: SearchInput { sender },
            results,
            task,
        }
    }

    pub fn current(&self) -> SearchState {
        self.results.borrow().clone()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<B: SearchBackend>(
    backend: Arc<B>,
    quiet: Duration,
    mut receiver: mpsc::UnboundedReceiver<String>,
    state_tx: Arc<watch::Sender<SearchState>>,
) {
    let latest = Arc::new(AtomicU64::new(0));

    while let Some(mut query) = receiver.recv().await {
        // Restart the quiet window on every keystroke
        loop {
            tokio::select! {
                next = receiver.recv() => match next {
                    Some(next) => query = next,
                    None => return,
                },
                _ = tokio::time::sleep(quiet) => break,
            }
        }

        let seq = latest.fetch_add(1, Ordering::SeqCst) + 1;
        if query.trim().is_empty() {
            state_tx.send_replace(SearchState {
                seq,
                ..Default::default()
            });
            continue;
        }

        debug!(seq, query = %query, "Issuing search");
        let backend = backend.clone();
        let latest = latest.clone();
        let state_tx = state_tx.clone();
        // In-flight requests are not cancelled; stale replies are dropped on arrival
        tokio::spawn(async move {
            let result = backend.search(&query).await;
            if latest.load(Ordering::SeqCst) != seq {
                debug!(seq, "Dropping stale search response");
                return;
            }
            match result {
                Ok(result) => {
                    let offer = if result.is_empty() {
                        CreateOffer::for_query(&query)
                    } else {
                        None
                    };
                    state_tx.send_replace(SearchState {
                        seq,
                        query,
                        result,
                        offer,
                    });
                }
                // Reads fail silently and keep the previous results
                Err(e) => error!(err = %e, query = %query, "Search failed"),
            }
        });
    }
}
