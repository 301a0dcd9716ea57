//! List query engine: debounced search merged with a persisted sort
//! order into one live result stream.
//!
//! The engine holds the latest value of its two inputs. Search edits
//! are debounced by a 300ms quiescence window and deduplicated, then
//! switch the underlying feed between the full list and a substring
//! search. Whenever the feed emits or the sort order changes, the
//! latest list is re-sorted in memory and published. Sort order changes
//! are persisted to the preference store as they arrive; searching
//! stays in the database, only sorting happens in memory.

use std::time::Duration;

use database::contact::ContactFeed;
use database::models::Contact;
use database::preference::{self, SortOrder};
use database::Result;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::repository::ContactRepository;

/// Quiescence window applied to search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

enum Input {
    Query(String),
    Sort(SortOrder),
}

/// Handle to a running list query engine.
///
/// Dropping the handle closes the input channel and stops the engine
/// task; nothing is published after that.
pub struct ListQueryEngine {
    input_tx: mpsc::UnboundedSender<Input>,
    results: watch::Receiver<Vec<Contact>>,
}

impl ListQueryEngine {
    /// Start the engine: read the persisted sort order, publish the
    /// initial full list, and spawn the merge task.
    pub async fn start(repo: ContactRepository) -> Result<ListQueryEngine> {
        let sort = preference::get_sort_order(repo.database().pool()).await?;

        let mut feed = repo.observe_all();
        let mut initial = feed.next().await?;
        sort_contacts(&mut initial, sort);

        let (results_tx, results) = watch::channel(initial);
        let (input_tx, input_rx) = mpsc::unbounded_channel();

        tokio::spawn(run(repo, feed, sort, input_rx, results_tx));

        Ok(ListQueryEngine { input_tx, results })
    }

    /// Update the search query. Debounced; rapid edits collapse to the
    /// last value once typing pauses.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let _ = self.input_tx.send(Input::Query(query.into()));
    }

    /// Change the sort order. Persisted immediately and applied to the
    /// next published result.
    pub fn set_sort_order(&self, order: SortOrder) {
        let _ = self.input_tx.send(Input::Sort(order));
    }

    /// Subscribe to the sorted, filtered result list. The receiver
    /// holds the latest published list at all times.
    pub fn results(&self) -> watch::Receiver<Vec<Contact>> {
        self.results.clone()
    }
}

async fn run(
    repo: ContactRepository,
    mut feed: ContactFeed,
    mut sort: SortOrder,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    results_tx: watch::Sender<Vec<Contact>>,
) {
    let mut active_query = String::new();
    let mut pending: Option<String> = None;
    let mut latest: Vec<Contact> = results_tx.borrow().clone();

    let debounce = sleep(SEARCH_DEBOUNCE);
    tokio::pin!(debounce);

    loop {
        tokio::select! {
            input = input_rx.recv() => match input {
                // Handle dropped; stop publishing.
                None => break,
                Some(Input::Query(query)) => {
                    pending = Some(query);
                    debounce.as_mut().reset(Instant::now() + SEARCH_DEBOUNCE);
                }
                Some(Input::Sort(order)) => {
                    sort = order;
                    if let Err(error) =
                        preference::set_sort_order(repo.database().pool(), order).await
                    {
                        warn!(%error, "failed to persist sort order");
                    }
                    publish(&results_tx, latest.clone(), sort);
                }
            },
            () = &mut debounce, if pending.is_some() => {
                let query = pending.take().unwrap_or_default();
                if query == active_query {
                    // Unchanged after debouncing; skip the recomputation.
                    continue;
                }
                active_query = query;
                feed = if active_query.trim().is_empty() {
                    repo.observe_all()
                } else {
                    repo.observe_search(&active_query)
                };
                match feed.snapshot().await {
                    Ok(list) => {
                        latest = list;
                        publish(&results_tx, latest.clone(), sort);
                    }
                    Err(error) => warn!(%error, "search query failed"),
                }
            },
            changed = feed.changed() => {
                if changed.is_err() {
                    // Database handle dropped.
                    break;
                }
                match feed.snapshot().await {
                    Ok(list) => {
                        latest = list;
                        publish(&results_tx, latest.clone(), sort);
                    }
                    Err(error) => warn!(%error, "requery after write failed"),
                }
            },
        }
    }

    debug!("list query engine stopped");
}

fn publish(results_tx: &watch::Sender<Vec<Contact>>, mut list: Vec<Contact>, sort: SortOrder) {
    sort_contacts(&mut list, sort);
    let _ = results_tx.send(list);
}

/// Sort contacts in place for the given order.
///
/// The sort is stable, so entries comparing equal (for example names
/// differing only in case) keep the store-provided relative order.
pub fn sort_contacts(contacts: &mut [Contact], order: SortOrder) {
    match order {
        SortOrder::NameAsc => {
            contacts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortOrder::NameDesc => {
            contacts.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
        }
        SortOrder::RecentlyAdded => {
            contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
    }
}
