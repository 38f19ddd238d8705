//! Fixed-interval re-fetch of one backend resource.
//!
//! A poller runs at most one fetch at a time. The in-flight slot is claimed
//! atomically by whoever starts a fetch: the loop on a tick or params change,
//! or `refresh`. A refresh that finds the slot taken is folded into the fetch
//! already running. A fetch started for parameters that have since changed is
//! dropped without publishing. After `shutdown` nothing is published.
//!
//! Readers that need a value before the first poll lands use `current`, which
//! waits on the same single fetch instead of issuing their own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ConsoleError, ConsoleResult};

type FetchFuture<T> = Pin<Box<dyn Future<Output = ConsoleResult<T>> + Send>>;
type FetchFn<P, T> = Arc<dyn Fn(P) -> FetchFuture<T> + Send + Sync>;

/// Last successful fetch
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<P, T> {
    pub params: P,
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

struct Shared<P, T> {
    name: &'static str,
    interval: Duration,
    fetch: FetchFn<P, T>,
    params: watch::Sender<P>,
    latest: watch::Sender<Option<Snapshot<P, T>>>,
    /// Bumped after every completed fetch, successful or not
    polls: watch::Sender<u64>,
    last_error: Mutex<Option<String>>,
    refresh: Notify,
    in_flight: AtomicBool,
    cancel: CancellationToken,
}

impl<P, T> Shared<P, T> {
    /// Take the single in-flight slot. `false` when a fetch already holds it.
    fn claim(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    fn set_last_error(&self, error: Option<String>) {
        *self.last_error.lock().unwrap_or_else(|p| p.into_inner()) = error;
    }

    fn unavailable(&self) -> ConsoleError {
        let reason = self
            .last_error
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .unwrap_or_else(|| "no data yet".to_string());
        ConsoleError::Unavailable { feed: self.name, reason }
    }
}

pub struct Poller<P, T> {
    shared: Arc<Shared<P, T>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<P, T> Poller<P, T>
where
    P: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, interval: Duration, params: P, fetch: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ConsoleResult<T>> + Send + 'static,
    {
        let fetch: FetchFn<P, T> = Arc::new(move |p| -> FetchFuture<T> { Box::pin(fetch(p)) });
        let (params, _) = watch::channel(params);
        let (latest, _) = watch::channel(None);
        let (polls, _) = watch::channel(0);

        Self {
            shared: Arc::new(Shared {
                name,
                interval,
                fetch,
                params,
                latest,
                polls,
                last_error: Mutex::new(None),
                refresh: Notify::new(),
                in_flight: AtomicBool::new(false),
                cancel: CancellationToken::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Spawn the poll loop on the current runtime. Calling it again while the
    /// loop is alive does nothing.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|p| p.into_inner());
        if task.as_ref().is_some_and(|t| !t.is_finished()) || self.shared.cancel.is_cancelled() {
            return;
        }
        info!(poller = self.shared.name, interval_secs = self.shared.interval.as_secs(), "Starting poller");
        *task = Some(tokio::spawn(run(Arc::clone(&self.shared))));
    }

    /// Cancel the loop. Any in-flight fetch is dropped.
    pub fn shutdown(&self) {
        self.shared.cancel.cancel();
    }

    /// Cancel and wait for the loop to exit.
    pub async fn stop(&self) {
        self.shutdown();
        let handle = self.task.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// A fetch is running, or has been claimed by `refresh` and is about to.
    pub fn is_fetching(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Ask for an immediate poll. Returns `false` when a fetch already holds
    /// the in-flight slot and the request was folded into it.
    pub fn refresh(&self) -> bool {
        if self.shared.cancel.is_cancelled() || !self.shared.claim() {
            return false;
        }
        self.shared.refresh.notify_one();
        true
    }

    /// Switch the poll context. A fetch in flight for the old params is
    /// abandoned and a new one starts right away.
    pub fn set_params(&self, params: P) {
        self.shared.params.send_if_modified(|current| {
            if *current == params {
                return false;
            }
            *current = params;
            true
        });
    }

    pub fn params(&self) -> P {
        self.shared.params.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot<P, T>>> {
        self.shared.latest.subscribe()
    }

    /// Latest snapshot. Before the first successful poll this starts the loop
    /// if needed, requests a poll, and waits up to `wait` for it to finish.
    /// Concurrent callers share that one fetch.
    pub async fn current(&self, wait: Duration) -> ConsoleResult<Snapshot<P, T>>
    where
        T: Clone,
    {
        if let Some(snapshot) = self.latest() {
            return Ok(snapshot);
        }
        if self.shared.cancel.is_cancelled() {
            return Err(self.shared.unavailable());
        }

        let mut polls = self.shared.polls.subscribe();
        polls.borrow_and_update();
        if let Some(snapshot) = self.latest() {
            return Ok(snapshot);
        }

        self.start();
        self.refresh();
        let _ = tokio::time::timeout(wait, polls.changed()).await;
        self.latest().ok_or_else(|| self.shared.unavailable())
    }
}

impl<P: Clone, T: Clone> Poller<P, T> {
    pub fn latest(&self) -> Option<Snapshot<P, T>> {
        self.shared.latest.borrow().clone()
    }
}

impl<P, T> Drop for Poller<P, T> {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

async fn run<P, T>(shared: Arc<Shared<P, T>>)
where
    P: Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(shared.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut params_rx = shared.params.subscribe();
    let mut refetch_now = false;

    loop {
        let claimed_by_refresh = if refetch_now {
            false
        } else {
            tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => break,
                changed = params_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    false
                }
                _ = shared.refresh.notified() => true,
                _ = ticker.tick() => false,
            }
        };
        refetch_now = false;

        if !claimed_by_refresh && !shared.claim() {
            // A refresh won the slot between wake-up and claim. This fetch
            // serves it, so consume its pending permit.
            tokio::select! {
                biased;
                _ = shared.cancel.cancelled() => break,
                _ = shared.refresh.notified() => {}
            }
        }

        let params = params_rx.borrow_and_update().clone();
        let fetch = (shared.fetch)(params.clone());

        let result = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => break,
            changed = params_rx.changed() => {
                shared.release();
                if changed.is_err() {
                    break;
                }
                debug!(poller = shared.name, "Params changed, dropping stale fetch");
                refetch_now = true;
                continue;
            }
            result = fetch => result,
        };

        if shared.cancel.is_cancelled() {
            break;
        }
        shared.release();
        match result {
            Ok(value) => {
                debug!(poller = shared.name, "Fetched");
                shared.set_last_error(None);
                shared.latest.send_replace(Some(Snapshot {
                    params,
                    value,
                    fetched_at: Utc::now(),
                }));
            }
            Err(e) => {
                warn!(poller = shared.name, error = %e, "Poll failed, keeping last snapshot");
                shared.set_last_error(Some(e.to_string()));
            }
        }
        shared.polls.send_modify(|n| *n += 1);
        ticker.reset();
    }

    shared.release();
    debug!(poller = shared.name, "Poller stopped");
}
