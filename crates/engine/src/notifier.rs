//! Post-commit webhook notifier.
//!
//! The request path only hands an event to [`Notifier::dispatch`], which
//! enqueues it without waiting. A single worker task owns the HTTP client and
//! delivers each event with one POST bounded by a timeout. Outcomes go to
//! `tracing` and to [`NotifierStats`]; nothing is reported back to the
//! request that produced the event, and nothing is retried.
//!
//! `queue_capacity` bounds both the number of concurrent deliveries and the
//! number of events waiting behind them. While the worker is saturated it
//! stops reading the queue and further events are counted as dropped.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use api_types::purchasing::PurchasingEvent;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::{JoinHandle, JoinSet},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct NotifierConfig {
    /// Process-wide endpoint used when a request carries no override.
    pub default_url: Option<String>,
    pub timeout: Duration,
    /// Deliveries in flight at once, and events allowed to wait behind them.
    /// Anything beyond that is dropped.
    pub queue_capacity: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            default_url: None,
            timeout: DEFAULT_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Pick the endpoint for one event: a non-blank override, else a non-blank
/// default, else nothing.
pub fn resolve_endpoint(override_url: Option<&str>, default_url: Option<&str>) -> Option<String> {
    override_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| default_url.map(str::trim).filter(|url| !url.is_empty()))
        .map(ToString::to_string)
}

/// What [`Notifier::dispatch`] did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Queued,
    /// No endpoint configured.
    Skipped,
    /// Queue full or worker gone.
    Dropped,
}

/// Delivery counters.
#[derive(Debug, Default)]
pub struct NotifierStats {
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotifierStatsSnapshot {
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
    pub skipped: u64,
}

impl NotifierStats {
    pub fn snapshot(&self) -> NotifierStatsSnapshot {
        NotifierStatsSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

struct Delivery {
    url: String,
    event: PurchasingEvent,
}

enum Message {
    Deliver(Box<Delivery>),
    Shutdown,
}

/// Handle to the webhook worker. Cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    sender: mpsc::Sender<Message>,
    default_url: Option<String>,
    stats: Arc<NotifierStats>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("default_url", &self.default_url)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

impl Notifier {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(config: NotifierConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("procurement/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let stats = Arc::new(NotifierStats::default());
        let worker = tokio::spawn(run_worker(client, receiver, capacity, Arc::clone(&stats)));

        Ok(Self {
            sender,
            default_url: config.default_url,
            stats,
            worker: Arc::new(Mutex::new(Some(worker))),
        })
    }

    pub fn stats(&self) -> NotifierStatsSnapshot {
        self.stats.snapshot()
    }

    /// Enqueue `event` for the resolved endpoint. Never waits.
    pub fn dispatch(&self, override_url: Option<&str>, event: PurchasingEvent) -> DispatchOutcome {
        let Some(url) = resolve_endpoint(override_url, self.default_url.as_deref()) else {
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("no webhook endpoint configured, skipping notification");
            return DispatchOutcome::Skipped;
        };

        let purchasing_id = event.purchasing.id;
        match self
            .sender
            .try_send(Message::Deliver(Box::new(Delivery { url, event })))
        {
            Ok(()) => DispatchOutcome::Queued,
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(purchasing_id, "webhook queue full, dropping notification");
                DispatchOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(purchasing_id, "webhook worker stopped, dropping notification");
                DispatchOutcome::Dropped
            }
        }
    }

    /// Stop accepting events, deliver what is already queued and wait for the
    /// worker to finish. Later calls return immediately.
    pub async fn shutdown(&self) {
        let worker = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(worker) = worker else {
            return;
        };
        if self.sender.send(Message::Shutdown).await.is_err() {
            tracing::debug!("webhook worker already stopped");
        }
        if let Err(err) = worker.await {
            tracing::error!("webhook worker failed: {err}");
        }
    }
}

async fn run_worker(
    client: reqwest::Client,
    mut receiver: mpsc::Receiver<Message>,
    max_in_flight: usize,
    stats: Arc<NotifierStats>,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            message = receiver.recv(), if in_flight.len() < max_in_flight => match message {
                Some(Message::Deliver(delivery)) => {
                    let client = client.clone();
                    let stats = Arc::clone(&stats);
                    in_flight.spawn(async move { deliver(&client, *delivery, &stats).await });
                }
                Some(Message::Shutdown) | None => break,
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(err) = joined {
                    tracing::error!("webhook delivery task failed: {err}");
                }
            }
        }
    }

    receiver.close();
    while let Some(joined) = in_flight.join_next().await {
        if let Err(err) = joined {
            tracing::error!("webhook delivery task failed: {err}");
        }
    }
    tracing::debug!("webhook worker stopped");
}

async fn deliver(client: &reqwest::Client, delivery: Delivery, stats: &NotifierStats) {
    let purchasing_id = delivery.event.purchasing.id;
    match client.post(&delivery.url).json(&delivery.event).send().await {
        Ok(response) if response.status().is_success() => {
            stats.delivered.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                purchasing_id,
                url = %delivery.url,
                status = response.status().as_u16(),
                "webhook delivered"
            );
        }
        Ok(response) => {
            stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                purchasing_id,
                url = %delivery.url,
                status = response.status().as_u16(),
                "webhook returned non-success status"
            );
        }
        Err(err) => {
            stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                purchasing_id,
                url = %delivery.url,
                timeout = err.is_timeout(),
                "webhook delivery failed: {err}"
            );
        }
    }
}
