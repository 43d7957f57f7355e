//! Per-strategy request lanes.
//!
//! Every [`StrategyKind`] gets its own FIFO queue drained by one worker task.
//! The worker takes a slot from the lane's semaphore before it dequeues, so
//! jobs start in submission order and never more than `slots` run at once.
//! Each job runs in a task of its own; the slot is released when that task
//! ends, whether it returned, failed or panicked.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::Deserialize;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;

use crate::error::{PredictError, Result};
use crate::selector::StrategyKind;

pub type Job<T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'static>>;

/// The `[governor]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GovernorConfig {
    pub policy_slots: usize,
    pub search_slots: usize,
    pub engine_slots: usize,
    /// Waiting jobs per lane beyond which submissions are refused.
    pub max_queue: Option<usize>,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            policy_slots: 2,
            search_slots: 2,
            engine_slots: 1,
            max_queue: None,
        }
    }
}

impl GovernorConfig {
    pub fn slots(&self, kind: StrategyKind) -> usize {
        let slots = match kind {
            StrategyKind::PolicyOnly => self.policy_slots,
            StrategyKind::SearchWithModel => self.search_slots,
            StrategyKind::ExternalEngine => self.engine_slots,
        };
        slots.max(1)
    }
}

/// Resolves once with the job's result. Dropping it discards the result;
/// the job itself still runs.
pub struct Ticket<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for Ticket<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.unwrap_or_else(|_| Err(PredictError::ShuttingDown)))
    }
}

struct Queued<T> {
    job: Job<T>,
    reply: oneshot::Sender<Result<T>>,
}

struct Lane<T> {
    tx: mpsc::UnboundedSender<Queued<T>>,
    waiting: Arc<AtomicUsize>,
    worker: JoinHandle<()>,
}

pub struct Governor<T> {
    lanes: HashMap<StrategyKind, Lane<T>>,
    max_queue: Option<usize>,
}

impl<T: Send + 'static> Governor<T> {
    /// Starts one worker per lane. Must be called inside a tokio runtime.
    pub fn start(config: &GovernorConfig) -> Self {
        let lanes = StrategyKind::ALL
            .into_iter()
            .map(|kind| {
                let (tx, rx) = mpsc::unbounded_channel();
                let waiting = Arc::new(AtomicUsize::new(0));
                let slots = Arc::new(Semaphore::new(config.slots(kind)));
                let worker = tokio::spawn(drain(kind, slots, rx, waiting.clone()));
                (kind, Lane { tx, waiting, worker })
            })
            .collect();
        tracing::debug!(?config, "governor started");
        Self {
            lanes,
            max_queue: config.max_queue,
        }
    }

    /// Queues `job` on the `kind` lane.
    pub fn submit<F>(&self, kind: StrategyKind, job: F) -> Result<Ticket<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let lane = self.lanes.get(&kind).ok_or(PredictError::ShuttingDown)?;
        let admitted = lane
            .waiting
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| match self.max_queue {
                Some(max) if n >= max => None,
                _ => Some(n + 1),
            });
        if admitted.is_err() {
            return Err(PredictError::QueueOverflow {
                lane: kind,
                max: self.max_queue.unwrap_or_default(),
            });
        }

        let (reply, rx) = oneshot::channel();
        let queued = Queued {
            job: Box::pin(job),
            reply,
        };
        if lane.tx.send(queued).is_err() {
            lane.waiting.fetch_sub(1, Ordering::AcqRel);
            return Err(PredictError::ShuttingDown);
        }
        Ok(Ticket { rx })
    }

    /// Jobs submitted to `kind` that have not started yet.
    pub fn waiting(&self, kind: StrategyKind) -> usize {
        self.lanes
            .get(&kind)
            .map(|l| l.waiting.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Stops the workers. Jobs still queued resolve with
    /// [`PredictError::ShuttingDown`]; running jobs finish normally.
    pub fn shutdown(&self) {
        for (kind, lane) in &self.lanes {
            lane.worker.abort();
            tracing::debug!(lane = %kind, "lane stopped");
        }
    }
}

async fn drain<T: Send + 'static>(
    kind: StrategyKind,
    slots: Arc<Semaphore>,
    mut rx: mpsc::UnboundedReceiver<Queued<T>>,
    waiting: Arc<AtomicUsize>,
) {
    loop {
        let Ok(permit) = slots.clone().acquire_owned().await else {
            break;
        };
        let Some(Queued { job, reply }) = rx.recv().await else {
            break;
        };
        waiting.fetch_sub(1, Ordering::AcqRel);

        tokio::spawn(async move {
            let result = match tokio::spawn(job).await {
                Ok(result) => result,
                Err(e) if e.is_panic() => {
                    let message = panic_message(e.into_panic());
                    tracing::error!(lane = %kind, %message, "job panicked");
                    Err(PredictError::WorkerPanicked {
                        lane: kind,
                        message,
                    })
                }
                Err(_) => Err(PredictError::ShuttingDown),
            };
            drop(permit);
            // The caller may have dropped its ticket.
            let _ = reply.send(result);
        });
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "governor_tests.rs"]
mod governor_tests;
