// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Worker pool for batch EV computation.
//!
//! Each worker owns a channel of [BatchRequest], batches are dispatched to
//! the workers round robin and computed on blocking threads. A collector task
//! receives the responses and completes the caller future with the same job
//! id, so callers see a request/response interface whatever the number of
//! workers.
use ahash::AHashMap;
use log::{debug, error};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Instant,
};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use evtracker_core::{EvCalculator, EvHand, HandId};

/// A batch job identifier.
pub type JobId = u64;

/// A batch of hands to compute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// The job id.
    pub job_id: JobId,
    /// The hands to compute.
    pub hands: Vec<EvHand>,
    /// Monte Carlo samples.
    pub samples: usize,
    /// Random seed for reproducible results.
    pub seed: Option<u64>,
}

/// A hand EV result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandEv {
    /// The hand id.
    pub id: HandId,
    /// Realized chips change.
    pub realized: Option<i64>,
    /// All-in adjusted chips change.
    pub adjusted: Option<i64>,
    /// Evaluated runouts.
    pub samples: usize,
}

/// The results of a batch in the request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    /// The request job id.
    pub job_id: JobId,
    /// The hands results.
    pub results: Vec<HandEv>,
    /// Batch computation time.
    pub duration_ms: u64,
}

/// Pool errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The workers have stopped.
    #[error("worker pool closed")]
    Closed,
    /// The job was dropped by a worker.
    #[error("job {0} failed")]
    JobFailed(JobId),
}

type Pending = Arc<Mutex<AHashMap<JobId, oneshot::Sender<BatchResponse>>>>;

/// A fixed size pool of EV workers.
#[derive(Debug, Clone)]
pub struct WorkerPool(Arc<Shared>);

#[derive(Debug)]
struct Shared {
    workers: Vec<mpsc::Sender<BatchRequest>>,
    pending: Pending,
    next_worker: AtomicUsize,
    next_job: AtomicU64,
}

impl WorkerPool {
    /// Number of batches a worker can queue.
    const WORKER_QUEUE: usize = 16;

    /// Creates a pool with the given number of workers, at least one.
    ///
    /// Must be called from a tokio runtime.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let pending = Pending::default();
        let (done_tx, done_rx) = mpsc::channel(size * Self::WORKER_QUEUE);

        let workers = (0..size)
            .map(|worker| {
                let (tx, rx) = mpsc::channel(Self::WORKER_QUEUE);
                tokio::spawn(run_worker(worker, rx, done_tx.clone(), pending.clone()));
                tx
            })
            .collect();

        tokio::spawn(run_collector(done_rx, pending.clone()));

        debug!("Started worker pool with {size} workers");

        Self(Arc::new(Shared {
            workers,
            pending,
            next_worker: AtomicUsize::new(0),
            next_job: AtomicU64::new(1),
        }))
    }

    /// Default pool size, half the available cores.
    pub fn default_size() -> usize {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        (cores / 2).max(1)
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.0.workers.len()
    }

    /// Computes a batch of hands.
    ///
    /// The results are in the same order as the hands, batches submitted
    /// concurrently may complete in any order. Dropping the returned future
    /// discards the batch result.
    pub async fn submit(
        &self,
        hands: Vec<EvHand>,
        samples: usize,
        seed: Option<u64>,
    ) -> Result<BatchResponse, PoolError> {
        let job_id = self.0.next_job.fetch_add(1, Ordering::Relaxed);
        let worker = self.0.next_worker.fetch_add(1, Ordering::Relaxed) % self.size();

        // Wait for a queue slot before registering the job so that dropping
        // this future while the queue is full leaves nothing behind.
        let permit = self.0.workers[worker]
            .reserve()
            .await
            .map_err(|_| PoolError::Closed)?;

        let (resp_tx, resp_rx) = oneshot::channel();
        self.0.pending.lock().insert(job_id, resp_tx);

        permit.send(BatchRequest {
            job_id,
            hands,
            samples,
            seed,
        });

        resp_rx.await.map_err(|_| PoolError::JobFailed(job_id))
    }
}

async fn run_worker(
    worker: usize,
    mut requests_rx: mpsc::Receiver<BatchRequest>,
    done_tx: mpsc::Sender<BatchResponse>,
    pending: Pending,
) {
    while let Some(req) = requests_rx.recv().await {
        let job_id = req.job_id;
        match tokio::task::spawn_blocking(move || compute_batch(req)).await {
            Ok(resp) => {
                if done_tx.send(resp).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Worker {worker} job {job_id} error {e}");
                // Drops the sender so the caller gets an error.
                pending.lock().remove(&job_id);
            }
        }
    }

    debug!("Worker {worker} stopped");
}

async fn run_collector(mut done_rx: mpsc::Receiver<BatchResponse>, pending: Pending) {
    while let Some(resp) = done_rx.recv().await {
        let resp_tx = pending.lock().remove(&resp.job_id);
        if let Some(resp_tx) = resp_tx {
            // The caller may have dropped the response future.
            let _ = resp_tx.send(resp);
        }
    }
}

/// Computes a batch on the current thread.
pub fn compute_batch(req: BatchRequest) -> BatchResponse {
    let start = Instant::now();
    let calculator = match req.seed {
        Some(seed) => EvCalculator::with_seed(req.samples, seed),
        None => EvCalculator::new(req.samples),
    };

    let results = req
        .hands
        .iter()
        .map(|hand| {
            let ev = calculator.compute(hand);
            HandEv {
                id: hand.id,
                realized: ev.realized,
                adjusted: ev.adjusted,
                samples: ev.samples,
            }
        })
        .collect();

    BatchResponse {
        job_id: req.job_id,
        results,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtracker_core::{Action, ActionKind, Chips, HoleCards, Street, ev::EvPlayer};
    use std::time::Duration;

    /// Heads up hand, hero pushes preflop and the villain calls.
    fn hand(ordinal: usize, hero: &str, villain: &str) -> EvHand {
        let action = |order, seat| Action {
            order,
            street: Street::Preflop,
            seat: Some(seat),
            kind: ActionKind::Push,
            size: Some(Chips::new(500)),
            all_in: true,
        };

        EvHand {
            id: HandId::new("pool", ordinal),
            hero_seat: Some(1),
            hero_cards: HoleCards::parse(hero),
            winner_seat: None,
            board_flop: None,
            board_turn: None,
            board_river: None,
            board: None,
            players: vec![
                EvPlayer {
                    seat: 1,
                    hole_cards: HoleCards::parse(hero),
                },
                EvPlayer {
                    seat: 2,
                    hole_cards: HoleCards::parse(villain),
                },
            ],
            actions: vec![action(1, 1), action(2, 2)],
        }
    }

    fn hands() -> Vec<EvHand> {
        vec![
            hand(0, "As Kd", "Qh Qd"),
            hand(1, "7c 2d", "Ah Ad"),
            hand(2, "Ts Th", "9c 8c"),
        ]
    }

    #[tokio::test]
    async fn batch_results_in_order() {
        let pool = WorkerPool::new(2);
        assert_eq!(pool.size(), 2);

        let resp = pool.submit(hands(), 2_000, Some(3)).await.unwrap();
        let ids = resp.results.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids, hands().iter().map(|h| h.id).collect::<Vec<_>>());
        assert!(resp.results.iter().all(|r| r.samples == 2_000));

        // Aces are a big favourite.
        assert!(resp.results[1].adjusted.unwrap() < -300);

        // Same seed on another worker gives the same results.
        let resp2 = pool.submit(hands(), 2_000, Some(3)).await.unwrap();
        assert_ne!(resp.job_id, resp2.job_id);
        assert_eq!(resp.results, resp2.results);
    }

    #[tokio::test]
    async fn concurrent_batches() {
        let pool = WorkerPool::new(3);

        let (r1, r2, r3, r4) = tokio::join!(
            pool.submit(vec![hand(0, "As Kd", "Qh Qd")], 500, Some(1)),
            pool.submit(vec![hand(1, "7c 2d", "Ah Ad")], 500, Some(1)),
            pool.submit(vec![], 500, Some(1)),
            pool.submit(hands(), 500, None),
        );

        assert_eq!(r1.unwrap().results[0].id, HandId::new("pool", 0));
        assert_eq!(r2.unwrap().results[0].id, HandId::new("pool", 1));
        assert!(r3.unwrap().results.is_empty());
        assert_eq!(r4.unwrap().results.len(), 3);
    }

    #[tokio::test]
    async fn dropped_request() {
        let pool = WorkerPool::new(1);

        let task = tokio::spawn({
            let pool = pool.clone();
            async move { pool.submit(hands(), 20_000, None).await }
        });
        task.abort();

        let resp = pool.submit(hands(), 100, Some(1)).await.unwrap();
        assert_eq!(resp.results.len(), 3);
    }

    #[tokio::test]
    async fn dropped_while_queue_full() {
        // A single worker that never reads its queue.
        let (tx, _rx) = mpsc::channel(1);
        let pool = WorkerPool(Arc::new(Shared {
            workers: vec![tx],
            pending: Pending::default(),
            next_worker: AtomicUsize::new(0),
            next_job: AtomicU64::new(1),
        }));

        let wait = Duration::from_millis(20);

        // The first batch takes the only queue slot and waits for a response.
        let first = tokio::time::timeout(wait, pool.submit(hands(), 100, None)).await;
        assert!(first.is_err());
        assert_eq!(pool.0.pending.lock().len(), 1);

        // The second one never gets queued and leaves no pending job.
        let second = tokio::time::timeout(wait, pool.submit(hands(), 100, None)).await;
        assert!(second.is_err());
        assert_eq!(pool.0.pending.lock().len(), 1);
        assert!(pool.0.pending.lock().contains_key(&1));
    }

    #[test]
    fn compute_batch_matches_calculator() {
        let req = BatchRequest {
            job_id: 7,
            hands: hands(),
            samples: 1_000,
            seed: Some(11),
        };

        let resp = compute_batch(req);
        assert_eq!(resp.job_id, 7);

        let calc = EvCalculator::with_seed(1_000, 11);
        for (hand, result) in hands().iter().zip(&resp.results) {
            let ev = calc.compute(hand);
            assert_eq!((result.realized, result.adjusted), (ev.realized, ev.adjusted));
        }
    }
}
