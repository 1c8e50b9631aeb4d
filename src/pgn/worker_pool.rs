//! Batched parallel PGN parsing (C9), grounded in the sibling engine
//! crate's use of `crossbeam-channel` for its search-reporting thread: the
//! same crate dispatches parse batches here, one request/response channel
//! pair per worker thread.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::PgnError;
use crate::game::Game;

use super::{build_game, grammar};

struct ParseRequest {
    batch_id: u64,
    games: Vec<(usize, String)>,
    strict: bool,
}

struct ParseResponse {
    batch_id: u64,
    results: Vec<(usize, Result<Game, PgnError>)>,
}

struct Worker {
    task_tx: Sender<ParseRequest>,
    result_rx: Receiver<ParseResponse>,
    handle: Option<JoinHandle<()>>,
}

fn spawn_worker() -> Worker {
    let (task_tx, task_rx) = unbounded::<ParseRequest>();
    let (result_tx, result_rx) = unbounded::<ParseResponse>();

    let handle = thread::spawn(move || {
        while let Ok(request) = task_rx.recv() {
            let results = request
                .games
                .into_iter()
                .map(|(index, pgn)| {
                    let parsed =
                        grammar::parse(&pgn, request.strict).and_then(|p| build_game(&p, request.strict));
                    (index, parsed)
                })
                .collect();
            if result_tx
                .send(ParseResponse { batch_id: request.batch_id, results })
                .is_err()
            {
                break;
            }
        }
    });

    Worker { task_tx, result_rx, handle: Some(handle) }
}

/// Outcome of dispatching one batch: either parsed results, or a report
/// that the worker's channel was gone, handing the batch back to the
/// caller to fall back to in-process parsing.
pub enum DispatchOutcome {
    Parsed(Vec<(usize, Result<Game, PgnError>)>),
    TransportFailure { games: Vec<(usize, String)>, strict: bool },
}

/// A fixed pool of worker threads, each with its own request/response
/// channel pair, used only by async iteration over a `Cursor`.
pub struct WorkerPool {
    workers: Vec<Worker>,
    next_batch_id: u64,
}

impl WorkerPool {
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let workers = (0..size).map(|_| spawn_worker()).collect();
        WorkerPool { workers, next_batch_id: 0 }
    }

    /// Dispatch one batch of `(index, pgn)` slices, round-robin by
    /// `batch_id % workers.len()`.
    pub fn dispatch(&mut self, games: Vec<(usize, String)>, strict: bool) -> DispatchOutcome {
        if games.is_empty() {
            return DispatchOutcome::Parsed(Vec::new());
        }

        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;
        let worker_idx = (batch_id as usize) % self.workers.len();
        let worker = &self.workers[worker_idx];

        let request = ParseRequest { batch_id, games: games.clone(), strict };
        if worker.task_tx.send(request).is_err() {
            return DispatchOutcome::TransportFailure { games, strict };
        }

        match worker.result_rx.recv() {
            Ok(response) if response.batch_id == batch_id => DispatchOutcome::Parsed(response.results),
            _ => DispatchOutcome::TransportFailure { games, strict },
        }
    }

    /// Reject all pending tasks and join every worker thread. Idempotent:
    /// calling this again on an already-terminated pool is a no-op.
    pub fn terminate(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        for mut worker in workers {
            drop(worker.task_tx);
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate();
    }
}
