//! Background search worker.
//!
//! A search can take noticeable wall-clock time, so interactive callers run
//! it on a dedicated thread. Requests and results cross threads over
//! `std::sync::mpsc` channels, which order the single result write before
//! its read. Every request carries an id; responses to superseded requests
//! are dropped by the handle.

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::games::ultimate::{UltimateMove, UltimateState};
use crate::MCTS;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Messages sent to the AI worker thread
#[derive(Debug)]
pub enum AIRequest {
    /// Search `game_state` and answer with the recommended move
    Search {
        request_id: u64,
        game_state: UltimateState,
        iterations: u32,
        /// Set by the requester to stop the search early
        cancel: Arc<AtomicBool>,
    },
    /// Replace the engine with one built from new settings
    UpdateSettings {
        exploration_parameter: f64,
        seed: Option<u64>,
    },
    /// Stop the AI worker thread
    Stop,
}

/// Messages received from the AI worker thread
#[derive(Debug)]
pub enum AIResponse {
    /// The worker started on a request
    Thinking(u64),
    /// The search finished: move, request_id
    MoveReady(UltimateMove, u64),
    /// The search failed: error, request_id
    Error(Error, u64),
}

/// The AI worker that runs in a separate thread
pub struct AIWorker {
    ai: MCTS,
}

impl AIWorker {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            ai: MCTS::from_config(config),
        }
    }

    /// Main loop for the AI worker thread
    ///
    /// Processes requests until it receives `Stop` or the request channel closes.
    pub fn run(mut self, rx: Receiver<AIRequest>, tx: Sender<AIResponse>) {
        while let Ok(request) = rx.recv() {
            match request {
                AIRequest::Search {
                    request_id,
                    game_state,
                    iterations,
                    cancel,
                } => {
                    if cancel.load(Ordering::Relaxed) {
                        debug!("request {} cancelled before it started", request_id);
                        let _ = tx.send(AIResponse::Error(Error::Cancelled, request_id));
                        continue;
                    }
                    let _ = tx.send(AIResponse::Thinking(request_id));
                    debug!("request {}: searching {} iterations", request_id, iterations);

                    let response = match self.ai.search_cancellable(&game_state, iterations, &cancel) {
                        Ok(report) => AIResponse::MoveReady(report.best_move, request_id),
                        Err(e) => {
                            warn!("request {} failed: {}", request_id, e);
                            AIResponse::Error(e, request_id)
                        }
                    };
                    if tx.send(response).is_err() {
                        break;
                    }
                }
                AIRequest::UpdateSettings {
                    exploration_parameter,
                    seed,
                } => {
                    self.ai = match seed {
                        Some(seed) => MCTS::with_seed(exploration_parameter, seed),
                        None => MCTS::new(exploration_parameter),
                    };
                }
                AIRequest::Stop => break,
            }
        }
        debug!("AI worker stopped");
    }
}

/// Owner-side handle to a running `AIWorker`
///
/// The owner issues requests and polls for the answer without blocking, or
/// blocks with `wait`. Dropping the handle stops and joins the worker.
pub struct AIHandle {
    tx: Sender<AIRequest>,
    rx: Receiver<AIResponse>,
    thread: Option<JoinHandle<()>>,
    next_request_id: u64,
    /// Request whose answer is still wanted
    pending: Option<(u64, Arc<AtomicBool>)>,
}

impl AIHandle {
    /// Starts a worker thread configured by `config`
    pub fn spawn(config: &SearchConfig) -> Self {
        let (req_tx, req_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let worker = AIWorker::new(config);
        let thread = thread::spawn(move || worker.run(req_rx, resp_tx));
        Self {
            tx: req_tx,
            rx: resp_rx,
            thread: Some(thread),
            next_request_id: 1,
            pending: None,
        }
    }

    /// Asks the worker for a move in `state`, superseding any earlier request
    ///
    /// The worker gets its own clone of `state`. Returns the request id.
    pub fn request_move(&mut self, state: &UltimateState, iterations: u32) -> Result<u64> {
        self.cancel();
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let cancel = Arc::new(AtomicBool::new(false));
        self.tx
            .send(AIRequest::Search {
                request_id,
                game_state: state.clone(),
                iterations,
                cancel: cancel.clone(),
            })
            .map_err(|_| Error::WorkerDisconnected)?;
        self.pending = Some((request_id, cancel));
        Ok(request_id)
    }

    /// Whether a requested move has not been collected yet
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Checks for the pending answer without blocking
    ///
    /// Returns `Ok(None)` while the search runs or when nothing was requested.
    pub fn poll(&mut self) -> Result<Option<UltimateMove>> {
        while self.pending.is_some() {
            match self.rx.try_recv() {
                Ok(response) => {
                    if let Some(answer) = self.accept(response) {
                        return answer.map(Some);
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    self.pending = None;
                    return Err(Error::WorkerDisconnected);
                }
            }
        }
        Ok(None)
    }

    /// Blocks until the pending request is answered
    ///
    /// Fails with `Error::NoMoveAvailable` when nothing was requested.
    pub fn wait(&mut self) -> Result<UltimateMove> {
        if self.pending.is_none() {
            return Err(Error::NoMoveAvailable);
        }
        loop {
            let response = self.rx.recv().map_err(|_| {
                self.pending = None;
                Error::WorkerDisconnected
            })?;
            if let Some(answer) = self.accept(response) {
                return answer;
            }
        }
    }

    /// Stops the pending search early; its answer is discarded
    pub fn cancel(&mut self) {
        if let Some((request_id, cancel)) = self.pending.take() {
            debug!("cancelling request {}", request_id);
            cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Replaces the worker's engine settings for later requests
    pub fn update_settings(&self, config: &SearchConfig) -> Result<()> {
        self.tx
            .send(AIRequest::UpdateSettings {
                exploration_parameter: config.exploration_parameter,
                seed: config.seed,
            })
            .map_err(|_| Error::WorkerDisconnected)
    }

    /// Stops the worker and waits for its thread to finish
    pub fn shutdown(mut self) {
        self.stop();
    }

    /// Matches a response against the pending request. Stale answers and
    /// progress notices yield None.
    fn accept(&mut self, response: AIResponse) -> Option<Result<UltimateMove>> {
        let current = self.pending.as_ref().map(|(id, _)| *id)?;
        let answer = match response {
            AIResponse::Thinking(_) => return None,
            AIResponse::MoveReady(mv, id) if id == current => Ok(mv),
            AIResponse::Error(e, id) if id == current => Err(e),
            _ => return None,
        };
        self.pending = None;
        Some(answer)
    }

    fn stop(&mut self) {
        self.cancel();
        let _ = self.tx.send(AIRequest::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("AI worker thread panicked");
            }
        }
    }
}

impl Drop for AIHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
