use std::sync::mpsc::{self, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::client::{PredictionResult, RequestError};
use crate::screen::error::ActionError;

/// What a finished recognition request delivers.
pub type Outcome = Result<PredictionResult, RequestError>;

struct Inflight {
    id: u64,
    rx: mpsc::Receiver<Outcome>,
}

/// Runs at most one recognition request at a time on a background thread.
///
/// Invalidating drops the receiving end of the channel, so a response that
/// arrives afterwards has nowhere to go and is discarded.
pub struct RequestSlot {
    next_id: u64,
    inflight: Option<Inflight>,
}

impl RequestSlot {
    pub fn new() -> RequestSlot {
        RequestSlot { next_id: 1, inflight: None }
    }

    pub fn is_pending(&self) -> bool {
        self.inflight.is_some()
    }

    /// Starts `job` unless a request is already outstanding.
    ///
    /// Returns the request id used in log lines.
    pub fn start<F>(&mut self, job: F) -> Result<u64, ActionError>
    where
        F: FnOnce() -> Outcome + Send + 'static,
    {
        if let Some(inflight) = &self.inflight {
            debug!("request #{} still outstanding; rejecting new one", inflight.id);
            return Err(ActionError::Busy);
        }

        let id = self.next_id;
        self.next_id += 1;
        let (tx, rx) = mpsc::channel::<Outcome>();

        thread::spawn(move || {
            let outcome = job();
            if tx.send(outcome).is_err() {
                warn!("request #{} was invalidated; discarding its response", id);
            }
        });

        debug!("request #{} started", id);
        self.inflight = Some(Inflight { id, rx });
        Ok(id)
    }

    /// Forgets the outstanding request, if any. Returns whether one was dropped.
    pub fn invalidate(&mut self) -> bool {
        match self.inflight.take() {
            Some(inflight) => {
                debug!("request #{} invalidated", inflight.id);
                true
            }
            None => false,
        }
    }

    /// Non-blocking check for a finished request.
    pub fn poll(&mut self) -> Option<Outcome> {
        let received = self.inflight.as_ref()?.rx.try_recv();
        match received {
            Ok(outcome) => {
                self.inflight = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.worker_vanished()),
        }
    }

    /// Blocks until the outstanding request finishes. `None` when idle.
    pub fn wait(&mut self) -> Option<Outcome> {
        let received = self.inflight.as_ref()?.rx.recv();
        match received {
            Ok(outcome) => {
                self.inflight = None;
                Some(outcome)
            }
            Err(_) => Some(self.worker_vanished()),
        }
    }

    // The worker thread died (panicked) before answering.
    fn worker_vanished(&mut self) -> Outcome {
        if let Some(inflight) = self.inflight.take() {
            warn!("request #{} ended without a response", inflight.id);
        }
        Err(RequestError::NoResponse)
    }
}

impl Default for RequestSlot {
    fn default() -> Self {
        RequestSlot::new()
    }
}
