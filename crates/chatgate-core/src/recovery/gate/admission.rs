//! FIFO admission gate with minimum dispatch spacing

use super::types::{DispatchPermit, GateConfig};
use crate::error::{ChatGateError, ChatGateResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, trace};

#[derive(Debug)]
struct Waiter {
    ticket: u64,
    enqueued_at: Instant,
    tx: oneshot::Sender<DispatchPermit>,
}

#[derive(Debug, Default)]
struct GateState {
    /// Last time a waiter was actually released
    last_dispatch: Option<Instant>,
    /// Waiters in arrival order
    pending: VecDeque<Waiter>,
    /// Whether a drain task is running
    draining: bool,
    next_ticket: u64,
    closed: bool,
}

/// Admission gate shared by every caller that talks to one upstream.
///
/// Callers queue in strict arrival order. A single drain task releases the
/// head of the queue once `min_interval` has passed since the previous
/// release, then pauses for `pacing_delay` before looking at the next waiter.
///
/// Cloning the gate shares the queue and the dispatch clock, so one gate
/// constructed at startup and handed to every client serializes the whole
/// process.
///
/// A caller that drops its `admit()` future while queued simply disappears
/// from the queue: the dispatch clock does not advance and the waiters behind
/// it are not held up.
#[derive(Debug, Clone)]
pub struct RequestGate {
    config: GateConfig,
    state: Arc<Mutex<GateState>>,
}

impl RequestGate {
    /// Create a gate with the given spacing policy
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(GateState::default())),
        }
    }

    /// Get the spacing policy
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Wait for this caller's dispatch slot.
    ///
    /// Fails with `Cancelled` only if the gate is shut down while waiting.
    #[instrument(skip(self), level = "debug")]
    pub async fn admit(&self) -> ChatGateResult<DispatchPermit> {
        let rx = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(ChatGateError::Cancelled);
            }

            let ticket = state.next_ticket;
            state.next_ticket += 1;

            let (tx, rx) = oneshot::channel();
            state.pending.push_back(Waiter {
                ticket,
                enqueued_at: Instant::now(),
                tx,
            });
            debug!(ticket, queued = state.pending.len(), "waiting for dispatch slot");

            if !state.draining {
                state.draining = true;
                tokio::spawn(drain(self.config.clone(), Arc::clone(&self.state)));
            }
            rx
        };

        rx.await.map_err(|_| ChatGateError::Cancelled)
    }

    /// Number of callers still queued
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .pending
            .iter()
            .filter(|waiter| !waiter.tx.is_closed())
            .count()
    }

    /// Drop every queued waiter and refuse new ones
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        let dropped = state.pending.len();
        state.pending.clear();
        debug!(dropped, "request gate shut down");
    }

    /// Whether `shutdown` has been called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

/// Clears `draining` if the drain task is dropped before it finishes,
/// e.g. when the runtime that spawned it shuts down.
struct DrainGuard {
    state: Arc<Mutex<GateState>>,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.state.lock().draining = false;
            debug!("drain task dropped mid-drain");
        }
    }
}

/// Release waiters one by one until the queue is empty.
async fn drain(config: GateConfig, state: Arc<Mutex<GateState>>) {
    let mut drain_guard = DrainGuard {
        state: Arc::clone(&state),
        finished: false,
    };

    loop {
        let wait = {
            let mut guard = state.lock();
            guard.pending.retain(|waiter| !waiter.tx.is_closed());
            if guard.pending.is_empty() {
                // cleared under the lock so a concurrent admit spawns a new drain
                guard.draining = false;
                drain_guard.finished = true;
                return;
            }
            match guard.last_dispatch {
                Some(last) => config
                    .min_interval
                    .saturating_sub(Instant::now().duration_since(last)),
                None => Duration::ZERO,
            }
        };

        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis() as u64, "spacing next dispatch");
            sleep(wait).await;
        }

        let released = {
            let mut guard = state.lock();
            let Some(waiter) = guard.pending.pop_front() else {
                continue;
            };

            let now = Instant::now();
            let permit = DispatchPermit {
                ticket: waiter.ticket,
                dispatched_at: now,
                waited: now.duration_since(waiter.enqueued_at),
            };
            match waiter.tx.send(permit) {
                Ok(()) => {
                    guard.last_dispatch = Some(guard.last_dispatch.map_or(now, |last| last.max(now)));
                    debug!(
                        ticket = permit.ticket,
                        waited_ms = permit.waited.as_millis() as u64,
                        "dispatch slot granted"
                    );
                    true
                }
                Err(_) => {
                    debug!(ticket = permit.ticket, "waiter left before its slot");
                    false
                }
            }
        };

        if released && !config.pacing_delay.is_zero() {
            sleep(config.pacing_delay).await;
        }
    }
}
