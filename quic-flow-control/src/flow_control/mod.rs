// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The connection-level flow control engine: the stream identity
//! classifier and the credit ledger/calculator live in [`ledger`]; this
//! module owns the lock, the blocking/notification gate, and the public
//! contract stream senders and the receive path call into.

mod error;
mod ledger;
#[cfg(test)]
mod tests;

pub use error::FlowControlError;
pub use quic_flow_core::endpoint::Type as Role;

use ledger::Ledger;
use quic_flow_core::{
    frame::{MaxData, MaxStreamData},
    stream::StreamId,
    transport::InitialFlowControlLimits,
    varint::VarInt,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Condvar, Mutex,
};

/// Aggregate counters for an external metrics consumer. Read-only,
/// advisory, and not itself part of the credit protocol — it mirrors the
/// pattern of exposing plain accumulated counters for event/metrics
/// subscribers rather than a full publisher pipeline, which is out of
/// scope for this subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub conn_allowed: u64,
    pub conn_assigned: u64,
    /// Cumulative bytes granted across every `reserve` call, never reset.
    pub bytes_granted_total: u64,
    /// Cumulative count of `reserve` calls that returned no additional
    /// credit while more was requested.
    pub blocked_events_total: u64,
    /// Cumulative count of peer-update intake calls (`onMaxData`,
    /// `onMaxStreamData`, `applyPeerTransportParameters`) that actually
    /// raised a ceiling.
    pub peer_updates_applied_total: u64,
}

/// The connection-level send-side flow control engine.
///
/// One instance per QUIC connection, shared by every stream sender on
/// that connection. All mutable state lives behind a single mutex: the
/// connection budget couples every stream together, so per-stream
/// locks would still need a global acquisition to update the connection
/// counter, and `reserve` is latency-sensitive enough that an actor/queue
/// would add unwanted queueing delay.
pub struct ConnectionFlowController {
    ledger: Mutex<Ledger>,
    notify: Condvar,
    closed: AtomicBool,
}

impl ConnectionFlowController {
    /// Constructs a controller from *our* transport parameters at startup.
    /// `initial_limits` must already be known to fit in 62 bits, which
    /// `VarInt` enforces structurally — there is nothing further to
    /// validate here.
    #[inline]
    pub fn new(role: Role, initial_limits: InitialFlowControlLimits) -> Self {
        crate::log::debug!(?role, max_data = %initial_limits.max_data, "flow control initialized");
        Self {
            ledger: Mutex::new(Ledger::new(
                role,
                initial_limits.max_data,
                initial_limits.stream_limits,
            )),
            notify: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Advances `stream_id`'s `assigned` offset
    /// as far as `requested_limit` allows given current credit, and
    /// returns the new `assigned` value. A zero-increment result is legal
    /// and is the caller's cue to call [`Self::wait_for_credit`].
    #[inline]
    pub fn reserve(
        &self,
        stream_id: StreamId,
        requested_limit: VarInt,
    ) -> Result<VarInt, FlowControlError> {
        let mut ledger = self.lock();
        let granted = ledger.reserve(stream_id, requested_limit)?;
        drop(ledger);
        crate::log::trace!(stream_id = ?stream_id, assigned = %granted, "reserve");
        Ok(granted)
    }

    /// Read-only snapshot of available credit for `stream_id` (advisory;
    /// may be stale the instant it is observed, since another reserver can
    /// race it).
    #[inline]
    pub fn get_available(&self, stream_id: StreamId) -> Result<VarInt, FlowControlError> {
        self.lock().available(stream_id)
    }

    /// Blocks the caller until `available(stream_id) > 0`, then returns.
    /// Returns immediately if credit is already available. Does not itself
    /// emit STREAM_DATA_BLOCKED/DATA_BLOCKED frames — that is the sender
    /// subsystem's call, made at its own discretion.
    #[inline]
    pub fn wait_for_credit(&self, stream_id: StreamId) -> Result<(), FlowControlError> {
        self.wait_for_credit_while(stream_id, || false)
    }

    /// As [`Self::wait_for_credit`], but also wakes (with `Cancelled`) the
    /// first time `cancelled` returns `true`. Checked each time the gate
    /// is woken, i.e. on every credit increase and at a bounded polling
    /// interval, not continuously.
    pub fn wait_for_credit_while(
        &self,
        stream_id: StreamId,
        mut cancelled: impl FnMut() -> bool,
    ) -> Result<(), FlowControlError> {
        let mut guard = self.lock();
        loop {
            if self.closed.load(Ordering::Acquire) || cancelled() {
                return Err(FlowControlError::Cancelled);
            }

            let available = guard.available(stream_id)?;
            if available > VarInt::ZERO {
                return Ok(());
            }

            // Spurious wakeups are expected: we re-check the predicate in
            // this loop rather than trusting the wakeup's cause.
            let (next, timeout) = self
                .notify
                .wait_timeout(guard, std::time::Duration::from_millis(50))
                .expect("the lock is never poisoned: no critical section panics");
            guard = next;
            let _ = timeout;
        }
    }

    /// `onMaxData`: raises the connection ceiling if `frame.maximum_data`
    /// is actually higher than what we have recorded; out-of-order smaller
    /// values are logged and discarded, never treated as errors. Wakes
    /// every waiter if and only if the ceiling moved.
    #[inline]
    pub fn on_max_data(&self, frame: MaxData) {
        let mut ledger = self.lock();
        let changed = ledger.on_max_data(frame.maximum_data);
        let conn_allowed = ledger.conn_allowed();
        drop(ledger);

        if changed {
            crate::log::debug!(max_data = %frame.maximum_data, "connection credit raised");
            self.notify.notify_all();
        } else {
            crate::log::trace!(
                max_data = %frame.maximum_data,
                current = %conn_allowed,
                "ignored out-of-order MAX_DATA"
            );
        }
    }

    /// `onMaxStreamData`: creates the stream's entry on first touch if
    /// needed, then raises its ceiling if `frame.maximum_stream_data` is
    /// actually higher than what is recorded. Wakes every waiter if and
    /// only if the ceiling moved.
    #[inline]
    pub fn on_max_stream_data(&self, frame: MaxStreamData) -> Result<(), FlowControlError> {
        let mut ledger = self.lock();
        let changed = ledger.on_max_stream_data(frame.stream_id, frame.maximum_stream_data)?;
        drop(ledger);

        if changed {
            crate::log::debug!(
                stream_id = ?frame.stream_id,
                max_stream_data = %frame.maximum_stream_data,
                "stream credit raised"
            );
            self.notify.notify_all();
        } else {
            crate::log::trace!(
                stream_id = ?frame.stream_id,
                max_stream_data = %frame.maximum_stream_data,
                "ignored out-of-order MAX_STREAM_DATA"
            );
        }
        Ok(())
    }

    /// `applyPeerTransportParameters` (Client only): a one-shot transition
    /// that lets a 0-RTT client's remembered initial limits be superseded
    /// by the server's authoritative values once the handshake completes.
    /// Per RFC 9000 §7.4.1 a compliant server never shrinks these, so any
    /// decrease observed here is a surprising-but-tolerated peer and is
    /// logged, not propagated as an error.
    pub fn apply_peer_transport_parameters(
        &self,
        params: InitialFlowControlLimits,
    ) -> Result<(), FlowControlError> {
        let mut ledger = self.lock();
        let (changed, rejected) =
            ledger.apply_peer_transport_parameters(params.max_data, params.stream_limits)?;
        drop(ledger);

        for name in rejected {
            crate::log::warn!(parameter = name, "peer attempted to reduce a remembered initial limit, ignoring");
        }
        if changed {
            crate::log::debug!("initial limits raised from peer transport parameters");
            self.notify.notify_all();
        }
        Ok(())
    }

    /// Advisory: stream ids currently at zero available credit. A sender
    /// deciding whether to emit STREAM_DATA_BLOCKED can consult this
    /// instead of reaching into the lock itself; this subsystem never
    /// emits the frame itself.
    pub fn blocked_streams(&self) -> Vec<StreamId> {
        self.lock().blocked_streams().collect()
    }

    /// Advisory: whether the connection-wide ceiling is currently
    /// exhausted (all of `connAllowed` is `connAssigned`).
    pub fn is_connection_blocked(&self) -> bool {
        self.lock().is_connection_blocked()
    }

    /// Aggregate counters for metrics consumers.
    pub fn snapshot(&self) -> Snapshot {
        let ledger = self.lock();
        Snapshot {
            conn_allowed: ledger.conn_allowed().as_u64(),
            conn_assigned: ledger.conn_assigned().as_u64(),
            bytes_granted_total: ledger.bytes_granted_total(),
            blocked_events_total: ledger.blocked_events_total(),
            peer_updates_applied_total: ledger.peer_updates_applied_total(),
        }
    }

    /// Wakes every waiter with `Cancelled`, e.g. on connection teardown.
    /// Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_all();
    }

    #[inline]
    fn lock(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .expect("the lock is never poisoned: no critical section panics")
    }
}
