// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::error::FlowControlError;
use quic_flow_core::{
    endpoint::Type as Role,
    stream::{StreamId, StreamType},
    transport::InitialStreamLimits,
    varint::VarInt,
};
use std::collections::HashMap;

/// One stream's slice of the ledger: the peer-imposed ceiling on its send
/// offset, and the highest offset this endpoint has authorized so far.
///
/// `0 <= assigned <= allowed` holds for every entry at every point the
/// lock is not held.
#[derive(Debug, Clone, Copy)]
struct StreamEntry {
    allowed: VarInt,
    assigned: VarInt,
}

/// Which of the three per-stream initial limits governs a stream. Named
/// after the `InitialStreamLimits` field it draws from, not after who
/// opened the stream: RFC 9000 §18.2 names `bidi_local`/`bidi_remote` from
/// the declaring peer's own point of view, so a stream *we* initiated is
/// bound by the peer's `bidi_remote` value and a stream the peer initiated
/// is bound by their `bidi_local` value (see
/// `InitialStreamLimits::max_data`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamClass {
    BidiLocal,
    BidiRemote,
    Uni,
}

/// A pure function of the stream id and the local role.
fn classify(role: Role, stream_id: StreamId) -> StreamClass {
    match (stream_id.initiator(), stream_id.stream_type()) {
        (initiator, StreamType::Bidirectional) if initiator == role => StreamClass::BidiRemote,
        (_, StreamType::Bidirectional) => StreamClass::BidiLocal,
        (_, StreamType::Unidirectional) => StreamClass::Uni,
    }
}

/// Rejects stream ids the local role has no business sending on: a
/// unidirectional stream may only be written to by the endpoint that
/// opened it.
fn ensure_sendable(role: Role, stream_id: StreamId) -> Result<(), FlowControlError> {
    if stream_id.stream_type() == StreamType::Unidirectional && stream_id.initiator() != role {
        return Err(FlowControlError::InternalInvariant {
            reason: "cannot send on a unidirectional stream the peer opened",
        });
    }
    Ok(())
}

/// The mutable state guarded by [`super::ConnectionFlowController`]'s lock:
/// the connection-wide counters plus the per-stream map, and the
/// arithmetic to derive available credit.
pub(super) struct Ledger {
    role: Role,
    /// Defaults applied to streams on first touch. Raised at most
    /// once, by `apply_peer_transport_parameters`, when acting as a
    /// 0-RTT client whose remembered values are superseded by the
    /// server's authoritative ones.
    initial_limits: InitialStreamLimits,
    conn_allowed: VarInt,
    conn_assigned: VarInt,
    streams: HashMap<StreamId, StreamEntry>,
    peer_params_applied: bool,
    /// Cumulative counters for [`super::Snapshot`]. These never decrease
    /// and are purely observational; no decision this ledger makes reads
    /// them back.
    bytes_granted_total: u64,
    blocked_events_total: u64,
    peer_updates_applied_total: u64,
}

impl Ledger {
    pub(super) fn new(
        role: Role,
        initial_max_data: VarInt,
        initial_limits: InitialStreamLimits,
    ) -> Self {
        Self {
            role,
            initial_limits,
            conn_allowed: initial_max_data,
            conn_assigned: VarInt::ZERO,
            streams: HashMap::new(),
            peer_params_applied: false,
            bytes_granted_total: 0,
            blocked_events_total: 0,
            peer_updates_applied_total: 0,
        }
    }

    /// Creates the stream's entry on first touch if it doesn't exist yet,
    /// then returns a copy of it.
    fn entry_or_insert(&mut self, stream_id: StreamId) -> Result<StreamEntry, FlowControlError> {
        if let Some(entry) = self.streams.get(&stream_id) {
            return Ok(*entry);
        }

        ensure_sendable(self.role, stream_id)?;

        let allowed = self.initial_limits.max_data(self.role, stream_id);
        let entry = StreamEntry {
            allowed,
            assigned: VarInt::ZERO,
        };
        self.streams.insert(stream_id, entry);
        Ok(entry)
    }

    /// `min(stream headroom, connection headroom)`. Both operands are
    /// non-negative since assigned never exceeds allowed on either axis.
    fn available_for(&self, entry: StreamEntry) -> VarInt {
        let stream_headroom = entry.allowed.saturating_sub(entry.assigned);
        let conn_headroom = self.conn_allowed.saturating_sub(self.conn_assigned);
        stream_headroom.min(conn_headroom)
    }

    /// Read-only snapshot of available credit for `stream_id`. Creates the
    /// entry on first touch like every other operation that observes a
    /// stream id.
    pub(super) fn available(&mut self, stream_id: StreamId) -> Result<VarInt, FlowControlError> {
        let entry = self.entry_or_insert(stream_id)?;
        Ok(self.available_for(entry))
    }

    /// See `ConnectionFlowController::reserve` for the full contract; this
    /// is the part that runs under the lock.
    pub(super) fn reserve(
        &mut self,
        stream_id: StreamId,
        requested_limit: VarInt,
    ) -> Result<VarInt, FlowControlError> {
        let entry = self.entry_or_insert(stream_id)?;

        if requested_limit < entry.assigned {
            return Err(FlowControlError::InvalidArgument {
                stream_id,
                requested: requested_limit,
                assigned: entry.assigned,
            });
        }

        let requested_increment = requested_limit
            .checked_sub(entry.assigned)
            .expect("requested_limit >= assigned was just checked");
        let possible_increment = self.available_for(entry);
        let granted = requested_increment.min(possible_increment);

        let new_assigned = entry
            .assigned
            .checked_add(granted)
            .expect("granted <= available <= allowed, which fits in a VarInt");

        self.streams.insert(
            stream_id,
            StreamEntry {
                allowed: entry.allowed,
                assigned: new_assigned,
            },
        );
        self.conn_assigned = self
            .conn_assigned
            .checked_add(granted)
            .expect("granted <= connection headroom, which fits in a VarInt");

        self.bytes_granted_total += granted.as_u64();
        if granted == VarInt::ZERO && requested_increment > VarInt::ZERO {
            self.blocked_events_total += 1;
        }

        Ok(new_assigned)
    }

    /// Raises the connection ceiling if `new_max` is actually higher than
    /// what is recorded; a smaller, out-of-order value is silently
    /// discarded rather than applied. Returns whether it changed, so the
    /// caller can decide whether to wake waiters and log.
    pub(super) fn on_max_data(&mut self, new_max: VarInt) -> bool {
        if new_max > self.conn_allowed {
            self.conn_allowed = new_max;
            self.peer_updates_applied_total += 1;
            true
        } else {
            false
        }
    }

    /// Creates the entry on first touch, then raises its ceiling if
    /// `new_max` is actually higher than what is recorded; a smaller,
    /// out-of-order value is silently discarded.
    pub(super) fn on_max_stream_data(
        &mut self,
        stream_id: StreamId,
        new_max: VarInt,
    ) -> Result<bool, FlowControlError> {
        let entry = self.entry_or_insert(stream_id)?;

        if new_max > entry.allowed {
            self.streams.insert(
                stream_id,
                StreamEntry {
                    allowed: new_max,
                    assigned: entry.assigned,
                },
            );
            self.peer_updates_applied_total += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// The one-shot 0-RTT-replacement transition. Returns `(changed,
    /// rejected)`: whether
    /// any ceiling was raised (wake waiters), and the names of any
    /// parameters that tried to lower a remembered limit (log only, per
    /// RFC 9000 §7.4.1).
    pub(super) fn apply_peer_transport_parameters(
        &mut self,
        max_data: VarInt,
        stream_limits: InitialStreamLimits,
    ) -> Result<(bool, Vec<&'static str>), FlowControlError> {
        if self.role != Role::Client {
            return Err(FlowControlError::InternalInvariant {
                reason: "applyPeerTransportParameters may only be called by a Client",
            });
        }
        if self.peer_params_applied {
            return Err(FlowControlError::InternalInvariant {
                reason: "applyPeerTransportParameters may only be invoked once per connection",
            });
        }
        self.peer_params_applied = true;

        let mut changed = false;
        let mut rejected = Vec::new();

        match max_data.as_u64().cmp(&self.conn_allowed.as_u64()) {
            std::cmp::Ordering::Greater => {
                self.conn_allowed = max_data;
                changed = true;
                self.peer_updates_applied_total += 1;
            }
            std::cmp::Ordering::Less => rejected.push("initial_max_data"),
            std::cmp::Ordering::Equal => {}
        }

        for (class, new_value, name) in [
            (
                StreamClass::BidiLocal,
                stream_limits.max_data_bidi_local,
                "initial_max_stream_data_bidi_local",
            ),
            (
                StreamClass::BidiRemote,
                stream_limits.max_data_bidi_remote,
                "initial_max_stream_data_bidi_remote",
            ),
            (
                StreamClass::Uni,
                stream_limits.max_data_uni,
                "initial_max_stream_data_uni",
            ),
        ] {
            let previous_initial = match class {
                StreamClass::BidiLocal => self.initial_limits.max_data_bidi_local,
                StreamClass::BidiRemote => self.initial_limits.max_data_bidi_remote,
                StreamClass::Uni => self.initial_limits.max_data_uni,
            };

            match new_value.as_u64().cmp(&previous_initial.as_u64()) {
                std::cmp::Ordering::Less => {
                    rejected.push(name);
                    continue;
                }
                std::cmp::Ordering::Equal => continue,
                std::cmp::Ordering::Greater => {}
            }

            match class {
                StreamClass::BidiLocal => self.initial_limits.max_data_bidi_local = new_value,
                StreamClass::BidiRemote => self.initial_limits.max_data_bidi_remote = new_value,
                StreamClass::Uni => self.initial_limits.max_data_uni = new_value,
            }
            self.peer_updates_applied_total += 1;

            for (stream_id, entry) in self.streams.iter_mut() {
                if classify(self.role, *stream_id) == class && new_value > entry.allowed {
                    entry.allowed = new_value;
                    changed = true;
                }
            }
        }

        Ok((changed, rejected))
    }

    /// For tests: the connection-wide assigned total must always equal the
    /// sum of every stream's assigned counter.
    #[cfg(test)]
    pub(super) fn conserves(&self) -> bool {
        let sum: u64 = self.streams.values().map(|e| e.assigned.as_u64()).sum();
        sum == self.conn_assigned.as_u64()
    }

    pub(super) fn conn_assigned(&self) -> VarInt {
        self.conn_assigned
    }

    pub(super) fn conn_allowed(&self) -> VarInt {
        self.conn_allowed
    }

    pub(super) fn bytes_granted_total(&self) -> u64 {
        self.bytes_granted_total
    }

    pub(super) fn blocked_events_total(&self) -> u64 {
        self.blocked_events_total
    }

    pub(super) fn peer_updates_applied_total(&self) -> u64 {
        self.peer_updates_applied_total
    }

    pub(super) fn blocked_streams(&self) -> impl Iterator<Item = StreamId> + '_ {
        self.streams.iter().filter_map(move |(id, entry)| {
            (self.available_for(*entry) == VarInt::ZERO).then_some(*id)
        })
    }

    pub(super) fn is_connection_blocked(&self) -> bool {
        self.conn_assigned == self.conn_allowed
    }
}
