// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use quic_flow_core::{stream::StreamId, varint::VarInt};

/// Errors the flow-control engine can raise.
///
/// These are not protocol violations: malformed or oversized values are
/// rejected by the frame parser upstream, and peer policy anomalies (a
/// `MAX_DATA` that decreases, a transport parameter that tries to shrink a
/// previously communicated limit) are logged and ignored rather than
/// surfaced as errors, per RFC 9000 §7.4.1. What remains here are
/// programming errors: a caller asking to roll an
/// `assigned` counter backwards, or calling a role-restricted entry point
/// from the wrong role.
#[derive(PartialEq, Eq, Debug, Copy, Clone, displaydoc::Display)]
#[non_exhaustive]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum FlowControlError {
    /// requested limit {requested} for stream {stream_id:?} is below the current assigned offset {assigned}
    InvalidArgument {
        stream_id: StreamId,
        requested: VarInt,
        assigned: VarInt,
    },
    /// internal invariant violated: {reason}
    InternalInvariant { reason: &'static str },
    /// the wait for credit was cancelled
    Cancelled,
}
