// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The connection-level send-side flow control engine of a QUIC endpoint.
//!
//! This crate enforces and negotiates the per-stream and per-connection
//! data-transfer credit limits defined by RFC 9000 §4 and §19.9/§19.10: it
//! tracks the peer-imposed `MAX_DATA`/`MAX_STREAM_DATA` limits, computes
//! how many bytes a stream may dispatch right now, blocks producers when
//! no credit is available, and resumes them when new credit arrives.
//!
//! Out of scope, handled by other collaborators elsewhere in an endpoint:
//! packet parsing and framing, encryption and the key schedule, congestion
//! control and pacing, ACK processing and loss recovery,
//! transport-parameter wire encoding, the stream I/O buffers themselves,
//! connection lifecycle, and the command-line entry point. Likewise,
//! receive-side flow control (issuing credit to the peer), stream
//! prioritization, fairness policy, anti-amplification rate limiting, and
//! pacing are not this crate's concern.

mod log;

mod flow_control;

pub use flow_control::{ConnectionFlowController, FlowControlError, Role, Snapshot};

pub use quic_flow_core::{
    frame::{MaxData, MaxStreamData},
    stream::StreamId,
    transport::{InitialFlowControlLimits, InitialStreamLimits},
    varint::VarInt,
};
