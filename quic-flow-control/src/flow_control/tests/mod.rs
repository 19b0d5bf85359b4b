// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Scenario tests covering the controller's worked flow-control examples,
//! plus a concurrency test and a classifier fuzz test. Split by concern the
//! way `s2n-quic-transport::stream::tests` splits into one file per
//! scenario group.

mod concurrency;

use super::*;
use quic_flow_core::{
    endpoint::Type as Role,
    stream::{StreamId, StreamType},
    transport::{InitialFlowControlLimits, InitialStreamLimits},
    varint::VarInt,
};

pub(super) fn v(value: u64) -> VarInt {
    VarInt::new(value).unwrap()
}

pub(super) fn stream(initiator: Role, stream_type: StreamType, n: u64) -> StreamId {
    StreamId::nth(initiator, stream_type, n).unwrap()
}

pub(super) fn limits(
    max_data: u64,
    bidi_local: u64,
    bidi_remote: u64,
    uni: u64,
) -> InitialFlowControlLimits {
    InitialFlowControlLimits {
        max_data: v(max_data),
        stream_limits: InitialStreamLimits {
            max_data_bidi_local: v(bidi_local),
            max_data_bidi_remote: v(bidi_remote),
            max_data_uni: v(uni),
        },
    }
}
