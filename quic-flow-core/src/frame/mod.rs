// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The subset of RFC 9000 control frames the flow-control engine consumes.
//!
//! Decoding these frames off the wire is the packet parser's job; this
//! crate only owns the decoded shape.

mod max_data;
mod max_stream_data;

pub use max_data::MaxData;
pub use max_stream_data::MaxStreamData;
