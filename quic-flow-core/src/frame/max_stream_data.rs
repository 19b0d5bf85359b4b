// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{stream::StreamId, varint::VarInt};

//= https://www.rfc-editor.org/rfc/rfc9000#19.10
//# A MAX_STREAM_DATA frame (type=0x11) is used in flow control to inform
//# a peer of the maximum amount of data that can be sent on a stream.

//= https://www.rfc-editor.org/rfc/rfc9000#19.10
//# MAX_STREAM_DATA Frame {
//#   Type (i) = 0x11,
//#   Stream ID (i),
//#   Maximum Stream Data (i),
//# }

/// A MAX_STREAM_DATA frame, decoded by the packet parser (out of scope here)
/// and handed to the flow controller's peer-update intake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MaxStreamData {
    /// The stream ID of the stream that is affected.
    pub stream_id: StreamId,

    /// A variable-length integer indicating the maximum amount of data
    /// that can be sent on the identified stream, in units of bytes.
    pub maximum_stream_data: VarInt,
}
