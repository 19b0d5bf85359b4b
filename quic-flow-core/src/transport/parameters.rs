// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The subset of RFC 9000 transport parameters the flow-control engine
//! cares about. Wire encoding/decoding of the full parameter set lives
//! with the handshake layer, out of scope here.

use crate::{
    endpoint,
    stream::{StreamId, StreamType},
    varint::VarInt,
};

//= https://www.rfc-editor.org/rfc/rfc9000#section-18.2
//# If present, transport parameters that set initial per-stream flow
//# control limits (initial_max_stream_data_bidi_local,
//# initial_max_stream_data_bidi_remote, and initial_max_stream_data_uni)
//# are equivalent to sending a MAX_STREAM_DATA frame (Section 19.10) on
//# every stream of the corresponding type immediately after opening. If
//# the transport parameter is absent, streams of that type start with a
//# flow control limit of 0.

/// The four initial flow control limits exchanged during the handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitialFlowControlLimits {
    pub max_data: VarInt,
    pub stream_limits: InitialStreamLimits,
}

/// The three initial per-stream flow control limits a peer declares about
/// *itself*: `bidi_local`/`bidi_remote` are named from the declaring
/// endpoint's own point of view (RFC 9000 §18.2), not the reader's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitialStreamLimits {
    pub max_data_bidi_local: VarInt,
    pub max_data_bidi_remote: VarInt,
    pub max_data_uni: VarInt,
}

impl InitialStreamLimits {
    /// Returns the initial maximum stream data limit a sender must respect
    /// on `stream_id`, given these are the limits *the peer* declared and
    /// `local_endpoint_type` is the sender's own role.
    ///
    /// This is a pure function of the stream id and the local role. RFC 9000
    /// names `bidi_local`/`bidi_remote` from the declaring peer's own
    /// vantage point: the
    /// peer's `bidi_local` value bounds bidirectional streams *the peer*
    /// initiated, and its `bidi_remote` value bounds bidirectional streams
    /// initiated by whoever is reading the parameter (us). So from the
    /// sender's side, a stream this endpoint opened itself is "remote" to
    /// the peer who declared these limits, and a stream the peer opened is
    /// "local" to them:
    ///
    /// - unidirectional (either party's): always `max_data_uni`
    /// - a stream we initiated ourselves: the peer's `max_data_bidi_remote`
    /// - a stream the peer initiated: the peer's `max_data_bidi_local`
    pub fn max_data(&self, local_endpoint_type: endpoint::Type, stream_id: StreamId) -> VarInt {
        match (stream_id.initiator(), stream_id.stream_type()) {
            (initiator, StreamType::Bidirectional) if initiator == local_endpoint_type => {
                self.max_data_bidi_remote
            }
            (_, StreamType::Bidirectional) => self.max_data_bidi_local,
            (_, StreamType::Unidirectional) => self.max_data_uni,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamId;

    fn limits() -> InitialStreamLimits {
        InitialStreamLimits {
            max_data_bidi_local: VarInt::from_u32(100),
            max_data_bidi_remote: VarInt::from_u32(200),
            max_data_uni: VarInt::from_u32(300),
        }
    }

    #[test]
    fn uni_streams_always_use_the_uni_limit() {
        let limits = limits();
        for initiator in [endpoint::Type::Client, endpoint::Type::Server] {
            let id = StreamId::initial(initiator, StreamType::Unidirectional);
            assert_eq!(
                limits.max_data(endpoint::Type::Client, id),
                VarInt::from_u32(300)
            );
            assert_eq!(
                limits.max_data(endpoint::Type::Server, id),
                VarInt::from_u32(300)
            );
        }
    }

    #[test]
    fn own_stream_uses_the_peers_remote_value() {
        // a client sending on a stream it opened itself is bound by the
        // peer's `initialMaxStreamDataBidiRemote`.
        let limits = limits();
        let client_opened = StreamId::initial(endpoint::Type::Client, StreamType::Bidirectional);
        let server_opened = StreamId::initial(endpoint::Type::Server, StreamType::Bidirectional);

        assert_eq!(
            limits.max_data(endpoint::Type::Client, client_opened),
            VarInt::from_u32(200)
        );
        assert_eq!(
            limits.max_data(endpoint::Type::Server, server_opened),
            VarInt::from_u32(200)
        );
    }

    #[test]
    fn peer_opened_stream_uses_the_peers_local_value() {
        let limits = limits();
        let client_opened = StreamId::initial(endpoint::Type::Client, StreamType::Bidirectional);
        let server_opened = StreamId::initial(endpoint::Type::Server, StreamType::Bidirectional);

        assert_eq!(
            limits.max_data(endpoint::Type::Client, server_opened),
            VarInt::from_u32(100)
        );
        assert_eq!(
            limits.max_data(endpoint::Type::Server, client_opened),
            VarInt::from_u32(100)
        );
    }
}
