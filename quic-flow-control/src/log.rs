// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Observational logging that compiles away entirely when the `tracing`
//! feature is disabled, mirroring `s2n-quic-core::state`'s
//! `state-tracing`-gated `_debug` re-export: callers write a single macro
//! invocation and never have to `#[cfg]` around it themselves.

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing::{debug as _debug, trace as _trace, warn as _warn};

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
pub use crate::__flow_control_tracing_noop__ as _debug;
#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
pub use crate::__flow_control_tracing_noop__ as _trace;
#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
pub use crate::__flow_control_tracing_noop__ as _warn;

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __flow_control_tracing_noop__ {
    ($($tt:tt)*) => {};
}

/// Logs at `debug` level. Always called outside the ledger's lock: never
/// log while holding the mutex.
macro_rules! debug {
    ($($tt:tt)*) => { $crate::log::_debug!($($tt)*) };
}

/// Logs at `trace` level, for the high-volume "value discarded" path.
macro_rules! trace {
    ($($tt:tt)*) => { $crate::log::_trace!($($tt)*) };
}

/// Logs at `warn` level, for peer policy anomalies worth a human's
/// attention (a shrinking `MAX_DATA`, a 0-RTT parameter reduction).
macro_rules! warn {
    ($($tt:tt)*) => { $crate::log::_warn!($($tt)*) };
}

pub(crate) use debug;
pub(crate) use trace;
pub(crate) use warn;
