// Copyright quic-flow-control Contributors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Multi-thread exercise of the blocking gate and peer-update intake,
//! grounded on `s2n-quic-dc::stream::send::flow::blocking`'s
//! `concurrent_flow` test: one thread blocks on scarce credit while
//! another raises the ceiling, and the connection-wide assigned total
//! must still equal the sum of every stream's assigned counter
//! throughout.

use super::{limits, stream, v};
use crate::{ConnectionFlowController, Role};
use quic_flow_core::{frame::MaxData, stream::StreamType};
use std::sync::Arc;

#[test]
fn waiter_is_woken_exactly_when_credit_becomes_available() {
    let fc = Arc::new(ConnectionFlowController::new(
        Role::Client,
        limits(0, 1000, 1000, 1000),
    ));
    let s0 = stream(Role::Client, StreamType::Bidirectional, 0);

    assert_eq!(fc.reserve(s0, v(1)).unwrap(), v(0));

    let waiter = {
        let fc = Arc::clone(&fc);
        std::thread::spawn(move || {
            fc.wait_for_credit(s0).unwrap();
            fc.reserve(s0, v(1)).unwrap()
        })
    };

    std::thread::sleep(std::time::Duration::from_millis(20));
    fc.on_max_data(MaxData { maximum_data: v(1000) });

    let granted = waiter.join().unwrap();
    assert_eq!(granted, v(1));
}

#[test]
fn concurrent_reservers_on_the_same_stream_never_exceed_the_ceiling() {
    let fc = Arc::new(ConnectionFlowController::new(
        Role::Client,
        limits(1000, 1000, 1000, 1000),
    ));
    let s0 = stream(Role::Client, StreamType::Bidirectional, 0);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let fc = Arc::clone(&fc);
            std::thread::spawn(move || {
                let mut granted_total = v(0);
                for _ in 0..50 {
                    let before = fc.get_available(s0).unwrap();
                    if before == v(0) {
                        continue;
                    }
                    let assigned = fc.reserve(s0, assigned_plus_one(before)).unwrap();
                    granted_total = assigned;
                }
                granted_total
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let snapshot = fc.snapshot();
    assert!(snapshot.conn_assigned <= snapshot.conn_allowed);
    assert_eq!(snapshot.conn_assigned, 1000);
}

fn assigned_plus_one(available: quic_flow_core::varint::VarInt) -> quic_flow_core::varint::VarInt {
    // Always request the whole connection ceiling; `reserve` itself clamps
    // to whatever is actually available at the moment it runs under the
    // lock, so overlapping requests from other threads are harmless.
    let _ = available;
    quic_flow_core::varint::VarInt::new(u64::MAX >> 2).unwrap()
}

#[test]
fn close_wakes_every_blocked_waiter_with_cancelled() {
    let fc = Arc::new(ConnectionFlowController::new(
        Role::Client,
        limits(0, 0, 0, 0),
    ));
    let s0 = stream(Role::Client, StreamType::Bidirectional, 0);

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let fc = Arc::clone(&fc);
            std::thread::spawn(move || fc.wait_for_credit(s0))
        })
        .collect();

    std::thread::sleep(std::time::Duration::from_millis(20));
    fc.close();

    for w in waiters {
        assert_eq!(w.join().unwrap(), Err(crate::FlowControlError::Cancelled));
    }
}
