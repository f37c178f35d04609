// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advances_both_timelines() {
    let clock = FakeClock::new();
    let start_instant = clock.now();
    let start_wall = clock.system_now();

    clock.advance(Duration::from_secs(5));

    assert_eq!(clock.now() - start_instant, Duration::from_secs(5));
    assert_eq!(
        clock
            .system_now()
            .duration_since(start_wall)
            .expect("time moves forward"),
        Duration::from_secs(5)
    );
}

#[test]
fn system_clock_now_is_monotonic() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}
