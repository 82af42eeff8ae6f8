//! # Clock Module / 时钟模块
//!
//! Every duration the harness reports is read from a [`Clock`]. The default
//! [`MonotonicClock`] wraps [`Instant`]; [`ManualClock`] only moves when it is
//! told to, which makes timing behaviour reproducible in tests.
//!
//! 所有计时都通过 [`Clock`] 读取。默认的 [`MonotonicClock`] 基于 [`Instant`]；
//! [`ManualClock`] 只在被显式推进时才前进，便于在测试中得到可复现的计时。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic time source. `now` returns the time elapsed since an
/// arbitrary, fixed origin.
///
/// 单调时间源。`now` 返回自某个固定起点以来经过的时间。
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Duration;
}

/// Wall-clock time from the operating system's monotonic timer.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that stands still until [`ManualClock::advance`] is called.
///
/// Tests hand this to a run context and advance it from inside the
/// callables under measurement, so the recorded durations are exact.
///
/// 一个在调用 [`ManualClock::advance`] 之前保持不动的时钟。
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`.
    /// 将时钟向前推进 `by`。
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
