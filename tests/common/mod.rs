// Shared test helpers for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cotest_runner::{
    CaptureBuffer, HarnessConfig, Hook, Logger, ManualClock, Params, RunContext, Runner,
};

/// A configuration that keeps captured output free of colors and progress
/// dots.
pub fn quiet_config() -> HarnessConfig {
    HarnessConfig {
        color: false,
        progress_width: 0,
        print_errors: false,
        ..HarnessConfig::default()
    }
}

/// A root run context writing into a buffer and timed by a manual clock.
pub struct Fixture {
    pub ctx: RunContext,
    pub output: CaptureBuffer,
    pub clock: Arc<ManualClock>,
}

pub fn fixture() -> Fixture {
    fixture_with(quiet_config())
}

pub fn fixture_with(config: HarnessConfig) -> Fixture {
    colored::control::set_override(false);
    let (logger, output) = Logger::capture();
    let clock = Arc::new(ManualClock::new());
    let ctx = RunContext::new(config)
        .with_logger(logger)
        .with_clock(clock.clone());
    Fixture { ctx, output, clock }
}

/// A runner writing into a buffer and timed by a manual clock.
pub fn runner_with(config: HarnessConfig) -> (Runner, CaptureBuffer, Arc<ManualClock>) {
    colored::control::set_override(false);
    let (logger, output) = Logger::capture();
    let clock = Arc::new(ManualClock::new());
    let runner = Runner::new(config)
        .with_logger(logger)
        .with_clock(clock.clone());
    (runner, output, clock)
}

pub fn runner() -> (Runner, CaptureBuffer, Arc<ManualClock>) {
    runner_with(quiet_config())
}

/// Records the order in which callables and hooks were invoked.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// A test body that records `name` and succeeds.
    pub fn passing(&self, name: &'static str) -> impl Fn(&Params) -> anyhow::Result<()> + Send + Sync + use<> {
        let log = self.clone();
        move |_: &Params| -> anyhow::Result<()> {
            log.push(name);
            Ok(())
        }
    }

    /// A test body that records `name` and fails with "boom".
    pub fn failing(&self, name: &'static str) -> impl Fn(&Params) -> anyhow::Result<()> + Send + Sync + use<> {
        let log = self.clone();
        move |_: &Params| -> anyhow::Result<()> {
            log.push(name);
            anyhow::bail!("boom")
        }
    }

    /// A hook that records `name`.
    pub fn hook(&self, name: &'static str) -> Hook {
        let log = self.clone();
        Hook::sync(move || {
            log.push(name);
            Ok(())
        })
    }
}

/// A test body that advances `clock` by `by` every time it is called.
pub fn ticking(
    clock: &Arc<ManualClock>,
    by: Duration,
) -> impl Fn(&Params) -> anyhow::Result<()> + Send + Sync + use<> {
    let clock = Arc::clone(clock);
    move |_: &Params| -> anyhow::Result<()> {
        clock.advance(by);
        Ok(())
    }
}

/// Counts invocations.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
