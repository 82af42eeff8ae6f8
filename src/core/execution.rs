//! # Execution Dispatch Module / 执行调度模块
//!
//! This module provides the top-level entry points. A root group is run to
//! completion and turned into a [`RunReport`], adapting to the caller's
//! concurrency context:
//!
//! - a group without asynchronous descendants runs inline;
//! - an asynchronous group called outside any runtime is driven on a fresh
//!   current-thread runtime;
//! - an asynchronous group called from inside a running runtime is never
//!   nested: the pending run is handed back for the caller to await.
//!
//! 此模块提供顶层入口。根组会被完整执行并转换为 [`RunReport`]，
//! 同时适配调用方的并发上下文：
//! 没有异步后代的组直接内联运行；在运行时之外调用的异步组会在新建的单线程
//! 运行时上执行；在已运行的运行时内部调用的异步组不会嵌套运行，
//! 而是将待完成的运行交还给调用方等待。

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;

use crate::core::config::HarnessConfig;
use crate::core::context::RunContext;
use crate::core::error::{AggregateError, BuildError, Failure};
use crate::core::group::{Group, GroupOptions};
use crate::core::models::{FailureRecord, Mode, RunReport};
use crate::core::planner::Item;
use crate::infra::{Clock, Logger, MonotonicClock};
use crate::reporting::{console, json};

/// Name of the implicit root group created by [`test_groups`].
pub const MAIN_GROUP: &str = "__main__";

/// Whether a tokio runtime is driving the current thread.
///
/// 当前线程是否处于正在运行的 tokio 运行时中。
pub fn runtime_active() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

/// Drives `future` to completion on a new current-thread runtime.
pub(crate) fn block_on_fresh<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start an async runtime")?;
    Ok(runtime.block_on(future))
}

/// An asynchronous run handed back to a caller that already runs inside a
/// runtime.
pub struct PendingRun(BoxFuture<'static, RunReport>);

impl Future for PendingRun {
    type Output = RunReport;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<RunReport> {
        self.get_mut().0.poll_unpin(cx)
    }
}

impl fmt::Debug for PendingRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingRun")
    }
}

/// The outcome of a top-level call.
///
/// 顶层调用的结果。
#[derive(Debug)]
pub enum Dispatch {
    /// The run finished before the call returned.
    Completed(RunReport),
    /// The run has to be awaited by the caller.
    Pending(PendingRun),
}

impl Dispatch {
    pub fn is_pending(&self) -> bool {
        matches!(self, Dispatch::Pending(_))
    }

    /// Returns the report, completing a pending run on a fresh runtime.
    /// Fails for a pending run when called inside a running runtime; await
    /// the [`PendingRun`] there instead.
    ///
    /// 返回运行报告；对于待完成的运行，会在新的运行时上完成它。
    pub fn into_report(self) -> Result<RunReport> {
        match self {
            Dispatch::Completed(report) => Ok(report),
            Dispatch::Pending(run) => {
                if runtime_active() {
                    bail!("a pending run has to be awaited inside the running runtime");
                }
                block_on_fresh(run)
            }
        }
    }
}

/// Runs root groups with one configuration, logger and clock.
///
/// 使用同一套配置、日志器和时钟运行根组。
#[derive(Debug, Clone)]
pub struct Runner {
    config: Arc<HarnessConfig>,
    logger: Logger,
    clock: Arc<dyn Clock>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl Runner {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config: Arc::new(config),
            logger: Logger::stdout(),
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs every case of `group` once.
    pub fn go(&self, group: Group) -> Dispatch {
        self.dispatch(group, Mode::Test)
    }

    /// Benchmarks every case of `group` over `iterations`.
    pub fn go_bench(&self, group: Group, iterations: usize) -> Result<Dispatch, BuildError> {
        if iterations == 0 {
            return Err(BuildError::ZeroIterations);
        }
        Ok(self.dispatch(group, Mode::Bench { iterations }))
    }

    /// Prints the greeting and runs `groups` under one `__main__` root.
    pub fn test_groups(
        &self,
        groups: impl IntoIterator<Item = Group>,
    ) -> Result<Dispatch, BuildError> {
        let root = Group::new(groups, GroupOptions::default().name(MAIN_GROUP))?;
        self.apply_color();
        console::print_greeting(&self.logger);
        Ok(self.go(root))
    }

    fn dispatch(&self, group: Group, mode: Mode) -> Dispatch {
        self.apply_color();
        let ctx = self.context();
        let name = group.name().to_string();

        if !group.is_async() {
            let started_at = Utc::now();
            let start = ctx.clock().now();
            let result = group.run_blocking(mode, &ctx);
            let elapsed = ctx.clock().now().saturating_sub(start);
            return Dispatch::Completed(self.conclude(name, mode, &ctx, started_at, elapsed, result));
        }

        let runner = self.clone();
        let run_name = name.clone();
        let run = async move {
            let started_at = Utc::now();
            let start = ctx.clock().now();
            let result = group.run_async(mode, &ctx).await;
            let elapsed = ctx.clock().now().saturating_sub(start);
            runner.conclude(run_name, mode, &ctx, started_at, elapsed, result)
        }
        .boxed();

        if runtime_active() {
            return Dispatch::Pending(PendingRun(run));
        }
        match block_on_fresh(run) {
            Ok(report) => Dispatch::Completed(report),
            Err(error) => {
                let failure = AggregateError::new(name.clone(), vec![Failure::bare(error)]);
                Dispatch::Completed(self.conclude(
                    name,
                    mode,
                    &self.context(),
                    Utc::now(),
                    Duration::ZERO,
                    Err(failure),
                ))
            }
        }
    }

    fn context(&self) -> RunContext {
        RunContext::with_config(Arc::clone(&self.config))
            .with_logger(self.logger.clone())
            .with_clock(Arc::clone(&self.clock))
    }

    fn apply_color(&self) {
        match self.config.color {
            true => colored::control::unset_override(),
            false => colored::control::set_override(false),
        }
    }

    /// Prints the error dump, builds the report and writes it as JSON when
    /// configured.
    fn conclude(
        &self,
        name: String,
        mode: Mode,
        ctx: &RunContext,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        result: Result<(), AggregateError>,
    ) -> RunReport {
        let error = result.err();
        let mut failures = Vec::new();
        if let Some(error) = &error {
            if self.config.print_errors {
                console::print_failures(ctx.logger(), error);
            }
            failures = error
                .leaves()
                .iter()
                .map(|leaf| FailureRecord {
                    path: leaf.path_string(),
                    origin: leaf.origin.map(str::to_string),
                    message: leaf.error.to_string(),
                })
                .collect();
        }

        let report = RunReport {
            name,
            mode,
            started_at,
            elapsed_secs: elapsed.as_secs_f64(),
            tables: ctx.recorder().take(),
            failures,
            error,
        };

        if let Some(path) = &self.config.json_report {
            if let Err(e) = json::write_json_report(&report, path) {
                ctx.logger().log(format!("! {e:#}"));
            }
        }
        report
    }
}

/// Runs `items` once each as one root group.
///
/// ```no_run
/// use cotest_runner::{GroupOptions, Item, Params, run_tests};
///
/// fn test_add(_: &Params) -> anyhow::Result<()> {
///     assert_eq!(1 + 1, 2);
///     Ok(())
/// }
///
/// let report = run_tests([Item::sync(test_add)], GroupOptions::default().name("math"))
///     .unwrap()
///     .into_report()
///     .unwrap();
/// assert!(report.is_success());
/// ```
pub fn run_tests<I>(
    items: impl IntoIterator<Item = I>,
    options: GroupOptions,
) -> Result<Dispatch, BuildError>
where
    I: Into<Item>,
{
    Ok(Group::new(items, options)?.go())
}

/// Benchmarks `items` over `iterations` as one root group.
pub fn run_benchmark<I>(
    items: impl IntoIterator<Item = I>,
    iterations: usize,
    options: GroupOptions,
) -> Result<Dispatch, BuildError>
where
    I: Into<Item>,
{
    if iterations == 0 {
        return Err(BuildError::ZeroIterations);
    }
    Group::new(items, options)?.go_bench(iterations)
}

/// Runs several groups one after the other under a `__main__` root,
/// preceded by the greeting banner.
///
/// 在 `__main__` 根组下依次运行多个组，并先打印欢迎横幅。
pub fn test_groups(groups: impl IntoIterator<Item = Group>) -> Result<Dispatch, BuildError> {
    Runner::default().test_groups(groups)
}
