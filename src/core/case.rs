//! # Case Module / 用例模块
//!
//! A [`Case`] is the smallest runnable unit: one callable plus the
//! argument bindings it is invoked with, optionally wrapped by `pre_test` /
//! `post_test` hooks. Hook time is never part of a measurement.
//!
//! A case built from a pre-created coroutine can be driven exactly once; it
//! refuses multi-iteration benchmarks up front.
//!
//! [`Case`] 是最小的可运行单元：一个可调用对象及其参数绑定，
//! 可选地由 `pre_test` / `post_test` 钩子包裹。钩子的耗时不计入测量结果。
//! 由预先创建的协程构建的用例只能被驱动一次。

use anyhow::{Result, anyhow, bail};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::core::context::RunContext;
use crate::core::error::Failure;
use crate::core::execution;
use crate::core::models::{Callable, Hook, Mode, Params};
use crate::core::stats::Measurement;
use crate::infra::panic::{guard, guard_future};
use crate::infra::{Clock, ProgressBar};
use crate::reporting::console;

/// Hooks run around every bound call of a case. Shared read-only by all
/// cases of a group.
///
/// 在用例的每次绑定调用前后运行的钩子，由组内所有用例只读共享。
#[derive(Debug, Clone, Default)]
pub struct CaseHooks {
    pub pre_test: Option<Hook>,
    pub post_test: Option<Hook>,
}

impl CaseHooks {
    pub fn is_async(&self) -> bool {
        self.pre_test.as_ref().is_some_and(Hook::is_async)
            || self.post_test.as_ref().is_some_and(Hook::is_async)
    }
}

enum CaseBody {
    Call(Callable),
    Coroutine(Mutex<Option<BoxFuture<'static, Result<()>>>>),
}

/// One runnable test / benchmark unit.
pub struct Case {
    name: String,
    body: CaseBody,
    params: Vec<Params>,
    hooks: Arc<CaseHooks>,
    is_async: bool,
}

impl Case {
    /// A case calling `callable` once per entry of `params`. An empty
    /// `params` means a single call without arguments.
    pub fn new(
        name: impl Into<String>,
        callable: Callable,
        mut params: Vec<Params>,
        hooks: Arc<CaseHooks>,
    ) -> Self {
        if params.is_empty() {
            params.push(Params::default());
        }
        let is_async = callable.is_async() || hooks.is_async();
        Self {
            name: name.into(),
            body: CaseBody::Call(callable),
            params,
            hooks,
            is_async,
        }
    }

    /// A case awaiting an already-created future. It has exactly one,
    /// empty, binding.
    ///
    /// 等待一个已创建 future 的用例。它只有一个空绑定。
    pub fn from_coroutine(
        name: impl Into<String>,
        future: BoxFuture<'static, Result<()>>,
        hooks: Arc<CaseHooks>,
    ) -> Self {
        Self {
            name: name.into(),
            body: CaseBody::Coroutine(Mutex::new(Some(future))),
            params: vec![Params::default()],
            hooks,
            is_async: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn is_coroutine(&self) -> bool {
        matches!(self.body, CaseBody::Coroutine(_))
    }

    pub fn bound_params(&self) -> &[Params] {
        &self.params
    }

    /// Runs every bound call once and returns the summed duration.
    ///
    /// An asynchronous case is driven on a fresh runtime; inside a running
    /// runtime use [`Case::run_test_async`] instead.
    ///
    /// 每个绑定调用运行一次，返回总耗时。异步用例会在新建的运行时上执行；
    /// 在已运行的运行时内部应使用 [`Case::run_test_async`]。
    pub fn run_test(&self, ctx: &RunContext) -> Result<Duration, Failure> {
        self.drive(Mode::Test, ctx).map(|m| m.headline())
    }

    pub async fn run_test_async(&self, ctx: &RunContext) -> Result<Duration, Failure> {
        self.run_async(Mode::Test, ctx).await.map(|m| m.headline())
    }

    /// Repeats the single-shot measurement `iterations` times.
    pub fn run_bench(&self, iterations: usize, ctx: &RunContext) -> Result<Measurement, Failure> {
        self.drive(Mode::Bench { iterations }, ctx)
    }

    pub async fn run_bench_async(
        &self,
        iterations: usize,
        ctx: &RunContext,
    ) -> Result<Measurement, Failure> {
        self.run_async(Mode::Bench { iterations }, ctx).await
    }

    fn drive(&self, mode: Mode, ctx: &RunContext) -> Result<Measurement, Failure> {
        if !self.is_async {
            return self.run(mode, ctx);
        }
        if execution::runtime_active() {
            console::print_case_start(ctx.logger(), &self.name);
            let error = anyhow!(
                "`{}` is asynchronous and has to be awaited inside the running runtime",
                self.name
            );
            return self.conclude(ctx, Err(error));
        }
        execution::block_on_fresh(self.run_async(mode, ctx))
            .unwrap_or_else(|error| Err(Failure::leaf(self.name.clone(), error)))
    }

    /// Synchronous driver. Must not be used for asynchronous cases.
    pub(crate) fn run(&self, mode: Mode, ctx: &RunContext) -> Result<Measurement, Failure> {
        console::print_case_start(ctx.logger(), &self.name);
        let outcome = self.check_mode(mode).and_then(|iterations| {
            let mut bar = ProgressBar::new(iterations, ctx.config().progress_width);
            let mut samples = Vec::with_capacity(iterations);
            for i in 0..iterations {
                samples.push(self.measure_once(ctx.clock())?);
                if iterations > 1 && bar.should_tick(i) {
                    console::print_progress_tick(ctx.logger());
                }
            }
            Measurement::from_samples(&samples)
        });
        self.conclude(ctx, outcome)
    }

    /// Asynchronous driver; synchronous bodies and hooks are called inline.
    pub(crate) async fn run_async(
        &self,
        mode: Mode,
        ctx: &RunContext,
    ) -> Result<Measurement, Failure> {
        console::print_case_start(ctx.logger(), &self.name);
        let outcome = match self.check_mode(mode) {
            Ok(iterations) => self.sample_async(iterations, ctx).await,
            Err(e) => Err(e),
        };
        self.conclude(ctx, outcome)
    }

    async fn sample_async(&self, iterations: usize, ctx: &RunContext) -> Result<Measurement> {
        let mut bar = ProgressBar::new(iterations, ctx.config().progress_width);
        let mut samples = Vec::with_capacity(iterations);
        for i in 0..iterations {
            samples.push(self.measure_once_async(ctx.clock()).await?);
            if iterations > 1 && bar.should_tick(i) {
                console::print_progress_tick(ctx.logger());
            }
        }
        Measurement::from_samples(&samples)
    }

    fn check_mode(&self, mode: Mode) -> Result<usize> {
        let iterations = mode.iterations();
        if iterations == 0 {
            bail!("iterations must be at least 1");
        }
        if iterations > 1 && self.is_coroutine() {
            bail!("cannot reuse coroutines");
        }
        Ok(iterations)
    }

    fn conclude(&self, ctx: &RunContext, outcome: Result<Measurement>) -> Result<Measurement, Failure> {
        match outcome {
            Ok(measurement) => {
                console::print_case_ok(ctx.logger(), measurement.headline());
                Ok(measurement)
            }
            Err(error) => {
                console::print_case_error(ctx.logger(), &error);
                Err(Failure::leaf(self.name.clone(), error))
            }
        }
    }

    fn measure_once(&self, clock: &dyn Clock) -> Result<Duration> {
        let CaseBody::Call(Callable::Sync(f)) = &self.body else {
            bail!("`{}` is asynchronous and has to be awaited", self.name);
        };
        let mut total = Duration::ZERO;
        for params in &self.params {
            run_hook_blocking(self.hooks.pre_test.as_ref())?;
            let start = clock.now();
            guard(|| f(params))?;
            total += clock.now().saturating_sub(start);
            run_hook_blocking(self.hooks.post_test.as_ref())?;
        }
        Ok(total)
    }

    async fn measure_once_async(&self, clock: &dyn Clock) -> Result<Duration> {
        let callable = match &self.body {
            CaseBody::Call(callable) => callable,
            CaseBody::Coroutine(_) => {
                let future = self.take_coroutine()?;
                run_hook(self.hooks.pre_test.as_ref()).await?;
                let start = clock.now();
                guard_future(future).await?;
                let elapsed = clock.now().saturating_sub(start);
                run_hook(self.hooks.post_test.as_ref()).await?;
                return Ok(elapsed);
            }
        };

        let mut total = Duration::ZERO;
        for params in &self.params {
            run_hook(self.hooks.pre_test.as_ref()).await?;
            let start = clock.now();
            match callable {
                Callable::Sync(f) => guard(|| f(params))?,
                Callable::Async(f) => guard_future(async { f(params.clone()).await }).await?,
            }
            total += clock.now().saturating_sub(start);
            run_hook(self.hooks.post_test.as_ref()).await?;
        }
        Ok(total)
    }

    fn take_coroutine(&self) -> Result<BoxFuture<'static, Result<()>>> {
        let CaseBody::Coroutine(slot) = &self.body else {
            bail!("`{}` is not a coroutine", self.name);
        };
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.take()
            .ok_or_else(|| anyhow!("cannot reuse coroutines: `{}` was already awaited", self.name))
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("is_async", &self.is_async)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub(crate) fn run_hook_blocking(hook: Option<&Hook>) -> Result<()> {
    match hook {
        None => Ok(()),
        Some(Hook::Sync(f)) => guard(|| f()),
        Some(Hook::Async(_)) => bail!("asynchronous hook cannot run in a synchronous context"),
    }
}

pub(crate) async fn run_hook(hook: Option<&Hook>) -> Result<()> {
    match hook {
        None => Ok(()),
        Some(Hook::Sync(f)) => guard(|| f()),
        Some(Hook::Async(f)) => guard_future(async { f().await }).await,
    }
}
