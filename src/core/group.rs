//! # Group Module / 组模块
//!
//! A [`Group`] is an ordered list of children (cases and nested groups)
//! sharing one argument resolver, one pair of `pre_test` / `post_test`
//! hooks and an optional `constructor` / `destructor` pair.
//!
//! Every invocation walks the same states:
//! `entering -> constructor -> children -> results -> destructor -> exited`.
//! Children run strictly in insertion order and never concurrently. A
//! failing child is recorded and its siblings still run; the collected
//! failures are returned as one [`AggregateError`] tagged with the group's
//! name once the group is done.
//!
//! 一个 [`Group`] 是一组有序的子项（用例和嵌套组），它们共享同一个参数解析器、
//! 同一对 `pre_test` / `post_test` 钩子，以及可选的 `constructor` / `destructor`。
//!
//! 每次调用都经历相同的状态：
//! `进入 -> 构造 -> 子项 -> 结果 -> 析构 -> 退出`。
//! 子项严格按插入顺序执行，绝不并发。失败的子项会被记录，
//! 其兄弟项仍会继续执行；组结束后，收集到的失败会作为一个带有组名的
//! [`AggregateError`] 返回。

use anyhow::{Result, anyhow};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::args::{ArgResolver, ArgSpec, expect_args, expect_kwargs};
use crate::core::bundle::CaseBundle;
use crate::core::case::{Case, CaseHooks, run_hook, run_hook_blocking};
use crate::core::context::RunContext;
use crate::core::error::{AggregateError, BuildError, Failure, INIT_ORIGIN};
use crate::core::execution::{self, Dispatch, Runner};
use crate::core::models::{GroupTable, Hook, Mode, TableRow};
use crate::core::planner::{self, Item};
use crate::core::stats::Measurement;
use crate::reporting::console;

/// One child of a group.
#[derive(Debug)]
pub enum Node {
    Case(Case),
    Group(Group),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Case(case) => case.name(),
            Node::Group(group) => group.name(),
        }
    }

    pub fn is_async(&self) -> bool {
        match self {
            Node::Case(case) => case.is_async(),
            Node::Group(group) => group.is_async(),
        }
    }
}

/// Options a group is assembled with.
///
/// Argument options take JSON values: `global_args` and each entry of
/// `personal_args` must be arrays, `global_kwargs` and each entry of
/// `personal_kwargs` must be objects. `null` means "not supplied".
///
/// 组装配时使用的选项。参数选项使用 JSON 值：`global_args` 和 `personal_args`
/// 的每一项必须是数组，`global_kwargs` 和 `personal_kwargs` 的每一项必须是对象。
/// `null` 表示未提供。
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    name: String,
    global_args: Value,
    global_kwargs: Value,
    personal_args: Vec<Value>,
    personal_kwargs: Vec<Value>,
    pre_test: Option<Hook>,
    post_test: Option<Hook>,
    constructor: Option<Hook>,
    destructor: Option<Hook>,
}

impl GroupOptions {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn global_args(mut self, args: Value) -> Self {
        self.global_args = args;
        self
    }

    pub fn global_kwargs(mut self, kwargs: Value) -> Self {
        self.global_kwargs = kwargs;
        self
    }

    /// One positional binding per entry; every case is called once per
    /// entry.
    pub fn personal_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.personal_args = args.into_iter().collect();
        self
    }

    pub fn personal_kwargs(mut self, kwargs: impl IntoIterator<Item = Value>) -> Self {
        self.personal_kwargs = kwargs.into_iter().collect();
        self
    }

    pub fn pre_test(mut self, hook: Hook) -> Self {
        self.pre_test = Some(hook);
        self
    }

    pub fn post_test(mut self, hook: Hook) -> Self {
        self.post_test = Some(hook);
        self
    }

    pub fn constructor(mut self, hook: Hook) -> Self {
        self.constructor = Some(hook);
        self
    }

    pub fn destructor(mut self, hook: Hook) -> Self {
        self.destructor = Some(hook);
        self
    }

    pub(crate) fn name_is_empty(&self) -> bool {
        self.name.is_empty()
    }

    fn arg_spec(&self) -> Result<ArgSpec, BuildError> {
        let personal_args = self
            .personal_args
            .iter()
            .enumerate()
            .map(|(i, value)| expect_args(&format!("personal_args[{i}]"), value.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let personal_kwargs = self
            .personal_kwargs
            .iter()
            .enumerate()
            .map(|(i, value)| expect_kwargs(&format!("personal_kwargs[{i}]"), value.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ArgSpec {
            global_args: expect_args("global_args", self.global_args.clone())?,
            global_kwargs: expect_kwargs("global_kwargs", self.global_kwargs.clone())?,
            personal_args,
            personal_kwargs,
        })
    }
}

/// An ordered, named collection of cases and nested groups.
///
/// 由用例和嵌套组组成的有序具名集合。
pub struct Group {
    name: String,
    children: Vec<Node>,
    is_async: bool,
    constructor: Option<Hook>,
    destructor: Option<Hook>,
    resolver: Arc<ArgResolver>,
    hooks: Arc<CaseHooks>,
    init_errors: Vec<(String, BuildError)>,
}

impl Group {
    /// Assembles a group, classifying and binding every item up front.
    ///
    /// Any argument conflict is fatal and reported before anything runs.
    ///
    /// 装配一个组，预先对每个条目进行分类和参数绑定。
    /// 任何参数冲突都是致命的，并在运行前报告。
    pub fn new<I>(items: impl IntoIterator<Item = I>, options: GroupOptions) -> Result<Self, BuildError>
    where
        I: Into<Item>,
    {
        let resolver = Arc::new(ArgResolver::new(options.arg_spec()?)?);
        let hooks = Arc::new(CaseHooks {
            pre_test: options.pre_test,
            post_test: options.post_test,
        });
        let mut group = Self::with_shared(
            options.name,
            Arc::clone(&resolver),
            Arc::clone(&hooks),
            options.constructor,
            options.destructor,
        );
        for item in items {
            group.push(planner::normalize(item.into(), &resolver, &hooks)?);
        }
        Ok(group)
    }

    /// An empty group reusing an existing resolver and hook set.
    pub fn with_shared(
        name: impl Into<String>,
        resolver: Arc<ArgResolver>,
        hooks: Arc<CaseHooks>,
        constructor: Option<Hook>,
        destructor: Option<Hook>,
    ) -> Self {
        let is_async = hooks.is_async()
            || constructor.as_ref().is_some_and(Hook::is_async)
            || destructor.as_ref().is_some_and(Hook::is_async);
        Self {
            name: name.into(),
            children: Vec::new(),
            is_async,
            constructor,
            destructor,
            resolver,
            hooks,
            init_errors: Vec::new(),
        }
    }

    /// Appends a child. A group becomes asynchronous as soon as one child is.
    pub fn push(&mut self, node: Node) {
        self.is_async |= node.is_async();
        self.children.push(node);
    }

    pub fn push_init_error(&mut self, member: impl Into<String>, error: BuildError) {
        self.init_errors.push((member.into(), error));
    }

    /// Adds the test members of `bundle` directly to this group and adopts
    /// its constructor and destructor.
    ///
    /// 将 `bundle` 的测试成员直接加入本组，并采用其构造和析构钩子。
    pub fn absorb_bundle(&mut self, bundle: Arc<dyn CaseBundle>) {
        if let Some(hook) = bundle.constructor() {
            self.is_async |= hook.is_async();
            self.constructor = Some(hook);
        }
        if let Some(hook) = bundle.destructor() {
            self.is_async |= hook.is_async();
            self.destructor = Some(hook);
        }
        let expanded = planner::expand_bundle(bundle, &self.resolver, &self.hooks);
        self.init_errors.extend(expanded.init_errors);
        for node in expanded.children {
            self.push(node);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// True when any descendant case or any hook is asynchronous.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn init_errors(&self) -> &[(String, BuildError)] {
        &self.init_errors
    }

    /// Runs every child once.
    ///
    /// An asynchronous group is driven on a fresh runtime; calling this from
    /// inside a running runtime is an error, use [`Group::run_test_async`]
    /// there instead.
    ///
    /// 每个子项运行一次。异步组会在新建的运行时上执行；
    /// 在已运行的运行时内部调用会返回错误，此时应使用 [`Group::run_test_async`]。
    pub fn run_test(&self, ctx: &RunContext) -> Result<(), AggregateError> {
        self.run(Mode::Test, ctx)
    }

    /// Benchmarks every child over `iterations` and prints the results table.
    pub fn run_bench(&self, iterations: usize, ctx: &RunContext) -> Result<(), AggregateError> {
        self.run(Mode::Bench { iterations }, ctx)
    }

    pub fn run_test_async<'a>(
        &'a self,
        ctx: &'a RunContext,
    ) -> BoxFuture<'a, Result<(), AggregateError>> {
        self.run_async(Mode::Test, ctx)
    }

    pub fn run_bench_async<'a>(
        &'a self,
        iterations: usize,
        ctx: &'a RunContext,
    ) -> BoxFuture<'a, Result<(), AggregateError>> {
        self.run_async(Mode::Bench { iterations }, ctx)
    }

    /// Runs the group as a top-level unit with the default configuration.
    pub fn go(self) -> Dispatch {
        Runner::default().go(self)
    }

    pub fn go_bench(self, iterations: usize) -> Result<Dispatch, BuildError> {
        Runner::default().go_bench(self, iterations)
    }

    fn run(&self, mode: Mode, ctx: &RunContext) -> Result<(), AggregateError> {
        if !self.is_async {
            return self.run_blocking(mode, ctx);
        }
        if execution::runtime_active() {
            return Err(self.single_failure(anyhow!(
                "asynchronous group has to be awaited inside the running runtime"
            )));
        }
        execution::block_on_fresh(self.run_async(mode, ctx))
            .unwrap_or_else(|error| Err(self.single_failure(error)))
    }

    pub(crate) fn run_blocking(&self, mode: Mode, ctx: &RunContext) -> Result<(), AggregateError> {
        let mut scope = GroupScope::open(self, mode, ctx);
        if self.is_empty() {
            return self.report_empty(ctx);
        }

        if scope.constructed(run_hook_blocking(self.constructor.as_ref())) {
            for child in &self.children {
                let proceed = match child {
                    Node::Case(case) => {
                        let outcome = case.run(mode, scope.inner());
                        scope.case_done(case, outcome)
                    }
                    Node::Group(group) => {
                        let outcome = group.run_blocking(mode, scope.inner());
                        scope.group_done(outcome)
                    }
                };
                if !proceed {
                    break;
                }
            }
            scope.print_results();
            scope.destructed(run_hook_blocking(self.destructor.as_ref()));
        } else {
            scope.print_results();
        }
        scope.finish()
    }

    /// Same shape as [`Group::run_blocking`]; asynchronous children are
    /// awaited, synchronous ones called inline, one after the other.
    pub(crate) fn run_async<'a>(
        &'a self,
        mode: Mode,
        ctx: &'a RunContext,
    ) -> BoxFuture<'a, Result<(), AggregateError>> {
        async move {
            let mut scope = GroupScope::open(self, mode, ctx);
            if self.is_empty() {
                return self.report_empty(ctx);
            }

            if scope.constructed(run_hook(self.constructor.as_ref()).await) {
                for child in &self.children {
                    let proceed = match child {
                        Node::Case(case) => {
                            let outcome = case.run_async(mode, scope.inner()).await;
                            scope.case_done(case, outcome)
                        }
                        Node::Group(group) => {
                            let outcome = group.run_async(mode, scope.inner()).await;
                            scope.group_done(outcome)
                        }
                    };
                    if !proceed {
                        break;
                    }
                }
                scope.print_results();
                scope.destructed(run_hook(self.destructor.as_ref()).await);
            } else {
                scope.print_results();
            }
            scope.finish()
        }
        .boxed()
    }

    /// An empty group runs no hooks. It fails when invoked directly or when
    /// its members could not be bound; nested inside a larger run it only
    /// prints the notice.
    fn report_empty(&self, ctx: &RunContext) -> Result<(), AggregateError> {
        console::print_tests_not_found(ctx.logger());
        let mut errors: Vec<Failure> = self.init_failure().into_iter().collect();
        if ctx.is_root() {
            errors.push(Failure::bare(anyhow!("Tests not found")));
        }
        match errors.is_empty() {
            true => Ok(()),
            false => Err(AggregateError::new(self.name.clone(), errors)),
        }
    }

    fn init_failure(&self) -> Option<Failure> {
        if self.init_errors.is_empty() {
            return None;
        }
        let leaves = self
            .init_errors
            .iter()
            .map(|(member, error)| Failure::leaf(member.clone(), anyhow::Error::new(error.clone())))
            .collect();
        Some(Failure::Group(AggregateError::new(INIT_ORIGIN, leaves)))
    }

    fn single_failure(&self, error: anyhow::Error) -> AggregateError {
        AggregateError::new(self.name.clone(), vec![Failure::bare(error)])
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("is_async", &self.is_async)
            .field("children", &self.children)
            .field("init_errors", &self.init_errors)
            .finish_non_exhaustive()
    }
}

/// Book-keeping of one group invocation: the child context, collected
/// failures and benchmark rows.
struct GroupScope<'a> {
    group: &'a Group,
    mode: Mode,
    ctx: &'a RunContext,
    inner: RunContext,
    started: Duration,
    errors: Vec<Failure>,
    rows: Vec<TableRow>,
}

impl<'a> GroupScope<'a> {
    fn open(group: &'a Group, mode: Mode, ctx: &'a RunContext) -> Self {
        console::print_group_header(ctx.logger(), mode, &group.name);
        Self {
            group,
            mode,
            ctx,
            inner: ctx.child(),
            started: ctx.clock().now(),
            errors: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn inner(&self) -> &RunContext {
        &self.inner
    }

    /// Records a constructor failure. Children and destructor are skipped
    /// when it returns `false`.
    fn constructed(&mut self, outcome: Result<()>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(error) => {
                console::print_hook_error(self.inner.logger(), "constructor", &error);
                self.errors.push(Failure::leaf("constructor", error));
                false
            }
        }
    }

    fn case_done(&mut self, case: &Case, outcome: Result<Measurement, Failure>) -> bool {
        match outcome {
            Ok(measurement) => {
                if let Mode::Bench { .. } = self.mode {
                    self.rows.push(TableRow {
                        name: case.name().to_string(),
                        values: measurement
                            .columns()
                            .iter()
                            .map(Duration::as_secs_f64)
                            .collect(),
                    });
                }
                true
            }
            Err(failure) => self.failed(failure),
        }
    }

    fn group_done(&mut self, outcome: Result<(), AggregateError>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(error) => self.failed(Failure::Group(error)),
        }
    }

    /// Returns whether the remaining siblings should still run.
    fn failed(&mut self, failure: Failure) -> bool {
        self.errors.push(failure);
        !self.ctx.config().fail_fast
    }

    fn print_results(&mut self) {
        if let Mode::Bench { iterations } = self.mode {
            if !self.rows.is_empty() {
                let table = GroupTable {
                    group: self.group.name.clone(),
                    headers: Measurement::headers(iterations)
                        .iter()
                        .map(|header| header.to_string())
                        .collect(),
                    rows: std::mem::take(&mut self.rows),
                };
                console::print_table(self.ctx.logger(), &table);
                self.ctx.recorder().push(table);
            }
        }
        let elapsed = self.ctx.clock().now().saturating_sub(self.started);
        console::print_group_footer(self.ctx.logger(), elapsed);
    }

    fn destructed(&mut self, outcome: Result<()>) {
        if let Err(error) = outcome {
            console::print_hook_error(self.ctx.logger(), "destructor", &error);
            self.errors.push(Failure::leaf("destructor", error));
        }
    }

    fn finish(self) -> Result<(), AggregateError> {
        let mut errors: Vec<Failure> = self.group.init_failure().into_iter().collect();
        errors.extend(self.errors);
        match errors.is_empty() {
            true => Ok(()),
            false => Err(AggregateError::new(self.group.name.clone(), errors)),
        }
    }
}
