//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the harness:
//! dynamic call parameters, the callable and hook shapes a case can wrap,
//! the execution mode, and the serializable run report.
//!
//! 此模块定义了整个测试工具中使用的核心数据结构：
//! 动态调用参数、用例可以包装的可调用对象和钩子的形式、执行模式以及可序列化的运行报告。

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::core::error::AggregateError;

/// Positional arguments of one bound call.
pub type Args = Vec<Value>;
/// Keyword arguments of one bound call, in insertion order.
pub type Kwargs = Map<String, Value>;

/// One resolved `(args, kwargs)` binding a case is invoked with.
///
/// 用例调用时使用的一组已解析的 `(args, kwargs)` 绑定。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub args: Args,
    pub kwargs: Kwargs,
}

impl Params {
    pub fn new(args: Args, kwargs: Kwargs) -> Self {
        Self { args, kwargs }
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// Deserializes the positional argument at `index`.
    ///
    /// 反序列化位于 `index` 的位置参数。
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let value = self
            .args
            .get(index)
            .ok_or_else(|| anyhow!("missing positional argument #{index}"))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("positional argument #{index} has an unexpected type"))
    }

    /// Deserializes the keyword argument `key`.
    pub fn kwarg<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .kwargs
            .get(key)
            .ok_or_else(|| anyhow!("missing keyword argument `{key}`"))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("keyword argument `{key}` has an unexpected type"))
    }

    /// Deserializes the keyword argument `key`, or returns `default` when
    /// it was not supplied.
    pub fn kwarg_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.kwargs.contains_key(key) {
            true => self.kwarg(key),
            false => Ok(default),
        }
    }
}

pub type SyncFn = Arc<dyn Fn(&Params) -> Result<()> + Send + Sync>;
pub type AsyncFn = Arc<dyn Fn(Params) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A test body: either a plain function or a function producing a future.
///
/// 测试体：普通函数或返回 future 的函数。
#[derive(Clone)]
pub enum Callable {
    Sync(SyncFn),
    Async(AsyncFn),
}

impl Callable {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Params) -> Result<()> + Send + Sync + 'static,
    {
        Callable::Sync(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Callable::Async(Arc::new(move |params| f(params).boxed()))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Callable::Async(_))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Sync(_) => f.write_str("Callable::Sync"),
            Callable::Async(_) => f.write_str("Callable::Async"),
        }
    }
}

pub type SyncHookFn = Arc<dyn Fn() -> Result<()> + Send + Sync>;
pub type AsyncHookFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A zero-argument callable run around a case (`pre_test` / `post_test`)
/// or around a whole group (`constructor` / `destructor`).
///
/// 在用例周围（`pre_test` / `post_test`）或整个组周围（`constructor` / `destructor`）
/// 运行的无参数可调用对象。
#[derive(Clone)]
pub enum Hook {
    Sync(SyncHookFn),
    Async(AsyncHookFn),
}

impl Hook {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Hook::Sync(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Hook::Async(Arc::new(move || f().boxed()))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Hook::Async(_))
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Sync(_) => f.write_str("Hook::Sync"),
            Hook::Async(_) => f.write_str("Hook::Async"),
        }
    }
}

/// How a group or case is executed.
///
/// 组或用例的执行方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every bound call runs once.
    Test,
    /// Every bound call runs `iterations` times and is summarized.
    Bench { iterations: usize },
}

impl Mode {
    pub fn iterations(&self) -> usize {
        match self {
            Mode::Test => 1,
            Mode::Bench { iterations } => *iterations,
        }
    }

    /// The banner greeting printed when a group starts.
    pub fn greeting(&self) -> &'static str {
        match self {
            Mode::Test => "CoTest",
            Mode::Bench { .. } => "CoBench",
        }
    }
}

/// One row of a group's benchmark table. Values are seconds, one per
/// column of the owning table.
///
/// 组基准表中的一行。数值单位为秒，与所属表格的列一一对应。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub name: String,
    pub values: Vec<f64>,
}

/// The results table a group prints once all of its children finished.
///
/// 组在所有子项完成后打印的结果表。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTable {
    pub group: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl GroupTable {
    pub fn row(&self, name: &str) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

/// One leaf failure of a run, flattened for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub path: String,
    pub origin: Option<String>,
    pub message: String,
}

/// Everything one top-level run produced.
///
/// The aggregated error tree itself is kept out of the serialized form;
/// its leaves are available flattened in `failures`.
///
/// 一次顶层运行产生的全部结果。
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub name: String,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub tables: Vec<GroupTable>,
    pub failures: Vec<FailureRecord>,
    #[serde(skip)]
    pub error: Option<AggregateError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&AggregateError> {
        self.error.as_ref()
    }

    /// The table printed by the group called `group`, if it printed one.
    pub fn table(&self, group: &str) -> Option<&GroupTable> {
        self.tables.iter().find(|table| table.group == group)
    }
}
