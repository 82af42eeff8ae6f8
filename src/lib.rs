//! # CoTest Runner Library / CoTest Runner 库
//!
//! A minimalist test and benchmark harness. It accepts plain functions,
//! future-returning functions, already-created futures, case bundles and
//! nested groups, runs them once ("test mode") or many times ("benchmark
//! mode"), measures each callable and prints a hierarchical report.
//!
//! 一个极简的测试与基准测试工具。它接受普通函数、返回 future 的函数、
//! 已创建的 future、用例集合以及嵌套组，将它们运行一次（测试模式）
//! 或多次（基准模式），测量每个可调用对象的耗时并打印分层报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Group execution engine, argument binding and dispatch
//! - `infra` - Clock, hierarchical logger, progress ticker and panic guard
//! - `reporting` - Console output, result tables and JSON reports
//!
//! - `core` - 组执行引擎、参数绑定和调度
//! - `infra` - 时钟、分层日志器、进度条和 panic 保护
//! - `reporting` - 控制台输出、结果表和 JSON 报告
//!
//! ## Example / 示例
//!
//! ```no_run
//! use cotest_runner::{GroupOptions, Item, Params, run_benchmark};
//! use serde_json::json;
//!
//! fn test_sum(params: &Params) -> anyhow::Result<()> {
//!     let n: u64 = params.kwarg("n")?;
//!     assert_eq!((1..=n).sum::<u64>(), n * (n + 1) / 2);
//!     Ok(())
//! }
//!
//! let options = GroupOptions::default()
//!     .name("sums")
//!     .global_kwargs(json!({"n": 1000}));
//! let report = run_benchmark([Item::sync(test_sum)], 100, options)
//!     .unwrap()
//!     .into_report()
//!     .unwrap();
//! assert!(report.is_success());
//! ```

pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::{
    AggregateError, BuildError, BundleExt, CallItem, Callable, CaseBundle, Dispatch, Failure,
    Group, GroupOptions, HarnessConfig, Hook, Item, Measurement, Member, Mode, Params,
    PendingRun, RunContext, RunReport, Runner, Summary, run_benchmark, run_tests,
    runtime_active, test_groups,
};
pub use crate::infra::{CaptureBuffer, Clock, Logger, ManualClock, MonotonicClock};
