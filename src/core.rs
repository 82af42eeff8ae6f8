//! # Core Module / 核心模块
//!
//! This module contains the group execution engine: argument resolution,
//! item normalization, cases, groups, statistics, error aggregation and the
//! top-level dispatch.
//!
//! 此模块包含组执行引擎：参数解析、条目规范化、用例、组、统计、
//! 错误聚合以及顶层调度。

pub mod args;
pub mod bundle;
pub mod case;
pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod group;
pub mod models;
pub mod planner;
pub mod stats;

// Re-exports
pub use args::{ArgResolver, ArgSpec};
pub use bundle::{BundleExt, CaseBundle, Member, TEST_PREFIX};
pub use case::{Case, CaseHooks};
pub use config::HarnessConfig;
pub use context::RunContext;
pub use error::{AggregateError, BuildError, Failure, LeafFailure};
pub use execution::{Dispatch, PendingRun, Runner, run_benchmark, run_tests, runtime_active, test_groups};
pub use group::{Group, GroupOptions, Node};
pub use models::{Callable, Hook, Mode, Params, RunReport};
pub use planner::{CallItem, Item};
pub use stats::{Measurement, Summary};
