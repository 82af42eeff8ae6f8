//! # Run Context Module / 运行上下文模块
//!
//! The explicit context handed down the group/case recursion: the logger at
//! the current nesting depth, the clock, the run configuration and the
//! recorder collecting the tables groups print.
//!
//! 沿组/用例递归向下传递的显式上下文：当前嵌套深度的日志器、时钟、
//! 运行配置以及收集各组打印表格的记录器。

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::config::HarnessConfig;
use crate::core::models::GroupTable;
use crate::infra::{Clock, Logger, MonotonicClock};

/// Collects the benchmark tables of one run, in the order groups finish.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    tables: Arc<Mutex<Vec<GroupTable>>>,
}

impl Recorder {
    pub fn push(&self, table: GroupTable) {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(table);
    }

    pub fn take(&self) -> Vec<GroupTable> {
        std::mem::take(&mut *self.tables.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Per-level execution context.
///
/// 每一层级的执行上下文。
#[derive(Debug, Clone)]
pub struct RunContext {
    logger: Logger,
    clock: Arc<dyn Clock>,
    config: Arc<HarnessConfig>,
    recorder: Recorder,
}

impl RunContext {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_config(Arc::new(config))
    }

    /// A root context sharing an already wrapped configuration.
    pub fn with_config(config: Arc<HarnessConfig>) -> Self {
        Self {
            logger: Logger::stdout(),
            clock: Arc::new(MonotonicClock::new()),
            config,
            recorder: Recorder::default(),
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

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Nesting depth; zero for the directly invoked unit.
    pub fn depth(&self) -> usize {
        self.logger.level()
    }

    pub fn is_root(&self) -> bool {
        self.depth() == 0
    }

    /// The context for the children of the current unit.
    pub fn child(&self) -> Self {
        Self {
            logger: self.logger.child(),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
            recorder: self.recorder.clone(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}
